//! Static types and generic-parameter substitution

use crate::name::{ClassId, Name};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in primitive types of the host language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveTy {
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Boolean
    Boolean,
    /// String
    String,
    /// No meaningful value
    Unit,
    /// Bottom type
    Nothing,
}

impl fmt::Display for PrimitiveTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveTy::Int => "Int",
            PrimitiveTy::Long => "Long",
            PrimitiveTy::Float => "Float",
            PrimitiveTy::Double => "Double",
            PrimitiveTy::Boolean => "Boolean",
            PrimitiveTy::String => "String",
            PrimitiveTy::Unit => "Unit",
            PrimitiveTy::Nothing => "Nothing",
        };
        write!(f, "{}", name)
    }
}

/// A static type as the front end sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ty {
    /// Primitive type
    Primitive(PrimitiveTy),
    /// Class or interface application: `List<Int>`, `State.Mutable<T>`
    Named {
        /// Referenced class
        class: ClassId,
        /// Type arguments, empty for non-generic classes
        args: Vec<Ty>,
    },
    /// Generic-parameter reference: `T`
    Param(Name),
    /// Nullable wrapper: `T?`
    Nullable(Box<Ty>),
}

impl Ty {
    /// A non-generic class type.
    pub fn named(class: ClassId) -> Self {
        Ty::Named { class, args: Vec::new() }
    }

    /// A generic class application.
    pub fn named_with(class: ClassId, args: Vec<Ty>) -> Self {
        Ty::Named { class, args }
    }

    /// Wrap this type as nullable.
    pub fn nullable(self) -> Self {
        match self {
            Ty::Nullable(_) => self,
            other => Ty::Nullable(Box::new(other)),
        }
    }

    /// Whether this is a bare primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Ty::Primitive(_))
    }

    /// The primitive kind, if this is a bare primitive.
    pub fn as_primitive(&self) -> Option<PrimitiveTy> {
        match self {
            Ty::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Whether this is a generic-parameter reference.
    pub fn is_param(&self) -> bool {
        matches!(self, Ty::Param(_))
    }

    /// The referenced class, if this is a class application.
    pub fn class_id(&self) -> Option<&ClassId> {
        match self {
            Ty::Named { class, .. } => Some(class),
            _ => None,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Primitive(p) => write!(f, "{}", p),
            Ty::Named { class, args } => {
                write!(f, "{}", class)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Ty::Param(name) => write!(f, "{}", name),
            Ty::Nullable(inner) => write!(f, "{}?", inner),
        }
    }
}

/// Declaration-site variance of a generic parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variance {
    /// `T` - read and write
    Invariant,
    /// `out T` - read only
    Covariant,
    /// `in T` - write only
    Contravariant,
}

/// A declared generic parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    /// Parameter name
    pub name: Name,
    /// Declaration-site variance
    pub variance: Variance,
    /// Upper bounds, empty when unbounded
    pub bounds: Vec<Ty>,
}

impl TypeParam {
    /// An unbounded invariant parameter.
    pub fn invariant(name: impl Into<String>) -> Self {
        TypeParam {
            name: Name::new(name),
            variance: Variance::Invariant,
            bounds: Vec::new(),
        }
    }

    /// An unbounded covariant parameter.
    pub fn covariant(name: impl Into<String>) -> Self {
        TypeParam {
            name: Name::new(name),
            variance: Variance::Covariant,
            bounds: Vec::new(),
        }
    }
}

/// A substitution from generic-parameter names to types.
///
/// Built once per owner/specification pair and applied to every field type
/// before it is attached to a synthesized member. Unmapped parameters are
/// left untouched.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    map: FxHashMap<Name, Ty>,
}

impl Substitution {
    /// The empty substitution.
    pub fn identity() -> Self {
        Substitution::default()
    }

    /// Zip `params` with `args` positionally; extra entries on either side
    /// are ignored.
    pub fn zip(params: &[TypeParam], args: &[Ty]) -> Self {
        let map = params
            .iter()
            .zip(args.iter())
            .map(|(param, arg)| (param.name.clone(), arg.clone()))
            .collect();
        Substitution { map }
    }

    /// Add a single mapping.
    pub fn insert(&mut self, param: Name, ty: Ty) {
        self.map.insert(param, ty);
    }

    /// Apply the substitution to a type, recursing through applications.
    pub fn apply(&self, ty: &Ty) -> Ty {
        match ty {
            Ty::Param(name) => match self.map.get(name) {
                Some(mapped) => mapped.clone(),
                None => ty.clone(),
            },
            Ty::Named { class, args } => Ty::Named {
                class: class.clone(),
                args: args.iter().map(|arg| self.apply(arg)).collect(),
            },
            Ty::Nullable(inner) => Ty::Nullable(Box::new(self.apply(inner))),
            Ty::Primitive(_) => ty.clone(),
        }
    }
}
