//! Declarations
//!
//! The declaration shapes the synthesis engine reads and produces: classes,
//! properties, functions, constructors and their value parameters. User
//! declarations come out of the unit builder with no synthesis key; every
//! synthesized declaration carries one.

use crate::body::Body;
use crate::key::SynthKey;
use crate::name::{ClassId, Name, Span};
use crate::ty::{Ty, TypeParam};

/// Kind of a class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// `interface`
    Interface,
    /// `class`
    Class,
    /// `object` (singleton)
    Object,
}

/// Openness of a class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    /// Cannot be extended
    Final,
    /// Extensible
    Open,
    /// Must be extended
    Abstract,
}

/// Declaration visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Visible everywhere
    Public,
    /// Visible within the module
    Internal,
    /// Visible within the declaring scope
    Private,
}

/// A value parameter of a constructor or function.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueParam {
    /// Parameter name
    pub name: Name,
    /// Declared type
    pub ty: Ty,
    /// Whether the parameter may be omitted at the call site
    pub has_default: bool,
    /// Default-value body, present when `has_default`
    pub default: Option<Body>,
}

impl ValueParam {
    /// A required parameter.
    pub fn required(name: impl Into<String>, ty: Ty) -> Self {
        ValueParam {
            name: Name::new(name),
            ty,
            has_default: false,
            default: None,
        }
    }

    /// An optional parameter with a default body.
    pub fn defaulted(name: impl Into<String>, ty: Ty, default: Body) -> Self {
        ValueParam {
            name: Name::new(name),
            ty,
            has_default: true,
            default: Some(default),
        }
    }
}

/// A constructor declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct CtorDecl {
    /// Visibility
    pub visibility: Visibility,
    /// Whether this is the canonical (primary) constructor
    pub is_primary: bool,
    /// Value parameters
    pub params: Vec<ValueParam>,
    /// Body, absent until lowered
    pub body: Option<Body>,
    /// Synthesis key, absent on user declarations
    pub key: Option<SynthKey>,
}

impl CtorDecl {
    /// A public primary constructor with the given parameters.
    pub fn primary(params: Vec<ValueParam>) -> Self {
        CtorDecl {
            visibility: Visibility::Public,
            is_primary: true,
            params,
            body: None,
            key: None,
        }
    }

    /// Same constructor with a different visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// A property declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    /// Property name
    pub name: Name,
    /// Declared type
    pub ty: Ty,
    /// Whether the property is mutable (`var`)
    pub is_var: bool,
    /// Whether the property is abstract
    pub is_abstract: bool,
    /// Whether the property overrides a supertype member
    pub is_override: bool,
    /// Visibility
    pub visibility: Visibility,
    /// Initializer body, absent until lowered
    pub initializer: Option<Body>,
    /// Getter body, absent until lowered
    pub getter: Option<Body>,
    /// Setter body, absent until lowered
    pub setter: Option<Body>,
    /// Synthesis key, absent on user declarations
    pub key: Option<SynthKey>,
}

impl PropertyDecl {
    /// A public immutable property.
    pub fn val(name: impl Into<String>, ty: Ty) -> Self {
        PropertyDecl {
            name: Name::new(name),
            ty,
            is_var: false,
            is_abstract: false,
            is_override: false,
            visibility: Visibility::Public,
            initializer: None,
            getter: None,
            setter: None,
            key: None,
        }
    }

    /// Same property with a different visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunDecl {
    /// Function name
    pub name: Name,
    /// Own generic parameters
    pub type_params: Vec<TypeParam>,
    /// Extension receiver type, if extension-style
    pub receiver: Option<Ty>,
    /// Value parameters
    pub params: Vec<ValueParam>,
    /// Return type
    pub return_ty: Ty,
    /// Visibility
    pub visibility: Visibility,
    /// Body, absent until lowered
    pub body: Option<Body>,
    /// Synthesis key, absent on user declarations
    pub key: Option<SynthKey>,
}

/// A class-like declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// Identifier
    pub id: ClassId,
    /// Kind
    pub kind: ClassKind,
    /// Openness
    pub modality: Modality,
    /// Visibility
    pub visibility: Visibility,
    /// Generic parameters
    pub type_params: Vec<TypeParam>,
    /// Supertypes
    pub supertypes: Vec<Ty>,
    /// Marker attributes by fully qualified name
    pub markers: Vec<String>,
    /// Constructors
    pub ctors: Vec<CtorDecl>,
    /// Properties
    pub properties: Vec<PropertyDecl>,
    /// Functions
    pub functions: Vec<FunDecl>,
    /// Source span, dummy for synthesized classes
    pub span: Span,
    /// Synthesis key, absent on user declarations
    pub key: Option<SynthKey>,
}

impl ClassDecl {
    /// A public final class with no members.
    pub fn new(id: ClassId, kind: ClassKind) -> Self {
        ClassDecl {
            id,
            kind,
            modality: Modality::Final,
            visibility: Visibility::Public,
            type_params: Vec::new(),
            supertypes: Vec::new(),
            markers: Vec::new(),
            ctors: Vec::new(),
            properties: Vec::new(),
            functions: Vec::new(),
            span: Span::dummy(),
            key: None,
        }
    }

    /// Attach a marker attribute.
    pub fn with_marker(mut self, fqn: impl Into<String>) -> Self {
        self.markers.push(fqn.into());
        self
    }

    /// Set the openness.
    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    /// Set generic parameters.
    pub fn with_type_params(mut self, params: Vec<TypeParam>) -> Self {
        self.type_params = params;
        self
    }

    /// Add a supertype.
    pub fn with_supertype(mut self, ty: Ty) -> Self {
        self.supertypes.push(ty);
        self
    }

    /// Add a constructor.
    pub fn with_ctor(mut self, ctor: CtorDecl) -> Self {
        self.ctors.push(ctor);
        self
    }

    /// Add a property.
    pub fn with_property(mut self, property: PropertyDecl) -> Self {
        self.properties.push(property);
        self
    }

    /// Set the source span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Whether the class is an interface.
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// Whether the class carries the given marker attribute.
    pub fn has_marker(&self, fqn: &str) -> bool {
        self.markers.iter().any(|m| m == fqn)
    }

    /// The canonical (primary) constructor, if declared.
    pub fn primary_ctor(&self) -> Option<&CtorDecl> {
        self.ctors.iter().find(|c| c.is_primary)
    }

    /// Look up a property by name.
    pub fn property(&self, name: &Name) -> Option<&PropertyDecl> {
        self.properties.iter().find(|p| &p.name == name)
    }

    /// Look up a function by name.
    pub fn function(&self, name: &Name) -> Option<&FunDecl> {
        self.functions.iter().find(|f| &f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::PrimitiveTy;

    fn spec_class() -> ClassDecl {
        let id = ClassId::top_level("foo.bar", "State").nested("Immutable");
        ClassDecl::new(id, ClassKind::Class)
            .with_ctor(CtorDecl::primary(vec![
                ValueParam::required("activity", Ty::Primitive(PrimitiveTy::String)),
                ValueParam::required("stepCount", Ty::Primitive(PrimitiveTy::Int)),
            ]))
            .with_property(PropertyDecl::val("activity", Ty::Primitive(PrimitiveTy::String)))
    }

    #[test]
    fn test_primary_ctor_lookup() {
        let decl = spec_class();
        let ctor = decl.primary_ctor().unwrap();
        assert_eq!(ctor.params.len(), 2);
        assert_eq!(ctor.params[0].name.as_str(), "activity");
    }

    #[test]
    fn test_property_lookup() {
        let decl = spec_class();
        assert!(decl.property(&Name::new("activity")).is_some());
        assert!(decl.property(&Name::new("missing")).is_none());
    }

    #[test]
    fn test_marker_query() {
        let decl = spec_class().with_marker("mirror.runtime.MirrorSpec");
        assert!(decl.has_marker("mirror.runtime.MirrorSpec"));
        assert!(!decl.has_marker("mirror.runtime.Mirrored"));
    }
}
