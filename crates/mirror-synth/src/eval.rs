//! Evaluator for lowered bodies
//!
//! Executes synthesized declarations against real cell storage: constructing
//! projections, reading and writing fields through the lowered accessor
//! bodies, calling `update` with named optional arguments, and running the
//! two conversions. This is what turns the engine's output into observable
//! behavior for end-to-end tests.
//!
//! Projection instances live in an arena owned by the evaluator; a
//! [`Value::Mutable`] is a handle into it. Each instance owns one storage
//! slot per field, allocated from the runtime cell class the lowering phase
//! selected, and nothing else ever touches those slots.

use crate::synthesized::Synthesized;
use mirror_cell::{Cell, DoubleCell, FloatCell, IntCell, LongCell};
use mirror_model::{
    Body, ClassId, CompilationUnit, Expr, FunDecl, Literal, Name, Stmt, SynthKey,
};
use rustc_hash::FxHashMap;
use serde::Serialize;
use thiserror::Error;

use crate::declare::{TO_MUTABLE_FUN_NAME, TO_SPECIFICATION_FUN_NAME, UPDATE_FUN_NAME};

/// Result alias for evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Evaluation failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    /// No declaration for the requested class.
    #[error("unknown class: {class}")]
    UnknownClass {
        /// The missing class
        class: ClassId,
    },

    /// No property with the requested name.
    #[error("unknown property '{property}' on {class}")]
    UnknownProperty {
        /// Owning class
        class: ClassId,
        /// The missing property
        property: Name,
    },

    /// No function with the requested name.
    #[error("unknown function '{function}' on {class}")]
    UnknownFunction {
        /// Owning class
        class: ClassId,
        /// The missing function
        function: Name,
    },

    /// A required argument was neither supplied nor defaulted.
    #[error("missing argument '{param}'")]
    MissingArgument {
        /// The unfilled parameter
        param: Name,
    },

    /// A declaration was invoked before lowering gave it a body.
    #[error("declaration has no body")]
    MissingBody,

    /// The placeholder default (or another raise-error stub) was evaluated.
    #[error("{message}")]
    Raised {
        /// The stub's message
        message: String,
    },

    /// A value of the wrong kind reached a typed position.
    #[error("value of unexpected kind for {context}")]
    Kind {
        /// Where the mismatch happened
        context: String,
    },

    /// A stale or foreign instance handle.
    #[error("unknown instance")]
    UnknownInstance,
}

/// Handle to a projection instance in the evaluator's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct InstanceId(u32);

/// An immutable specification value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecValue {
    /// The specification class
    pub class: ClassId,
    /// Field values in canonical-constructor order
    pub fields: Vec<(Name, Value)>,
}

impl SpecValue {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field.as_str() == name)
            .map(|(_, value)| value)
    }
}

/// A runtime value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// Boolean
    Boolean(bool),
    /// String
    Str(String),
    /// Null
    Null,
    /// Unit
    Unit,
    /// An immutable specification value
    Spec(SpecValue),
    /// A mutable projection instance
    Mutable(InstanceId),
}

impl Value {
    /// Convenience constructor for string values.
    pub fn str(value: impl Into<String>) -> Value {
        Value::Str(value.into())
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Int(v) => Value::Int(*v),
        Literal::Long(v) => Value::Long(*v),
        Literal::Float(v) => Value::Float(*v),
        Literal::Double(v) => Value::Double(*v),
        Literal::Boolean(v) => Value::Boolean(*v),
        Literal::Str(v) => Value::Str(v.clone()),
        Literal::Null => Value::Null,
        Literal::Unit => Value::Unit,
    }
}

/// One field's storage slot, wrapping the runtime cell the strategy table
/// selected.
#[derive(Debug)]
enum Slot {
    Int(IntCell),
    Long(LongCell),
    Float(FloatCell),
    Double(DoubleCell),
    Boxed(Cell<Value>),
}

impl Slot {
    fn allocate(runtime_class: &ClassId, initial: Value) -> EvalResult<Slot> {
        match (runtime_class.name().as_str(), initial) {
            (mirror_cell::INT_CELL_CLASS, Value::Int(v)) => Ok(Slot::Int(IntCell::new(v))),
            (mirror_cell::LONG_CELL_CLASS, Value::Long(v)) => Ok(Slot::Long(LongCell::new(v))),
            (mirror_cell::FLOAT_CELL_CLASS, Value::Float(v)) => Ok(Slot::Float(FloatCell::new(v))),
            (mirror_cell::DOUBLE_CELL_CLASS, Value::Double(v)) => {
                Ok(Slot::Double(DoubleCell::new(v)))
            }
            (mirror_cell::BOXED_CELL_CLASS, value) => Ok(Slot::Boxed(Cell::new(value))),
            _ => Err(EvalError::Kind { context: format!("cell {}", runtime_class) }),
        }
    }

    fn read(&self) -> Value {
        match self {
            Slot::Int(cell) => Value::Int(cell.get()),
            Slot::Long(cell) => Value::Long(cell.get()),
            Slot::Float(cell) => Value::Float(cell.get()),
            Slot::Double(cell) => Value::Double(cell.get()),
            Slot::Boxed(cell) => cell.get().clone(),
        }
    }

    fn write(&mut self, value: Value) -> EvalResult<()> {
        match (self, value) {
            (Slot::Int(cell), Value::Int(v)) => cell.set(v),
            (Slot::Long(cell), Value::Long(v)) => cell.set(v),
            (Slot::Float(cell), Value::Float(v)) => cell.set(v),
            (Slot::Double(cell), Value::Double(v)) => cell.set(v),
            (Slot::Boxed(cell), value) => cell.set(value),
            (_, value) => {
                return Err(EvalError::Kind { context: format!("cell write of {:?}", value) })
            }
        }
        Ok(())
    }

    fn version(&self) -> u64 {
        match self {
            Slot::Int(cell) => cell.version(),
            Slot::Long(cell) => cell.version(),
            Slot::Float(cell) => cell.version(),
            Slot::Double(cell) => cell.version(),
            Slot::Boxed(cell) => cell.version(),
        }
    }
}

#[derive(Debug)]
struct Instance {
    class: ClassId,
    slots: FxHashMap<Name, Slot>,
}

#[derive(Debug, Clone, Default)]
struct Env {
    receiver: Option<Value>,
    params: FxHashMap<Name, Value>,
}

/// Executes lowered declarations for one unit.
pub struct Evaluator<'a> {
    unit: &'a CompilationUnit,
    synthesized: &'a Synthesized,
    instances: Vec<Instance>,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator over a unit and its synthesis output.
    pub fn new(unit: &'a CompilationUnit, synthesized: &'a Synthesized) -> Self {
        Evaluator { unit, synthesized, instances: Vec::new() }
    }

    /// Construct a specification value through its canonical constructor.
    /// Omitted arguments fall back to the field defaults.
    pub fn construct_spec(
        &mut self,
        class: &ClassId,
        args: &[(&str, Value)],
    ) -> EvalResult<Value> {
        self.construct_spec_with(class, named_args(args))
    }

    /// Construct a mutable projection through its synthesized constructor.
    pub fn construct_mutable(
        &mut self,
        class: &ClassId,
        args: &[(&str, Value)],
    ) -> EvalResult<Value> {
        self.construct_mutable_with(class, named_args(args))
    }

    /// Convert a specification value to a fresh projection via the
    /// companion conversion.
    pub fn to_mutable(&mut self, spec_value: &Value) -> EvalResult<Value> {
        let Value::Spec(spec) = spec_value else {
            return Err(EvalError::Kind { context: "toMutable receiver".to_string() });
        };
        let spec_class = spec.class.clone();
        let function = self
            .find_function(|key| {
                matches!(key, SynthKey::ToMutableFun { spec, .. } if spec == &spec_class)
            })
            .ok_or_else(|| EvalError::UnknownFunction {
                class: spec_class.clone(),
                function: Name::new(TO_MUTABLE_FUN_NAME),
            })?;
        self.call(function, spec_value.clone(), FxHashMap::default())
    }

    /// Convert a projection back to a fresh specification value via the
    /// companion conversion.
    pub fn to_specification(&mut self, value: &Value) -> EvalResult<Value> {
        let instance_class = self.instance_class(value)?;
        let interface = instance_class.outer().ok_or_else(|| EvalError::UnknownClass {
            class: instance_class.clone(),
        })?;
        let function = self
            .find_function(|key| {
                matches!(key, SynthKey::ToSpecificationFun { interface: i, .. } if i == &interface)
            })
            .ok_or_else(|| EvalError::UnknownFunction {
                class: instance_class,
                function: Name::new(TO_SPECIFICATION_FUN_NAME),
            })?;
        self.call(function, value.clone(), FxHashMap::default())
    }

    /// Read a field through its getter (projections) or directly
    /// (specification values).
    pub fn get_property(&mut self, value: &Value, name: &str) -> EvalResult<Value> {
        match value {
            Value::Spec(spec) => {
                spec.field(name)
                    .cloned()
                    .ok_or_else(|| EvalError::UnknownProperty {
                        class: spec.class.clone(),
                        property: Name::new(name),
                    })
            }
            Value::Mutable(_) => {
                let synthesized = self.synthesized;
                let class = self.instance_class(value)?;
                let property = synthesized
                    .property(&class, &Name::new(name))
                    .ok_or_else(|| EvalError::UnknownProperty {
                        class: class.clone(),
                        property: Name::new(name),
                    })?;
                let getter = property.getter.as_ref().ok_or(EvalError::MissingBody)?;
                let env = Env { receiver: Some(value.clone()), params: FxHashMap::default() };
                self.eval_body(getter, &env)
            }
            _ => Err(EvalError::Kind { context: format!("property read of '{}'", name) }),
        }
    }

    /// Write a projection field through its setter.
    pub fn set_property(&mut self, value: &Value, name: &str, new_value: Value) -> EvalResult<()> {
        let synthesized = self.synthesized;
        let class = self.instance_class(value)?;
        let property = synthesized
            .property(&class, &Name::new(name))
            .ok_or_else(|| EvalError::UnknownProperty {
                class: class.clone(),
                property: Name::new(name),
            })?;
        let setter = property.setter.as_ref().ok_or(EvalError::MissingBody)?;
        let mut params = FxHashMap::default();
        params.insert(Name::new("value"), new_value);
        let env = Env { receiver: Some(value.clone()), params };
        self.eval_body(setter, &env)?;
        Ok(())
    }

    /// Call the projection's update operation with named arguments. Omitted
    /// fields keep their current value.
    pub fn update(&mut self, value: &Value, args: &[(&str, Value)]) -> EvalResult<Value> {
        let synthesized = self.synthesized;
        let class = self.instance_class(value)?;
        let function = synthesized
            .function(&class, &Name::new(UPDATE_FUN_NAME))
            .ok_or_else(|| EvalError::UnknownFunction {
                class: class.clone(),
                function: Name::new(UPDATE_FUN_NAME),
            })?;
        self.call(function, value.clone(), named_args(args))
    }

    /// Observed write count of one field's backing cell.
    pub fn cell_version(&self, value: &Value, field: &str) -> EvalResult<u64> {
        let Value::Mutable(id) = value else {
            return Err(EvalError::Kind { context: "cell version".to_string() });
        };
        let instance = self.instance(*id)?;
        instance
            .slots
            .get(&Name::new(field))
            .map(Slot::version)
            .ok_or_else(|| EvalError::UnknownProperty {
                class: instance.class.clone(),
                property: Name::new(field),
            })
    }

    fn call(
        &mut self,
        function: &'a FunDecl,
        receiver: Value,
        mut provided: FxHashMap<Name, Value>,
    ) -> EvalResult<Value> {
        let body = function.body.as_ref().ok_or(EvalError::MissingBody)?;
        let mut env = Env { receiver: Some(receiver), params: FxHashMap::default() };
        // Defaults are resolved in declaration order with the receiver in
        // scope, so a default can read the current field value.
        for param in &function.params {
            let value = match provided.remove(&param.name) {
                Some(value) => value,
                None => match &param.default {
                    Some(default) => self.eval_body(default, &env)?,
                    None => return Err(EvalError::MissingArgument { param: param.name.clone() }),
                },
            };
            env.params.insert(param.name.clone(), value);
        }
        self.eval_body(body, &env)
    }

    fn construct_spec_with(
        &mut self,
        class: &ClassId,
        mut provided: FxHashMap<Name, Value>,
    ) -> EvalResult<Value> {
        let unit = self.unit;
        let ctor = unit
            .class(class)
            .and_then(|decl| decl.primary_ctor())
            .ok_or_else(|| EvalError::UnknownClass { class: class.clone() })?;
        let mut fields = Vec::with_capacity(ctor.params.len());
        for param in &ctor.params {
            let value = match provided.remove(&param.name) {
                Some(value) => value,
                None => match &param.default {
                    Some(default) => self.eval_body(default, &Env::default())?,
                    None => return Err(EvalError::MissingArgument { param: param.name.clone() }),
                },
            };
            fields.push((param.name.clone(), value));
        }
        Ok(Value::Spec(SpecValue { class: class.clone(), fields }))
    }

    fn construct_mutable_with(
        &mut self,
        class: &ClassId,
        mut provided: FxHashMap<Name, Value>,
    ) -> EvalResult<Value> {
        let synthesized = self.synthesized;
        let ctor = synthesized
            .primary_ctor(class)
            .ok_or_else(|| EvalError::UnknownClass { class: class.clone() })?;
        if ctor.body.is_none() {
            return Err(EvalError::MissingBody);
        }

        let mut params = FxHashMap::default();
        for param in &ctor.params {
            let value = match provided.remove(&param.name) {
                Some(value) => value,
                None => match &param.default {
                    Some(default) => self.eval_body(default, &Env::default())?,
                    None => return Err(EvalError::MissingArgument { param: param.name.clone() }),
                },
            };
            params.insert(param.name.clone(), value);
        }

        let id = InstanceId(self.instances.len() as u32);
        self.instances.push(Instance { class: class.clone(), slots: FxHashMap::default() });

        // The constructor body delegates to the base constructor and runs
        // the instance initializers; the initializers allocate one cell per
        // field from the constructor parameters.
        let env = Env { receiver: Some(Value::Mutable(id)), params };
        for property in &synthesized
            .members(class)
            .ok_or_else(|| EvalError::UnknownClass { class: class.clone() })?
            .properties
        {
            let Some(Body::Expr(Expr::NewCell { runtime_class, initial })) = &property.initializer
            else {
                continue;
            };
            let initial = self.eval_expr(initial, &env)?;
            let slot = Slot::allocate(runtime_class, initial)?;
            self.instance_mut(id)?.slots.insert(property.name.clone(), slot);
        }

        Ok(Value::Mutable(id))
    }

    fn eval_body(&mut self, body: &Body, env: &Env) -> EvalResult<Value> {
        match body {
            Body::Expr(expr) => self.eval_expr(expr, env),
            Body::Block(stmts) => {
                for stmt in stmts {
                    if let Some(returned) = self.eval_stmt(stmt, env)? {
                        return Ok(returned);
                    }
                }
                Ok(Value::Unit)
            }
        }
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: &Env) -> EvalResult<Option<Value>> {
        match stmt {
            // Realized during construction; markers when re-encountered.
            Stmt::DelegateBaseCtor | Stmt::InstanceInit => Ok(None),
            Stmt::SetProperty { object, property, value } => {
                let receiver = self.eval_expr(object, env)?;
                let value = self.eval_expr(value, env)?;
                self.set_property(&receiver, property.as_str(), value)?;
                Ok(None)
            }
            Stmt::WriteCell { field, value, .. } => {
                let value = self.eval_expr(value, env)?;
                let id = self.receiver_id(env)?;
                let instance = self.instance_mut(id)?;
                match instance.slots.get_mut(field) {
                    Some(slot) => {
                        slot.write(value)?;
                        Ok(None)
                    }
                    None => Err(EvalError::UnknownProperty {
                        class: instance.class.clone(),
                        property: field.clone(),
                    }),
                }
            }
            Stmt::Return(expr) => Ok(Some(self.eval_expr(expr, env)?)),
        }
    }

    fn eval_expr(&mut self, expr: &Expr, env: &Env) -> EvalResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(literal_value(literal)),
            Expr::SelfRef => env
                .receiver
                .clone()
                .ok_or_else(|| EvalError::Kind { context: "self reference".to_string() }),
            Expr::Param(name) => env
                .params
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::MissingArgument { param: name.clone() }),
            Expr::GetProperty { object, property } => {
                let receiver = self.eval_expr(object, env)?;
                self.get_property(&receiver, property.as_str())
            }
            Expr::ReadCell { field, .. } => {
                let id = self.receiver_id(env)?;
                let instance = self.instance(id)?;
                instance
                    .slots
                    .get(field)
                    .map(Slot::read)
                    .ok_or_else(|| EvalError::UnknownProperty {
                        class: instance.class.clone(),
                        property: field.clone(),
                    })
            }
            Expr::NewCell { .. } => {
                Err(EvalError::Kind { context: "cell allocation outside an initializer".to_string() })
            }
            Expr::Construct { class, args } => {
                let mut provided = FxHashMap::default();
                for (name, arg) in args {
                    let value = self.eval_expr(arg, env)?;
                    provided.insert(name.clone(), value);
                }
                if self.synthesized.class(class).is_some() {
                    self.construct_mutable_with(class, provided)
                } else {
                    self.construct_spec_with(class, provided)
                }
            }
            Expr::RaiseError { message } => Err(EvalError::Raised { message: message.clone() }),
        }
    }

    fn find_function<F>(&self, pred: F) -> Option<&'a FunDecl>
    where
        F: Fn(&SynthKey) -> bool,
    {
        let synthesized = self.synthesized;
        synthesized.owners().find_map(|owner| {
            synthesized
                .members(owner)?
                .functions
                .iter()
                .find(|f| f.key.as_ref().is_some_and(&pred))
        })
    }

    fn receiver_id(&self, env: &Env) -> EvalResult<InstanceId> {
        match env.receiver {
            Some(Value::Mutable(id)) => Ok(id),
            _ => Err(EvalError::Kind { context: "cell access receiver".to_string() }),
        }
    }

    fn instance_class(&self, value: &Value) -> EvalResult<ClassId> {
        let Value::Mutable(id) = value else {
            return Err(EvalError::Kind { context: "projection receiver".to_string() });
        };
        Ok(self.instance(*id)?.class.clone())
    }

    fn instance(&self, id: InstanceId) -> EvalResult<&Instance> {
        self.instances.get(id.0 as usize).ok_or(EvalError::UnknownInstance)
    }

    fn instance_mut(&mut self, id: InstanceId) -> EvalResult<&mut Instance> {
        self.instances.get_mut(id.0 as usize).ok_or(EvalError::UnknownInstance)
    }
}

fn named_args(args: &[(&str, Value)]) -> FxHashMap<Name, Value> {
    args.iter()
        .map(|(name, value)| (Name::new(*name), value.clone()))
        .collect()
}
