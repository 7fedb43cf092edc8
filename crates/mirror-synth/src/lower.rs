//! Body synthesizer - the lowering stage
//!
//! A single forward pass over every declaration carrying a synthesis key,
//! run after all signatures in the unit exist. It supplies the executable
//! bodies the signature phase left out: backing-cell construction, delegating
//! accessors, the constructor, the update operation with its
//! read-current-value defaults, and the two conversions.
//!
//! The pass is guarded by the store's explicit phase-completion flag, and a
//! declaration that already has a body is never touched, so running the pass
//! a second time changes nothing.

use crate::error::{FatalError, SynthResult};
use crate::storage;
use crate::synthesized::Synthesized;
use mirror_model::{
    Body, ClassId, CompilationUnit, CtorDecl, Expr, FunDecl, Name, PropertyDecl, Stmt, SynthKey,
    ValueParam,
};

use crate::declare::MUTABLE_CLASS_NAME;

/// The lowering pass for one unit.
pub struct Lowerer<'a> {
    unit: &'a CompilationUnit,
}

impl<'a> Lowerer<'a> {
    /// Create the pass.
    pub fn new(unit: &'a CompilationUnit) -> Self {
        Lowerer { unit }
    }

    /// Fill bodies for every keyed declaration in `synthesized`.
    pub fn lower(&self, synthesized: &mut Synthesized) -> SynthResult<()> {
        if !synthesized.signatures_complete() {
            return Err(FatalError::PhaseOrder);
        }

        let unit = self.unit;
        for (_, members) in synthesized.members_iter_mut() {
            for property in &mut members.properties {
                lower_property(unit, property)?;
            }
            for ctor in &mut members.ctors {
                lower_ctor(unit, ctor)?;
            }
            for function in &mut members.functions {
                lower_function(unit, function)?;
            }
        }
        Ok(())
    }
}

/// ```text
/// var activity: String
///     field = cellOf(activity)   // from the constructor parameter
///     get() = field.get()
///     set(value) = field.set(value)
/// ```
fn lower_property(unit: &CompilationUnit, property: &mut PropertyDecl) -> SynthResult<()> {
    let Some(SynthKey::MutableProperty { field, .. }) = &property.key else {
        return Ok(());
    };
    if property.getter.is_some() {
        return Ok(());
    }
    let entry = storage::resolve(&property.ty, unit.classpath())?;

    property.initializer = Some(Body::Expr(Expr::NewCell {
        runtime_class: entry.runtime_class,
        initial: Box::new(Expr::Param(field.clone())),
    }));
    property.getter = Some(Body::Expr(Expr::ReadCell {
        field: field.clone(),
        accessor: entry.accessor,
    }));
    property.setter = Some(Body::Block(vec![Stmt::WriteCell {
        field: field.clone(),
        mutator: entry.mutator,
        value: Expr::Param(Name::new("value")),
    }]));
    Ok(())
}

/// Delegate to the universal base constructor, then run the instance
/// initializers; the fields themselves are cell-backed and initialized by the
/// property initializers, so no assignment logic lives here. Placeholder
/// parameter defaults are replaced with the specification's own defaults.
fn lower_ctor(unit: &CompilationUnit, ctor: &mut CtorDecl) -> SynthResult<()> {
    match &ctor.key {
        Some(SynthKey::MutableCtor { spec, .. }) => {
            if ctor.body.is_some() {
                return Ok(());
            }
            let spec_id = spec.clone();
            resolve_ctor_defaults(unit, &spec_id, &mut ctor.params)?;
            ctor.body = Some(Body::Block(vec![Stmt::DelegateBaseCtor, Stmt::InstanceInit]));
            Ok(())
        }
        Some(SynthKey::CompanionCtor { .. }) => {
            if ctor.body.is_none() {
                ctor.body = Some(Body::Block(vec![Stmt::DelegateBaseCtor, Stmt::InstanceInit]));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn resolve_ctor_defaults(
    unit: &CompilationUnit,
    spec: &ClassId,
    params: &mut [ValueParam],
) -> SynthResult<()> {
    let spec_ctor = unit
        .class(spec)
        .and_then(|decl| decl.primary_ctor())
        .ok_or_else(|| FatalError::Internal {
            message: format!("specification {} lost its primary constructor", spec),
        })?;
    for param in params {
        let is_placeholder = param.default.as_ref().is_some_and(Body::is_placeholder);
        if !is_placeholder {
            continue;
        }
        let source = spec_ctor
            .params
            .iter()
            .find(|p| p.name == param.name)
            .and_then(|p| p.default.clone());
        if let Some(default) = source {
            param.default = Some(default);
        }
    }
    Ok(())
}

fn lower_function(unit: &CompilationUnit, function: &mut FunDecl) -> SynthResult<()> {
    match &function.key {
        Some(SynthKey::UpdateFun { .. }) => {
            if function.body.is_some() {
                return Ok(());
            }
            lower_update(function);
            Ok(())
        }
        Some(SynthKey::ToSpecificationFun { spec, .. }) => {
            if function.body.is_some() {
                return Ok(());
            }
            function.body = Some(conversion_body(unit, spec, spec.clone())?);
            Ok(())
        }
        Some(SynthKey::ToMutableFun { interface, spec }) => {
            if function.body.is_some() {
                return Ok(());
            }
            let mutable = interface.nested(MUTABLE_CLASS_NAME);
            function.body = Some(conversion_body(unit, spec, mutable)?);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// ```text
/// fun update(activity: String = this.activity, ...): Mutable {
///     this.activity = activity
///     ...
///     return this
/// }
/// ```
///
/// Omitted arguments resolve to the current field value read through its
/// getter, so a zero-argument call keeps every field.
fn lower_update(function: &mut FunDecl) {
    for param in &mut function.params {
        let is_placeholder = param.default.as_ref().is_some_and(Body::is_placeholder);
        if is_placeholder {
            param.default = Some(Body::Expr(Expr::GetProperty {
                object: Box::new(Expr::SelfRef),
                property: param.name.clone(),
            }));
        }
    }
    let mut stmts: Vec<Stmt> = function
        .params
        .iter()
        .map(|param| Stmt::SetProperty {
            object: Expr::SelfRef,
            property: param.name.clone(),
            value: Expr::Param(param.name.clone()),
        })
        .collect();
    stmts.push(Stmt::Return(Expr::SelfRef));
    function.body = Some(Body::Block(stmts));
}

/// Construct `target` from the receiver, one named argument per
/// specification field read through its getter.
fn conversion_body(unit: &CompilationUnit, spec: &ClassId, target: ClassId) -> SynthResult<Body> {
    let spec_ctor = unit
        .class(spec)
        .and_then(|decl| decl.primary_ctor())
        .ok_or_else(|| FatalError::Internal {
            message: format!("specification {} lost its primary constructor", spec),
        })?;
    let args = spec_ctor
        .params
        .iter()
        .map(|param| {
            (
                param.name.clone(),
                Expr::GetProperty {
                    object: Box::new(Expr::SelfRef),
                    property: param.name.clone(),
                },
            )
        })
        .collect();
    Ok(Body::Expr(Expr::Construct { class: target, args }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Engine;
    use mirror_model::{
        ClassDecl, ClassKind, PrimitiveTy, Ty, UnitBuilder, ValueParam, MIRRORED_FQN,
        MIRROR_SPEC_FQN,
    };

    #[test]
    fn test_lowering_requires_completed_signatures() {
        let unit = UnitBuilder::new().freeze();
        let mut synthesized = Synthesized::new();
        let err = Lowerer::new(&unit).lower(&mut synthesized).unwrap_err();
        assert_eq!(err, FatalError::PhaseOrder);
    }

    #[test]
    fn test_second_lowering_run_is_noop() {
        let interface_id = mirror_model::ClassId::top_level("foo", "State");
        let mut builder = UnitBuilder::new();
        builder
            .add_class(
                ClassDecl::new(interface_id.clone(), ClassKind::Interface).with_marker(MIRRORED_FQN),
            )
            .unwrap();
        builder
            .add_class(
                ClassDecl::new(interface_id.nested("Immutable"), ClassKind::Class)
                    .with_marker(MIRROR_SPEC_FQN)
                    .with_ctor(mirror_model::CtorDecl::primary(vec![ValueParam::required(
                        "stepCount",
                        Ty::Primitive(PrimitiveTy::Int),
                    )])),
            )
            .unwrap();
        builder.set_classpath(crate::storage::runtime_classpath());
        let unit = builder.freeze();

        let mut synthesis = Engine::register(&unit).run().unwrap();
        let before = format!("{:?}", synthesis.synthesized);
        Lowerer::new(&unit).lower(&mut synthesis.synthesized).unwrap();
        assert_eq!(before, format!("{:?}", synthesis.synthesized));
    }
}
