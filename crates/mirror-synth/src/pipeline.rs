//! Per-unit pipeline
//!
//! The toolchain-integration surface: the host compiler registers an engine
//! once per compilation unit, and the engine runs the passes in order -
//! validation, then the signature phase for every owner in the unit, then the
//! status pass, then lowering. The signature phase completes globally before
//! lowering touches anything, because lowered bodies reference other
//! synthesized declarations' signatures.

use crate::declare::{COMPANION_CLASS_NAME, DeclarationSynthesizer, SynthDecl};
use crate::error::{FatalError, SynthResult, ValidationError};
use crate::index::SymbolIndex;
use crate::lower::Lowerer;
use crate::status::{OverrideFacts, StatusPass};
use crate::synthesized::Synthesized;
use crate::validate::Validator;
use mirror_model::{ClassId, CompilationUnit, Name};
use rustc_hash::FxHashSet;

/// Everything the engine produced for one unit.
#[derive(Debug)]
pub struct UnitSynthesis {
    /// Validator findings, one per offending declaration
    pub diagnostics: Vec<ValidationError>,
    /// Contract-satisfaction facts from the status pass
    pub override_facts: OverrideFacts,
    /// Synthesized declarations with lowered bodies
    pub synthesized: Synthesized,
}

/// The per-unit synthesis engine.
pub struct Engine<'a> {
    unit: &'a CompilationUnit,
    index: SymbolIndex<'a>,
}

impl<'a> Engine<'a> {
    /// Registration entry point, invoked once per compilation unit.
    pub fn register(unit: &'a CompilationUnit) -> Self {
        Engine { unit, index: SymbolIndex::new(unit) }
    }

    /// The unit's symbol index.
    pub fn index(&self) -> &SymbolIndex<'a> {
        &self.index
    }

    /// Run the ordered passes to completion.
    ///
    /// User structural errors land in the returned diagnostics and suppress
    /// synthesis for their declarations only; a fatal error aborts the whole
    /// unit.
    pub fn run(&self) -> SynthResult<UnitSynthesis> {
        let diagnostics = Validator::new(self.unit, &self.index).validate();
        let eligible = self.eligible_interfaces(&diagnostics);

        let synthesizer = DeclarationSynthesizer::new(self.unit, &self.index, eligible.clone());
        let mut synthesized = Synthesized::new();
        for decl in self.unit.classes() {
            if !eligible.contains(&decl.id) {
                continue;
            }
            self.declare_for_interface(&synthesizer, &decl.id, &mut synthesized)?;
        }
        synthesized.mark_signatures_complete();

        let override_facts = StatusPass::new(self.unit, &self.index).run();

        Lowerer::new(self.unit).lower(&mut synthesized)?;

        Ok(UnitSynthesis { diagnostics, override_facts, synthesized })
    }

    /// Marked interfaces that survived validation: neither the interface nor
    /// its specification produced a finding.
    fn eligible_interfaces(&self, diagnostics: &[ValidationError]) -> FxHashSet<ClassId> {
        let rejected: FxHashSet<ClassId> =
            diagnostics.iter().map(|d| d.class().clone()).collect();
        self.index
            .interfaces()
            .iter()
            .filter(|id| !rejected.contains(*id))
            .filter(|id| {
                self.index
                    .spec_of(id)
                    .is_some_and(|spec| !rejected.contains(spec))
            })
            .cloned()
            .collect()
    }

    fn declare_for_interface(
        &self,
        synthesizer: &DeclarationSynthesizer<'_>,
        interface: &ClassId,
        out: &mut Synthesized,
    ) -> SynthResult<()> {
        self.declare_owner(synthesizer, interface, out)?;
        self.declare_owner(synthesizer, &self.index.mutable_id_of(interface), out)?;
        self.declare_owner(synthesizer, &self.index.companion_id_of(interface), out)?;
        Ok(())
    }

    fn declare_owner(
        &self,
        synthesizer: &DeclarationSynthesizer<'_>,
        owner: &ClassId,
        out: &mut Synthesized,
    ) -> SynthResult<()> {
        let mut names: Vec<Name> = synthesizer.names_for(owner).into_iter().collect();
        names.sort();
        for name in names {
            match synthesizer.build_type(owner, &name)? {
                Some(SynthDecl::Class(class)) => out.add_class(class),
                Some(SynthDecl::Property(property)) => {
                    out.members_mut(owner).properties.push(property)
                }
                Some(SynthDecl::Function(function)) => {
                    out.members_mut(owner).functions.push(function)
                }
                Some(SynthDecl::Ctor(ctor)) => out.members_mut(owner).ctors.push(ctor),
                // The companion name stays enumerated even when a user
                // companion suppresses its synthesis.
                None if name.as_str() == COMPANION_CLASS_NAME => {}
                None => {
                    return Err(FatalError::Internal {
                        message: format!(
                            "enumerated name '{}' on {} produced no declaration",
                            name, owner
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_model::{
        Body, ClassDecl, ClassKind, CtorDecl, Expr, Literal, PrimitiveTy, Ty, UnitBuilder,
        ValueParam, MIRRORED_FQN, MIRROR_SPEC_FQN,
    };

    fn tracking_unit() -> CompilationUnit {
        let interface_id = ClassId::top_level("foo.bar", "State");
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
                    .with_ctor(CtorDecl::primary(vec![
                        ValueParam::defaulted(
                            "activity",
                            Ty::Primitive(PrimitiveTy::String),
                            Body::Expr(Expr::Literal(Literal::Str("jog".to_string()))),
                        ),
                        ValueParam::defaulted(
                            "stepCount",
                            Ty::Primitive(PrimitiveTy::Int),
                            Body::Expr(Expr::Literal(Literal::Int(42))),
                        ),
                    ])),
            )
            .unwrap();
        builder.set_classpath(crate::storage::runtime_classpath());
        builder.freeze()
    }

    #[test]
    fn test_run_produces_lowered_projection() {
        let unit = tracking_unit();
        let engine = Engine::register(&unit);
        let result = engine.run().unwrap();
        assert!(result.diagnostics.is_empty());

        let interface = ClassId::top_level("foo.bar", "State");
        let mutable = engine.index().mutable_id_of(&interface);
        assert!(result.synthesized.class(&mutable).is_some());
        assert!(result.synthesized.class(&interface.nested("Companion")).is_some());

        let activity = result
            .synthesized
            .property(&mutable, &Name::new("activity"))
            .unwrap();
        assert!(activity.getter.is_some());
        assert!(activity.setter.is_some());
        assert!(activity.initializer.is_some());

        let update = result.synthesized.function(&mutable, &Name::new("update")).unwrap();
        assert!(update.body.is_some());
        assert!(update
            .params
            .iter()
            .all(|p| !p.default.as_ref().is_some_and(Body::is_placeholder)));
    }

    #[test]
    fn test_interface_gains_abstract_properties() {
        let unit = tracking_unit();
        let result = Engine::register(&unit).run().unwrap();
        let interface = ClassId::top_level("foo.bar", "State");

        let activity = result
            .synthesized
            .property(&interface, &Name::new("activity"))
            .unwrap();
        assert!(activity.is_abstract);
        assert!(!activity.is_var);
        assert!(activity.getter.is_none());
    }

    #[test]
    fn test_invalid_interface_is_skipped_but_unit_continues() {
        let good = ClassId::top_level("foo", "Good");
        let bad = ClassId::top_level("foo", "Bad");
        let mut builder = UnitBuilder::new();
        builder
            .add_class(ClassDecl::new(good.clone(), ClassKind::Interface).with_marker(MIRRORED_FQN))
            .unwrap();
        builder
            .add_class(
                ClassDecl::new(good.nested("Immutable"), ClassKind::Class)
                    .with_marker(MIRROR_SPEC_FQN)
                    .with_ctor(CtorDecl::primary(Vec::new())),
            )
            .unwrap();
        // Marked interface with no nested specification.
        builder
            .add_class(ClassDecl::new(bad.clone(), ClassKind::Interface).with_marker(MIRRORED_FQN))
            .unwrap();
        builder.set_classpath(crate::storage::runtime_classpath());
        let unit = builder.freeze();

        let result = Engine::register(&unit).run().unwrap();
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.synthesized.class(&good.nested("Mutable")).is_some());
        assert!(result.synthesized.class(&bad.nested("Mutable")).is_none());
    }

    #[test]
    fn test_missing_runtime_aborts_the_unit() {
        let interface_id = ClassId::top_level("foo", "State");
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
                    .with_ctor(CtorDecl::primary(vec![ValueParam::required(
                        "stepCount",
                        Ty::Primitive(PrimitiveTy::Int),
                    )])),
            )
            .unwrap();
        // No classpath supplied: the runtime is absent.
        let unit = builder.freeze();

        let err = Engine::register(&unit).run().unwrap_err();
        assert!(matches!(err, FatalError::StorageTypeNotFound { .. }));
    }
}
