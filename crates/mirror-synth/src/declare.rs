//! Declaration synthesizer - the two-phase signature stage
//!
//! Mirrors the host compiler's two-phase declaration generation model. The
//! name-enumeration phase ([`DeclarationSynthesizer::names_for`]) decides
//! which member and nested-type names will exist on an owner; the
//! construction phase ([`DeclarationSynthesizer::build_type`]) lazily builds
//! the concrete declaration for one requested name, performing
//! generic-parameter substitution and invariance enforcement.
//!
//! Nothing here has a body: optional parameters receive the "fail if
//! actually invoked" placeholder, and every declaration is tagged with a
//! [`SynthKey`] so the lowering pass can recover its context later.

use crate::error::{FatalError, SynthResult};
use crate::index::SymbolIndex;
use mirror_model::{
    Body, ClassDecl, ClassId, ClassKind, CompilationUnit, CtorDecl, FunDecl, Modality, Name,
    PropertyDecl, Span, Substitution, SynthKey, Ty, TypeParam, ValueParam, Variance, Visibility,
};
use rustc_hash::FxHashSet;

/// Name of the synthesized mutable projection nested under a marked
/// interface.
pub const MUTABLE_CLASS_NAME: &str = "Mutable";
/// Name of the synthesized (or reused) companion nested under a marked
/// interface.
pub const COMPANION_CLASS_NAME: &str = "Companion";
/// Name of the multi-field update operation on the mutable projection.
pub const UPDATE_FUN_NAME: &str = "update";
/// Name of the specification-to-projection conversion on the companion.
pub const TO_MUTABLE_FUN_NAME: &str = "toMutable";
/// Name of the projection-to-specification conversion on the companion.
pub const TO_SPECIFICATION_FUN_NAME: &str = "toSpecification";

/// A declaration produced by the construction phase.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthDecl {
    /// A nested class-like declaration.
    Class(ClassDecl),
    /// A member property.
    Property(PropertyDecl),
    /// A member function.
    Function(FunDecl),
    /// A constructor.
    Ctor(CtorDecl),
}

/// Resolved interface/specification pair a synthesis request works against.
struct SpecContext<'u> {
    interface: &'u ClassDecl,
    spec: &'u ClassDecl,
}

/// The two-phase declaration synthesizer for one unit.
pub struct DeclarationSynthesizer<'a> {
    unit: &'a CompilationUnit,
    index: &'a SymbolIndex<'a>,
    /// Marked interfaces that passed validation; everything else is skipped.
    eligible: FxHashSet<ClassId>,
}

impl<'a> DeclarationSynthesizer<'a> {
    /// Create a synthesizer targeting the validator-approved `eligible`
    /// interfaces.
    pub fn new(
        unit: &'a CompilationUnit,
        index: &'a SymbolIndex<'a>,
        eligible: FxHashSet<ClassId>,
    ) -> Self {
        DeclarationSynthesizer { unit, index, eligible }
    }

    /// Name-enumeration phase: the member and nested-type names that will
    /// exist on `owner`.
    pub fn names_for(&self, owner: &ClassId) -> FxHashSet<Name> {
        let mut names = FxHashSet::default();

        if self.eligible.contains(owner) {
            names.extend(self.field_names(owner));
            names.insert(Name::new(MUTABLE_CLASS_NAME));
            names.insert(Name::new(COMPANION_CLASS_NAME));
            return names;
        }

        if let Some(interface) = self.owner_as_mutable(owner) {
            names.extend(self.field_names(&interface));
            names.insert(Name::init());
            names.insert(Name::new(UPDATE_FUN_NAME));
            return names;
        }

        if let Some(interface) = self.owner_as_companion(owner) {
            if !self.index.has_user_companion(&interface) {
                names.insert(Name::init());
            }
            names.insert(Name::new(TO_MUTABLE_FUN_NAME));
            names.insert(Name::new(TO_SPECIFICATION_FUN_NAME));
            return names;
        }

        names
    }

    /// Construction phase: build exactly the declaration named `name` on
    /// `owner`.
    ///
    /// `Ok(None)` means the name is legitimately not synthesized here (for
    /// example the companion of an interface that already declares one). A
    /// recognized owner whose relationships cannot be resolved is an
    /// internal invariant violation, not a diagnostic.
    pub fn build_type(
        &self,
        owner: &ClassId,
        name: &Name,
    ) -> SynthResult<Option<SynthDecl>> {
        if self.eligible.contains(owner) {
            let ctx = self.context_for(owner, owner)?;
            if name.as_str() == MUTABLE_CLASS_NAME {
                return Ok(Some(SynthDecl::Class(self.build_mutable_class(&ctx))));
            }
            if name.as_str() == COMPANION_CLASS_NAME {
                return Ok(self.build_companion_class(&ctx).map(SynthDecl::Class));
            }
            return Ok(self
                .spec_field(&ctx, name)
                .map(|field| SynthDecl::Property(self.build_interface_property(&ctx, field))));
        }

        if let Some(interface) = self.owner_as_mutable(owner) {
            let ctx = self.context_for(&interface, owner)?;
            if name.is_init() {
                return Ok(Some(SynthDecl::Ctor(self.build_mutable_ctor(&ctx))));
            }
            if name.as_str() == UPDATE_FUN_NAME {
                return Ok(Some(SynthDecl::Function(self.build_update_fun(&ctx))));
            }
            return Ok(self
                .spec_field(&ctx, name)
                .map(|field| SynthDecl::Property(self.build_mutable_property(&ctx, field))));
        }

        if let Some(interface) = self.owner_as_companion(owner) {
            let ctx = self.context_for(&interface, owner)?;
            if name.is_init() {
                if self.index.has_user_companion(&interface) {
                    return Ok(None);
                }
                return Ok(Some(SynthDecl::Ctor(CtorDecl {
                    visibility: Visibility::Private,
                    is_primary: true,
                    params: Vec::new(),
                    body: None,
                    key: Some(SynthKey::CompanionCtor { interface: ctx.interface.id.clone() }),
                })));
            }
            if name.as_str() == TO_SPECIFICATION_FUN_NAME {
                return Ok(Some(SynthDecl::Function(self.build_conversion(&ctx, true))));
            }
            if name.as_str() == TO_MUTABLE_FUN_NAME {
                return Ok(Some(SynthDecl::Function(self.build_conversion(&ctx, false))));
            }
            return Ok(None);
        }

        Ok(None)
    }

    fn owner_as_mutable(&self, owner: &ClassId) -> Option<ClassId> {
        let interface = owner.outer()?;
        (owner.name().as_str() == MUTABLE_CLASS_NAME && self.eligible.contains(&interface))
            .then_some(interface)
    }

    fn owner_as_companion(&self, owner: &ClassId) -> Option<ClassId> {
        let interface = owner.outer()?;
        (owner.name().as_str() == COMPANION_CLASS_NAME && self.eligible.contains(&interface))
            .then_some(interface)
    }

    // `origin` is the owner the request came in for; a failure here means
    // the index and the synthesizer disagree about it.
    fn context_for(&self, interface: &ClassId, origin: &ClassId) -> SynthResult<SpecContext<'a>> {
        let untraceable = || FatalError::UntraceableNestedType { class: origin.clone() };
        let interface_decl = self.unit.class(interface).ok_or_else(untraceable)?;
        let spec_id = self.index.spec_of(interface).ok_or_else(untraceable)?;
        let spec = self.unit.class(spec_id).ok_or_else(untraceable)?;
        Ok(SpecContext { interface: interface_decl, spec })
    }

    fn field_names(&self, interface: &ClassId) -> Vec<Name> {
        self.index
            .spec_of(interface)
            .and_then(|spec| self.index.spec_primary_ctor(spec))
            .map(|ctor| ctor.params.iter().map(|p| p.name.clone()).collect())
            .unwrap_or_default()
    }

    fn spec_fields(&self, ctx: &SpecContext<'a>) -> &'a [ValueParam] {
        ctx.spec
            .primary_ctor()
            .map(|ctor| ctor.params.as_slice())
            .unwrap_or(&[])
    }

    fn spec_field(&self, ctx: &SpecContext<'a>, name: &Name) -> Option<&'a ValueParam> {
        self.spec_fields(ctx).iter().find(|field| &field.name == name)
    }

    /// Generic parameters copied from the marked interface onto a
    /// synthesized owner. Always invariant: the projection supports both
    /// read and write, so a covariant source parameter would be unsound as
    /// a mutable write target.
    fn copied_type_params(&self, ctx: &SpecContext<'a>) -> Vec<TypeParam> {
        ctx.interface
            .type_params
            .iter()
            .map(|param| TypeParam {
                name: param.name.clone(),
                variance: Variance::Invariant,
                bounds: param.bounds.clone(),
            })
            .collect()
    }

    /// Substitution from the specification's generic parameters to the
    /// target owner's, built once per owner/specification pair.
    fn substitution_to(&self, ctx: &SpecContext<'a>, target_params: &[TypeParam]) -> Substitution {
        let args: Vec<Ty> = target_params
            .iter()
            .map(|param| Ty::Param(param.name.clone()))
            .collect();
        Substitution::zip(&ctx.spec.type_params, &args)
    }

    fn own_type(&self, class: ClassId, params: &[TypeParam]) -> Ty {
        let args = params.iter().map(|p| Ty::Param(p.name.clone())).collect();
        Ty::named_with(class, args)
    }

    fn build_interface_property(&self, ctx: &SpecContext<'a>, field: &ValueParam) -> PropertyDecl {
        let subst = self.substitution_to(ctx, &ctx.interface.type_params);
        PropertyDecl {
            name: field.name.clone(),
            ty: subst.apply(&field.ty),
            is_var: false,
            is_abstract: true,
            is_override: false,
            visibility: Visibility::Public,
            initializer: None,
            getter: None,
            setter: None,
            key: Some(SynthKey::InterfaceProperty {
                interface: ctx.interface.id.clone(),
                spec: ctx.spec.id.clone(),
                field: field.name.clone(),
            }),
        }
    }

    fn build_mutable_property(&self, ctx: &SpecContext<'a>, field: &ValueParam) -> PropertyDecl {
        let params = self.copied_type_params(ctx);
        let subst = self.substitution_to(ctx, &params);
        PropertyDecl {
            name: field.name.clone(),
            ty: subst.apply(&field.ty),
            is_var: true,
            is_abstract: false,
            is_override: true,
            visibility: Visibility::Public,
            initializer: None,
            getter: None,
            setter: None,
            key: Some(SynthKey::MutableProperty {
                interface: ctx.interface.id.clone(),
                spec: ctx.spec.id.clone(),
                field: field.name.clone(),
            }),
        }
    }

    fn build_mutable_class(&self, ctx: &SpecContext<'a>) -> ClassDecl {
        let id = self.index.mutable_id_of(&ctx.interface.id);
        let type_params = self.copied_type_params(ctx);
        let supertype = self.own_type(ctx.interface.id.clone(), &type_params);
        ClassDecl {
            id,
            kind: ClassKind::Class,
            modality: Modality::Final,
            visibility: Visibility::Public,
            type_params,
            supertypes: vec![supertype],
            markers: Vec::new(),
            ctors: Vec::new(),
            properties: Vec::new(),
            functions: Vec::new(),
            span: Span::dummy(),
            key: Some(SynthKey::MutableClass {
                interface: ctx.interface.id.clone(),
                spec: ctx.spec.id.clone(),
            }),
        }
    }

    fn build_companion_class(&self, ctx: &SpecContext<'a>) -> Option<ClassDecl> {
        if self.index.has_user_companion(&ctx.interface.id) {
            return None;
        }
        let id = self.index.companion_id_of(&ctx.interface.id);
        Some(ClassDecl {
            id,
            kind: ClassKind::Object,
            modality: Modality::Final,
            visibility: Visibility::Public,
            type_params: Vec::new(),
            supertypes: Vec::new(),
            markers: Vec::new(),
            ctors: Vec::new(),
            properties: Vec::new(),
            functions: Vec::new(),
            span: Span::dummy(),
            key: Some(SynthKey::CompanionClass { interface: ctx.interface.id.clone() }),
        })
    }

    fn build_mutable_ctor(&self, ctx: &SpecContext<'a>) -> CtorDecl {
        let params = self.copied_type_params(ctx);
        let subst = self.substitution_to(ctx, &params);
        let params = self
            .spec_fields(ctx)
            .iter()
            .map(|field| ValueParam {
                name: field.name.clone(),
                ty: subst.apply(&field.ty),
                has_default: field.has_default,
                default: field.has_default.then(Body::placeholder),
            })
            .collect();
        CtorDecl {
            visibility: Visibility::Public,
            is_primary: true,
            params,
            body: None,
            key: Some(SynthKey::MutableCtor {
                interface: ctx.interface.id.clone(),
                spec: ctx.spec.id.clone(),
            }),
        }
    }

    fn build_update_fun(&self, ctx: &SpecContext<'a>) -> FunDecl {
        let type_params = self.copied_type_params(ctx);
        let subst = self.substitution_to(ctx, &type_params);
        let mutable_id = self.index.mutable_id_of(&ctx.interface.id);
        let params = self
            .spec_fields(ctx)
            .iter()
            .map(|field| ValueParam {
                name: field.name.clone(),
                ty: subst.apply(&field.ty),
                has_default: true,
                default: Some(Body::placeholder()),
            })
            .collect();
        FunDecl {
            name: Name::new(UPDATE_FUN_NAME),
            type_params: Vec::new(),
            receiver: None,
            params,
            return_ty: self.own_type(mutable_id, &type_params),
            visibility: Visibility::Public,
            body: None,
            key: Some(SynthKey::UpdateFun {
                interface: ctx.interface.id.clone(),
                spec: ctx.spec.id.clone(),
            }),
        }
    }

    /// Conversion functions on the companion: extension-style, generic over
    /// the owner's type parameters.
    fn build_conversion(&self, ctx: &SpecContext<'a>, to_spec: bool) -> FunDecl {
        let type_params = self.copied_type_params(ctx);
        let args: Vec<Ty> = type_params.iter().map(|p| Ty::Param(p.name.clone())).collect();
        let mutable_ty = Ty::named_with(self.index.mutable_id_of(&ctx.interface.id), args.clone());
        let spec_args: Vec<Ty> = ctx
            .spec
            .type_params
            .iter()
            .zip(args.iter())
            .map(|(_, arg)| arg.clone())
            .collect();
        let spec_ty = Ty::named_with(ctx.spec.id.clone(), spec_args);

        let (name, receiver, return_ty, key) = if to_spec {
            (
                Name::new(TO_SPECIFICATION_FUN_NAME),
                mutable_ty,
                spec_ty,
                SynthKey::ToSpecificationFun {
                    interface: ctx.interface.id.clone(),
                    spec: ctx.spec.id.clone(),
                },
            )
        } else {
            (
                Name::new(TO_MUTABLE_FUN_NAME),
                spec_ty,
                mutable_ty,
                SynthKey::ToMutableFun {
                    interface: ctx.interface.id.clone(),
                    spec: ctx.spec.id.clone(),
                },
            )
        };

        FunDecl {
            name,
            type_params,
            receiver: Some(receiver),
            params: Vec::new(),
            return_ty,
            visibility: Visibility::Public,
            body: None,
            key: Some(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_model::{ClassId, PrimitiveTy, UnitBuilder, MIRRORED_FQN, MIRROR_SPEC_FQN};

    fn generic_unit() -> CompilationUnit {
        let interface_id = ClassId::top_level("foo", "Holder");
        let mut builder = UnitBuilder::new();
        builder
            .add_class(
                ClassDecl::new(interface_id.clone(), ClassKind::Interface)
                    .with_marker(MIRRORED_FQN)
                    .with_type_params(vec![TypeParam::covariant("T")]),
            )
            .unwrap();
        builder
            .add_class(
                ClassDecl::new(interface_id.nested("Immutable"), ClassKind::Class)
                    .with_marker(MIRROR_SPEC_FQN)
                    .with_type_params(vec![TypeParam::invariant("T")])
                    .with_ctor(CtorDecl::primary(vec![
                        ValueParam::required("item", Ty::Param(Name::new("T"))),
                        ValueParam::required("count", Ty::Primitive(PrimitiveTy::Int)),
                    ])),
            )
            .unwrap();
        builder.freeze()
    }

    fn synthesizer<'a>(
        unit: &'a CompilationUnit,
        index: &'a SymbolIndex<'a>,
    ) -> DeclarationSynthesizer<'a> {
        DeclarationSynthesizer::new(unit, index, index.interfaces().clone())
    }

    #[test]
    fn test_interface_names_include_fields_and_nested_types() {
        let unit = generic_unit();
        let index = SymbolIndex::new(&unit);
        let synth = synthesizer(&unit, &index);
        let interface = ClassId::top_level("foo", "Holder");

        let names = synth.names_for(&interface);
        let expected: FxHashSet<Name> = ["item", "count", "Mutable", "Companion"]
            .into_iter()
            .map(Name::new)
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_mutable_names_include_ctor_and_update() {
        let unit = generic_unit();
        let index = SymbolIndex::new(&unit);
        let synth = synthesizer(&unit, &index);
        let mutable = ClassId::top_level("foo", "Holder").nested("Mutable");

        let names = synth.names_for(&mutable);
        assert!(names.contains(&Name::init()));
        assert!(names.contains(&Name::new("update")));
        assert!(names.contains(&Name::new("item")));
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_copied_type_params_are_invariant() {
        let unit = generic_unit();
        let index = SymbolIndex::new(&unit);
        let synth = synthesizer(&unit, &index);
        let interface = ClassId::top_level("foo", "Holder");

        let built = synth
            .build_type(&interface, &Name::new(MUTABLE_CLASS_NAME))
            .unwrap()
            .unwrap();
        let SynthDecl::Class(mutable) = built else {
            panic!("expected a class declaration");
        };
        assert_eq!(mutable.type_params.len(), 1);
        assert_eq!(mutable.type_params[0].variance, Variance::Invariant);
        assert_eq!(mutable.supertypes, vec![Ty::named_with(
            interface.clone(),
            vec![Ty::Param(Name::new("T"))],
        )]);
    }

    #[test]
    fn test_field_types_are_substituted() {
        let unit = generic_unit();
        let index = SymbolIndex::new(&unit);
        let synth = synthesizer(&unit, &index);
        let mutable = ClassId::top_level("foo", "Holder").nested("Mutable");

        let built = synth.build_type(&mutable, &Name::new("item")).unwrap().unwrap();
        let SynthDecl::Property(property) = built else {
            panic!("expected a property declaration");
        };
        assert_eq!(property.ty, Ty::Param(Name::new("T")));
        assert!(property.is_var);
        assert!(property.is_override);
    }

    #[test]
    fn test_update_params_carry_placeholder_defaults() {
        let unit = generic_unit();
        let index = SymbolIndex::new(&unit);
        let synth = synthesizer(&unit, &index);
        let mutable = ClassId::top_level("foo", "Holder").nested("Mutable");

        let built = synth.build_type(&mutable, &Name::new("update")).unwrap().unwrap();
        let SynthDecl::Function(update) = built else {
            panic!("expected a function declaration");
        };
        assert!(update.params.iter().all(|p| p.has_default));
        assert!(update
            .params
            .iter()
            .all(|p| p.default.as_ref().is_some_and(Body::is_placeholder)));
        assert_eq!(
            update.return_ty,
            Ty::named_with(mutable, vec![Ty::Param(Name::new("T"))])
        );
    }

    #[test]
    fn test_unresolvable_nested_owner_is_fatal() {
        // An interface forced eligible without a specification: the index
        // and the synthesizer disagree, which is an internal error, not a
        // diagnostic.
        let id = ClassId::top_level("foo", "Orphan");
        let mut builder = UnitBuilder::new();
        builder
            .add_class(ClassDecl::new(id.clone(), ClassKind::Interface).with_marker(MIRRORED_FQN))
            .unwrap();
        let unit = builder.freeze();
        let index = SymbolIndex::new(&unit);
        let mut eligible = FxHashSet::default();
        eligible.insert(id.clone());
        let synth = DeclarationSynthesizer::new(&unit, &index, eligible);

        let mutable = id.nested("Mutable");
        let err = synth.build_type(&mutable, &Name::init()).unwrap_err();
        assert_eq!(err, FatalError::UntraceableNestedType { class: mutable });
    }

    #[test]
    fn test_unrelated_owner_builds_nothing() {
        let unit = generic_unit();
        let index = SymbolIndex::new(&unit);
        let synth = synthesizer(&unit, &index);
        let other = ClassId::top_level("foo", "Other");

        assert!(synth.names_for(&other).is_empty());
        assert_eq!(synth.build_type(&other, &Name::new("item")).unwrap(), None);
    }
}
