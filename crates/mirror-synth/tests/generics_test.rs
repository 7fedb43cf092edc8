//! Generic interfaces: substitution, invariance, and boxed storage

use mirror_model::{
    ClassDecl, ClassId, ClassKind, CompilationUnit, CtorDecl, Name, Ty, TypeParam, UnitBuilder,
    ValueParam, Variance, MIRRORED_FQN, MIRROR_SPEC_FQN,
};
use mirror_synth::{Engine, Evaluator, Value};

/// ```text
/// @Mirrored
/// interface Holder<out T, R> {
///     @MirrorSpec
///     class Immutable<T, R>(item: T, value: R) : Holder<T, R>
/// }
/// ```
fn holder_unit() -> CompilationUnit {
    let interface_id = ClassId::top_level("foo", "Holder");
    let spec_id = interface_id.nested("Immutable");

    let mut builder = UnitBuilder::new();
    builder
        .add_class(
            ClassDecl::new(interface_id.clone(), ClassKind::Interface)
                .with_marker(MIRRORED_FQN)
                .with_type_params(vec![TypeParam::covariant("T"), TypeParam::invariant("R")]),
        )
        .unwrap();
    builder
        .add_class(
            ClassDecl::new(spec_id, ClassKind::Class)
                .with_marker(MIRROR_SPEC_FQN)
                .with_type_params(vec![TypeParam::invariant("T"), TypeParam::invariant("R")])
                .with_supertype(Ty::named_with(
                    interface_id,
                    vec![Ty::Param(Name::new("T")), Ty::Param(Name::new("R"))],
                ))
                .with_ctor(CtorDecl::primary(vec![
                    ValueParam::required("item", Ty::Param(Name::new("T"))),
                    ValueParam::required("value", Ty::Param(Name::new("R"))),
                ])),
        )
        .unwrap();
    builder.set_classpath(mirror_synth::runtime_classpath());
    builder.freeze()
}

#[test]
fn test_covariant_source_parameter_becomes_invariant() {
    let unit = holder_unit();
    let synthesis = Engine::register(&unit).run().unwrap();
    let mutable = ClassId::top_level("foo", "Holder").nested("Mutable");

    let decl = synthesis.synthesized.class(&mutable).unwrap();
    assert_eq!(decl.type_params.len(), 2);
    assert!(decl
        .type_params
        .iter()
        .all(|param| param.variance == Variance::Invariant));
}

#[test]
fn test_member_types_are_substituted_parameters() {
    let unit = holder_unit();
    let synthesis = Engine::register(&unit).run().unwrap();
    let interface = ClassId::top_level("foo", "Holder");
    let mutable = interface.nested("Mutable");

    let item = synthesis
        .synthesized
        .property(&mutable, &Name::new("item"))
        .unwrap();
    assert_eq!(item.ty, Ty::Param(Name::new("T")));

    let abstract_item = synthesis
        .synthesized
        .property(&interface, &Name::new("item"))
        .unwrap();
    assert_eq!(abstract_item.ty, Ty::Param(Name::new("T")));

    let update = synthesis
        .synthesized
        .function(&mutable, &Name::new("update"))
        .unwrap();
    assert_eq!(
        update.return_ty,
        Ty::named_with(
            mutable,
            vec![Ty::Param(Name::new("T")), Ty::Param(Name::new("R"))],
        )
    );
}

#[test]
fn test_conversions_are_generic_over_owner_parameters() {
    let unit = holder_unit();
    let synthesis = Engine::register(&unit).run().unwrap();
    let companion = ClassId::top_level("foo", "Holder").nested("Companion");

    for name in ["toMutable", "toSpecification"] {
        let function = synthesis
            .synthesized
            .function(&companion, &Name::new(name))
            .unwrap();
        assert_eq!(function.type_params.len(), 2);
        assert!(function.receiver.is_some());
    }
}

#[test]
fn test_generic_fields_use_boxed_cells_end_to_end() {
    let unit = holder_unit();
    let synthesis = Engine::register(&unit).run().unwrap();
    let mut eval = Evaluator::new(&unit, &synthesis.synthesized);

    let spec_id = ClassId::top_level("foo", "Holder").nested("Immutable");
    let spec = eval
        .construct_spec(
            &spec_id,
            &[("item", Value::str("Hello")), ("value", Value::Int(10))],
        )
        .unwrap();
    let mutable = eval.to_mutable(&spec).unwrap();

    eval.set_property(&mutable, "item", Value::str("World")).unwrap();
    eval.update(&mutable, &[("value", Value::Int(20))]).unwrap();

    assert_eq!(eval.get_property(&mutable, "item").unwrap(), Value::str("World"));
    assert_eq!(eval.get_property(&mutable, "value").unwrap(), Value::Int(20));

    let back = eval.to_specification(&mutable).unwrap();
    let Value::Spec(back) = back else {
        panic!("expected a specification value");
    };
    assert_eq!(back.field("item"), Some(&Value::str("World")));
    assert_eq!(back.field("value"), Some(&Value::Int(20)));
}

#[test]
fn test_field_isolation_holds_for_boxed_cells() {
    let unit = holder_unit();
    let synthesis = Engine::register(&unit).run().unwrap();
    let mut eval = Evaluator::new(&unit, &synthesis.synthesized);

    let spec_id = ClassId::top_level("foo", "Holder").nested("Immutable");
    let spec = eval
        .construct_spec(&spec_id, &[("item", Value::str("a")), ("value", Value::Int(1))])
        .unwrap();
    let mutable = eval.to_mutable(&spec).unwrap();

    eval.set_property(&mutable, "item", Value::str("b")).unwrap();
    assert_eq!(eval.cell_version(&mutable, "value").unwrap(), 0);
    assert_eq!(eval.cell_version(&mutable, "item").unwrap(), 1);
}
