//! Shared fixtures for integration tests

use mirror_model::{
    Body, ClassDecl, ClassId, ClassKind, CompilationUnit, CtorDecl, Expr, Literal, PrimitiveTy,
    Ty, UnitBuilder, ValueParam, MIRRORED_FQN, MIRROR_SPEC_FQN,
};
use mirror_synth::{runtime_classpath, Engine, UnitSynthesis};

/// Id of the fixture interface `foo.bar.State`.
pub fn state_id() -> ClassId {
    ClassId::top_level("foo.bar", "State")
}

fn literal(value: Literal) -> Body {
    Body::Expr(Expr::Literal(value))
}

/// A marked interface with the activity-tracking specification:
///
/// ```text
/// @Mirrored
/// interface State {
///     @MirrorSpec
///     class Immutable(
///         activity: String = "jog",
///         stepCount: Int = 42,
///         startTimeStamp: Long = 1700923000,
///         totalDistanceInMiles: Float = 45.5,
///         stepsPerSecond: Double = 0.4,
///     ) : State
/// }
/// ```
pub fn tracking_unit() -> CompilationUnit {
    let interface_id = state_id();
    let spec_id = interface_id.nested("Immutable");

    let mut builder = UnitBuilder::new();
    builder
        .add_class(
            ClassDecl::new(interface_id.clone(), ClassKind::Interface).with_marker(MIRRORED_FQN),
        )
        .unwrap();
    builder
        .add_class(
            ClassDecl::new(spec_id, ClassKind::Class)
                .with_marker(MIRROR_SPEC_FQN)
                .with_supertype(Ty::named(interface_id))
                .with_ctor(CtorDecl::primary(vec![
                    ValueParam::defaulted(
                        "activity",
                        Ty::Primitive(PrimitiveTy::String),
                        literal(Literal::Str("jog".to_string())),
                    ),
                    ValueParam::defaulted(
                        "stepCount",
                        Ty::Primitive(PrimitiveTy::Int),
                        literal(Literal::Int(42)),
                    ),
                    ValueParam::defaulted(
                        "startTimeStamp",
                        Ty::Primitive(PrimitiveTy::Long),
                        literal(Literal::Long(1_700_923_000)),
                    ),
                    ValueParam::defaulted(
                        "totalDistanceInMiles",
                        Ty::Primitive(PrimitiveTy::Float),
                        literal(Literal::Float(45.5)),
                    ),
                    ValueParam::defaulted(
                        "stepsPerSecond",
                        Ty::Primitive(PrimitiveTy::Double),
                        literal(Literal::Double(0.4)),
                    ),
                ])),
        )
        .unwrap();
    builder.set_classpath(runtime_classpath());
    builder.freeze()
}

/// Run the whole pipeline over `unit`, expecting no fatal error.
pub fn run(unit: &CompilationUnit) -> UnitSynthesis {
    Engine::register(unit).run().expect("synthesis succeeds")
}
