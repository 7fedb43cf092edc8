//! Mirror Model - the frozen symbol universe
//!
//! The host-compiler front-end surface the synthesis engine plugs into:
//! names and class identifiers, static types with generic-parameter
//! substitution, class/property/function/constructor declarations, marker
//! attributes, a small body IR, and the frozen per-unit declaration universe.
//!
//! This crate holds data only; every pass that reads or produces these
//! shapes lives in `mirror-synth`.

pub mod body;
pub mod decl;
pub mod error;
pub mod key;
pub mod markers;
pub mod name;
pub mod ty;
pub mod unit;

pub use body::{Body, Expr, Literal, Stmt};
pub use decl::{ClassDecl, ClassKind, CtorDecl, FunDecl, Modality, PropertyDecl, ValueParam, Visibility};
pub use error::ModelError;
pub use key::SynthKey;
pub use markers::{Marker, MIRRORED_FQN, MIRROR_SPEC_FQN};
pub use name::{ClassId, Name, Span, INIT_NAME};
pub use ty::{PrimitiveTy, Substitution, Ty, TypeParam, Variance};
pub use unit::{CompilationUnit, RuntimeClasspath, UnitBuilder};
