//! Mirror Synth - declaration synthesis for mutable projections
//!
//! A compile-time synthesis engine that plugs into the host compiler's front
//! end. Given an immutable specification record nested under a marked
//! interface, it synthesizes the parallel mutable projection type backed by
//! observable storage cells, bidirectional converters between the two
//! representations, and a multi-field update operation.
//!
//! This crate provides:
//! - Marker discovery and relationship resolution ([`SymbolIndex`])
//! - Structural validation with one diagnostic per offending declaration
//!   ([`Validator`])
//! - Two-phase declaration synthesis: name enumeration, then lazy
//!   construction with generic substitution ([`DeclarationSynthesizer`])
//! - The contract-satisfaction status pass ([`StatusPass`])
//! - Body lowering with per-field storage strategy selection ([`Lowerer`])
//! - An evaluator that executes lowered bodies against real cell storage
//!   ([`Evaluator`])
//!
//! # Usage
//!
//! ```ignore
//! use mirror_synth::Engine;
//!
//! // The host compiler registers the engine once per unit.
//! let engine = Engine::register(&unit);
//!
//! // Validation, signature synthesis, the status pass and lowering run as
//! // ordered extensions.
//! let synthesis = engine.run()?;
//! for finding in &synthesis.diagnostics {
//!     eprintln!("{finding}");
//! }
//! ```

pub mod declare;
pub mod diagnostic;
pub mod error;
pub mod eval;
pub mod index;
pub mod lower;
pub mod pipeline;
pub mod status;
pub mod storage;
pub mod synthesized;
pub mod validate;

// Re-export main types
pub use declare::{
    DeclarationSynthesizer, SynthDecl, COMPANION_CLASS_NAME, MUTABLE_CLASS_NAME,
    TO_MUTABLE_FUN_NAME, TO_SPECIFICATION_FUN_NAME, UPDATE_FUN_NAME,
};
pub use diagnostic::{create_files, error_code, Diagnostic, ErrorCode, JsonDiagnostic};
pub use error::{FatalError, SynthResult, ValidationError};
pub use eval::{EvalError, EvalResult, Evaluator, InstanceId, SpecValue, Value};
pub use index::SymbolIndex;
pub use lower::Lowerer;
pub use pipeline::{Engine, UnitSynthesis};
pub use status::{OverrideFacts, StatusPass};
pub use storage::{runtime_classpath, StorageEntry, StorageKind};
pub use synthesized::{OwnedMembers, Synthesized};
pub use validate::Validator;
