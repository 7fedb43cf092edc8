//! Synthesis errors
//!
//! Two distinct failure families. [`ValidationError`] records a user
//! structural mistake: it becomes a compiler diagnostic, synthesis for the
//! offending declaration is skipped, and the rest of the unit continues.
//! [`FatalError`] records an internal invariant violation or a broken
//! environment: it aborts the unit's analysis outright. Every lookup that can
//! legitimately find nothing returns an `Option` instead of either of these.

use mirror_model::{ClassId, Name};
use thiserror::Error;

/// Result alias for the fatal-error family.
pub type SynthResult<T> = Result<T, FatalError>;

/// Unrecoverable failures: synthesizer bugs or a broken environment, never
/// user mistakes.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FatalError {
    /// A nested mutable-projection id could not be traced back to any marked
    /// interface even though the synthesizer produced it.
    #[error("nested mutable type {class} cannot be traced to a marked interface")]
    UntraceableNestedType {
        /// The orphaned nested type
        class: ClassId,
    },

    /// A storage kind selected by the strategy table is absent from the
    /// compilation classpath.
    #[error("storage type {class} not found on the compilation classpath")]
    StorageTypeNotFound {
        /// The missing runtime cell class
        class: ClassId,
    },

    /// Lowering started before every signature in the unit was produced.
    #[error("lowering started before the signature phase completed")]
    PhaseOrder,

    /// Catch-all internal invariant violation.
    #[error("internal error: {message}")]
    Internal {
        /// What went wrong
        message: String,
    },
}

/// One structural rule violation on a marked declaration.
///
/// The display strings are the fixed human-readable message templates; each
/// variant maps to exactly one diagnostic code.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// Interface-role marker on a non-interface declaration.
    #[error("'@Mirrored' must be declared on an interface")]
    RoleMismatch {
        /// The offending declaration
        class: ClassId,
    },

    /// Marked interface without exactly one nested specification.
    #[error("'@Mirrored' interface requires exactly one nested '@MirrorSpec' class")]
    MissingSpec {
        /// The offending interface
        class: ClassId,
    },

    /// Specification without a primary constructor.
    #[error("'@MirrorSpec' requires a primary constructor")]
    MissingConstructor {
        /// The offending specification
        class: ClassId,
    },

    /// Specification whose primary constructor is private.
    #[error("'@MirrorSpec' requires a non-private primary constructor")]
    PrivateConstructor {
        /// The offending specification
        class: ClassId,
    },

    /// Specification that is abstract, open, or not a class.
    #[error("'@MirrorSpec' requires a final class")]
    NonFinalShape {
        /// The offending specification
        class: ClassId,
    },

    /// Specification not nested under a marked interface.
    #[error("'@MirrorSpec' must be nested under a '@Mirrored' interface")]
    MissingParent {
        /// The offending specification
        class: ClassId,
    },

    /// Specification field that is not public.
    #[error("'@MirrorSpec' constructor field '{field}' must be public")]
    IllegalFieldVisibility {
        /// The offending specification
        class: ClassId,
        /// The non-public field
        field: Name,
    },
}

impl ValidationError {
    /// The declaration the finding is attached to.
    pub fn class(&self) -> &ClassId {
        match self {
            ValidationError::RoleMismatch { class }
            | ValidationError::MissingSpec { class }
            | ValidationError::MissingConstructor { class }
            | ValidationError::PrivateConstructor { class }
            | ValidationError::NonFinalShape { class }
            | ValidationError::MissingParent { class }
            | ValidationError::IllegalFieldVisibility { class, .. } => class,
        }
    }
}
