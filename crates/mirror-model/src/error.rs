//! Model errors

use crate::name::ClassId;
use thiserror::Error;

/// Errors raised while assembling a compilation unit.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// Two class declarations share an id.
    #[error("duplicate class declaration: {id}")]
    DuplicateClass {
        /// The duplicated identifier
        id: ClassId,
    },
}
