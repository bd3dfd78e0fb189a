//! Error types for pipeline assembly and execution
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! ## Categories
//!
//! | Category | Variants | Raised |
//! |----------|----------|--------|
//! | Assembly | `ContractViolation`, `ConflictingField`, `IncompatiblePipeline` | Before any stage runs |
//! | Access | `UnsetField`, `UnknownField` | While a stage runs |
//! | Action | `Action` | Raised by a stage action itself |

/// Boxed error raised by a stage action.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for Morphline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Morphline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ==================== Assembly Errors ====================
    /// A stage's input contract is not satisfied by its ancestor's available contract
    #[error(
        "stage '{stage}' is not compatible with contract from ancestor '{ancestor}': missing {}",
        .missing.join(", ")
    )]
    ContractViolation {
        /// Name of the first stage whose input contract is unsatisfied
        stage: String,
        /// Name of that stage's immediate ancestor
        ancestor: String,
        /// Names of the required fields the ancestor does not provide
        missing: Vec<String>,
    },

    /// Two descriptors share a name but disagree on the value type
    #[error("conflicting definitions for field '{name}': {existing} vs {incoming}")]
    ConflictingField {
        /// The shared field name
        name: String,
        /// Value type already present in the contract
        existing: &'static str,
        /// Value type that collided with it
        incoming: &'static str,
    },

    /// The pipeline cannot produce a store or run because it failed validation
    #[error("pipeline ending at stage '{stage}' is not compatible; call validate() for details")]
    IncompatiblePipeline {
        /// Name of the tip stage
        stage: String,
    },

    // ==================== Access Errors ====================
    /// A slot exists for the field but no stage has written it yet
    #[error("field '{name}' ({value_type}) was read before any stage set it")]
    UnsetField {
        /// Field name
        name: String,
        /// Rust type name of the field's value
        value_type: &'static str,
    },

    /// The store holds no slot for this (type, name) pair
    #[error("field '{name}' ({value_type}) is not allocated in the store")]
    UnknownField {
        /// Field name
        name: String,
        /// Rust type name of the field's value
        value_type: &'static str,
    },

    // ==================== Action Errors ====================
    /// Failure raised inside a stage action, passed through unchanged
    #[error(transparent)]
    Action(BoxError),
}

impl Error {
    /// Wrap a failure raised by a stage action.
    pub fn action<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Action(err.into())
    }

    /// Whether this error was detected while assembling the pipeline.
    pub fn is_assembly_error(&self) -> bool {
        matches!(
            self,
            Error::ContractViolation { .. }
                | Error::ConflictingField { .. }
                | Error::IncompatiblePipeline { .. }
        )
    }

    /// Names of the missing fields for a contract violation, empty otherwise.
    pub fn missing_fields(&self) -> &[String] {
        match self {
            Error::ContractViolation { missing, .. } => missing,
            _ => &[],
        }
    }
}
