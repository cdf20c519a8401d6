//! Error types for the gauge registry.

use thiserror::Error;

/// Errors returned by [`Registry`](crate::Registry) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A family with this name is already registered.
    #[error("gauge family {0:?} is already registered")]
    Duplicate(String),

    /// No family with this name is registered.
    #[error("gauge family {0:?} is not registered")]
    UnknownFamily(String),

    /// Not a valid Prometheus metric name.
    #[error("invalid metric name {0:?}")]
    InvalidName(String),

    /// Not a valid Prometheus label name.
    #[error("invalid label name {0:?}")]
    InvalidLabel(String),

    /// The number of label values does not match the family's label names.
    #[error("gauge family {family:?} expects {expected} label values, got {got}")]
    LabelArity {
        family: String,
        expected: usize,
        got: usize,
    },
}
