//! Error types for vial container operations.
//!
//! Every failure is reported to the immediate caller; nothing is caught or
//! retried inside the container. Errors are `Clone` so a single failed
//! singleton construction can be handed to every caller waiting on it.

use std::fmt;
use std::sync::Arc;

use vial_support::rendering::render_chain;

use crate::key::TypeKey;

/// Main error type for all vial operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VialError {
    /// Requested type has no binding.
    #[error("{}", .0)]
    UnregisteredType(UnregisteredTypeError),

    /// `inject` targeted a type without a designated constructor.
    #[error("No designated constructor for {key}\n  Hint: return Some(Constructor) from {}::constructor()", .key.short_name())]
    NoConstructor { key: TypeKey },

    /// A module provider method yielded no value.
    #[error("Provider method `{method}` for {key} returned no value")]
    ProviderReturnedNull { key: TypeKey, method: &'static str },

    /// A bound provider produced a value of another type.
    #[error("Type mismatch for {key}: expected {expected}")]
    TypeMismatch { key: TypeKey, expected: &'static str },

    /// A constructor read more arguments than it declared.
    #[error("Constructor of {key} read argument #{position}, which it never declared")]
    MissingArgument { key: TypeKey, position: usize },

    /// A user factory returned an error.
    #[error("Failed to construct {key}: {source}")]
    ConstructionFailed {
        key: TypeKey,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The spawned task building a singleton panicked.
    #[error("Provider for {key} panicked during construction")]
    ProviderPanicked { key: TypeKey },

    /// An async singleton had to be built outside a tokio runtime.
    #[error("Cannot construct singleton {key}: no tokio runtime is running")]
    NoRuntime { key: TypeKey },
}

impl VialError {
    /// Wraps a factory error as [`VialError::ConstructionFailed`].
    pub fn construction(
        key: TypeKey,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        VialError::ConstructionFailed {
            key,
            source: Arc::from(source.into()),
        }
    }

    /// Creates an [`VialError::UnregisteredType`] for `key`.
    pub(crate) fn unregistered(key: TypeKey, suggestions: Vec<String>) -> Self {
        VialError::UnregisteredType(UnregisteredTypeError {
            requested: key,
            required_by: Vec::new(),
            suggestions,
        })
    }

    /// Records that `consumer` needed the missing type.
    ///
    /// Other error kinds pass through unchanged.
    pub(crate) fn required_by(mut self, consumer: TypeKey) -> Self {
        if let VialError::UnregisteredType(ref mut err) = self {
            err.required_by.push(consumer);
        }
        self
    }
}

/// Error when a type has no binding.
#[derive(Debug, Clone)]
pub struct UnregisteredTypeError {
    /// The type that was requested
    pub requested: TypeKey,
    /// Types whose constructors needed it, innermost first
    pub required_by: Vec<TypeKey>,
    /// Registered type names that look similar
    pub suggestions: Vec<String>,
}

impl fmt::Display for UnregisteredTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type not registered: {}", self.requested)?;

        if !self.required_by.is_empty() {
            let chain: Vec<String> = self
                .required_by
                .iter()
                .rev()
                .chain(std::iter::once(&self.requested))
                .map(TypeKey::short_name)
                .collect();
            write!(f, "\n  Required by: {}", render_chain(&chain))?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: Did you forget to call .register::<{}>()?",
            self.requested.short_name()
        )
    }
}

/// Convenient Result type for vial operations.
pub type Result<T> = std::result::Result<T, VialError>;
