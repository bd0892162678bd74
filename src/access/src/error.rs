//! Error types for policy construction and denials

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Policy construction and configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    /// A composite policy was built without factors
    #[error("Policy `{combinator}` demands at least one factor")]
    EmptyFactors { combinator: &'static str },

    /// Malformed access-control settings
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for access-control operations
pub type Result<T> = std::result::Result<T, AccessError>;

/// Default denial raised when a policy refuses access
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct UnauthorizedError {
    message: String,
}

impl UnauthorizedError {
    pub const DEFAULT_MESSAGE: &'static str = "Unauthorized";

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for UnauthorizedError {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MESSAGE)
    }
}

/// Shared handle to the error explaining a denial
///
/// Wraps any error type. Clones point to the same error, so a denial raised
/// deep inside a policy tree reaches the caller as the very same object, and
/// callers can downcast it back to their own type.
///
/// # Example
///
/// ```
/// use warden_access::{Denial, UnauthorizedError};
///
/// let denial = Denial::new(UnauthorizedError::new("None Shall Pass!"));
///
/// assert_eq!(denial.to_string(), "None Shall Pass!");
/// assert!(denial.is::<UnauthorizedError>());
/// assert!(Denial::ptr_eq(&denial, &denial.clone()));
/// ```
#[derive(Clone)]
pub struct Denial(Arc<dyn StdError + Send + Sync + 'static>);

impl Denial {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    /// Display text of the wrapped error
    pub fn message(&self) -> String {
        self.0.to_string()
    }

    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.0.downcast_ref::<E>()
    }

    pub fn is<E>(&self) -> bool
    where
        E: StdError + 'static,
    {
        self.0.is::<E>()
    }

    /// Whether both handles share the same error object
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }

    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.0
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl fmt::Debug for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Denial").field(&self.0).finish()
    }
}

impl StdError for Denial {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<UnauthorizedError> for Denial {
    fn from(error: UnauthorizedError) -> Self {
        Self::new(error)
    }
}
