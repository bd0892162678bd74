//! Evaluation results and raw predicate outcomes

use crate::error::{Denial, UnauthorizedError};

/// Outcome of evaluating a [`Policy`](crate::Policy)
///
/// A result is allowed exactly when it carries no error.
#[derive(Debug, Clone)]
pub struct PolicyResult {
    allowed: bool,
    error: Option<Denial>,
}

impl PolicyResult {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            error: None,
        }
    }

    pub fn deny(denial: impl Into<Denial>) -> Self {
        Self {
            allowed: false,
            error: Some(denial.into()),
        }
    }

    /// Allowed when `error` is `None`, denied otherwise
    pub fn from_error(error: Option<Denial>) -> Self {
        Self {
            allowed: error.is_none(),
            error,
        }
    }

    pub fn allowed(&self) -> bool {
        self.allowed
    }

    pub fn denied(&self) -> bool {
        !self.allowed
    }

    pub fn error(&self) -> Option<&Denial> {
        self.error.as_ref()
    }

    pub fn into_error(self) -> Option<Denial> {
        self.error
    }

    pub fn into_result(self) -> Result<(), Denial> {
        match self.error {
            Some(denial) => Err(denial),
            None => Ok(()),
        }
    }
}

impl From<Result<(), Denial>> for PolicyResult {
    fn from(result: Result<(), Denial>) -> Self {
        Self::from_error(result.err())
    }
}

/// Raw value produced by a predicate, before error normalization
///
/// | outcome | result |
/// |---------|--------|
/// | `Bool(true)` | allowed |
/// | `Error(denial)` | denied with `denial` as-is |
/// | `Result(result)` | the error of `result`, allowed if it has none |
/// | `Message(text)` | denied with the preformatted `text` |
/// | `Bool(false)` | denied with the default preformatted error |
#[derive(Debug, Clone)]
pub enum Outcome {
    Bool(bool),
    Message(String),
    Error(Denial),
    Result(PolicyResult),
}

impl From<bool> for Outcome {
    fn from(value: bool) -> Self {
        Outcome::Bool(value)
    }
}

impl From<&str> for Outcome {
    fn from(message: &str) -> Self {
        Outcome::Message(message.to_string())
    }
}

impl From<String> for Outcome {
    fn from(message: String) -> Self {
        Outcome::Message(message)
    }
}

impl From<Denial> for Outcome {
    fn from(denial: Denial) -> Self {
        Outcome::Error(denial)
    }
}

impl From<UnauthorizedError> for Outcome {
    fn from(error: UnauthorizedError) -> Self {
        Outcome::Error(error.into())
    }
}

impl From<PolicyResult> for Outcome {
    fn from(result: PolicyResult) -> Self {
        Outcome::Result(result)
    }
}

impl From<Result<(), Denial>> for Outcome {
    fn from(result: Result<(), Denial>) -> Self {
        Outcome::Result(result.into())
    }
}

/// `None` counts as `false`
impl<T: Into<Outcome>> From<Option<T>> for Outcome {
    fn from(value: Option<T>) -> Self {
        value.map_or(Outcome::Bool(false), Into::into)
    }
}
