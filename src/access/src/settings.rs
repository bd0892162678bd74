//! Error hooks and access-control configuration
//!
//! Every leaf policy carries two hooks:
//! - `preformat_error` builds a denial from an optional message, used when a
//!   predicate answers `false` or a bare message
//! - `format_error` post-processes every denial the leaf produces

use crate::error::{AccessError, Denial, Result, UnauthorizedError};
use crate::result::Outcome;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Builds a denial from an optional message
pub type PreformatFn = Arc<dyn Fn(Option<&str>) -> Denial + Send + Sync>;

/// Post-processes a denial
pub type FormatFn = Arc<dyn Fn(Denial) -> Denial + Send + Sync>;

/// Programmatic error hooks; unset hooks fall back to the defaults
///
/// # Example
///
/// ```
/// use warden_access::{AccessControl, AccessControlSettings, Denial, UnauthorizedError};
///
/// let settings = AccessControlSettings::new().with_preformat_error(|message: Option<&str>| {
///     Denial::new(UnauthorizedError::new(format!("denied: {}", message.unwrap_or("no reason"))))
/// });
///
/// let access = AccessControl::<()>::with_settings(settings);
/// ```
#[derive(Clone, Default)]
pub struct AccessControlSettings {
    preformat_error: Option<PreformatFn>,
    format_error: Option<FormatFn>,
}

impl AccessControlSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preformat_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&str>) -> Denial + Send + Sync + 'static,
    {
        self.preformat_error = Some(Arc::new(f));
        self
    }

    pub fn with_format_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Denial) -> Denial + Send + Sync + 'static,
    {
        self.format_error = Some(Arc::new(f));
        self
    }

    pub fn preformat_error(&self) -> Option<&PreformatFn> {
        self.preformat_error.as_ref()
    }

    pub fn format_error(&self) -> Option<&FormatFn> {
        self.format_error.as_ref()
    }

    /// Hooks set in `overrides` win over the ones set here
    pub fn merge(&self, overrides: &AccessControlSettings) -> AccessControlSettings {
        AccessControlSettings {
            preformat_error: overrides
                .preformat_error
                .clone()
                .or_else(|| self.preformat_error.clone()),
            format_error: overrides
                .format_error
                .clone()
                .or_else(|| self.format_error.clone()),
        }
    }
}

impl fmt::Debug for AccessControlSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessControlSettings")
            .field("preformat_error", &self.preformat_error.is_some())
            .field("format_error", &self.format_error.is_some())
            .finish()
    }
}

/// Declarative access-control configuration
///
/// ```toml
/// default_message = "Access denied"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessControlConfig {
    /// Message of the default denial when a predicate gives no reason
    pub default_message: String,
}

impl Default for AccessControlConfig {
    fn default() -> Self {
        Self {
            default_message: UnauthorizedError::DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl AccessControlConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_message.trim().is_empty() {
            warn!("Rejecting access-control config with a blank default message");
            return Err(AccessError::InvalidSettings(
                "default_message cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(document).map_err(|e| AccessError::InvalidSettings(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read access config: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse access config: {}", path.display()))
    }
}

/// Resolved hooks of a leaf policy
#[derive(Clone)]
pub(crate) struct ErrorHooks {
    preformat: PreformatFn,
    format: FormatFn,
}

impl ErrorHooks {
    pub(crate) fn resolve(settings: &AccessControlSettings, default_message: &str) -> Self {
        let preformat = match settings.preformat_error() {
            Some(preformat) => Arc::clone(preformat),
            None => default_preformat(default_message),
        };

        let format = match settings.format_error() {
            Some(format) => Arc::clone(format),
            None => Arc::new(|denial: Denial| denial) as FormatFn,
        };

        Self { preformat, format }
    }

    pub(crate) fn preformat(&self, message: Option<&str>) -> Denial {
        (self.preformat)(message)
    }

    /// Turn a raw outcome into `None` (allow) or a formatted denial
    pub(crate) fn normalize(&self, outcome: Outcome) -> Option<Denial> {
        let denial = match outcome {
            Outcome::Bool(true) => return None,
            Outcome::Error(denial) => denial,
            Outcome::Result(result) => result.into_error()?,
            Outcome::Message(message) => self.preformat(Some(&message)),
            Outcome::Bool(false) => self.preformat(None),
        };

        Some((self.format)(denial))
    }
}

impl Default for ErrorHooks {
    fn default() -> Self {
        Self::resolve(
            &AccessControlSettings::default(),
            UnauthorizedError::DEFAULT_MESSAGE,
        )
    }
}

impl fmt::Debug for ErrorHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHooks").finish_non_exhaustive()
    }
}

fn default_preformat(default_message: &str) -> PreformatFn {
    let default_message = default_message.to_string();

    Arc::new(move |message: Option<&str>| {
        Denial::new(UnauthorizedError::new(
            message.unwrap_or(default_message.as_str()),
        ))
    })
}
