//! Policy factory
//!
//! [`AccessControl`] builds policies bound to one set of error hooks. Policies
//! built by different instances compose freely; each leaf keeps applying the
//! hooks of the instance that built it.

use crate::error::{Denial, Result, UnauthorizedError};
use crate::policy::Policy;
use crate::predicate::{AsyncFn, Constant, Predicate, SyncFn};
use crate::result::{Outcome, PolicyResult};
use crate::settings::{AccessControlConfig, AccessControlSettings, ErrorHooks};
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Anything accepted where a policy is expected in [`AccessControl::all`] and
/// [`AccessControl::any`]
///
/// Policies are used as they are, predicates become leaves bound to the
/// factory's hooks, and plain values become constant leaves.
pub enum Factor<A: ?Sized> {
    Policy(Policy<A>),
    Predicate(Arc<dyn Predicate<A>>),
    Value(Outcome),
}

impl<A: ?Sized> Factor<A> {
    pub fn from_fn<F, R>(f: F) -> Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        Factor::Predicate(Arc::new(SyncFn(f)))
    }

    pub fn from_async_fn<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a A) -> BoxFuture<'a, Outcome> + Send + Sync + 'static,
    {
        Factor::Predicate(Arc::new(AsyncFn(f)))
    }

    pub fn from_predicate<P>(predicate: P) -> Self
    where
        P: Predicate<A> + 'static,
    {
        Factor::Predicate(Arc::new(predicate))
    }
}

impl<A: ?Sized> From<Policy<A>> for Factor<A> {
    fn from(policy: Policy<A>) -> Self {
        Factor::Policy(policy)
    }
}

impl<A: ?Sized> From<&Policy<A>> for Factor<A> {
    fn from(policy: &Policy<A>) -> Self {
        Factor::Policy(policy.clone())
    }
}

macro_rules! value_factor {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<A: ?Sized> From<$ty> for Factor<A> {
                fn from(value: $ty) -> Self {
                    Factor::Value(value.into())
                }
            }
        )*
    };
}

value_factor!(
    bool,
    &str,
    String,
    Denial,
    UnauthorizedError,
    PolicyResult,
    Outcome,
);

/// Reason given to [`AccessControl::deny_with`]
#[derive(Debug, Clone)]
pub enum DenyReason {
    /// Passed to the factory's `preformat_error` hook
    Message(String),
    /// Used verbatim
    Error(Denial),
}

impl From<&str> for DenyReason {
    fn from(message: &str) -> Self {
        DenyReason::Message(message.to_string())
    }
}

impl From<String> for DenyReason {
    fn from(message: String) -> Self {
        DenyReason::Message(message)
    }
}

impl From<Denial> for DenyReason {
    fn from(denial: Denial) -> Self {
        DenyReason::Error(denial)
    }
}

impl From<UnauthorizedError> for DenyReason {
    fn from(error: UnauthorizedError) -> Self {
        DenyReason::Error(error.into())
    }
}

/// Policy factory bound to a set of error hooks
///
/// # Example
///
/// ```
/// use warden_access::AccessControl;
///
/// struct Request {
///     user: Option<String>,
/// }
///
/// # tokio_test::block_on(async {
/// let access = AccessControl::<Request>::new();
///
/// let signed_in = access.can(|req: &Request| req.user.is_some());
/// let policy = access.any([access.deny_with("no"), signed_in])?;
///
/// assert!(policy.check(&Request { user: Some("ada".into()) }).await);
///
/// let denial = policy.authorize(&Request { user: None }).await.unwrap_err();
/// assert_eq!(denial.to_string(), "Unauthorized");
/// # Ok::<(), warden_access::AccessError>(())
/// # }).unwrap();
/// ```
pub struct AccessControl<A: ?Sized> {
    settings: AccessControlSettings,
    default_message: String,
    hooks: ErrorHooks,
    allow: Policy<A>,
    deny: Policy<A>,
}

impl<A: ?Sized> AccessControl<A> {
    /// Factory with the default hooks
    pub fn new() -> Self {
        Self::with_settings(AccessControlSettings::default())
    }

    pub fn with_settings(settings: AccessControlSettings) -> Self {
        Self::build(settings, UnauthorizedError::DEFAULT_MESSAGE.to_string())
    }

    /// Factory using the configured default message
    pub fn with_config(config: &AccessControlConfig) -> Result<Self> {
        Self::with_config_and_settings(config, AccessControlSettings::default())
    }

    pub fn with_config_and_settings(
        config: &AccessControlConfig,
        settings: AccessControlSettings,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(settings, config.default_message.clone()))
    }

    fn build(settings: AccessControlSettings, default_message: String) -> Self {
        let hooks = ErrorHooks::resolve(&settings, &default_message);

        let allow = Policy::leaf(Arc::new(Constant(Outcome::Bool(true))), hooks.clone());
        let deny = Policy::leaf(Arc::new(Constant(Outcome::Bool(false))), hooks.clone());

        info!(
            "AccessControl initialized with preformat_error={}, format_error={}",
            settings.preformat_error().is_some(),
            settings.format_error().is_some()
        );

        Self {
            settings,
            default_message,
            hooks,
            allow,
            deny,
        }
    }

    pub fn settings(&self) -> &AccessControlSettings {
        &self.settings
    }

    pub fn default_message(&self) -> &str {
        &self.default_message
    }

    /// Build a denial through this factory's `preformat_error` hook
    pub fn preformat_error(&self, message: Option<&str>) -> Denial {
        self.hooks.preformat(message)
    }

    /// Leaf evaluating a synchronous closure
    pub fn can<F, R>(&self, f: F) -> Policy<A>
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        self.predicate(SyncFn(f))
    }

    /// Leaf evaluating an asynchronous closure
    pub fn can_async<F>(&self, f: F) -> Policy<A>
    where
        F: for<'a> Fn(&'a A) -> BoxFuture<'a, Outcome> + Send + Sync + 'static,
    {
        self.predicate(AsyncFn(f))
    }

    /// Leaf whose hooks are this factory's, overridden by `settings`
    pub fn can_with<F, R>(&self, f: F, settings: &AccessControlSettings) -> Policy<A>
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        let hooks = ErrorHooks::resolve(&self.settings.merge(settings), &self.default_message);
        Policy::leaf(Arc::new(SyncFn(f)), hooks)
    }

    /// Leaf evaluating any [`Predicate`]
    pub fn predicate<P>(&self, predicate: P) -> Policy<A>
    where
        P: Predicate<A> + 'static,
    {
        Policy::leaf(Arc::new(predicate), self.hooks.clone())
    }

    /// Turn a factor into a policy
    pub fn factor(&self, factor: impl Into<Factor<A>>) -> Policy<A> {
        match factor.into() {
            Factor::Policy(policy) => policy,
            Factor::Predicate(predicate) => Policy::leaf(predicate, self.hooks.clone()),
            Factor::Value(outcome) => self.predicate(Constant(outcome)),
        }
    }

    /// Allows only if every factor allows
    ///
    /// # Errors
    ///
    /// [`AccessError::EmptyFactors`](crate::AccessError::EmptyFactors) when
    /// `factors` is empty.
    pub fn all<I>(&self, factors: I) -> Result<Policy<A>>
    where
        I: IntoIterator,
        I::Item: Into<Factor<A>>,
    {
        Policy::all(factors.into_iter().map(|f| self.factor(f)).collect())
    }

    /// Allows if any factor allows
    ///
    /// # Errors
    ///
    /// [`AccessError::EmptyFactors`](crate::AccessError::EmptyFactors) when
    /// `factors` is empty.
    pub fn any<I>(&self, factors: I) -> Result<Policy<A>>
    where
        I: IntoIterator,
        I::Item: Into<Factor<A>>,
    {
        Policy::any(factors.into_iter().map(|f| self.factor(f)).collect())
    }

    /// Shared leaf that always allows
    pub fn allow(&self) -> Policy<A> {
        self.allow.clone()
    }

    /// Shared leaf that always denies with the default denial
    pub fn deny(&self) -> Policy<A> {
        self.deny.clone()
    }

    /// Leaf that always denies for `reason`
    pub fn deny_with(&self, reason: impl Into<DenyReason>) -> Policy<A> {
        let outcome = match reason.into() {
            DenyReason::Message(message) => Outcome::Message(message),
            DenyReason::Error(denial) => Outcome::Error(denial),
        };
        self.predicate(Constant(outcome))
    }
}

impl<A: ?Sized> Default for AccessControl<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> Clone for AccessControl<A> {
    fn clone(&self) -> Self {
        Self {
            settings: self.settings.clone(),
            default_message: self.default_message.clone(),
            hooks: self.hooks.clone(),
            allow: self.allow.clone(),
            deny: self.deny.clone(),
        }
    }
}

impl<A: ?Sized> fmt::Debug for AccessControl<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessControl")
            .field("settings", &self.settings)
            .field("default_message", &self.default_message)
            .finish_non_exhaustive()
    }
}
