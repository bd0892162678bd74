//! Policy tree and evaluation
//!
//! A [`Policy`] is either a leaf wrapping a predicate, or a composite over an
//! ordered, non-empty list of child policies:
//! - `All` returns the first denial, otherwise the last result
//! - `Any` returns the first allowance, otherwise the last denial
//!
//! Children are evaluated one at a time, in order, with the same arguments.
//! Evaluation stops as soon as the outcome is known.

use crate::error::{AccessError, Denial, Result};
use crate::predicate::Predicate;
use crate::result::PolicyResult;
use crate::settings::ErrorHooks;
use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Leaf policy: a predicate plus the hooks that turn its outcome into a denial
pub struct Can<A: ?Sized> {
    predicate: Arc<dyn Predicate<A>>,
    hooks: ErrorHooks,
}

impl<A: ?Sized> Can<A> {
    pub(crate) fn new(predicate: Arc<dyn Predicate<A>>, hooks: ErrorHooks) -> Self {
        Self { predicate, hooks }
    }

    async fn inspect(&self, args: &A) -> PolicyResult {
        let outcome = self.predicate.evaluate(args).await;
        let error = self.hooks.normalize(outcome);

        if let Some(denial) = &error {
            debug!("Policy denied: {}", denial);
        }

        PolicyResult::from_error(error)
    }
}

/// Composable authorization rule over arguments of type `A`
///
/// Cloning is cheap: nodes are shared, so one policy can appear in several
/// trees and be evaluated concurrently.
///
/// # Example
///
/// ```
/// use warden_access::{Policy, SyncFn};
///
/// # tokio_test::block_on(async {
/// let adult: Policy<u32> = Policy::can(SyncFn(|age: &u32| *age >= 18));
/// let senior: Policy<u32> = Policy::can(SyncFn(|age: &u32| *age >= 65));
/// let either = Policy::any(vec![adult, senior])?;
///
/// assert!(either.check(&30).await);
/// assert!(!either.check(&12).await);
/// # Ok::<(), warden_access::AccessError>(())
/// # }).unwrap();
/// ```
pub enum Policy<A: ?Sized> {
    Can(Arc<Can<A>>),
    All(Arc<[Policy<A>]>),
    Any(Arc<[Policy<A>]>),
}

impl<A: ?Sized> Policy<A> {
    /// Leaf with the default hooks
    pub fn can<P>(predicate: P) -> Self
    where
        P: Predicate<A> + 'static,
    {
        Self::leaf(Arc::new(predicate), ErrorHooks::default())
    }

    /// Composite allowing only if every factor allows
    pub fn all(factors: Vec<Policy<A>>) -> Result<Self> {
        if factors.is_empty() {
            return Err(AccessError::EmptyFactors { combinator: "all" });
        }
        Ok(Policy::All(factors.into()))
    }

    /// Composite allowing if any factor allows
    pub fn any(factors: Vec<Policy<A>>) -> Result<Self> {
        if factors.is_empty() {
            return Err(AccessError::EmptyFactors { combinator: "any" });
        }
        Ok(Policy::Any(factors.into()))
    }

    pub(crate) fn leaf(predicate: Arc<dyn Predicate<A>>, hooks: ErrorHooks) -> Self {
        Policy::Can(Arc::new(Can::new(predicate, hooks)))
    }

    /// Child policies of a composite; empty for a leaf
    pub fn factors(&self) -> &[Policy<A>] {
        match self {
            Policy::Can(_) => &[],
            Policy::All(factors) | Policy::Any(factors) => &factors[..],
        }
    }

    /// Whether both handles share the same node
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        match (this, other) {
            (Policy::Can(a), Policy::Can(b)) => Arc::ptr_eq(a, b),
            (Policy::All(a), Policy::All(b)) | (Policy::Any(a), Policy::Any(b)) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl<A: ?Sized + Sync> Policy<A> {
    /// Evaluate the policy
    pub fn inspect<'a>(&'a self, args: &'a A) -> BoxFuture<'a, PolicyResult> {
        async move {
            match self {
                Policy::Can(can) => can.inspect(args).await,
                Policy::All(factors) => {
                    // factors is never empty
                    let mut result = PolicyResult::allow();
                    for (index, factor) in factors.iter().enumerate() {
                        result = factor.inspect(args).await;
                        if result.denied() {
                            debug!("All short-circuited at factor {}", index);
                            return result;
                        }
                    }
                    result
                }
                Policy::Any(factors) => {
                    let mut result = PolicyResult::allow();
                    for (index, factor) in factors.iter().enumerate() {
                        result = factor.inspect(args).await;
                        if result.allowed() {
                            debug!("Any short-circuited at factor {}", index);
                            return result;
                        }
                    }
                    result
                }
            }
        }
        .boxed()
    }

    /// `true` if the policy allows, discarding the denial
    pub async fn check(&self, args: &A) -> bool {
        self.inspect(args).await.allowed()
    }

    /// `Ok(())` if the policy allows, otherwise the denial that decided it
    pub async fn authorize(&self, args: &A) -> std::result::Result<(), Denial> {
        self.inspect(args).await.into_result()
    }
}

impl<A: ?Sized> Clone for Policy<A> {
    fn clone(&self) -> Self {
        match self {
            Policy::Can(can) => Policy::Can(Arc::clone(can)),
            Policy::All(factors) => Policy::All(Arc::clone(factors)),
            Policy::Any(factors) => Policy::Any(Arc::clone(factors)),
        }
    }
}

impl<A: ?Sized> fmt::Debug for Policy<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Can(_) => f.write_str("Can"),
            Policy::All(factors) => f.debug_tuple("All").field(&factors).finish(),
            Policy::Any(factors) => f.debug_tuple("Any").field(&factors).finish(),
        }
    }
}
