//! Leaf predicates
//!
//! A predicate is the decision logic inside a leaf policy. It receives the
//! evaluation arguments and yields a raw [`Outcome`], which the leaf then
//! normalizes into a [`PolicyResult`](crate::PolicyResult).

use crate::result::Outcome;
use futures::future::{self, BoxFuture, FutureExt};

/// Decision logic of a leaf policy
///
/// Implement it directly for predicates that carry their own state; closures
/// go through [`SyncFn`] and [`AsyncFn`].
///
/// # Example
///
/// ```
/// use futures::future::{BoxFuture, FutureExt};
/// use warden_access::{Outcome, Predicate};
///
/// struct MinimumAge(u32);
///
/// impl Predicate<u32> for MinimumAge {
///     fn evaluate<'a>(&'a self, age: &'a u32) -> BoxFuture<'a, Outcome> {
///         let outcome = if *age >= self.0 {
///             Outcome::Bool(true)
///         } else {
///             Outcome::Message(format!("must be at least {}", self.0))
///         };
///         futures::future::ready(outcome).boxed()
///     }
/// }
/// ```
pub trait Predicate<A: ?Sized>: Send + Sync {
    fn evaluate<'a>(&'a self, args: &'a A) -> BoxFuture<'a, Outcome>;
}

/// Synchronous closure predicate
pub struct SyncFn<F>(pub F);

impl<A, F, R> Predicate<A> for SyncFn<F>
where
    A: ?Sized,
    F: Fn(&A) -> R + Send + Sync,
    R: Into<Outcome>,
{
    fn evaluate<'a>(&'a self, args: &'a A) -> BoxFuture<'a, Outcome> {
        future::ready((self.0)(args).into()).boxed()
    }
}

/// Asynchronous closure predicate
///
/// The closure returns a boxed future borrowing the arguments. Build it with
/// [`AsyncFn::new`] so the closure's signature is inferred from the bound:
///
/// ```
/// use futures::future::FutureExt;
/// use warden_access::{AsyncFn, Outcome, Predicate};
///
/// let is_even = AsyncFn::new(|n: &u64| async move { Outcome::from(*n % 2 == 0) }.boxed());
/// assert!(matches!(
///     futures::executor::block_on(is_even.evaluate(&4)),
///     Outcome::Bool(true)
/// ));
/// ```
pub struct AsyncFn<F>(pub F);

impl<F> AsyncFn<F> {
    pub fn new<A>(f: F) -> Self
    where
        A: ?Sized,
        F: for<'a> Fn(&'a A) -> BoxFuture<'a, Outcome> + Send + Sync,
    {
        Self(f)
    }
}

impl<A, F> Predicate<A> for AsyncFn<F>
where
    A: ?Sized,
    F: for<'a> Fn(&'a A) -> BoxFuture<'a, Outcome> + Send + Sync,
{
    fn evaluate<'a>(&'a self, args: &'a A) -> BoxFuture<'a, Outcome> {
        (self.0)(args)
    }
}

/// Predicate yielding the same outcome on every call
#[derive(Debug, Clone)]
pub struct Constant(pub Outcome);

impl<A: ?Sized> Predicate<A> for Constant {
    fn evaluate<'a>(&'a self, _args: &'a A) -> BoxFuture<'a, Outcome> {
        future::ready(self.0.clone()).boxed()
    }
}
