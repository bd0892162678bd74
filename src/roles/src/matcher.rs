//! Role matching
//!
//! [`RoleMatcher`] checks required roles against granted roles, counting a
//! required role as held when some granted role implies it.

use crate::authority::RoleAuthority;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Conversion into a list of role names
///
/// A single name becomes a one-element list and `None` becomes an empty one.
/// Empty names are dropped by the matcher, not here.
pub trait IntoRoles {
    fn into_roles(self) -> Vec<String>;
}

impl IntoRoles for &str {
    fn into_roles(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoRoles for String {
    fn into_roles(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoRoles for &String {
    fn into_roles(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<T: AsRef<str>> IntoRoles for &[T] {
    fn into_roles(self) -> Vec<String> {
        self.iter().map(|r| r.as_ref().to_string()).collect()
    }
}

impl<T: AsRef<str>> IntoRoles for Vec<T> {
    fn into_roles(self) -> Vec<String> {
        self.iter().map(|r| r.as_ref().to_string()).collect()
    }
}

impl<T: AsRef<str>> IntoRoles for &Vec<T> {
    fn into_roles(self) -> Vec<String> {
        self.as_slice().into_roles()
    }
}

impl<T: AsRef<str>, const N: usize> IntoRoles for [T; N] {
    fn into_roles(self) -> Vec<String> {
        self.as_slice().into_roles()
    }
}

impl<T: IntoRoles> IntoRoles for Option<T> {
    fn into_roles(self) -> Vec<String> {
        self.map(IntoRoles::into_roles).unwrap_or_default()
    }
}

/// Outcome of [`RoleMatcher::match_roles`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMatch {
    /// At least one required role is reachable
    pub any: bool,
    /// Every required role is reachable, and at least one was required
    pub all: bool,
    /// Required roles found among the reachable ones, in required order
    pub matches: Vec<String>,
    /// Required roles after normalization
    pub required: Vec<String>,
    /// Granted roles after normalization
    pub granted: Vec<String>,
    /// Roles implied by `granted` plus `granted` itself, deduplicated
    pub reachable: Vec<String>,
}

/// Matches required roles against granted roles through a [`RoleAuthority`]
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use warden_roles::{HierarchicalRoleAuthority, RoleHierarchy, RoleMatcher};
///
/// let authority = HierarchicalRoleAuthority::new(
///     &RoleHierarchy::new().role("admin", ["writer"]).role("writer", ["reader"]),
/// )?;
/// let matcher = RoleMatcher::new(Arc::new(authority));
///
/// let result = matcher.match_roles(["reader", "writer"], "admin");
/// assert!(result.all);
/// assert_eq!(result.matches, ["reader", "writer"]);
/// # Ok::<(), warden_roles::RoleError>(())
/// ```
#[derive(Clone)]
pub struct RoleMatcher {
    authority: Arc<dyn RoleAuthority>,
}

impl RoleMatcher {
    pub fn new(authority: Arc<dyn RoleAuthority>) -> Self {
        Self { authority }
    }

    pub fn authority(&self) -> &Arc<dyn RoleAuthority> {
        &self.authority
    }

    /// Roles implied by `granted`, as answered by the authority
    pub fn reachable_roles(&self, granted: impl IntoRoles) -> Vec<String> {
        self.authority.reachable_roles(&granted.into_roles())
    }

    /// Match `required` against `granted`
    ///
    /// Empty role names are ignored on both sides. Granted roles unknown to the
    /// authority still count as held by themselves.
    pub fn match_roles(&self, required: impl IntoRoles, granted: impl IntoRoles) -> RoleMatch {
        let required = normalize(required);
        let granted = normalize(granted);

        let mut reachable: IndexSet<String> = self
            .authority
            .reachable_roles(&granted)
            .into_iter()
            .collect();
        reachable.extend(granted.iter().cloned());

        let matches: Vec<String> = required
            .iter()
            .filter(|r| reachable.contains(*r))
            .cloned()
            .collect();

        let any = !matches.is_empty();
        let all = any && required.iter().all(|r| matches.contains(r));

        debug!(
            "Role match: required={:?} granted={:?} any={} all={}",
            required, granted, any, all
        );

        RoleMatch {
            any,
            all,
            matches,
            required,
            granted,
            reachable: reachable.into_iter().collect(),
        }
    }
}

impl fmt::Debug for RoleMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleMatcher").finish_non_exhaustive()
    }
}

fn normalize(roles: impl IntoRoles) -> Vec<String> {
    let mut roles = roles.into_roles();
    roles.retain(|r| !r.is_empty());
    roles
}
