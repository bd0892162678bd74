//! Role-gated policies
//!
//! Leaves that allow according to a [`RoleMatcher`], taking the granted roles
//! from the evaluation arguments.

use crate::control::AccessControl;
use crate::policy::Policy;
use crate::predicate::Predicate;
use crate::result::Outcome;
use futures::future::{self, BoxFuture, FutureExt};
use warden_roles::{IntoRoles, RoleMatch, RoleMatcher};

/// How many of the required roles must be reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    /// At least one
    Any,
    /// Every one
    All,
}

impl RoleRequirement {
    fn satisfied_by(self, result: &RoleMatch) -> bool {
        match self {
            RoleRequirement::Any => result.any,
            RoleRequirement::All => result.all,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            RoleRequirement::Any => "one of",
            RoleRequirement::All => "all of",
        }
    }
}

/// Predicate matching the roles granted in the arguments against required roles
pub struct RolePredicate<G> {
    matcher: RoleMatcher,
    required: Vec<String>,
    requirement: RoleRequirement,
    granted_of: G,
}

impl<G> RolePredicate<G> {
    pub fn new(
        matcher: RoleMatcher,
        required: impl IntoRoles,
        requirement: RoleRequirement,
        granted_of: G,
    ) -> Self {
        Self {
            matcher,
            required: required.into_roles(),
            requirement,
            granted_of,
        }
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }
}

impl<A, G> Predicate<A> for RolePredicate<G>
where
    A: ?Sized,
    G: Fn(&A) -> Vec<String> + Send + Sync,
{
    fn evaluate<'a>(&'a self, args: &'a A) -> BoxFuture<'a, Outcome> {
        let granted = (self.granted_of)(args);
        let result = self.matcher.match_roles(self.required.as_slice(), granted);

        let outcome = if self.requirement.satisfied_by(&result) {
            Outcome::Bool(true)
        } else {
            Outcome::Message(format!(
                "must have {} the following roles: {} - but has {}",
                self.requirement.describe(),
                quoted(&result.required),
                quoted(&result.reachable)
            ))
        };

        future::ready(outcome).boxed()
    }
}

fn quoted(roles: &[String]) -> String {
    roles
        .iter()
        .map(|r| format!("\"{}\"", r))
        .collect::<Vec<_>>()
        .join(", ")
}

impl<A: ?Sized> AccessControl<A> {
    /// Leaf allowing when at least one required role is reachable from the
    /// roles `granted_of` extracts from the arguments
    pub fn has_roles<G>(
        &self,
        matcher: &RoleMatcher,
        required: impl IntoRoles,
        granted_of: G,
    ) -> Policy<A>
    where
        G: Fn(&A) -> Vec<String> + Send + Sync + 'static,
    {
        self.predicate(RolePredicate::new(
            matcher.clone(),
            required,
            RoleRequirement::Any,
            granted_of,
        ))
    }

    /// Leaf allowing when every required role is reachable
    pub fn has_all_roles<G>(
        &self,
        matcher: &RoleMatcher,
        required: impl IntoRoles,
        granted_of: G,
    ) -> Policy<A>
    where
        G: Fn(&A) -> Vec<String> + Send + Sync + 'static,
    {
        self.predicate(RolePredicate::new(
            matcher.clone(),
            required,
            RoleRequirement::All,
            granted_of,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use warden_roles::{HierarchicalRoleAuthority, RoleHierarchy};

    struct User {
        roles: Vec<String>,
    }

    impl User {
        fn with_roles(roles: &[&str]) -> Self {
            Self {
                roles: roles.iter().map(|r| r.to_string()).collect(),
            }
        }
    }

    fn matcher() -> RoleMatcher {
        let hierarchy = RoleHierarchy::new()
            .role("admin", ["editor"])
            .role("editor", ["viewer"]);
        RoleMatcher::new(Arc::new(HierarchicalRoleAuthority::new(&hierarchy).unwrap()))
    }

    #[tokio::test]
    async fn test_has_roles_through_hierarchy() {
        let access = AccessControl::<User>::new();
        let policy = access.has_roles(&matcher(), ["viewer", "billing"], |u: &User| {
            u.roles.clone()
        });

        assert!(policy.check(&User::with_roles(&["admin"])).await);
        assert!(policy.check(&User::with_roles(&["billing"])).await);
        assert!(!policy.check(&User::with_roles(&["guest"])).await);
    }

    #[tokio::test]
    async fn test_has_roles_denial_message() {
        let access = AccessControl::<User>::new();
        let policy = access.has_roles(&matcher(), ["admin", "billing"], |u: &User| {
            u.roles.clone()
        });

        let denial = policy
            .authorize(&User::with_roles(&["editor"]))
            .await
            .unwrap_err();
        assert_eq!(
            denial.to_string(),
            r#"must have one of the following roles: "admin", "billing" - but has "editor", "viewer""#
        );
    }

    #[tokio::test]
    async fn test_has_all_roles() {
        let access = AccessControl::<User>::new();
        let policy = access.has_all_roles(&matcher(), ["viewer", "editor"], |u: &User| {
            u.roles.clone()
        });

        assert!(policy.check(&User::with_roles(&["admin"])).await);

        let denial = policy
            .authorize(&User::with_roles(&["viewer"]))
            .await
            .unwrap_err();
        assert_eq!(
            denial.to_string(),
            r#"must have all of the following roles: "viewer", "editor" - but has "viewer""#
        );
    }
}
