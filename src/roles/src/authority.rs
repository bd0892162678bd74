//! Role authorities
//!
//! A role authority answers "which roles does this set of granted roles
//! imply". [`HierarchicalRoleAuthority`] answers it from a compiled
//! [`HierarchyMapping`].

use crate::closure::HierarchyMapping;
use crate::error::Result;
use crate::hierarchy::RoleHierarchy;
use indexmap::IndexSet;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// Source of implied roles consulted by [`RoleMatcher`](crate::RoleMatcher)
pub trait RoleAuthority: Send + Sync {
    /// Roles reachable from `granted`, deduplicated in first-seen order
    ///
    /// Roles unknown to the authority contribute nothing.
    fn reachable_roles(&self, granted: &[String]) -> Vec<String>;
}

/// Role authority backed by a compiled role hierarchy
///
/// The mapping is swapped as a whole by [`set_hierarchy`](Self::set_hierarchy);
/// readers always see either the old or the new table, never a mix.
///
/// # Example
///
/// ```
/// use warden_roles::{HierarchicalRoleAuthority, RoleAuthority, RoleHierarchy};
///
/// let authority = HierarchicalRoleAuthority::new(
///     &RoleHierarchy::new()
///         .role("admin", ["moderator", "writer"])
///         .role("moderator", ["reader"]),
/// )?;
///
/// let reachable = authority.reachable_roles(&["admin".to_string()]);
/// assert_eq!(reachable, ["admin", "moderator", "writer", "reader"]);
/// # Ok::<(), warden_roles::RoleError>(())
/// ```
#[derive(Debug)]
pub struct HierarchicalRoleAuthority {
    mapping: RwLock<Arc<HierarchyMapping>>,
}

impl HierarchicalRoleAuthority {
    /// Compile `hierarchy` into a new authority
    ///
    /// # Errors
    ///
    /// Fails on circular references and empty role names.
    pub fn new(hierarchy: &RoleHierarchy) -> Result<Self> {
        let mapping = Self::compile(hierarchy)?;

        Ok(Self {
            mapping: RwLock::new(Arc::new(mapping)),
        })
    }

    /// Replace the hierarchy
    ///
    /// The new table is built completely before it replaces the old one. On
    /// error the previous hierarchy stays in force.
    pub fn set_hierarchy(&self, hierarchy: &RoleHierarchy) -> Result<()> {
        let mapping = Self::compile(hierarchy)?;
        *self.mapping.write() = Arc::new(mapping);
        Ok(())
    }

    /// Snapshot of the current closure table
    pub fn mapping(&self) -> Arc<HierarchyMapping> {
        Arc::clone(&self.mapping.read())
    }

    /// Implied roles of a single role, itself included; empty if unknown
    pub fn lookup(&self, role: &str) -> Vec<String> {
        self.mapping
            .read()
            .get(role)
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    fn compile(hierarchy: &RoleHierarchy) -> Result<HierarchyMapping> {
        match HierarchyMapping::compile(hierarchy) {
            Ok(mapping) => {
                info!(
                    "Role hierarchy compiled: {} declared roles, {} known roles",
                    hierarchy.len(),
                    mapping.len()
                );
                Ok(mapping)
            }
            Err(err) => {
                warn!("Role hierarchy rejected: {}", err);
                Err(err)
            }
        }
    }
}

impl RoleAuthority for HierarchicalRoleAuthority {
    fn reachable_roles(&self, granted: &[String]) -> Vec<String> {
        let mapping = self.mapping();
        let mut reachable = IndexSet::new();

        for role in granted {
            if let Some(implied) = mapping.get(role) {
                reachable.extend(implied.iter().cloned());
            }
        }

        reachable.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RoleError;

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|r| r.to_string()).collect()
    }

    fn authority() -> HierarchicalRoleAuthority {
        HierarchicalRoleAuthority::new(
            &RoleHierarchy::new()
                .role("a", ["b", "c"])
                .role("b", ["d"])
                .role("c", ["d"])
                .role("d", ["e"]),
        )
        .unwrap()
    }

    #[test]
    fn test_lookup() {
        let authority = authority();

        assert_eq!(authority.lookup("a"), roles(&["a", "b", "c", "d", "e"]));
        assert_eq!(authority.lookup("e"), roles(&["e"]));
        assert!(authority.lookup("unknown").is_empty());
    }

    #[test]
    fn test_reachable_roles_union() {
        let authority = authority();

        assert_eq!(
            authority.reachable_roles(&roles(&["a", "e"])),
            roles(&["a", "b", "c", "d", "e"])
        );
        assert_eq!(
            authority.reachable_roles(&roles(&["c", "b"])),
            roles(&["c", "d", "e", "b"])
        );
        assert_eq!(
            authority.reachable_roles(&roles(&["z", "p", "b"])),
            roles(&["b", "d", "e"])
        );
        assert!(authority.reachable_roles(&[]).is_empty());
    }

    #[test]
    fn test_set_hierarchy_replaces_mapping() {
        let authority =
            HierarchicalRoleAuthority::new(&RoleHierarchy::new().role("a", ["b", "c"])).unwrap();
        let before = authority.mapping();

        authority
            .set_hierarchy(&RoleHierarchy::new().role("k", ["y", "z"]))
            .unwrap();

        let after = authority.mapping();
        assert!(after.get("a").is_none());
        assert_eq!(after.get("k").unwrap(), ["k", "y", "z"]);

        // Snapshots taken earlier are unaffected
        assert_eq!(before.get("a").unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn test_failed_set_hierarchy_keeps_previous_mapping() {
        let authority = authority();

        let err = authority
            .set_hierarchy(&RoleHierarchy::new().role("x", ["y"]).role("y", ["x"]))
            .unwrap_err();

        assert!(matches!(err, RoleError::CircularReference { .. }));
        assert_eq!(authority.lookup("a"), roles(&["a", "b", "c", "d", "e"]));
    }

    #[test]
    fn test_authority_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HierarchicalRoleAuthority>();

        let authority = Arc::new(authority());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let authority = Arc::clone(&authority);
                std::thread::spawn(move || authority.lookup("b"))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), roles(&["b", "d", "e"]));
        }
    }
}
