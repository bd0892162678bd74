//! Closure table compilation for role hierarchies
//!
//! Expands a [`RoleHierarchy`] into a [`HierarchyMapping`] where every role
//! maps to itself followed by every role it implies, directly or transitively.
//!
//! # Algorithm
//!
//! Depth-first traversal from each declared role, in declaration order, while
//! tracking the current path:
//! 1. A role visited for the first time gets the entry `[role]`
//! 2. A role that is not declared implies nothing else
//! 3. A role already on the path is a circular reference
//! 4. Otherwise the entry becomes `[role, children...]` followed by the
//!    closure of each child, appended in order and deduplicated
//!
//! Completed roles are memoized. A completed role cannot lie on a cycle, so
//! skipping it never hides one.

use crate::error::{Result, RoleError};
use crate::hierarchy::RoleHierarchy;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// Compiled `role -> implied roles` table
///
/// Every role appearing in the hierarchy, as a key or as a child, has an
/// entry. The entry starts with the role itself and lists each implied role
/// once, in first-discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HierarchyMapping {
    entries: IndexMap<String, Vec<String>>,
}

impl HierarchyMapping {
    /// Compile a hierarchy into its closure table
    ///
    /// # Errors
    ///
    /// - [`RoleError::InvalidRole`] if a role name is empty
    /// - [`RoleError::CircularReference`] for the first cycle met during traversal
    pub fn compile(hierarchy: &RoleHierarchy) -> Result<Self> {
        hierarchy.validate()?;

        let mut compiler = Compiler {
            hierarchy,
            entries: IndexMap::new(),
            resolved: HashSet::new(),
        };

        for role in hierarchy.roles() {
            let mut path = Vec::new();
            compiler.traverse(role, &mut path)?;
        }

        Ok(Self {
            entries: compiler.entries,
        })
    }

    /// Implied roles of `role`, itself included
    pub fn get(&self, role: &str) -> Option<&[String]> {
        self.entries.get(role).map(Vec::as_slice)
    }

    pub fn contains(&self, role: &str) -> bool {
        self.entries.contains_key(role)
    }

    /// Known roles in first-discovery order
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(role, implied)| (role.as_str(), implied.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Compiler<'h> {
    hierarchy: &'h RoleHierarchy,
    entries: IndexMap<String, Vec<String>>,
    resolved: HashSet<String>,
}

impl Compiler<'_> {
    /// Returns the roles `role` contributes to its parent beyond itself
    fn traverse(&mut self, role: &str, path: &mut Vec<String>) -> Result<Vec<String>> {
        if !self.entries.contains_key(role) {
            self.entries.insert(role.to_string(), vec![role.to_string()]);
        }

        let hierarchy = self.hierarchy;
        let Some(children) = hierarchy.children(role) else {
            return Ok(Vec::new());
        };

        if path.iter().any(|r| r == role) {
            let mut cycle = path.clone();
            cycle.push(role.to_string());

            return Err(RoleError::CircularReference {
                role: role.to_string(),
                path: cycle,
            });
        }

        if self.resolved.contains(role) {
            return Ok(self.entries.get(role).cloned().unwrap_or_default());
        }

        let mut implied = vec![role.to_string()];
        for child in children {
            if !implied.contains(child) {
                implied.push(child.clone());
            }
        }

        path.push(role.to_string());
        for child in children {
            for descendant in self.traverse(child, path)? {
                if !implied.contains(&descendant) {
                    implied.push(descendant);
                }
            }
        }
        path.pop();

        self.entries.insert(role.to_string(), implied.clone());
        self.resolved.insert(role.to_string());

        Ok(implied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hierarchy() {
        let mapping = HierarchyMapping::compile(&RoleHierarchy::new()).unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_leaf_roles_get_entries() {
        let mapping =
            HierarchyMapping::compile(&RoleHierarchy::new().role("a", ["b", "c"])).unwrap();

        assert_eq!(mapping.get("a").unwrap(), ["a", "b", "c"]);
        assert_eq!(mapping.get("b").unwrap(), ["b"]);
        assert_eq!(mapping.get("c").unwrap(), ["c"]);
        assert!(mapping.get("d").is_none());
    }

    #[test]
    fn test_diamond_deduplicates() {
        let mapping = HierarchyMapping::compile(
            &RoleHierarchy::new()
                .role("1", ["2", "3"])
                .role("2", ["4"])
                .role("3", ["4"]),
        )
        .unwrap();

        let implied = mapping.get("1").unwrap();
        assert_eq!(implied, ["1", "2", "3", "4"]);
        assert_eq!(implied.iter().filter(|r| *r == "4").count(), 1);
    }

    #[test]
    fn test_duplicate_children_listed_once() {
        let mapping =
            HierarchyMapping::compile(&RoleHierarchy::new().role("a", ["b", "b", "c"])).unwrap();
        assert_eq!(mapping.get("a").unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn test_discovery_order_of_entries() {
        let mapping = HierarchyMapping::compile(
            &RoleHierarchy::new()
                .role("1", ["2", "3"])
                .role("2", ["4"])
                .role("3", ["4"]),
        )
        .unwrap();

        let roles: Vec<&str> = mapping.roles().collect();
        assert_eq!(roles, vec!["1", "2", "4", "3"]);
    }

    #[test]
    fn test_self_reference() {
        let err =
            HierarchyMapping::compile(&RoleHierarchy::new().role("1", ["1", "2"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Circular reference error: role [1] is backreferenced in path [1] > [1]"
        );
    }

    #[test]
    fn test_memoized_role_reused_without_false_cycle() {
        // "b" is completed while traversing "a" and reached again from "c"
        let mapping = HierarchyMapping::compile(
            &RoleHierarchy::new()
                .role("a", ["b"])
                .role("b", ["x"])
                .role("c", ["b", "a"]),
        )
        .unwrap();

        assert_eq!(mapping.get("c").unwrap(), ["c", "b", "a", "x"]);
    }

    #[test]
    fn test_invalid_role_name() {
        let err = HierarchyMapping::compile(&RoleHierarchy::new().role("", ["a"])).unwrap_err();
        assert!(matches!(err, RoleError::InvalidRole(_)));
    }
}
