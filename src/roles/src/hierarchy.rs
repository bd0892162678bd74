//! Role hierarchy representation
//!
//! A hierarchy maps each role to the roles it directly implies. Roles that
//! imply nothing may be left out as keys; they still exist as soon as some
//! other role references them.

use crate::error::{Result, RoleError};
use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ordered `role -> direct children` mapping
///
/// Declaration order is kept: it drives traversal order during compilation
/// and therefore which circular reference is reported first.
///
/// # Example
///
/// ```
/// use warden_roles::RoleHierarchy;
///
/// let hierarchy = RoleHierarchy::new()
///     .role("admin", ["moderator", "writer"])
///     .role("moderator", ["reader"]);
///
/// assert_eq!(hierarchy.len(), 2);
/// assert_eq!(hierarchy.children("admin").unwrap(), ["moderator", "writer"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleHierarchy {
    roles: IndexMap<String, Vec<String>>,
}

impl RoleHierarchy {
    /// Create an empty hierarchy
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the direct children of `role`, replacing any previous declaration
    pub fn role<I, S>(mut self, role: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(role, children);
        self
    }

    /// In-place variant of [`RoleHierarchy::role`]
    pub fn insert<I, S>(&mut self, role: impl Into<String>, children: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles
            .insert(role.into(), children.into_iter().map(Into::into).collect());
    }

    /// Direct children declared for `role`, `None` if it is not a key
    pub fn children(&self, role: &str) -> Option<&[String]> {
        self.roles.get(role).map(Vec::as_slice)
    }

    /// Declared roles in declaration order
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Reject empty role names, both as keys and as children
    pub fn validate(&self) -> Result<()> {
        for (role, children) in &self.roles {
            if role.is_empty() {
                return Err(RoleError::InvalidRole(
                    "Role name cannot be empty".to_string(),
                ));
            }

            if children.iter().any(String::is_empty) {
                return Err(RoleError::InvalidRole(format!(
                    "Role '{}' has an empty child role",
                    role
                )));
            }
        }

        Ok(())
    }

    /// Parse a JSON document such as `{"admin": ["moderator", "writer"]}`
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RoleError::Parse(e.to_string()))
    }

    /// Parse a TOML document such as `admin = ["moderator", "writer"]`
    pub fn from_toml_str(document: &str) -> Result<Self> {
        toml::from_str(document).map_err(|e| RoleError::Parse(e.to_string()))
    }

    /// Load a hierarchy file; `.toml` files are read as TOML, anything else as JSON
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read role hierarchy: {}", path.display()))?;

        let is_toml = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("toml"));

        let hierarchy = if is_toml {
            Self::from_toml_str(&contents)
        } else {
            Self::from_json_str(&contents)
        };

        hierarchy.with_context(|| format!("Failed to parse role hierarchy: {}", path.display()))
    }
}

impl<R, I, S> FromIterator<(R, I)> for RoleHierarchy
where
    R: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (R, I)>>(iter: T) -> Self {
        let mut hierarchy = Self::new();
        for (role, children) in iter {
            hierarchy.insert(role, children);
        }
        hierarchy
    }
}

impl From<IndexMap<String, Vec<String>>> for RoleHierarchy {
    fn from(roles: IndexMap<String, Vec<String>>) -> Self {
        Self { roles }
    }
}
