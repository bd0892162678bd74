//! Error types for role hierarchy compilation

use thiserror::Error;

/// Role hierarchy errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    /// A role implies itself, directly or through other roles.
    ///
    /// `path` runs from the traversal root to the repeated occurrence of `role`.
    #[error(
        "Circular reference error: role [{role}] is backreferenced in path {}",
        render_path(.role, .path)
    )]
    CircularReference { role: String, path: Vec<String> },

    /// Invalid role definition
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// Hierarchy document could not be parsed
    #[error("Invalid hierarchy document: {0}")]
    Parse(String),
}

impl RoleError {
    /// Role and path of a circular reference, if this is one
    pub fn cycle(&self) -> Option<(&str, &[String])> {
        match self {
            RoleError::CircularReference { role, path } => Some((role, path)),
            _ => None,
        }
    }
}

/// Renders `a > [b] > c > [b]`, bracketing every occurrence of `role`.
fn render_path(role: &str, path: &[String]) -> String {
    path.iter()
        .map(|r| {
            if r == role {
                format!("[{}]", r)
            } else {
                r.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Result type for role operations
pub type Result<T> = std::result::Result<T, RoleError>;
