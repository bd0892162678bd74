//! # Warden Roles
//!
//! Hierarchical role authority for the Warden access-control library.
//!
//! ## Features
//!
//! - **Role hierarchies** declared in code, JSON or TOML
//! - **Closure compilation** of every role into the full set of roles it implies
//! - **Cycle detection** reporting the offending path
//! - **Atomic replacement** of the hierarchy while readers keep working
//! - **Role matching** of required roles against granted roles
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use warden_roles::{HierarchicalRoleAuthority, RoleHierarchy, RoleMatcher};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hierarchy = RoleHierarchy::new()
//!         .role("admin", ["moderator", "writer"])
//!         .role("moderator", ["reader"])
//!         .role("writer", ["reader"]);
//!
//!     let authority = Arc::new(HierarchicalRoleAuthority::new(&hierarchy)?);
//!     let matcher = RoleMatcher::new(authority);
//!
//!     let result = matcher.match_roles(["reader", "billing"], "moderator");
//!     assert!(result.any);
//!     assert!(!result.all);
//!
//!     Ok(())
//! }
//! ```

pub mod authority;
pub mod closure;
pub mod error;
pub mod hierarchy;
pub mod matcher;

pub use authority::{HierarchicalRoleAuthority, RoleAuthority};
pub use closure::HierarchyMapping;
pub use error::{Result, RoleError};
pub use hierarchy::RoleHierarchy;
pub use matcher::{IntoRoles, RoleMatch, RoleMatcher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
