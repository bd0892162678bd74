//! # Warden Access
//!
//! Composable, asynchronous authorization policies.
//!
//! ## Features
//!
//! - **Leaf policies** from sync closures, async closures or custom predicates
//! - **Composites** (`all`, `any`) with ordered, short-circuiting evaluation
//! - **Pluggable error hooks** to build and post-process denials
//! - **Cross-factory composition**: each leaf keeps its own hooks
//! - **Role-gated policies** backed by a hierarchical role authority
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use warden_access::AccessControl;
//! use warden_roles::{HierarchicalRoleAuthority, RoleHierarchy, RoleMatcher};
//!
//! struct Request {
//!     user_id: u64,
//!     owner_id: u64,
//!     roles: Vec<String>,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let authority = HierarchicalRoleAuthority::new(
//!         &RoleHierarchy::new().role("admin", ["moderator"]),
//!     )?;
//!     let matcher = RoleMatcher::new(Arc::new(authority));
//!
//!     let access = AccessControl::<Request>::new();
//!     let is_owner = access.can(|req: &Request| req.user_id == req.owner_id);
//!     let is_moderator =
//!         access.has_roles(&matcher, "moderator", |req: &Request| req.roles.clone());
//!     let can_edit = access.any([is_owner, is_moderator])?;
//!
//!     let request = Request { user_id: 1, owner_id: 2, roles: vec!["admin".into()] };
//!     can_edit.authorize(&request).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod control;
pub mod error;
pub mod policy;
pub mod predicate;
pub mod result;
pub mod role_policy;
pub mod settings;

pub use control::{AccessControl, DenyReason, Factor};
pub use error::{AccessError, Denial, Result, UnauthorizedError};
pub use policy::{Can, Policy};
pub use predicate::{AsyncFn, Constant, Predicate, SyncFn};
pub use result::{Outcome, PolicyResult};
pub use role_policy::{RolePredicate, RoleRequirement};
pub use settings::{AccessControlConfig, AccessControlSettings, FormatFn, PreformatFn};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
