//! Authorization
//!
//! - [`permissions`]: typed permission catalogue
//! - [`resolver`]: admin/permission/role resolution over an [`Actor`]
//! - [`guard`]: turn resolver denials into errors

pub mod guard;
pub mod permissions;
pub mod resolver;

pub use guard::{require_admin, require_permission, require_role};
pub use permissions::{Permission, UI_PERMISSIONS, catalog, validate_permission_keys};
pub use resolver::Actor;
