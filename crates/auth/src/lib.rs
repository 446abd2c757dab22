//! `aladil-auth` — authorization core (permission resolution + access decision).
//!
//! This crate is intentionally decoupled from HTTP and from any concrete
//! storage backend: the API layer supplies a [`PermissionStore`] and a
//! [`SessionProvider`], and everything here is pure policy over the data
//! those traits return.

pub mod access;
pub mod keys;
pub mod memory;
pub mod permission;
pub mod resolver;
pub mod session;
pub mod store;

pub use access::{has_permission, require_permission, AccessError};
pub use memory::{MemoryPermissionStore, MemorySessions};
pub use permission::{Permission, PermissionSet};
pub use resolver::resolve_permissions;
pub use session::{Session, SessionProvider};
pub use store::{MembershipGrant, PermissionStore, StoreError, UserGrants};
