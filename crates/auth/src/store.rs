//! The permission-store boundary.
//!
//! The resolver is pure policy; everything it knows about a user comes
//! through [`PermissionStore`]. Implementations exist for Postgres
//! (`aladil-store`) and in-memory ([`crate::memory`], tests and dev wiring).

use async_trait::async_trait;
use thiserror::Error;

use aladil_core::{ProjectKey, UserId};

use crate::permission::Permission;

/// Infrastructure failure in the underlying store.
///
/// Deliberately distinct from the authorization error kinds: a broken
/// database connection is never "forbidden".
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store error in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    #[error("connection pool closed in {0}")]
    PoolClosed(&'static str),
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

/// One membership of a user within the queried project.
///
/// At most one exists per `(user, project)` pair (uniqueness constraint),
/// but the resolver does not rely on that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipGrant {
    /// Soft-disable flag: inactive memberships grant nothing.
    pub is_active: bool,
    /// Permission keys attached to the membership's role.
    pub permissions: Vec<Permission>,
}

/// The authorization-relevant view of a user for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGrants {
    pub is_super_admin: bool,
    /// Memberships in the queried project only. Implementations may leave
    /// this empty for super-admins — the resolver never reads it then.
    pub memberships: Vec<MembershipGrant>,
}

/// Read-only access to users, memberships, roles, and permissions.
///
/// Implementations must:
/// - return `Ok(None)` for unknown users (never an error)
/// - scope memberships to the requested project (no cross-project rows)
/// - reflect current data on every call (no stale caching)
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Load the user's grants within `project`.
    async fn load_grants(
        &self,
        user_id: UserId,
        project: ProjectKey,
    ) -> Result<Option<UserGrants>, StoreError>;

    /// Fresh `is_super_admin` flag, re-read from the store.
    ///
    /// The admin gate calls this per request instead of trusting the
    /// session payload, so revocation takes effect on the next call.
    async fn is_super_admin(&self, user_id: UserId) -> Result<Option<bool>, StoreError>;
}
