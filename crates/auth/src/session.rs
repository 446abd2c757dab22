//! Session boundary.
//!
//! The transport layer hands us an opaque token (cookie value); a
//! [`SessionProvider`] turns it into an authenticated identity or nothing.
//! Token issuance and cookie mechanics live upstream of this crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use aladil_core::UserId;

use crate::store::StoreError;

/// A resolved session: the authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
}

/// Resolves opaque session tokens.
///
/// Implementations must return `Ok(None)` for unknown, expired, or revoked
/// tokens — and for tokens belonging to deactivated users, so disabling an
/// account cuts off its sessions at the door.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Option<Session>, StoreError>;
}
