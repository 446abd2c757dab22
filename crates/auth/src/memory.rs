//! In-memory store implementations for tests and dev wiring.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use aladil_core::{ProjectKey, RoleId, UserId};

use crate::permission::Permission;
use crate::session::{Session, SessionProvider};
use crate::store::{MembershipGrant, PermissionStore, StoreError, UserGrants};

#[derive(Debug, Clone)]
struct UserRecord {
    is_super_admin: bool,
}

#[derive(Debug, Clone)]
struct RoleRecord {
    project: ProjectKey,
    permissions: Vec<Permission>,
}

#[derive(Debug, Clone)]
struct MembershipRecord {
    user_id: UserId,
    project: ProjectKey,
    role_id: RoleId,
    is_active: bool,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, UserRecord>,
    roles: HashMap<RoleId, RoleRecord>,
    memberships: Vec<MembershipRecord>,
}

/// Mutex-guarded in-memory [`PermissionStore`].
///
/// The mutators mirror the writes the admin surface performs, so tests can
/// exercise "data changed, next resolution reflects it" without a database.
#[derive(Debug, Default)]
pub struct MemoryPermissionStore {
    inner: Mutex<Inner>,
}

impl MemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user_id: UserId, is_super_admin: bool) {
        self.inner
            .lock()
            .unwrap()
            .users
            .insert(user_id, UserRecord { is_super_admin });
    }

    pub fn remove_user(&self, user_id: UserId) {
        let mut inner = self.inner.lock().unwrap();
        inner.users.remove(&user_id);
        inner.memberships.retain(|m| m.user_id != user_id);
    }

    pub fn set_super_admin(&self, user_id: UserId, is_super_admin: bool) {
        if let Some(user) = self.inner.lock().unwrap().users.get_mut(&user_id) {
            user.is_super_admin = is_super_admin;
        }
    }

    pub fn add_role(
        &self,
        role_id: RoleId,
        project: ProjectKey,
        permissions: impl IntoIterator<Item = Permission>,
    ) {
        self.inner.lock().unwrap().roles.insert(
            role_id,
            RoleRecord {
                project,
                permissions: permissions.into_iter().collect(),
            },
        );
    }

    pub fn set_role_permissions(
        &self,
        role_id: RoleId,
        permissions: impl IntoIterator<Item = Permission>,
    ) {
        if let Some(role) = self.inner.lock().unwrap().roles.get_mut(&role_id) {
            role.permissions = permissions.into_iter().collect();
        }
    }

    /// Assign (or replace) the user's single role within a project.
    pub fn assign_membership(&self, user_id: UserId, project: ProjectKey, role_id: RoleId) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .memberships
            .retain(|m| !(m.user_id == user_id && m.project == project));
        inner.memberships.push(MembershipRecord {
            user_id,
            project,
            role_id,
            is_active: true,
        });
    }

    pub fn set_membership_active(&self, user_id: UserId, project: ProjectKey, is_active: bool) {
        let mut inner = self.inner.lock().unwrap();
        for m in &mut inner.memberships {
            if m.user_id == user_id && m.project == project {
                m.is_active = is_active;
            }
        }
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn load_grants(
        &self,
        user_id: UserId,
        project: ProjectKey,
    ) -> Result<Option<UserGrants>, StoreError> {
        let inner = self.inner.lock().unwrap();

        let Some(user) = inner.users.get(&user_id) else {
            return Ok(None);
        };

        if user.is_super_admin {
            return Ok(Some(UserGrants {
                is_super_admin: true,
                memberships: Vec::new(),
            }));
        }

        let memberships = inner
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id && m.project == project)
            .filter_map(|m| {
                let role = inner.roles.get(&m.role_id)?;
                // Roles are project-scoped; a mismatched row grants nothing.
                if role.project != project {
                    return None;
                }
                Some(MembershipGrant {
                    is_active: m.is_active,
                    permissions: role.permissions.clone(),
                })
            })
            .collect();

        Ok(Some(UserGrants {
            is_super_admin: false,
            memberships,
        }))
    }

    async fn is_super_admin(&self, user_id: UserId) -> Result<Option<bool>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .get(&user_id)
            .map(|u| u.is_super_admin))
    }
}

/// In-memory [`SessionProvider`] keyed by token string.
#[derive(Debug, Default)]
pub struct MemorySessions {
    inner: Mutex<HashMap<String, Session>>,
}

impl MemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: impl Into<String>, session: Session) {
        self.inner.lock().unwrap().insert(token.into(), session);
    }

    pub fn revoke(&self, token: &str) {
        self.inner.lock().unwrap().remove(token);
    }
}

#[async_trait]
impl SessionProvider for MemorySessions {
    async fn resolve(&self, token: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.inner.lock().unwrap().get(token).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn membership_replacement_keeps_one_role_per_project() {
        let store = MemoryPermissionStore::new();
        let user = UserId::new();
        store.add_user(user, false);

        let viewer = RoleId::new();
        let editor = RoleId::new();
        store.add_role(viewer, ProjectKey::News, [Permission::from_static("news.read")]);
        store.add_role(
            editor,
            ProjectKey::News,
            [
                Permission::from_static("news.read"),
                Permission::from_static("news.update"),
            ],
        );

        store.assign_membership(user, ProjectKey::News, viewer);
        store.assign_membership(user, ProjectKey::News, editor);

        let grants = store
            .load_grants(user, ProjectKey::News)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(grants.memberships.len(), 1);
        assert_eq!(grants.memberships[0].permissions.len(), 2);
    }

    #[tokio::test]
    async fn revoked_session_stops_resolving() {
        let sessions = MemorySessions::new();
        let session = Session {
            user_id: UserId::new(),
            email: "x@aladil.org".to_string(),
            display_name: "X".to_string(),
        };
        sessions.insert("tok", session.clone());
        assert_eq!(sessions.resolve("tok").await.unwrap(), Some(session));

        sessions.revoke("tok");
        assert_eq!(sessions.resolve("tok").await.unwrap(), None);
    }
}
