//! Permission resolution.
//!
//! Computes the effective permission set for a `(user, project)` pair as a
//! pure function of current store data. No caching, no side effects; the
//! result may change between calls as the underlying data changes.

use std::collections::HashSet;

use aladil_core::{ProjectKey, UserId};

use crate::permission::PermissionSet;
use crate::store::{PermissionStore, StoreError};

/// Resolve the complete permission set a user holds in `project`.
///
/// - Unknown user → the empty set (deleted users simply hold nothing).
/// - Super-admin → [`PermissionSet::Unrestricted`], without touching the
///   role or permission tables.
/// - Otherwise → the union of permission keys over the user's **active**
///   memberships in `project`.
///
/// Only infrastructure failures surface as errors; "no data for this user"
/// is a normal-path outcome.
pub async fn resolve_permissions<S>(
    store: &S,
    user_id: UserId,
    project: ProjectKey,
) -> Result<PermissionSet, StoreError>
where
    S: PermissionStore + ?Sized,
{
    let Some(grants) = store.load_grants(user_id, project).await? else {
        return Ok(PermissionSet::empty());
    };

    if grants.is_super_admin {
        return Ok(PermissionSet::Unrestricted);
    }

    let mut union = HashSet::new();
    for membership in grants.memberships {
        if membership.is_active {
            union.extend(membership.permissions);
        }
    }

    Ok(PermissionSet::Restricted(union))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::news;
    use crate::memory::MemoryPermissionStore;
    use crate::permission::Permission;

    use aladil_core::RoleId;

    #[tokio::test]
    async fn unknown_user_resolves_to_empty_set() {
        let store = MemoryPermissionStore::new();
        let set = resolve_permissions(&store, UserId::new(), ProjectKey::News)
            .await
            .unwrap();
        assert_eq!(set, PermissionSet::empty());
    }

    #[tokio::test]
    async fn super_admin_is_unrestricted_without_memberships() {
        let store = MemoryPermissionStore::new();
        let admin = UserId::new();
        store.add_user(admin, true);

        for project in ProjectKey::all() {
            let set = resolve_permissions(&store, admin, *project).await.unwrap();
            assert!(set.is_unrestricted());
        }
    }

    #[tokio::test]
    async fn union_spans_only_active_memberships_in_the_project() {
        let store = MemoryPermissionStore::new();
        let user = UserId::new();
        store.add_user(user, false);

        let editor = RoleId::new();
        store.add_role(editor, ProjectKey::News, [news::READ, news::UPDATE]);
        store.assign_membership(user, ProjectKey::News, editor);

        let set = resolve_permissions(&store, user, ProjectKey::News)
            .await
            .unwrap();
        assert!(set.allows(&news::READ));
        assert!(set.allows(&news::UPDATE));
        assert!(!set.allows(&news::DELETE));

        // Same user, different project: nothing leaks across.
        let other = resolve_permissions(&store, user, ProjectKey::Meetings)
            .await
            .unwrap();
        assert_eq!(other, PermissionSet::empty());
    }

    #[tokio::test]
    async fn deactivated_membership_grants_nothing() {
        let store = MemoryPermissionStore::new();
        let user = UserId::new();
        store.add_user(user, false);

        let role = RoleId::new();
        store.add_role(role, ProjectKey::Labs, [Permission::from_static("labs.read")]);
        store.assign_membership(user, ProjectKey::Labs, role);

        store.set_membership_active(user, ProjectKey::Labs, false);

        let set = resolve_permissions(&store, user, ProjectKey::Labs)
            .await
            .unwrap();
        assert_eq!(set, PermissionSet::empty());
    }

    #[tokio::test]
    async fn removing_a_role_permission_is_reflected_immediately() {
        let store = MemoryPermissionStore::new();
        let user = UserId::new();
        store.add_user(user, false);

        let role = RoleId::new();
        store.add_role(role, ProjectKey::News, [news::READ, news::PUBLISH]);
        store.assign_membership(user, ProjectKey::News, role);

        store.set_role_permissions(role, [news::READ]);

        let set = resolve_permissions(&store, user, ProjectKey::News)
            .await
            .unwrap();
        assert!(set.allows(&news::READ));
        assert!(!set.allows(&news::PUBLISH));
    }
}
