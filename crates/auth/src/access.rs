//! Access decision: "does user U hold permission P in project J?"

use thiserror::Error;

use aladil_core::{ProjectKey, UserId};

use crate::permission::Permission;
use crate::resolver::resolve_permissions;
use crate::store::{PermissionStore, StoreError};

/// Why a guarded operation was refused.
///
/// `Unauthenticated` and `Forbidden` are the two terminal authorization
/// outcomes (401 / 403 at the transport); `Store` is an infrastructure
/// failure and maps to neither.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Boolean access decision.
///
/// True iff the resolved set is unrestricted or contains `permission`
/// exactly (string equality, no prefix matching).
pub async fn has_permission<S>(
    store: &S,
    user_id: UserId,
    project: ProjectKey,
    permission: &Permission,
) -> Result<bool, StoreError>
where
    S: PermissionStore + ?Sized,
{
    let set = resolve_permissions(store, user_id, project).await?;
    Ok(set.allows(permission))
}

/// Require `permission`, distinguishing the two failure kinds.
///
/// `user` is the optional authenticated identity: `None` fails with
/// [`AccessError::Unauthenticated`] before any store access, so an
/// anonymous caller can never observe a permission-specific denial.
pub async fn require_permission<S>(
    store: &S,
    user: Option<UserId>,
    project: ProjectKey,
    permission: &Permission,
) -> Result<(), AccessError>
where
    S: PermissionStore + ?Sized,
{
    let Some(user_id) = user else {
        return Err(AccessError::Unauthenticated);
    };

    if has_permission(store, user_id, project, permission).await? {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %user_id,
            project = %project,
            permission = %permission,
            "access denied"
        );
        Err(AccessError::Forbidden(permission.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{meetings, news};
    use crate::memory::MemoryPermissionStore;

    use aladil_core::RoleId;

    fn editor_fixture() -> (MemoryPermissionStore, UserId) {
        let store = MemoryPermissionStore::new();
        let user = UserId::new();
        store.add_user(user, false);

        let editor = RoleId::new();
        store.add_role(editor, ProjectKey::News, [news::READ, news::UPDATE]);
        store.assign_membership(user, ProjectKey::News, editor);
        (store, user)
    }

    #[tokio::test]
    async fn super_admin_passes_every_check() {
        let store = MemoryPermissionStore::new();
        let admin = UserId::new();
        store.add_user(admin, true);

        for (project, permission) in crate::keys::catalog() {
            assert!(has_permission(&store, admin, *project, permission)
                .await
                .unwrap());
        }
    }

    #[tokio::test]
    async fn no_membership_means_denied() {
        let store = MemoryPermissionStore::new();
        let user = UserId::new();
        store.add_user(user, false);

        assert!(!has_permission(&store, user, ProjectKey::News, &news::READ)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn editor_scenario_end_to_end() {
        let (store, user) = editor_fixture();

        assert!(has_permission(&store, user, ProjectKey::News, &news::READ)
            .await
            .unwrap());
        assert!(!has_permission(&store, user, ProjectKey::News, &news::DELETE)
            .await
            .unwrap());
        // Project mismatch: the key itself is irrelevant in another scope.
        assert!(
            !has_permission(&store, user, ProjectKey::Meetings, &news::READ)
                .await
                .unwrap()
        );
        assert!(
            !has_permission(&store, user, ProjectKey::Meetings, &meetings::READ)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn unknown_user_is_denied_without_error() {
        let store = MemoryPermissionStore::new();
        assert!(
            !has_permission(&store, UserId::new(), ProjectKey::News, &news::READ)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn require_distinguishes_the_two_failure_kinds() {
        let (store, user) = editor_fixture();

        // Anonymous: unauthenticated, even though the permission would also
        // have been denied.
        let err = require_permission(&store, None, ProjectKey::News, &news::DELETE)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Unauthenticated));

        // Authenticated but not permitted: forbidden, carrying the key.
        let err = require_permission(&store, Some(user), ProjectKey::News, &news::DELETE)
            .await
            .unwrap_err();
        match err {
            AccessError::Forbidden(denied) => assert_eq!(denied, news::DELETE),
            other => panic!("expected Forbidden, got {other:?}"),
        }

        // Permitted: passes.
        require_permission(&store, Some(user), ProjectKey::News, &news::READ)
            .await
            .unwrap();
    }
}
