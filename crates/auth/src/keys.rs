//! Permission-key catalog.
//!
//! Every capability the routers guard with, grouped by feature area. New
//! features must follow the `"<resource>.<action>"` convention so the exact
//! string-equality check in the resolver stays meaningful.

use aladil_core::ProjectKey;

use crate::permission::Permission;

pub mod news {
    use super::Permission;

    pub const READ: Permission = Permission::from_static("news.read");
    pub const CREATE: Permission = Permission::from_static("news.create");
    pub const UPDATE: Permission = Permission::from_static("news.update");
    pub const DELETE: Permission = Permission::from_static("news.delete");
    pub const PUBLISH: Permission = Permission::from_static("news.publish");
}

pub mod meetings {
    use super::Permission;

    pub const READ: Permission = Permission::from_static("meetings.read");
    pub const CREATE: Permission = Permission::from_static("meetings.create");
    pub const UPDATE: Permission = Permission::from_static("meetings.update");
    pub const DELETE: Permission = Permission::from_static("meetings.delete");
}

pub mod labs {
    use super::Permission;

    pub const READ: Permission = Permission::from_static("labs.read");
    pub const CREATE: Permission = Permission::from_static("labs.create");
    pub const UPDATE: Permission = Permission::from_static("labs.update");
    pub const DELETE: Permission = Permission::from_static("labs.delete");
}

pub mod executive {
    use super::Permission;

    pub const READ: Permission = Permission::from_static("executive.read");
    pub const CREATE: Permission = Permission::from_static("executive.create");
    pub const UPDATE: Permission = Permission::from_static("executive.update");
    pub const DELETE: Permission = Permission::from_static("executive.delete");
}

pub mod users {
    use super::Permission;

    pub const READ: Permission = Permission::from_static("users.read");
    pub const CREATE: Permission = Permission::from_static("users.create");
    pub const UPDATE: Permission = Permission::from_static("users.update");
    pub const DELETE: Permission = Permission::from_static("users.delete");
    pub const MANAGE: Permission = Permission::from_static("users.manage");
}

pub mod contact {
    use super::Permission;

    pub const READ: Permission = Permission::from_static("contact.read");
    pub const ARCHIVE: Permission = Permission::from_static("contact.archive");
}

pub mod roles {
    use super::Permission;

    pub const MANAGE: Permission = Permission::from_static("roles.manage");
}

/// The full catalog, with the project each key is scoped to.
///
/// This is the seed data for the `permissions` table and the reference list
/// exposed by the role-administration endpoints.
pub fn catalog() -> &'static [(ProjectKey, Permission)] {
    &CATALOG
}

static CATALOG: [(ProjectKey, Permission); 25] = [
    (ProjectKey::News, news::READ),
    (ProjectKey::News, news::CREATE),
    (ProjectKey::News, news::UPDATE),
    (ProjectKey::News, news::DELETE),
    (ProjectKey::News, news::PUBLISH),
    (ProjectKey::Meetings, meetings::READ),
    (ProjectKey::Meetings, meetings::CREATE),
    (ProjectKey::Meetings, meetings::UPDATE),
    (ProjectKey::Meetings, meetings::DELETE),
    (ProjectKey::Labs, labs::READ),
    (ProjectKey::Labs, labs::CREATE),
    (ProjectKey::Labs, labs::UPDATE),
    (ProjectKey::Labs, labs::DELETE),
    (ProjectKey::ExecCommittee, executive::READ),
    (ProjectKey::ExecCommittee, executive::CREATE),
    (ProjectKey::ExecCommittee, executive::UPDATE),
    (ProjectKey::ExecCommittee, executive::DELETE),
    (ProjectKey::Settings, users::READ),
    (ProjectKey::Settings, users::CREATE),
    (ProjectKey::Settings, users::UPDATE),
    (ProjectKey::Settings, users::DELETE),
    (ProjectKey::Settings, users::MANAGE),
    (ProjectKey::Intranet, contact::READ),
    (ProjectKey::Intranet, contact::ARCHIVE),
    (ProjectKey::Settings, roles::MANAGE),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_keys_are_unique_and_well_formed() {
        let mut seen = HashSet::new();
        for (_, permission) in catalog() {
            assert!(seen.insert(permission.as_str()), "duplicate key {permission}");
            let (resource, action) = permission
                .as_str()
                .split_once('.')
                .expect("key must be <resource>.<action>");
            assert!(!resource.is_empty());
            assert!(!action.is_empty());
        }
    }
}
