use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are modeled as opaque strings following the
/// `"<resource>.<action>"` convention (e.g. `"news.publish"`). The decision
/// path checks exact string equality — there is no prefix or glob matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The effective permission set of a user within one project.
///
/// Super-admins get `Unrestricted` — a typed sentinel rather than a literal
/// `"*"` entry, so a stray wildcard string in role data can never collide
/// with the super-admin bypass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionSet {
    /// All permissions, present and future. Only produced for super-admins.
    Unrestricted,
    /// Exactly the named permissions.
    Restricted(HashSet<Permission>),
}

impl PermissionSet {
    /// The empty set (a user with no grants, or an unknown user).
    pub fn empty() -> Self {
        Self::Restricted(HashSet::new())
    }

    /// Does this set satisfy `permission`?
    pub fn allows(&self, permission: &Permission) -> bool {
        match self {
            PermissionSet::Unrestricted => true,
            PermissionSet::Restricted(set) => set.contains(permission),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, PermissionSet::Unrestricted)
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self::Restricted(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restricted_checks_exact_equality() {
        let set: PermissionSet =
            [Permission::from_static("news.read")].into_iter().collect();
        assert!(set.allows(&Permission::new("news.read")));
        assert!(!set.allows(&Permission::new("news")));
        assert!(!set.allows(&Permission::new("news.readonly")));
    }

    #[test]
    fn literal_wildcard_string_is_not_a_bypass() {
        // A "*" row in role data is just another opaque string.
        let set: PermissionSet = [Permission::from_static("*")].into_iter().collect();
        assert!(!set.allows(&Permission::new("news.read")));
        assert!(set.allows(&Permission::new("*")));
    }

    #[test]
    fn unrestricted_allows_everything() {
        let set = PermissionSet::Unrestricted;
        assert!(set.allows(&Permission::new("news.read")));
        assert!(set.allows(&Permission::new("anything.at.all")));
    }
}
