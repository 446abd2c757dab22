//! In-memory repositories for tests and the no-database dev wiring.
//!
//! One struct per feature, mirroring the Postgres implementations' ordering
//! and filtering so handler tests observe the same behavior either way.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use aladil_auth::{
    MembershipGrant, MemorySessions, Permission, PermissionStore, Session, SessionProvider,
    StoreError, UserGrants,
};
use aladil_core::{LabId, MeetingId, MemberId, MessageId, NewsId, ProjectKey, RoleId, UserId};

use crate::contact::{ContactRecord, ContactStore};
use crate::executive::{ExecutiveStore, MemberRecord, MemberUpdate};
use crate::labs::{LabRecord, LabStore, LabUpdate};
use crate::meetings::{MeetingRecord, MeetingStore, MeetingUpdate};
use crate::news::{NewsRecord, NewsStore, NewsUpdate};
use crate::roles::{MembershipRecord, RoleDirectory, RoleRecord};
use crate::users::{UserAccount, UserDirectory, UserUpdate};

#[derive(Debug, Default)]
pub struct MemoryNewsStore {
    inner: Mutex<Vec<NewsRecord>>,
}

impl MemoryNewsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NewsStore for MemoryNewsStore {
    async fn list(&self, include_unpublished: bool) -> Result<Vec<NewsRecord>, StoreError> {
        let mut posts: Vec<NewsRecord> = self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|p| include_unpublished || p.is_published)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn get(&self, id: NewsId) -> Result<Option<NewsRecord>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<NewsRecord>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn create(&self, record: NewsRecord) -> Result<(), StoreError> {
        self.inner.lock().unwrap().push(record);
        Ok(())
    }

    async fn update(
        &self,
        id: NewsId,
        changes: NewsUpdate,
    ) -> Result<Option<NewsRecord>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(post) = inner.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(slug) = changes.slug {
            post.slug = slug;
        }
        if let Some(summary) = changes.summary {
            post.summary = summary;
        }
        if let Some(body) = changes.body {
            post.body = body;
        }
        if let Some(url) = changes.cover_image_url {
            post.cover_image_url = Some(url);
        }
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: NewsId) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.len();
        inner.retain(|p| p.id != id);
        Ok(inner.len() < before)
    }

    async fn set_published(
        &self,
        id: NewsId,
        published: bool,
        at: chrono::DateTime<Utc>,
    ) -> Result<Option<NewsRecord>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(post) = inner.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        post.is_published = published;
        post.published_at = published.then_some(at);
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryMeetingStore {
    inner: Mutex<Vec<MeetingRecord>>,
}

impl MemoryMeetingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MeetingStore for MemoryMeetingStore {
    async fn list(&self) -> Result<Vec<MeetingRecord>, StoreError> {
        let mut meetings = self.inner.lock().unwrap().clone();
        meetings.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        Ok(meetings)
    }

    async fn get(&self, id: MeetingId) -> Result<Option<MeetingRecord>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn create(&self, record: MeetingRecord) -> Result<(), StoreError> {
        self.inner.lock().unwrap().push(record);
        Ok(())
    }

    async fn update(
        &self,
        id: MeetingId,
        changes: MeetingUpdate,
    ) -> Result<Option<MeetingRecord>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(meeting) = inner.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            meeting.title = title;
        }
        if let Some(description) = changes.description {
            meeting.description = description;
        }
        if let Some(location) = changes.location {
            meeting.location = location;
        }
        if let Some(starts_at) = changes.starts_at {
            meeting.starts_at = starts_at;
        }
        if let Some(ends_at) = changes.ends_at {
            meeting.ends_at = Some(ends_at);
        }
        meeting.updated_at = Utc::now();
        Ok(Some(meeting.clone()))
    }

    async fn delete(&self, id: MeetingId) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.len();
        inner.retain(|m| m.id != id);
        Ok(inner.len() < before)
    }
}

#[derive(Debug, Default)]
pub struct MemoryLabStore {
    inner: Mutex<Vec<LabRecord>>,
}

impl MemoryLabStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LabStore for MemoryLabStore {
    async fn list(&self) -> Result<Vec<LabRecord>, StoreError> {
        let mut labs = self.inner.lock().unwrap().clone();
        labs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(labs)
    }

    async fn get(&self, id: LabId) -> Result<Option<LabRecord>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn create(&self, record: LabRecord) -> Result<(), StoreError> {
        self.inner.lock().unwrap().push(record);
        Ok(())
    }

    async fn update(
        &self,
        id: LabId,
        changes: LabUpdate,
    ) -> Result<Option<LabRecord>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(lab) = inner.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            lab.name = name;
        }
        if let Some(acronym) = changes.acronym {
            lab.acronym = Some(acronym);
        }
        if let Some(city) = changes.city {
            lab.city = city;
        }
        if let Some(country) = changes.country {
            lab.country = country;
        }
        if let Some(director) = changes.director_name {
            lab.director_name = Some(director);
        }
        if let Some(url) = changes.website_url {
            lab.website_url = Some(url);
        }
        if let Some(latitude) = changes.latitude {
            lab.latitude = Some(latitude);
        }
        if let Some(longitude) = changes.longitude {
            lab.longitude = Some(longitude);
        }
        lab.updated_at = Utc::now();
        Ok(Some(lab.clone()))
    }

    async fn delete(&self, id: LabId) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.len();
        inner.retain(|l| l.id != id);
        Ok(inner.len() < before)
    }
}

#[derive(Debug, Default)]
pub struct MemoryExecutiveStore {
    inner: Mutex<Vec<MemberRecord>>,
}

impl MemoryExecutiveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutiveStore for MemoryExecutiveStore {
    async fn list(&self) -> Result<Vec<MemberRecord>, StoreError> {
        let mut members = self.inner.lock().unwrap().clone();
        members.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.full_name.cmp(&b.full_name))
        });
        Ok(members)
    }

    async fn get(&self, id: MemberId) -> Result<Option<MemberRecord>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn create(&self, record: MemberRecord) -> Result<(), StoreError> {
        self.inner.lock().unwrap().push(record);
        Ok(())
    }

    async fn update(
        &self,
        id: MemberId,
        changes: MemberUpdate,
    ) -> Result<Option<MemberRecord>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(member) = inner.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        if let Some(full_name) = changes.full_name {
            member.full_name = full_name;
        }
        if let Some(position) = changes.position {
            member.position = position;
        }
        if let Some(url) = changes.photo_url {
            member.photo_url = Some(url);
        }
        if let Some(order) = changes.display_order {
            member.display_order = order;
        }
        member.updated_at = Utc::now();
        Ok(Some(member.clone()))
    }

    async fn delete(&self, id: MemberId) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.len();
        inner.retain(|m| m.id != id);
        Ok(inner.len() < before)
    }
}

#[derive(Debug, Default)]
pub struct MemoryContactStore {
    inner: Mutex<Vec<ContactRecord>>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn submit(&self, record: ContactRecord) -> Result<(), StoreError> {
        self.inner.lock().unwrap().push(record);
        Ok(())
    }

    async fn list(&self, include_archived: bool) -> Result<Vec<ContactRecord>, StoreError> {
        let mut messages: Vec<ContactRecord> = self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|m| include_archived || !m.is_archived)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    async fn archive(&self, id: MessageId) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.is_archived = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    inner: Mutex<HashMap<UserId, UserAccount>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn list(&self) -> Result<Vec<UserAccount>, StoreError> {
        let mut accounts: Vec<UserAccount> =
            self.inner.lock().unwrap().values().cloned().collect();
        accounts.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(accounts)
    }

    async fn get(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.inner.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn create(&self, account: UserAccount) -> Result<(), StoreError> {
        self.inner.lock().unwrap().insert(account.id, account);
        Ok(())
    }

    async fn update(
        &self,
        id: UserId,
        changes: UserUpdate,
    ) -> Result<Option<UserAccount>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(account) = inner.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(email) = changes.email {
            account.email = email;
        }
        if let Some(display_name) = changes.display_name {
            account.display_name = display_name;
        }
        if let Some(is_active) = changes.is_active {
            account.is_active = is_active;
        }
        if let Some(is_super_admin) = changes.is_super_admin {
            account.is_super_admin = is_super_admin;
        }
        Ok(Some(account.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        Ok(self.inner.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
struct RolesInner {
    roles: HashMap<RoleId, RoleRecord>,
    memberships: Vec<MembershipRecord>,
}

#[derive(Debug, Default)]
pub struct MemoryRoleDirectory {
    inner: Mutex<RolesInner>,
}

impl MemoryRoleDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleDirectory for MemoryRoleDirectory {
    async fn list_roles(
        &self,
        project: Option<ProjectKey>,
    ) -> Result<Vec<RoleRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut roles: Vec<RoleRecord> = inner
            .roles
            .values()
            .filter(|r| project.is_none_or(|p| r.project == p))
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.id.as_uuid().cmp(b.id.as_uuid()));
        Ok(roles)
    }

    async fn get_role(&self, id: RoleId) -> Result<Option<RoleRecord>, StoreError> {
        Ok(self.inner.lock().unwrap().roles.get(&id).cloned())
    }

    async fn create_role(&self, role: RoleRecord) -> Result<(), StoreError> {
        self.inner.lock().unwrap().roles.insert(role.id, role);
        Ok(())
    }

    async fn set_role_permissions(
        &self,
        id: RoleId,
        permissions: Vec<Permission>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.roles.get_mut(&id) {
            Some(role) => {
                role.permissions = permissions;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_role(&self, id: RoleId) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.roles.remove(&id).is_some();
        if removed {
            inner.memberships.retain(|m| m.role_id != id);
        }
        Ok(removed)
    }

    async fn assign_membership(
        &self,
        user_id: UserId,
        project: ProjectKey,
        role_id: RoleId,
    ) -> Result<(), StoreError> {
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
        Ok(())
    }

    async fn set_membership_active(
        &self,
        user_id: UserId,
        project: ProjectKey,
        is_active: bool,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let mut touched = false;
        for m in &mut inner.memberships {
            if m.user_id == user_id && m.project == project {
                m.is_active = is_active;
                touched = true;
            }
        }
        Ok(touched)
    }

    async fn list_memberships(
        &self,
        user_id: UserId,
    ) -> Result<Vec<MembershipRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut memberships: Vec<MembershipRecord> = inner
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        memberships.sort_by(|a, b| a.project.as_str().cmp(b.project.as_str()));
        Ok(memberships)
    }
}

/// [`PermissionStore`] over the in-memory directories.
///
/// Reads the super-admin flag and memberships from the same structures the
/// admin surface writes to, so a flag flip or role edit is visible to the
/// very next resolution, matching the Postgres wiring.
pub struct MemoryGrantSource {
    users: Arc<MemoryUserDirectory>,
    roles: Arc<MemoryRoleDirectory>,
}

impl MemoryGrantSource {
    pub fn new(users: Arc<MemoryUserDirectory>, roles: Arc<MemoryRoleDirectory>) -> Self {
        Self { users, roles }
    }
}

#[async_trait]
impl PermissionStore for MemoryGrantSource {
    async fn load_grants(
        &self,
        user_id: UserId,
        project: ProjectKey,
    ) -> Result<Option<UserGrants>, StoreError> {
        let Some(account) = self.users.get(user_id).await? else {
            return Ok(None);
        };

        if account.is_super_admin {
            return Ok(Some(UserGrants {
                is_super_admin: true,
                memberships: Vec::new(),
            }));
        }

        let mut memberships = Vec::new();
        for m in self.roles.list_memberships(user_id).await? {
            if m.project != project {
                continue;
            }
            let Some(role) = self.roles.get_role(m.role_id).await? else {
                continue;
            };
            if role.project != project {
                continue;
            }
            memberships.push(MembershipGrant {
                is_active: m.is_active,
                permissions: role.permissions,
            });
        }

        Ok(Some(UserGrants {
            is_super_admin: false,
            memberships,
        }))
    }

    async fn is_super_admin(&self, user_id: UserId) -> Result<Option<bool>, StoreError> {
        Ok(self.users.get(user_id).await?.map(|a| a.is_super_admin))
    }
}

/// [`SessionProvider`] that layers the active-account check over
/// [`MemorySessions`], mirroring what the Postgres session query enforces.
pub struct MemorySessionSource {
    sessions: Arc<MemorySessions>,
    users: Arc<MemoryUserDirectory>,
}

impl MemorySessionSource {
    pub fn new(sessions: Arc<MemorySessions>, users: Arc<MemoryUserDirectory>) -> Self {
        Self { sessions, users }
    }
}

#[async_trait]
impl SessionProvider for MemorySessionSource {
    async fn resolve(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let Some(session) = self.sessions.resolve(token).await? else {
            return Ok(None);
        };
        let active = self
            .users
            .get(session.user_id)
            .await?
            .is_some_and(|a| a.is_active);
        Ok(active.then_some(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aladil_auth::keys;

    #[tokio::test]
    async fn news_list_hides_unpublished_on_public_surface() {
        let store = MemoryNewsStore::new();
        let now = Utc::now();
        store
            .create(NewsRecord {
                id: NewsId::new(),
                title: "Draft".to_string(),
                slug: "draft".to_string(),
                summary: String::new(),
                body: String::new(),
                cover_image_url: None,
                is_published: false,
                published_at: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        assert!(store.list(false).await.unwrap().is_empty());
        assert_eq!(store.list(true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn membership_assignment_replaces_previous_role() {
        let dir = MemoryRoleDirectory::new();
        let user = UserId::new();
        let viewer = RoleId::new();
        let editor = RoleId::new();
        for (id, key) in [(viewer, "viewer"), (editor, "editor")] {
            dir.create_role(RoleRecord {
                id,
                project: ProjectKey::News,
                key: key.to_string(),
                name: key.to_string(),
                is_system: false,
                permissions: vec![keys::news::READ],
            })
            .await
            .unwrap();
        }

        dir.assign_membership(user, ProjectKey::News, viewer)
            .await
            .unwrap();
        dir.assign_membership(user, ProjectKey::News, editor)
            .await
            .unwrap();

        let memberships = dir.list_memberships(user).await.unwrap();
        assert_eq!(memberships.len(), 1);
        assert_eq!(memberships[0].role_id, editor);
        assert!(memberships[0].is_active);
    }

    #[tokio::test]
    async fn mismatched_membership_role_grants_nothing() {
        let users = Arc::new(MemoryUserDirectory::new());
        let roles = Arc::new(MemoryRoleDirectory::new());
        let grants = MemoryGrantSource::new(Arc::clone(&users), Arc::clone(&roles));

        let user = UserId::new();
        users
            .create(UserAccount {
                id: user,
                email: "member@aladil.org".to_string(),
                display_name: "Member".to_string(),
                is_active: true,
                is_super_admin: false,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let role = RoleId::new();
        roles
            .create_role(RoleRecord {
                id: role,
                project: ProjectKey::Meetings,
                key: "meetings-editor".to_string(),
                name: "Meetings editor".to_string(),
                is_system: false,
                permissions: vec![keys::meetings::READ, keys::meetings::UPDATE],
            })
            .await
            .unwrap();

        // Corrupt assignment: a NEWS membership pointing at a MEETINGS role.
        // The directory accepts it (validation lives at the API boundary),
        // but resolution must not leak the role's keys across projects.
        roles
            .assign_membership(user, ProjectKey::News, role)
            .await
            .unwrap();

        let news = grants
            .load_grants(user, ProjectKey::News)
            .await
            .unwrap()
            .unwrap();
        assert!(news.memberships.is_empty());

        // The role still works where it belongs, through a proper row.
        roles
            .assign_membership(user, ProjectKey::Meetings, role)
            .await
            .unwrap();
        let meetings = grants
            .load_grants(user, ProjectKey::Meetings)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(meetings.memberships.len(), 1);
        assert!(meetings.memberships[0]
            .permissions
            .contains(&keys::meetings::READ));
    }

    #[tokio::test]
    async fn archiving_removes_message_from_default_listing() {
        let store = MemoryContactStore::new();
        let id = MessageId::new();
        store
            .submit(ContactRecord {
                id,
                name: "A".to_string(),
                email: "a@example.org".to_string(),
                subject: "Hi".to_string(),
                body: "Hello".to_string(),
                is_archived: false,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        assert!(store.archive(id).await.unwrap());
        assert!(store.list(false).await.unwrap().is_empty());
        assert_eq!(store.list(true).await.unwrap().len(), 1);
    }
}
