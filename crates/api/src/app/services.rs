//! Store wiring: Postgres in production, in-memory for dev and tests.

use std::sync::Arc;

use sqlx::PgPool;

use aladil_auth::{MemorySessions, PermissionStore, SessionProvider};
use aladil_store::{
    ContactStore, ExecutiveStore, LabStore, MeetingStore, MemoryContactStore,
    MemoryExecutiveStore, MemoryGrantSource, MemoryLabStore, MemoryMeetingStore, MemoryNewsStore,
    MemoryRoleDirectory, MemorySessionSource, MemoryUserDirectory, NewsStore, PgContactStore,
    PgExecutiveStore, PgLabStore, PgMeetingStore, PgNewsStore, PgPermissionStore,
    PgRoleDirectory, PgSessions, PgUserDirectory, RoleDirectory, UserDirectory,
};

/// Everything the handlers need, behind object-safe traits so the same
/// router serves both backends.
pub struct AppServices {
    pub permissions: Arc<dyn PermissionStore>,
    pub sessions: Arc<dyn SessionProvider>,
    pub news: Arc<dyn NewsStore>,
    pub meetings: Arc<dyn MeetingStore>,
    pub labs: Arc<dyn LabStore>,
    pub executive: Arc<dyn ExecutiveStore>,
    pub contact: Arc<dyn ContactStore>,
    pub users: Arc<dyn UserDirectory>,
    pub roles: Arc<dyn RoleDirectory>,
}

/// Direct handles onto the in-memory stores, for seeding outside the HTTP
/// surface (tests, dev bootstrap).
pub struct MemoryHandles {
    pub sessions: Arc<MemorySessions>,
    pub users: Arc<MemoryUserDirectory>,
    pub roles: Arc<MemoryRoleDirectory>,
}

impl AppServices {
    pub fn postgres(pool: PgPool) -> Self {
        let pool = Arc::new(pool);
        Self {
            permissions: Arc::new(PgPermissionStore::new(pool.clone())),
            sessions: Arc::new(PgSessions::new(pool.clone())),
            news: Arc::new(PgNewsStore::new(pool.clone())),
            meetings: Arc::new(PgMeetingStore::new(pool.clone())),
            labs: Arc::new(PgLabStore::new(pool.clone())),
            executive: Arc::new(PgExecutiveStore::new(pool.clone())),
            contact: Arc::new(PgContactStore::new(pool.clone())),
            users: Arc::new(PgUserDirectory::new(pool.clone())),
            roles: Arc::new(PgRoleDirectory::new(pool)),
        }
    }

    pub fn in_memory() -> (Self, MemoryHandles) {
        let users = Arc::new(MemoryUserDirectory::new());
        let roles = Arc::new(MemoryRoleDirectory::new());
        let sessions = Arc::new(MemorySessions::new());

        let services = Self {
            permissions: Arc::new(MemoryGrantSource::new(users.clone(), roles.clone())),
            sessions: Arc::new(MemorySessionSource::new(sessions.clone(), users.clone())),
            news: Arc::new(MemoryNewsStore::new()),
            meetings: Arc::new(MemoryMeetingStore::new()),
            labs: Arc::new(MemoryLabStore::new()),
            executive: Arc::new(MemoryExecutiveStore::new()),
            contact: Arc::new(MemoryContactStore::new()),
            users: users.clone(),
            roles: roles.clone(),
        };

        let handles = MemoryHandles {
            sessions,
            users,
            roles,
        };

        (services, handles)
    }
}
