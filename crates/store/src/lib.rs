//! `aladil-store` — persistence layer.
//!
//! Postgres implementations (sqlx) of the permission store, the session
//! provider, and the per-feature content repositories, plus in-memory
//! counterparts used by tests and the no-database dev wiring. The SQL
//! schema lives under `migrations/`.

pub mod contact;
pub mod error;
pub mod executive;
pub mod labs;
pub mod meetings;
pub mod memory;
pub mod news;
pub mod permissions;
pub mod roles;
pub mod sessions;
pub mod users;

pub use contact::{ContactRecord, ContactStore, PgContactStore};
pub use executive::{ExecutiveStore, MemberRecord, MemberUpdate, PgExecutiveStore};
pub use labs::{LabRecord, LabStore, LabUpdate, PgLabStore};
pub use meetings::{MeetingRecord, MeetingStore, MeetingUpdate, PgMeetingStore};
pub use memory::{
    MemoryContactStore, MemoryExecutiveStore, MemoryGrantSource, MemoryLabStore,
    MemoryMeetingStore, MemoryNewsStore, MemoryRoleDirectory, MemorySessionSource,
    MemoryUserDirectory,
};
pub use news::{NewsRecord, NewsStore, NewsUpdate, PgNewsStore};
pub use permissions::PgPermissionStore;
pub use roles::{MembershipRecord, PgRoleDirectory, RoleDirectory, RoleRecord};
pub use sessions::PgSessions;
pub use users::{PgUserDirectory, UserAccount, UserDirectory, UserUpdate};
