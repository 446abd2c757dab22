//! `aladil-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod project;
pub mod slug;

pub use error::{DomainError, DomainResult};
pub use id::{LabId, MeetingId, MemberId, MessageId, NewsId, RoleId, UserId};
pub use project::ProjectKey;
pub use slug::slugify;
