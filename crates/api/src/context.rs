use aladil_auth::Session;
use aladil_core::UserId;

/// Session context for a request.
///
/// The base session middleware inserts this for every request, anonymous or
/// not, so downstream layers only have to look at one place.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    session: Option<Session>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.session.as_ref().map(|s| s.user_id)
    }
}

/// Authenticated identity for a request.
///
/// Only present past the `require_auth` layer; handlers behind it can take
/// this by `Extension` and never deal with the anonymous case.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    session: Session,
}

impl CurrentUser {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn user_id(&self) -> UserId {
        self.session.user_id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
