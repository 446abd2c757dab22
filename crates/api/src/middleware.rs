//! Request middleware: session resolution and the auth/admin gates.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use aladil_auth::{PermissionStore, SessionProvider};

use crate::app::errors::json_error;
use crate::context::{CurrentUser, SessionContext};

/// Name of the opaque session cookie.
pub const SESSION_COOKIE: &str = "aladil_session";

#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionProvider>,
    pub permissions: Arc<dyn PermissionStore>,
}

/// Base layer: resolve the session cookie (if any) into a [`SessionContext`].
///
/// Anonymous requests pass through with an empty context; only the gates
/// further in decide whether that is acceptable.
pub async fn session_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let context = match session_token(req.headers()) {
        Some(token) => match state.sessions.resolve(&token).await {
            Ok(Some(session)) => SessionContext::authenticated(session),
            Ok(None) => SessionContext::anonymous(),
            Err(e) => {
                tracing::error!("session resolution failed: {e}");
                return json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store_error",
                    "session resolution failed",
                );
            }
        },
        None => SessionContext::anonymous(),
    };

    req.extensions_mut().insert(context);
    next.run(req).await
}

/// Layer 3: reject anonymous requests, promote the rest to [`CurrentUser`].
pub async fn require_auth(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let session = req
        .extensions()
        .get::<SessionContext>()
        .and_then(|c| c.session().cloned());

    match session {
        Some(session) => {
            req.extensions_mut().insert(CurrentUser::new(session));
            next.run(req).await
        }
        None => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "authentication required",
        ),
    }
}

/// Layer 5: super-admin gate.
///
/// The flag is re-fetched from the store on every call rather than trusted
/// from the session, so a revoked admin is cut off immediately.
pub async fn require_admin(
    State(state): State<AuthState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(user) = req.extensions().get::<CurrentUser>() else {
        return json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "authentication required",
        );
    };

    match state.permissions.is_super_admin(user.user_id()).await {
        Ok(Some(true)) => next.run(req).await,
        Ok(_) => json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "super-admin access required",
        ),
        Err(e) => {
            tracing::error!("super-admin check failed: {e}");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "authorization check failed",
            )
        }
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, value.parse().unwrap());
        headers
    }

    #[test]
    fn extracts_session_cookie_among_others() {
        let headers = headers_with("theme=dark; aladil_session=tok123; lang=fr");
        assert_eq!(session_token(&headers), Some("tok123".to_string()));
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        assert_eq!(session_token(&HeaderMap::new()), None);
        assert_eq!(session_token(&headers_with("theme=dark")), None);
        assert_eq!(session_token(&headers_with("aladil_session=")), None);
    }
}
