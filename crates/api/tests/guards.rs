//! End-to-end guard behavior over the in-memory wiring: the same router as
//! production, driven with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;

use aladil_api::app::services::{AppServices, MemoryHandles};
use aladil_api::app::build_app;
use aladil_auth::Session;
use aladil_core::{NewsId, ProjectKey, RoleId, UserId};
use aladil_store::{RoleDirectory, RoleRecord, UserAccount, UserDirectory, UserUpdate};

struct TestApp {
    app: Router,
    handles: MemoryHandles,
}

fn test_app() -> TestApp {
    let (services, handles) = AppServices::in_memory();
    TestApp {
        app: build_app(Arc::new(services)),
        handles,
    }
}

impl TestApp {
    async fn seed_user(&self, email: &str, is_super_admin: bool, token: &str) -> UserId {
        let account = UserAccount {
            id: UserId::new(),
            email: email.to_string(),
            display_name: email.to_string(),
            is_active: true,
            is_super_admin,
            created_at: Utc::now(),
        };
        let id = account.id;
        self.handles.users.create(account).await.unwrap();
        self.handles.sessions.insert(
            token,
            Session {
                user_id: id,
                email: email.to_string(),
                display_name: email.to_string(),
            },
        );
        id
    }

    async fn seed_role(
        &self,
        project: ProjectKey,
        key: &str,
        permissions: Vec<aladil_auth::Permission>,
    ) -> RoleId {
        let role = RoleRecord {
            id: RoleId::new(),
            project,
            key: key.to_string(),
            name: key.to_string(),
            is_system: false,
            permissions,
        };
        let id = role.id;
        self.handles.roles.create_role(role).await.unwrap();
        id
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("aladil_session={token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    json_request("POST", uri, token, body)
}

fn patch_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    json_request("PATCH", uri, token, body)
}

fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("aladil_session={token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn anonymous_guarded_request_is_unauthenticated_not_forbidden() {
    let t = test_app();

    for uri in ["/news", "/meetings", "/contact", "/rbac/roles", "/whoami"] {
        let (status, body) = t.send(get(uri, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"], "unauthenticated", "{uri}");
    }
}

#[tokio::test]
async fn denial_names_the_missing_permission() {
    let t = test_app();
    let user = t.seed_user("sec@aladil.org", false, "tok-sec").await;

    let role = t
        .seed_role(
            ProjectKey::Meetings,
            "meetings-editor",
            vec![
                aladil_auth::keys::meetings::READ,
                aladil_auth::keys::meetings::CREATE,
            ],
        )
        .await;
    t.handles
        .roles
        .assign_membership(user, ProjectKey::Meetings, role)
        .await
        .unwrap();

    let (status, _) = t.send(get("/meetings", Some("tok-sec"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t.send(get("/news", Some("tok-sec"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert_eq!(body["permission"], "news.read");
}

#[tokio::test]
async fn denied_caller_cannot_probe_record_existence() {
    let t = test_app();
    let user = t.seed_user("limited@aladil.org", false, "tok-lim").await;
    t.seed_user("root@aladil.org", true, "tok-root").await;

    let role = t
        .seed_role(
            ProjectKey::Meetings,
            "meetings-viewer",
            vec![aladil_auth::keys::meetings::READ],
        )
        .await;
    t.handles
        .roles
        .assign_membership(user, ProjectKey::Meetings, role)
        .await
        .unwrap();

    // The id does not exist, but an unauthorized caller must see the
    // denial, not the 404 that would reveal whether it does.
    let missing = NewsId::new();
    let (status, body) = t.send(get(&format!("/news/{missing}"), Some("tok-lim"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert_eq!(body["permission"], "news.read");

    // Only an authorized caller gets far enough to learn it is missing.
    let (status, _) = t.send(get(&format!("/news/{missing}"), Some("tok-root"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn meeting_patch_cannot_end_before_it_starts() {
    let t = test_app();
    t.seed_user("planner@aladil.org", true, "tok-plan").await;

    let (status, created) = t
        .send(post_json(
            "/meetings",
            Some("tok-plan"),
            serde_json::json!({
                "title": "Board meeting",
                "description": "Quarterly review",
                "location": "Tunis",
                "starts_at": "2026-10-01T09:00:00Z",
                "ends_at": "2026-10-01T12:00:00Z"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    // Patching only ends_at still has to respect the stored start.
    let (status, body) = t
        .send(patch_json(
            &format!("/meetings/{id}"),
            Some("tok-plan"),
            serde_json::json!({ "ends_at": "2026-10-01T08:00:00Z" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    // So does moving the start past the stored end.
    let (status, _) = t
        .send(patch_json(
            &format!("/meetings/{id}"),
            Some("tok-plan"),
            serde_json::json!({ "starts_at": "2026-10-01T13:00:00Z" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, fetched) = t.send(get(&format!("/meetings/{id}"), Some("tok-plan"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["ends_at"], "2026-10-01T12:00:00Z");
}

#[tokio::test]
async fn super_admin_passes_every_guard() {
    let t = test_app();
    t.seed_user("root@aladil.org", true, "tok-root").await;

    let (status, body) = t
        .send(post_json(
            "/news",
            Some("tok-root"),
            serde_json::json!({
                "title": "Annual congress",
                "summary": "Save the date",
                "body": "Details to follow."
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["slug"], "annual-congress");

    let (status, _) = t.send(get("/contact", Some("tok-root"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t.send(get("/rbac/permissions", Some("tok-root"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 25);
}

#[tokio::test]
async fn admin_gate_tracks_the_current_flag() {
    let t = test_app();
    let user = t.seed_user("ops@aladil.org", false, "tok-ops").await;

    let (status, body) = t.send(get("/admin/users", Some("tok-ops"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    // Promotion is visible on the very next request, no new session needed.
    t.handles
        .users
        .update(
            user,
            UserUpdate {
                is_super_admin: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (status, _) = t.send(get("/admin/users", Some("tok-ops"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn public_contact_submission_needs_no_session() {
    let t = test_app();

    let (status, _) = t
        .send(post_json(
            "/public/contact",
            None,
            serde_json::json!({
                "name": "Visitor",
                "email": "visitor@example.org",
                "subject": "Membership",
                "body": "How does my lab join?"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Reading the inbox stays guarded.
    let (status, body) = t.send(get("/contact", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");
}

#[tokio::test]
async fn deactivated_account_loses_its_session() {
    let t = test_app();
    let user = t.seed_user("gone@aladil.org", true, "tok-gone").await;

    let (status, _) = t.send(get("/whoami", Some("tok-gone"))).await;
    assert_eq!(status, StatusCode::OK);

    t.handles
        .users
        .update(
            user,
            UserUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (status, body) = t.send(get("/whoami", Some("tok-gone"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");
}

#[tokio::test]
async fn publish_flow_controls_public_visibility() {
    let t = test_app();
    t.seed_user("editor@aladil.org", true, "tok-ed").await;

    let (status, created) = t
        .send(post_json(
            "/news",
            Some("tok-ed"),
            serde_json::json!({
                "title": "Lab spotlight",
                "summary": "New member lab",
                "body": "..."
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    // Drafts are invisible on the public surface, even by slug.
    let (status, body) = t.send(get("/public/news", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
    let (status, _) = t.send(get("/public/news/lab-spotlight", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = t
        .send(post_json(
            &format!("/news/{id}/publish"),
            Some("tok-ed"),
            serde_json::json!({}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t.send(get("/public/news/lab-spotlight", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_published"], true);
}

#[tokio::test]
async fn duplicate_slug_is_a_conflict() {
    let t = test_app();
    t.seed_user("dup@aladil.org", true, "tok-dup").await;

    let body = serde_json::json!({
        "title": "Same title",
        "summary": "s",
        "body": "b"
    });
    let (status, _) = t.send(post_json("/news", Some("tok-dup"), body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, response) = t.send(post_json("/news", Some("tok-dup"), body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["error"], "conflict");
}
