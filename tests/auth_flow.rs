//! End-to-end authentication flow against the real router

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use batchline::auth::{AppState, AuthService, TokenBlacklist, TokenConfig, TokenService, auth_router};
use batchline::store::{InMemorySessionStore, InMemoryUserStore, SessionStore, UserStore};

struct TestApp {
    router: Router,
    state: AppState,
}

fn test_app() -> TestApp {
    let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let tokens = Arc::new(TokenService::new(
        TokenConfig::new().secret("integration_test_secret_key"),
    ));
    let blacklist = Arc::new(TokenBlacklist::new());

    let state = AppState {
        auth: AuthService::new(users, sessions, tokens, blacklist),
    };
    TestApp {
        router: auth_router(state.clone()),
        state,
    }
}

async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    into_json(response).await
}

async fn get_with_auth(router: &Router, uri: &str, auth: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = auth {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let response = router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    into_json(response).await
}

async fn into_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, value)
}

async fn register_and_login(app: &TestApp) -> (String, Value) {
    let (status, _) = post_json(
        &app.router,
        "/auth/register",
        json!({
            "email": "op@plant.example",
            "password": "Hunter2!pass",
            "name": "Operator"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json(
        &app.router,
        "/auth/login",
        json!({"email": "op@plant.example", "password": "Hunter2!pass"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().unwrap().to_string();
    (token, body)
}

#[tokio::test]
async fn test_login_response_carries_token_expiry_and_user() {
    let app = test_app();
    let (token, body) = register_and_login(&app).await;

    assert!(!token.is_empty());
    assert_eq!(body["expires_in"], json!(3_600_000));
    assert_eq!(body["user"]["email"], "op@plant.example");
    assert_eq!(body["user"]["name"], "Operator");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_with_wrong_password_rejected() {
    let app = test_app();
    register_and_login(&app).await;

    let (status, body) = post_json(
        &app.router,
        "/auth/login",
        json!({"email": "op@plant.example", "password": "not-the-password"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_with_blank_email_rejected_as_missing_field() {
    let app = test_app();

    let (status, body) = post_json(
        &app.router,
        "/auth/login",
        json!({"email": "", "password": "whatever"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_FIELD");
}

#[tokio::test]
async fn test_full_login_logout_revocation_cycle() {
    let app = test_app();
    let (token, login_body) = register_and_login(&app).await;
    let user_id: uuid::Uuid = login_body["user"]["id"].as_str().unwrap().parse().unwrap();
    let bearer = format!("Bearer {token}");

    // Authenticated request resolves to the same identity
    let (status, body) = get_with_auth(&app.router, "/auth/me", Some(&bearer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "op@plant.example");

    // The session is enumerable while logged in
    let (status, body) = get_with_auth(&app.router, "/auth/sessions", Some(&bearer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["token"], token.as_str());

    // Logout revokes the token and removes the session
    let (status, _) = post_json(&app.router, "/auth/logout", json!({"token": token})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.state.auth.blacklist().is_revoked(&token));
    assert!(app.state.auth.sessions_for(user_id).await.unwrap().is_empty());

    // The token is still cryptographically valid but must be rejected
    let (status, body) = get_with_auth(&app.router, "/auth/me", Some(&bearer)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_REVOKED");
}

#[tokio::test]
async fn test_logout_token_is_trimmed() {
    let app = test_app();
    let (token, _) = register_and_login(&app).await;

    let padded = format!("  {token}  ");
    let (status, _) = post_json(&app.router, "/auth/logout", json!({"token": padded})).await;
    assert_eq!(status, StatusCode::OK);

    assert!(app.state.auth.blacklist().is_revoked(&token));
    let (status, body) =
        get_with_auth(&app.router, "/auth/me", Some(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_REVOKED");
}

#[tokio::test]
async fn test_unauthenticated_requests_pass_through_to_handler_checks() {
    let app = test_app();

    // No Authorization header: the gate passes the request through and the
    // route's own auth requirement answers
    let (status, body) = get_with_auth(&app.router, "/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "NOT_AUTHENTICATED");

    // Non-Bearer scheme behaves the same as no header
    let (status, body) = get_with_auth(&app.router, "/auth/me", Some("Basic dXNlcjpwYXNz")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "NOT_AUTHENTICATED");
}

#[tokio::test]
async fn test_tampered_token_never_authenticates() {
    let app = test_app();
    let (token, _) = register_and_login(&app).await;

    // Re-sign a token for the same subject under a different key
    let forged = {
        let attacker = TokenService::new(TokenConfig::new().secret("attacker_key"));
        attacker
            .issue(&batchline::store::User::new(
                "op@plant.example",
                "irrelevant",
                "Mallory",
            ))
            .unwrap()
    };
    assert_ne!(forged, token);

    let (status, body) =
        get_with_auth(&app.router, "/auth/me", Some(&format!("Bearer {forged}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_profile_update_and_account_deletion() {
    let app = test_app();
    let (token, _) = register_and_login(&app).await;
    let bearer = format!("Bearer {token}");

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/profile")
                .header(header::AUTHORIZATION, &bearer)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"name": "Operator Prime", "preferred_name": "Op"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, body) = into_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Operator Prime");
    assert_eq!(body["preferred_name"], "Op");

    // Deleting the account cascades to its sessions; the token no longer
    // resolves to anyone
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/delete-account")
                .header(header::AUTHORIZATION, &bearer)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, _) = into_json(response).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_with_auth(&app.router, "/auth/me", Some(&bearer)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app();
    register_and_login(&app).await;

    let (status, body) = post_json(
        &app.router,
        "/auth/register",
        json!({
            "email": "op@plant.example",
            "password": "Another1!pass",
            "name": "Impostor"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "EMAIL_EXISTS");
}
