//! Integration tests for accounts and sessions.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_sign_up_and_duplicates() {
    let app = TestApp::new();

    let created = app
        .request(
            "POST",
            "/api/v1/auth/sign-up",
            Some(json!({
                "username": "alice",
                "email": "Alice@Example.com",
                "password": "password123",
            })),
            None,
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["username"], "alice");
    assert_eq!(created.data()["email"], "alice@example.com");
    assert!(created.data().get("password_hash").is_none());

    let same_name = app
        .request(
            "POST",
            "/api/v1/auth/sign-up",
            Some(json!({
                "username": "alice",
                "email": "other@example.com",
                "password": "password123",
            })),
            None,
        )
        .await;
    assert_eq!(same_name.status, StatusCode::CONFLICT);

    let same_email = app
        .request(
            "POST",
            "/api/v1/auth/sign-up",
            Some(json!({
                "username": "alice2",
                "email": "alice@example.com",
                "password": "password123",
            })),
            None,
        )
        .await;
    assert_eq!(same_email.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_sign_up_validation() {
    let app = TestApp::new();

    let short_password = app
        .request(
            "POST",
            "/api/v1/auth/sign-up",
            Some(json!({"username": "bob", "email": "bob@example.com", "password": "short"})),
            None,
        )
        .await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);

    let bad_email = app
        .request(
            "POST",
            "/api/v1/auth/sign-up",
            Some(json!({"username": "bob", "email": "not-an-email", "password": "password123"})),
            None,
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);

    let unknown_field = app
        .request(
            "POST",
            "/api/v1/auth/sign-up",
            Some(json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "password123",
                "role": "admin",
            })),
            None,
        )
        .await;
    assert_eq!(unknown_field.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_sets_http_only_cookie() {
    let app = TestApp::new();
    app.sign_up("carol", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({"username": "carol", "password": "password123"})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["user"]["username"], "carol");

    let cookie = response
        .set_cookies()
        .into_iter()
        .find(|c| c.starts_with("token="))
        .expect("session cookie");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age="));
}

#[tokio::test]
async fn test_login_by_email() {
    let app = TestApp::new();
    app.sign_up("dave", "password123").await;
    let token = app.login("dave@example.com", "password123").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable() {
    let app = TestApp::new();
    app.sign_up("erin", "password123").await;

    let wrong_password = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({"username": "erin", "password": "password124"})),
            None,
        )
        .await;
    let no_such_user = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({"username": "nobody", "password": "password123"})),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(no_such_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body["message"], "Invalid credentials");
    assert_eq!(no_such_user.body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_me_with_cookie_or_bearer() {
    let app = TestApp::new();
    let (id, token) = app.user("frank").await;

    let with_cookie = app.request("GET", "/api/v1/auth/me", None, Some(&token)).await;
    assert_eq!(with_cookie.status, StatusCode::OK);
    assert_eq!(with_cookie.data()["id"], id.to_string());

    let req = http::Request::builder()
        .uri("/api/v1/auth/me")
        .header("authorization", format!("Bearer {token}"))
        .body(axum::body::Body::empty())
        .unwrap();
    let with_bearer = app.send(req).await;
    assert_eq!(with_bearer.status, StatusCode::OK);

    let anonymous = app.request("GET", "/api/v1/auth/me", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.error_code(), "UNAUTHORIZED");

    let forged = app
        .request("GET", "/api/v1/auth/me", None, Some("not.a.jwt"))
        .await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new();
    let (_, token) = app.user("grace").await;

    let response = app
        .request("POST", "/api/v1/auth/logout", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let cookie = response
        .set_cookies()
        .into_iter()
        .find(|c| c.starts_with("token="))
        .expect("removal cookie");
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_public_key_lookup() {
    let app = TestApp::new();
    let (heidi_id, _) = app.user("heidi").await;
    let (_, ivan) = app.user("ivan").await;

    let anonymous = app
        .request("GET", "/api/v1/users/heidi/public-key", None, None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let found = app
        .request("GET", "/api/v1/users/heidi/public-key", None, Some(&ivan))
        .await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.data()["id"], heidi_id.to_string());
    assert_eq!(found.data()["public_key"], "heidi-public-key");

    let missing = app
        .request("GET", "/api/v1/users/nobody/public-key", None, Some(&ivan))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/v1/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"], "connected");
    assert_eq!(response.data()["storage"], "available");
}
