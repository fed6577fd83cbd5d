//! Integration tests for share resolution: expiry, recipient gate, downloads.

mod helpers;

use chrono::{Duration, Utc};
use axum::body::Body;
use http::header::ORIGIN;
use http::{Request, StatusCode};
use serde_json::json;

use vaultdrop_database::store::TransferStore;
use vaultdrop_entity::file::NewFile;
use vaultdrop_entity::transfer::NewTransfer;

use helpers::TestApp;

async fn seed_open(app: &TestApp, token: &str, expires_in: Duration) {
    app.transfers
        .commit(
            NewTransfer {
                token: token.to_string(),
                expires_at: Utc::now() + expires_in,
                total_size: 5,
                is_anonymous: true,
                sender_id: None,
            },
            vec![NewFile {
                filename: "a.txt".to_string(),
                size: 5,
                storage_key: format!("uploads/{token}/seed_a.txt"),
                content_type: "text/plain".to_string(),
                index: 0,
            }],
            Vec::new(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_expiry_boundary() {
    let app = TestApp::new();
    seed_open(&app, "lapsed_token", Duration::seconds(-1)).await;
    seed_open(&app, "live_token", Duration::hours(1)).await;

    let lapsed = app
        .request("GET", "/api/v1/share/lapsed_token", None, None)
        .await;
    assert_eq!(lapsed.status, StatusCode::GONE);
    assert_eq!(lapsed.error_code(), "EXPIRED");
    assert_eq!(lapsed.body["message"], "This link has expired");

    let live = app.request("GET", "/api/v1/share/live_token", None, None).await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.data()["is_anonymous"], true);
    assert!(live.data().get("encrypted_key").is_none());
}

#[tokio::test]
async fn test_unknown_and_malformed_tokens_are_not_found() {
    let app = TestApp::new();

    let unknown = app.request("GET", "/api/v1/share/nothing_here", None, None).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["message"], "Invalid or expired share link");

    let malformed = app.request("GET", "/api/v1/share/not%20a%20token", None, None).await;
    assert_eq!(malformed.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recipient_gate() {
    let app = TestApp::new();
    let (_, alice) = app.user("alice").await;
    let (bob_id, bob) = app.user("bob").await;
    let (_, eve) = app.user("eve").await;

    let (token, files) = app
        .presign_and_upload(&[("secret.bin", b"ciphertext")], Some(&alice))
        .await;
    let complete = app
        .request(
            "POST",
            "/api/v1/files/complete",
            Some(json!({
                "token": token,
                "files": files,
                "recipients": [{"receiver_id": bob_id, "encrypted_key": "wrapped+key/for==bob"}],
            })),
            Some(&alice),
        )
        .await;
    assert_eq!(complete.status, StatusCode::OK, "{:?}", complete.body);
    assert_eq!(complete.data()["expires_in"], 86400);

    let path = format!("/api/v1/share/{token}");

    let anonymous = app.request("GET", &path, None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let outsider = app.request("GET", &path, None, Some(&eve)).await;
    assert_eq!(outsider.status, StatusCode::FORBIDDEN);
    assert_eq!(outsider.error_code(), "FORBIDDEN");

    let sender = app.request("GET", &path, None, Some(&alice)).await;
    assert_eq!(sender.status, StatusCode::FORBIDDEN);

    let missing = app
        .request("GET", "/api/v1/share/no_such_token", None, Some(&eve))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let recipient = app.request("GET", &path, None, Some(&bob)).await;
    assert_eq!(recipient.status, StatusCode::OK);
    assert_eq!(recipient.data()["is_anonymous"], false);
    assert_eq!(recipient.data()["encrypted_key"], "wrapped+key/for==bob");
    assert_eq!(recipient.data()["sender"]["username"], "alice");
    assert_eq!(recipient.data()["sender"]["public_key"], "alice-public-key");

    let download = app
        .request("GET", &format!("{path}/download/0"), None, Some(&bob))
        .await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(download.bytes, b"ciphertext");

    let denied = app
        .request("GET", &format!("{path}/presign-download/0"), None, Some(&eve))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_recipients_require_sign_in() {
    let app = TestApp::new();
    let (bob_id, _) = app.user("bob").await;
    let (token, files) = app.presign_and_upload(&[("a.txt", b"a")], None).await;

    let response = app
        .request(
            "POST",
            "/api/v1/files/complete",
            Some(json!({
                "token": token,
                "files": files,
                "recipients": [{"receiver_id": bob_id, "encrypted_key": "k"}],
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.transfers.transfer_count().await, 0);
}

#[tokio::test]
async fn test_unknown_recipient_rejected() {
    let app = TestApp::new();
    let (_, alice) = app.user("alice").await;
    let (token, files) = app
        .presign_and_upload(&[("a.txt", b"a")], Some(&alice))
        .await;

    let response = app
        .request(
            "POST",
            "/api/v1/files/complete",
            Some(json!({
                "token": token,
                "files": files,
                "recipients": [{"receiver_id": uuid::Uuid::new_v4(), "encrypted_key": "k"}],
            })),
            Some(&alice),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.transfers.transfer_count().await, 0);
}

#[tokio::test]
async fn test_stream_download_headers() {
    let app = TestApp::new();
    let token = app.upload_open(&[("notes.txt", b"hello world")], None).await;

    let response = app
        .request("GET", &format!("/api/v1/share/{token}/download/0"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes, b"hello world");
    assert_eq!(response.headers["content-type"], "text/plain");
    assert_eq!(
        response.headers["content-disposition"],
        "attachment; filename=\"notes.txt\""
    );
}

#[tokio::test]
async fn test_cross_origin_download_exposes_filename() {
    let app = TestApp::with_config(|config| {
        config.server.cors.allowed_origins = vec!["http://localhost:5173".to_string()];
        config.server.cors.allow_credentials = true;
    });
    let token = app.upload_open(&[("notes.txt", b"hello world")], None).await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/v1/share/{token}/download/0"))
        .header(ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers["access-control-allow-origin"],
        "http://localhost:5173"
    );
    let exposed = response.headers["access-control-expose-headers"]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("content-disposition"));
}

#[tokio::test]
async fn test_download_index_errors() {
    let app = TestApp::new();
    let token = app.upload_open(&[("a.txt", b"a")], None).await;

    let out_of_range = app
        .request(
            "GET",
            &format!("/api/v1/share/{token}/presign-download/5"),
            None,
            None,
        )
        .await;
    assert_eq!(out_of_range.status, StatusCode::NOT_FOUND);
    assert_eq!(out_of_range.body["message"], "File not found");

    let not_a_number = app
        .request(
            "GET",
            &format!("/api/v1/share/{token}/presign-download/first"),
            None,
            None,
        )
        .await;
    assert_eq!(not_a_number.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboards_and_revoke() {
    let app = TestApp::new();
    let (_, alice) = app.user("alice").await;
    let (bob_id, bob) = app.user("bob").await;

    let (token, files) = app
        .presign_and_upload(&[("a.txt", b"aaa")], Some(&alice))
        .await;
    let key = files[0]["key"].as_str().unwrap().to_string();
    let complete = app
        .request(
            "POST",
            "/api/v1/files/complete",
            Some(json!({
                "token": token,
                "files": files,
                "recipients": [{"receiver_id": bob_id, "encrypted_key": "k"}],
            })),
            Some(&alice),
        )
        .await;
    assert_eq!(complete.status, StatusCode::OK);

    let sent = app
        .request("GET", "/api/v1/transfers/sent", None, Some(&alice))
        .await;
    assert_eq!(sent.status, StatusCode::OK);
    assert_eq!(sent.data()[0]["token"], token.as_str());
    assert_eq!(sent.data()[0]["file_count"], 1);
    assert_eq!(sent.data()[0]["recipient_count"], 1);

    let received = app
        .request("GET", "/api/v1/transfers/received", None, Some(&bob))
        .await;
    assert_eq!(received.status, StatusCode::OK);
    assert_eq!(received.data().as_array().unwrap().len(), 1);

    let anonymous = app.request("GET", "/api/v1/transfers/sent", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let path = format!("/api/v1/transfers/{token}");
    let by_recipient = app.request("DELETE", &path, None, Some(&bob)).await;
    assert_eq!(by_recipient.status, StatusCode::FORBIDDEN);

    let by_sender = app.request("DELETE", &path, None, Some(&alice)).await;
    assert_eq!(by_sender.status, StatusCode::OK);
    assert!(!app.storage.contains(&key).await);

    let gone = app
        .request("GET", &format!("/api/v1/share/{token}"), None, Some(&bob))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}
