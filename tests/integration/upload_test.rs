//! Integration tests for the presign/complete upload protocol.

mod helpers;

use http::StatusCode;
use serde_json::json;

use vaultdrop_core::traits::storage::ObjectStore;

use helpers::TestApp;

#[tokio::test]
async fn test_presign_complete_list_download() {
    let app = TestApp::new();

    let presign = app
        .request(
            "POST",
            "/api/v1/files/presign",
            Some(json!([
                {"filename": "a.txt", "size": 100},
                {"filename": "b.txt", "size": 200},
            ])),
            None,
        )
        .await;
    assert_eq!(presign.status, StatusCode::OK);

    let token = presign.data()["token"].as_str().unwrap().to_string();
    let urls = presign.data()["urls"].as_array().unwrap().clone();
    assert_eq!(urls.len(), 2);
    assert_eq!(presign.data()["expires_in"], 900);

    let mut files = Vec::new();
    for (url, (name, size)) in urls.iter().zip([("a.txt", 100usize), ("b.txt", 200)]) {
        let key = url["key"].as_str().unwrap();
        assert_eq!(url["filename"], name);
        assert!(key.starts_with(&format!("uploads/{token}/")));
        assert!(key.ends_with(&format!("_{name}")));
        assert!(url["upload_url"].as_str().unwrap().contains("method=PUT"));

        app.storage.put(key, vec![b'x'; size]).await;
        files.push(json!({"filename": name, "size": size, "key": key}));
    }

    let complete = app
        .request(
            "POST",
            "/api/v1/files/complete",
            Some(json!({"token": token, "files": files})),
            None,
        )
        .await;
    assert_eq!(complete.status, StatusCode::OK, "{:?}", complete.body);
    assert_eq!(complete.data()["share_code"], token.as_str());
    assert_eq!(complete.data()["expires_in"], 3600);

    let listing = app
        .request("GET", &format!("/api/v1/share/{token}"), None, None)
        .await;
    assert_eq!(listing.status, StatusCode::OK);
    let listed = listing.data()["files"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["filename"], "a.txt");
    assert_eq!(listed[0]["index"], 0);
    assert_eq!(listed[1]["filename"], "b.txt");
    assert_eq!(listed[1]["index"], 1);
    assert_eq!(listed[1]["content_type"], "application/octet-stream");
    assert!(listed[0].get("storage_key").is_none());

    let link = app
        .request(
            "GET",
            &format!("/api/v1/share/{token}/presign-download/1"),
            None,
            None,
        )
        .await;
    assert_eq!(link.status, StatusCode::OK);
    assert_eq!(link.data()["filename"], "b.txt");
    assert!(link.data()["url"].as_str().unwrap().contains("method=GET"));
}

#[tokio::test]
async fn test_token_unresolvable_until_complete() {
    let app = TestApp::new();
    let (token, _) = app.presign_and_upload(&[("a.txt", b"hello")], None).await;

    let response = app
        .request("GET", &format!("/api/v1/share/{token}"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.transfers.transfer_count().await, 0);
}

#[tokio::test]
async fn test_missing_object_registers_nothing() {
    let app = TestApp::new();
    let (token, files) = app
        .presign_and_upload(&[("a.txt", b"aaa"), ("b.txt", b"bbb")], None)
        .await;

    let b_key = files[1]["key"].as_str().unwrap();
    app.storage.delete(b_key).await.unwrap();

    let response = app
        .request(
            "POST",
            "/api/v1/files/complete",
            Some(json!({"token": token, "files": files})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "File not found: b.txt");

    assert_eq!(app.transfers.transfer_count().await, 0);
    assert_eq!(app.transfers.file_count().await, 0);
    let share = app
        .request("GET", &format!("/api/v1/share/{token}"), None, None)
        .await;
    assert_eq!(share.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_presign_over_cap_rejected() {
    let app = TestApp::new();
    let cap: u64 = 100 * 1024 * 1024;

    let response = app
        .request(
            "POST",
            "/api/v1/files/presign",
            Some(json!([
                {"filename": "big.bin", "size": cap},
                {"filename": "one.bin", "size": 1},
            ])),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
    assert_eq!(
        response.body["message"],
        "Total upload size exceeds the 100 MB limit"
    );

    let at_cap = app
        .request(
            "POST",
            "/api/v1/files/presign",
            Some(json!([{"filename": "big.bin", "size": cap}])),
            None,
        )
        .await;
    assert_eq!(at_cap.status, StatusCode::OK);
}

#[tokio::test]
async fn test_complete_checks_reported_sizes_against_cap() {
    let app = TestApp::new();
    let (token, mut files) = app.presign_and_upload(&[("a.txt", b"tiny")], None).await;
    files[0]["size"] = json!(100 * 1024 * 1024 + 1);

    let response = app
        .request(
            "POST",
            "/api/v1/files/complete",
            Some(json!({"token": token, "files": files})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.transfers.transfer_count().await, 0);
}

#[tokio::test]
async fn test_index_collision_rejected() {
    let app = TestApp::new();
    let (token, mut files) = app
        .presign_and_upload(&[("a.txt", b"a"), ("b.txt", b"b")], None)
        .await;
    files[0]["index"] = json!(0);
    files[1]["index"] = json!(0);

    let response = app
        .request(
            "POST",
            "/api/v1/files/complete",
            Some(json!({"token": token, "files": files})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Duplicate file index 0");
    assert_eq!(app.transfers.transfer_count().await, 0);
}

#[tokio::test]
async fn test_explicit_indices_order_listing() {
    let app = TestApp::new();
    let (token, mut files) = app
        .presign_and_upload(&[("a.txt", b"a"), ("b.txt", b"b")], None)
        .await;
    files[0]["index"] = json!(1);
    files[1]["index"] = json!(0);

    let response = app
        .request(
            "POST",
            "/api/v1/files/complete",
            Some(json!({"token": token, "files": files})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let listing = app
        .request("GET", &format!("/api/v1/share/{token}"), None, None)
        .await;
    let listed = listing.data()["files"].as_array().unwrap();
    assert_eq!(listed[0]["filename"], "b.txt");
    assert_eq!(listed[1]["filename"], "a.txt");
}

#[tokio::test]
async fn test_second_completion_conflicts() {
    let app = TestApp::new();
    let (token, files) = app.presign_and_upload(&[("a.txt", b"a")], None).await;
    let body = json!({"token": token, "files": files});

    let first = app
        .request("POST", "/api/v1/files/complete", Some(body.clone()), None)
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app
        .request("POST", "/api/v1/files/complete", Some(body), None)
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(app.transfers.transfer_count().await, 1);
}

#[tokio::test]
async fn test_key_from_another_transfer_rejected() {
    let app = TestApp::new();
    let (_, other_files) = app.presign_and_upload(&[("a.txt", b"a")], None).await;
    let (token, _) = app.presign_and_upload(&[("a.txt", b"a")], None).await;

    let response = app
        .request(
            "POST",
            "/api/v1/files/complete",
            Some(json!({"token": token, "files": other_files})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_fields_and_malformed_json_rejected() {
    let app = TestApp::new();

    let unknown = app
        .request(
            "POST",
            "/api/v1/files/presign",
            Some(json!([{"filename": "a.txt", "size": 1, "owner": "me"}])),
            None,
        )
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.error_code(), "VALIDATION_ERROR");

    let req = http::Request::builder()
        .method("POST")
        .uri("/api/v1/files/complete")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"token\": "))
        .unwrap();
    let malformed = app.send(req).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.body["success"], false);
}

#[tokio::test]
async fn test_empty_presign_rejected() {
    let app = TestApp::new();
    let response = app
        .request("POST", "/api/v1/files/presign", Some(json!([])), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "No files provided");
}
