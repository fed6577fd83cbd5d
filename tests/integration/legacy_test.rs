//! Integration tests for the single-phase multipart upload.

mod helpers;

use http::StatusCode;

use helpers::TestApp;

#[tokio::test]
async fn test_multipart_upload_round_trip() {
    let app = TestApp::new();

    let response = app
        .upload_multipart(
            &[
                ("a.txt", "text/plain", b"first file"),
                ("b.bin", "application/octet-stream", b"\x00\x01\x02"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["expires_in"], 3600);
    let token = response.data()["share_code"].as_str().unwrap().to_string();

    let listing = app
        .request("GET", &format!("/api/v1/share/{token}"), None, None)
        .await;
    let files = listing.data()["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["filename"], "a.txt");
    assert_eq!(files[0]["size"], 10);
    assert_eq!(files[0]["content_type"], "text/plain");
    assert_eq!(files[1]["size"], 3);

    let download = app
        .request("GET", &format!("/api/v1/share/{token}/download/0"), None, None)
        .await;
    assert_eq!(download.bytes, b"first file");
}

#[tokio::test]
async fn test_multipart_over_cap_leaves_nothing_behind() {
    let app = TestApp::with_config(|c| c.transfers.max_total_size_bytes = 16);

    let response = app
        .upload_multipart(
            &[
                ("a.txt", "text/plain", b"0123456789"),
                ("b.txt", "text/plain", b"0123456789"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.error_code(), "PAYLOAD_TOO_LARGE");

    assert!(app.storage.is_empty().await);
    assert_eq!(app.transfers.transfer_count().await, 0);
}

#[tokio::test]
async fn test_multipart_without_files_rejected() {
    let app = TestApp::new();
    let response = app.upload_multipart(&[], None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.transfers.transfer_count().await, 0);
}

#[tokio::test]
async fn test_signed_in_multipart_is_open_link_owned_by_sender() {
    let app = TestApp::new();
    let (_, token) = app.user("judy").await;

    let response = app
        .upload_multipart(&[("a.txt", "text/plain", b"hi")], Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["expires_in"], 3600);

    let sent = app
        .request("GET", "/api/v1/transfers/sent", None, Some(&token))
        .await;
    assert_eq!(sent.data().as_array().unwrap().len(), 1);
}
