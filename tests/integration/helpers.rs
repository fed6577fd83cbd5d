//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use http::{HeaderMap, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use vaultdrop_api::{AppState, build_router};
use vaultdrop_core::config::AppConfig;
use vaultdrop_database::{MemoryTransferStore, MemoryUserStore};
use vaultdrop_storage::MemoryObjectStore;

pub const BOUNDARY: &str = "vaultdrop-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Transfer registry, shared with the router
    pub transfers: MemoryTransferStore,
    /// Account store, shared with the router
    pub users: MemoryUserStore,
    /// Object store, shared with the router
    pub storage: MemoryObjectStore,
    /// Application config
    pub config: AppConfig,
}

/// Test response wrapper
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body parsed as JSON (`Null` when not JSON)
    pub body: Value,
    /// Raw response body
    pub bytes: Vec<u8>,
}

impl TestResponse {
    /// The `data` member of the success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The machine-readable code of the error envelope.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    /// Every `Set-Cookie` header value.
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(String::from)
            .collect()
    }
}

impl TestApp {
    /// Create a new test application over in-memory stores
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test application with adjusted configuration
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret".to_string();
        adjust(&mut config);

        let transfers = MemoryTransferStore::new();
        let users = MemoryUserStore::new();
        let storage = MemoryObjectStore::new();

        let state = AppState::new(
            config.clone(),
            Arc::new(transfers.clone()),
            Arc::new(users.clone()),
            Arc::new(storage.clone()),
        );

        Self {
            router: build_router(state),
            transfers,
            users,
            storage,
            config,
        }
    }

    /// Make a JSON request; `token` is sent as the session cookie
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(CONTENT_TYPE, "application/json");

        if let Some(t) = token {
            req = req.header(COOKIE, format!("token={t}"));
        }

        self.send(req.body(Body::from(body_str)).expect("Failed to build request"))
            .await
    }

    /// Send a prepared request
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body")
            .to_vec();

        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            bytes,
        }
    }

    /// POST a multipart body with one part per `(filename, content_type, data)`
    pub async fn upload_multipart(
        &self,
        parts: &[(&str, &str, &[u8])],
        token: Option<&str>,
    ) -> TestResponse {
        let mut body = Vec::new();
        for (filename, content_type, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut req = Request::builder()
            .method("POST")
            .uri("/api/v1/files")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(t) = token {
            req = req.header(COOKIE, format!("token={t}"));
        }

        self.send(req.body(Body::from(body)).expect("Failed to build request"))
            .await
    }

    /// Register an account with a public key and return its ID
    pub async fn sign_up(&self, username: &str, password: &str) -> Uuid {
        let response = self
            .request(
                "POST",
                "/api/v1/auth/sign-up",
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": password,
                    "public_key": format!("{username}-public-key"),
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Sign-up failed: {:?}",
            response.body
        );

        response.data()["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("No id in sign-up response")
    }

    /// Login and return the session token from the cookie
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/v1/auth/login",
                Some(json!({
                    "username": username,
                    "password": password,
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response
            .set_cookies()
            .iter()
            .find_map(|c| c.strip_prefix("token="))
            .and_then(|rest| rest.split(';').next())
            .map(String::from)
            .expect("No session cookie in login response")
    }

    /// Sign up and log in, returning the user ID and session token
    pub async fn user(&self, username: &str) -> (Uuid, String) {
        let id = self.sign_up(username, "password123").await;
        let token = self.login(username, "password123").await;
        (id, token)
    }

    /// Presign `files`, upload their bytes to the object store, and return
    /// the presign token with the completion file list.
    pub async fn presign_and_upload(
        &self,
        files: &[(&str, &[u8])],
        token: Option<&str>,
    ) -> (String, Vec<Value>) {
        let announce: Vec<Value> = files
            .iter()
            .map(|(name, data)| json!({"filename": name, "size": data.len()}))
            .collect();

        let response = self
            .request(
                "POST",
                "/api/v1/files/presign",
                Some(Value::Array(announce)),
                token,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Presign failed: {:?}",
            response.body
        );

        let transfer_token = response.data()["token"]
            .as_str()
            .expect("No token in presign response")
            .to_string();

        let mut completed = Vec::new();
        for ((name, data), url) in files.iter().zip(
            response.data()["urls"]
                .as_array()
                .expect("No urls in presign response"),
        ) {
            let key = url["key"].as_str().expect("No key").to_string();
            self.storage.put(&key, data.to_vec()).await;
            completed.push(json!({
                "filename": name,
                "size": data.len(),
                "key": key,
                "content_type": "text/plain",
            }));
        }

        (transfer_token, completed)
    }

    /// Full presign/complete round for an open transfer; returns the share code
    pub async fn upload_open(&self, files: &[(&str, &[u8])], token: Option<&str>) -> String {
        let (transfer_token, completed) = self.presign_and_upload(files, token).await;
        let response = self
            .request(
                "POST",
                "/api/v1/files/complete",
                Some(json!({"token": transfer_token, "files": completed})),
                token,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Complete failed: {:?}",
            response.body
        );

        response.data()["share_code"]
            .as_str()
            .expect("No share_code")
            .to_string()
    }
}
