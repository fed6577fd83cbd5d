//! Request DTOs with validation.
//!
//! Every body rejects unknown fields. Fields that clients commonly send in
//! camelCase accept that spelling as an alias.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use vaultdrop_service::upload::{CompleteUpload, CompletedFile, PresignFile, RecipientGrant};
use vaultdrop_service::user::SignUp;

/// One entry of the presign request array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresignFileRequest {
    /// Original filename.
    pub filename: String,
    /// Declared size in bytes.
    pub size: u64,
}

impl From<PresignFileRequest> for PresignFile {
    fn from(req: PresignFileRequest) -> Self {
        Self {
            filename: req.filename,
            size: req.size,
        }
    }
}

/// One uploaded file reported on completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletedFileRequest {
    /// Original filename.
    pub filename: String,
    /// Size in bytes.
    pub size: u64,
    /// Storage key returned by presign.
    pub key: String,
    /// MIME type.
    #[serde(default, alias = "contentType")]
    pub content_type: Option<String>,
    /// Explicit position in the transfer.
    #[serde(default)]
    pub index: Option<i32>,
}

/// A recipient grant: who may open the transfer, and their wrapped key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipientRequest {
    /// Receiving user ID.
    #[serde(alias = "receiverId")]
    pub receiver_id: Uuid,
    /// Content key wrapped for the receiver.
    #[serde(alias = "encryptedKey")]
    pub encrypted_key: String,
}

/// Completion request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CompleteRequest {
    /// Token issued by presign.
    #[validate(length(min = 1, message = "Missing token"))]
    pub token: String,
    /// Uploaded files.
    #[validate(length(min = 1, message = "No files provided"))]
    pub files: Vec<CompletedFileRequest>,
    /// Recipient grants; empty for an open link.
    #[serde(default)]
    pub recipients: Vec<RecipientRequest>,
}

impl From<CompleteRequest> for CompleteUpload {
    fn from(req: CompleteRequest) -> Self {
        Self {
            token: req.token,
            files: req
                .files
                .into_iter()
                .map(|f| CompletedFile {
                    filename: f.filename,
                    size: f.size,
                    key: f.key,
                    content_type: f.content_type,
                    index: f.index,
                })
                .collect(),
            recipients: req
                .recipients
                .into_iter()
                .map(|r| RecipientGrant {
                    receiver_id: r.receiver_id,
                    encrypted_key: r.encrypted_key,
                })
                .collect(),
        }
    }
}

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SignUpRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Email.
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Public key for recipient envelopes.
    #[serde(default, alias = "publicKey")]
    pub public_key: Option<String>,
    /// Client-side encrypted private key.
    #[serde(default, alias = "encryptedPrivateKey")]
    pub encrypted_private_key: Option<String>,
}

impl From<SignUpRequest> for SignUp {
    fn from(req: SignUpRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
            public_key: req.public_key,
            encrypted_private_key: req.encrypted_private_key,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    /// Username or email address.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_accepts_camel_case_aliases() {
        let req: CompleteRequest = serde_json::from_value(serde_json::json!({
            "token": "tok",
            "files": [{"filename": "a", "size": 1, "key": "uploads/tok/x_a", "contentType": "text/plain"}],
            "recipients": [{"receiverId": Uuid::nil(), "encryptedKey": "k"}]
        }))
        .unwrap();
        assert_eq!(req.files[0].content_type.as_deref(), Some("text/plain"));
        assert_eq!(req.recipients[0].encrypted_key, "k");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<PresignFileRequest, _> = serde_json::from_value(serde_json::json!({
            "filename": "a", "size": 1, "owner": "me"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_complete_requires_files() {
        let req: CompleteRequest =
            serde_json::from_value(serde_json::json!({"token": "tok", "files": []})).unwrap();
        assert!(req.validate().is_err());
    }
}
