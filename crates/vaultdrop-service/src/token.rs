//! Share token generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use vaultdrop_core::error::AppError;
use vaultdrop_core::result::AppResult;

/// Generates unguessable URL-safe tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenGenerator;

impl TokenGenerator {
    /// Creates a new token generator.
    pub fn new() -> Self {
        Self
    }

    /// Draw `byte_length` bytes from the thread CSPRNG and encode them as
    /// unpadded URL-safe base64.
    pub fn generate(&self, byte_length: usize) -> AppResult<String> {
        if byte_length == 0 {
            return Err(AppError::validation("Token length must be positive"));
        }

        let mut bytes = vec![0u8; byte_length];
        rand::rng().fill_bytes(&mut bytes);
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Whether `token` could have come from [`TokenGenerator::generate`].
    pub fn is_well_formed(token: &str) -> bool {
        !token.is_empty()
            && token
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }
}
