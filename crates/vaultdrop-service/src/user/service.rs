//! User account service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use vaultdrop_auth::jwt::JwtEncoder;
use vaultdrop_auth::password::{PasswordHasher, PasswordValidator};
use vaultdrop_core::error::AppError;
use vaultdrop_core::result::AppResult;
use vaultdrop_database::store::UserStore;
use vaultdrop_entity::user::{CreateUser, User};

use crate::context::Caller;

/// Registration input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUp {
    /// Unique handle, 3 to 32 characters of `[A-Za-z0-9_-]`.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Public key recipients' envelopes are wrapped with.
    pub public_key: Option<String>,
    /// Private key encrypted client-side, stored verbatim.
    pub encrypted_private_key: Option<String>,
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// The authenticated user.
    pub user: User,
    /// Signed session token.
    pub token: String,
    /// Session expiry.
    pub expires_at: DateTime<Utc>,
}

/// Public key lookup result, used by senders to wrap content keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyInfo {
    /// User ID to place in a recipient grant.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// The user's public key.
    pub public_key: String,
}

/// Manages accounts and session issuance.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    policy: PasswordValidator,
    encoder: JwtEncoder,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        users: Arc<dyn UserStore>,
        policy: PasswordValidator,
        encoder: JwtEncoder,
    ) -> Self {
        Self {
            users,
            hasher: PasswordHasher::new(),
            policy,
            encoder,
        }
    }

    /// Create an account.
    pub async fn register(&self, input: SignUp) -> AppResult<User> {
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_lowercase();

        validate_username(&username)?;
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::validation("A valid email address is required"));
        }
        self.policy.validate(&input.password)?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AppError::conflict("Username is already taken"));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User already exists with this email"));
        }

        let password_hash = self.hasher.hash_password(&input.password)?;
        let user = self
            .users
            .create(CreateUser {
                username,
                email,
                password_hash,
                public_key: non_blank(input.public_key),
                encrypted_private_key: non_blank(input.encrypted_private_key),
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verify credentials and issue a session token.
    ///
    /// `identifier` may be a username or an email address. Unknown accounts
    /// and wrong passwords produce the same error.
    pub async fn login(&self, identifier: &str, password: &str) -> AppResult<LoginResult> {
        let identifier = identifier.trim();
        let user = if identifier.contains('@') {
            self.users.find_by_email(&identifier.to_lowercase()).await?
        } else {
            self.users.find_by_username(identifier).await?
        };

        let user = match user {
            Some(user) if self.hasher.verify_password(password, &user.password_hash)? => user,
            _ => return Err(AppError::authentication("Invalid credentials")),
        };

        let (token, expires_at) = self.encoder.issue(user.id, &user.username)?;
        info!(user_id = %user.id, "User logged in");

        Ok(LoginResult {
            user,
            token,
            expires_at,
        })
    }

    /// The caller's own account.
    pub async fn me(&self, caller: &Caller) -> AppResult<User> {
        self.users
            .find_by_id(caller.user_id)
            .await?
            .ok_or_else(|| AppError::authentication("Account no longer exists"))
    }

    /// Look up the public key of `username`.
    pub async fn public_key(&self, username: &str) -> AppResult<PublicKeyInfo> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User not found: {username}")))?;

        let public_key = user
            .public_key
            .ok_or_else(|| AppError::not_found(format!("{username} has not published a public key")))?;

        Ok(PublicKeyInfo {
            id: user.id,
            username: user.username,
            public_key,
        })
    }
}

fn validate_username(username: &str) -> AppResult<()> {
    let length = username.chars().count();
    if !(3..=32).contains(&length) {
        return Err(AppError::validation(
            "Username must be between 3 and 32 characters",
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::validation(
            "Username may contain only letters, digits, '_' and '-'",
        ));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
