//! PostgreSQL implementations of the registry traits.

pub mod transfer;
pub mod user;

pub use transfer::TransferRepository;
pub use user::UserRepository;

use vaultdrop_core::error::{AppError, ErrorKind};

/// Map a write failure, turning unique violations into `Conflict`.
pub(crate) fn map_write_error(err: sqlx::Error, context: &str) -> AppError {
    let violated = match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Some(db.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    };

    match violated {
        Some(constraint) => {
            AppError::with_source(ErrorKind::Conflict, conflict_message(&constraint), err)
        }
        None => AppError::with_source(ErrorKind::Database, context, err),
    }
}

fn conflict_message(constraint: &str) -> &'static str {
    match constraint {
        "transfers_token_key" => "A transfer with this token has already been completed",
        "files_transfer_index_key" => "Two files share the same index",
        "recipients_transfer_receiver_key" => "A recipient was listed more than once",
        "users_username_key" => "Username is already taken",
        "users_email_key" => "User already exists with this email",
        _ => "Resource already exists",
    }
}
