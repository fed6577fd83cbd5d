//! # vaultdrop-service
//!
//! Business logic for VaultDrop. Each service receives its stores and the
//! object store at construction time as `Arc` handles, and every operation
//! takes the caller identity as an explicit `Option<&Caller>`.

pub mod context;
pub mod share;
pub mod token;
pub mod transfer;
pub mod upload;
pub mod user;

pub use context::Caller;
pub use share::ShareService;
pub use token::TokenGenerator;
pub use transfer::TransferService;
pub use upload::{DirectUpload, UploadService};
pub use user::UserService;
