//! # vaultdrop-core
//!
//! Core crate for VaultDrop. Contains configuration schemas, the object
//! storage trait, shared response envelopes, and the unified error system.
//!
//! This crate has **no** internal dependencies on other VaultDrop crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
