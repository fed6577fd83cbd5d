//! # vaultdrop-entity
//!
//! Domain entity models for VaultDrop. Every struct in this crate
//! represents a database table row or the data needed to insert one.
//! Row types derive `sqlx::FromRow`.

pub mod file;
pub mod recipient;
pub mod transfer;
pub mod user;
