//! # vaultdrop-database
//!
//! The transfer registry. Defines the [`TransferStore`] and [`UserStore`]
//! traits the services depend on, the PostgreSQL repositories that
//! implement them, and in-memory stores used by tests and development.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::{MemoryTransferStore, MemoryUserStore};
pub use repositories::{TransferRepository, UserRepository};
pub use store::{TransferStore, UserStore};
