//! Sender and recipient dashboards.

pub mod service;

pub use service::{TransferService, TransferSummary};
