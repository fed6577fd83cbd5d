//! Background tasks for VaultDrop.
//!
//! This crate provides:
//! - A cron scheduler hosting periodic tasks
//! - The expired-transfer cleanup sweep

pub mod jobs;
pub mod scheduler;

pub use jobs::cleanup::{CleanupReport, ExpiredTransferCleanup};
pub use scheduler::CronScheduler;
