//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Expired-transfer cleanup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the cleanup scheduler runs in this process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression (with seconds) for the cleanup sweep.
    #[serde(default = "default_cleanup_cron")]
    pub cleanup_cron: String,
    /// Maximum transfers handled per sweep.
    #[serde(default = "default_batch_size")]
    pub cleanup_batch_size: i64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cleanup_cron: default_cleanup_cron(),
            cleanup_batch_size: default_batch_size(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cleanup_cron() -> String {
    "0 */10 * * * *".to_string()
}

fn default_batch_size() -> i64 {
    200
}
