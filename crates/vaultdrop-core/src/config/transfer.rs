//! Transfer limits and lifetimes.

use serde::{Deserialize, Serialize};

/// Limits applied by the upload orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Cap on the summed size of all files in one transfer.
    #[serde(default = "default_max_total_size")]
    pub max_total_size_bytes: u64,
    /// Maximum number of files in one transfer.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Lifetime of a transfer without recipients, in seconds.
    #[serde(default = "default_anonymous_ttl")]
    pub anonymous_ttl_seconds: u64,
    /// Lifetime of a transfer with recipients, in seconds.
    #[serde(default = "default_authenticated_ttl")]
    pub authenticated_ttl_seconds: u64,
    /// Random bytes behind each share token.
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
    /// Permit transfers that have no recipient list.
    #[serde(default = "default_true")]
    pub allow_anonymous: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_total_size_bytes: default_max_total_size(),
            max_files: default_max_files(),
            anonymous_ttl_seconds: default_anonymous_ttl(),
            authenticated_ttl_seconds: default_authenticated_ttl(),
            token_bytes: default_token_bytes(),
            allow_anonymous: true,
        }
    }
}

fn default_max_total_size() -> u64 {
    100 * 1024 * 1024
}

fn default_max_files() -> usize {
    100
}

fn default_anonymous_ttl() -> u64 {
    60 * 60
}

fn default_authenticated_ttl() -> u64 {
    24 * 60 * 60
}

fn default_token_bytes() -> usize {
    32
}

fn default_true() -> bool {
    true
}
