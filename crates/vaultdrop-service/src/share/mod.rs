//! Share resolution: token lookup, expiry, recipient gate, and download.

pub mod access;
pub mod service;

pub use access::{AccessGate, ShareAccess};
pub use service::{DownloadLink, FileDownload, SenderInfo, ShareListing, ShareService, SharedFile};
