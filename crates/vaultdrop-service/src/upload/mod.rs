//! Upload orchestration: the presign/complete protocol and the
//! single-phase streaming path.

pub mod direct;
pub mod service;
pub mod validate;

pub use direct::DirectUpload;
pub use service::{
    CompleteUpload, CompletedFile, PresignFile, PresignResponse, PresignedUpload, RecipientGrant,
    TransferReceipt, UploadService,
};
