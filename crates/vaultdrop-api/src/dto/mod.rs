//! Data transfer objects for API requests and responses.

pub mod request;
pub mod response;
