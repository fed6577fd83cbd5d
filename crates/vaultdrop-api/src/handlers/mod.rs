//! HTTP request handlers organized by domain.

pub mod auth;
pub mod health;
pub mod share;
pub mod transfer;
pub mod upload;
pub mod user;
