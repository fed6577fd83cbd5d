//! Account registration, login, and public key lookup.

pub mod service;

pub use service::{LoginResult, PublicKeyInfo, SignUp, UserService};
