//! # vaultdrop-auth
//!
//! Session credentials for VaultDrop: signed JWTs carried in a cookie or
//! bearer header, and Argon2id password hashing.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
