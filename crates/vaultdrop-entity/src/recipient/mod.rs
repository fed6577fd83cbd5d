//! Recipient grant entities.

pub mod model;

pub use model::{NewRecipient, Recipient};
