//! Transfer domain entities.

pub mod model;

pub use model::{NewTransfer, Transfer};
