//! Transfer file entities.

pub mod model;

pub use model::{File, NewFile};
