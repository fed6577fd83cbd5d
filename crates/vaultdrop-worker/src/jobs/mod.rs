//! Job implementations.

pub mod cleanup;
