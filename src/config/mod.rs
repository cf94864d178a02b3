//! Configuration for questcard
//!
//! Provides types and loading for the `questcard.toml` file.

pub mod loader;
pub mod schema;

pub use schema::*;
