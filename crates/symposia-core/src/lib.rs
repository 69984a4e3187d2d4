//! Symposia Core — domain models, permission vocabulary, and repository
//! trait definitions shared across all crates.

pub mod error;
pub mod models;
pub mod permission;
pub mod repository;
pub mod validate;

pub use error::{SymposiaError, SymposiaResult};
