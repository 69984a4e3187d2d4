//! Domain models for Symposia.
//!
//! These are the core types shared across all crates.

pub mod abstracts;
pub mod conference;
pub mod organization;
pub mod review;
pub mod role_assignment;
pub mod schedule;
pub mod session;
pub mod settings;
pub mod user;
