//! Shared types for the to-do service.

pub mod types;

pub use types::{TodoId, UserId};
