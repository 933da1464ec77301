// Core pieces of the surveyor client:
// - Domain types shared by every crate
// - Configuration loading
// - The session service trait and an in-memory adapter
// - Shared error types

// Export types module - Sessions, messages, interests
pub mod types;
pub use types::*;

// Export config module - Configuration loading
pub mod config;
pub use config::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;

// Export service module - Remote session service seam
pub mod service;
pub use service::*;

pub mod adapters;
