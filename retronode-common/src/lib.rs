//! # RetroNode Common Library
//!
//! Shared code for the RetroNode server and its tooling:
//! - Error type shared across crates
//! - Configuration loading and root folder resolution
//! - Event types (LibraryEvent enum) and the EventBus
//! - Server-Sent Events helpers

pub mod config;
pub mod error;
pub mod events;
pub mod sse;

pub use error::{Error, Result};
