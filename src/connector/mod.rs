//! # Connector Layer
//!
//! External integrations implementing the application ports:
//! - Storage (JSON file for conversations and the key override, in-memory for tests)
//! - Completions (HTTP `chat/completions` client, scripted mock)
//! - Connectivity probing

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
