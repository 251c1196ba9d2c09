//! # Domain Layer
//!
//! Conversations, messages and the rules that govern them.
//! This layer is independent of storage, transport and presentation.

mod error;
pub mod models;
pub mod repositories;

pub use error::*;
pub use models::*;
pub use repositories::*;
