//! In-memory conversation collection owned by the session.

mod conversation_repository;

pub use conversation_repository::*;
