//! # Application Layer
//!
//! Ports, the session event stream, and the use cases that coordinate the
//! domain with storage and the completion service.

mod events;
pub mod interfaces;
mod session;
mod session_context;
pub mod use_cases;

pub use events::*;
pub use interfaces::*;
pub use session::*;
pub use session_context::*;
pub use use_cases::*;
