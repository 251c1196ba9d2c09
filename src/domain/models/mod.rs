mod chat_state;
mod conversation;
mod credential;
mod draft;
mod failure;
mod message;
mod notice;
mod settings;

pub use chat_state::*;
pub use conversation::*;
pub use credential::*;
pub use draft::*;
pub use failure::*;
pub use message::*;
pub use notice::*;
pub use settings::*;
