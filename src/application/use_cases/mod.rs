mod bootstrap_session;
mod manage_conversations;
mod manage_credential;
mod send_message;

pub use bootstrap_session::*;
pub use manage_conversations::*;
pub use manage_credential::*;
pub use send_message::*;
