pub mod conversation_controller;
pub mod credential_controller;
pub mod message_controller;

pub use conversation_controller::ConversationController;
pub use credential_controller::CredentialController;
pub use message_controller::MessageController;
