mod chat_completions_client;
mod connectivity_probe;
mod credential_store;
mod in_memory_state_store;
mod json_state_store;
mod scripted_completion_client;

pub use chat_completions_client::*;
pub use connectivity_probe::*;
pub use credential_store::*;
pub use in_memory_state_store::*;
pub use json_state_store::*;
pub use scripted_completion_client::*;
