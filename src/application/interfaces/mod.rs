mod completion_client;
mod connectivity_probe;
mod credential_store;
mod state_store;

pub use completion_client::*;
pub use connectivity_probe::*;
pub use credential_store::*;
pub use state_store::*;
