pub mod repl;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat in the active conversation
    Chat,

    /// Send one message to the active conversation and print the reply
    Send {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// List conversations, most recently updated first
    List,

    /// Print a conversation's messages (the active one by default)
    Show { id: Option<String> },

    /// Start a new conversation and make it active
    New,

    /// Make a conversation the active one
    Select { id: String },

    Rename {
        id: String,

        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    Delete { id: String },

    /// Read an API key from standard input and store it as the override
    SetKey,

    /// Forget the stored API key override
    ClearKey,
}
