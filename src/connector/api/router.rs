use anyhow::Result;

use crate::cli::repl;
use crate::Commands;

use super::container::Container;
use super::controller::{ConversationController, CredentialController, MessageController};

pub struct Router<'a> {
    container: &'a Container,
    conversation_controller: ConversationController<'a>,
    message_controller: MessageController<'a>,
    credential_controller: CredentialController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            container,
            conversation_controller: ConversationController::new(container),
            message_controller: MessageController::new(container),
            credential_controller: CredentialController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Chat => {
                repl::run(self.container).await?;
                Ok(String::new())
            }
            Commands::Send { message } => self.message_controller.send(message).await,
            Commands::List => self.conversation_controller.list().await,
            Commands::Show { id } => self.conversation_controller.show(id).await,
            Commands::New => self.conversation_controller.create().await,
            Commands::Select { id } => self.conversation_controller.select(id).await,
            Commands::Rename { id, title } => self.conversation_controller.rename(id, title).await,
            Commands::Delete { id } => self.conversation_controller.delete(id).await,
            Commands::SetKey => self.credential_controller.set_key().await,
            Commands::ClearKey => self.credential_controller.clear_key().await,
        }
    }
}
