use anyhow::Result;

use crate::application::SendOutcome;

use super::super::Container;

pub struct MessageController<'a> {
    container: &'a Container,
}

impl<'a> MessageController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn send(&self, message: Vec<String>) -> Result<String> {
        let text = message.join(" ");
        let outcome = self.container.session().send(&text).await?;
        Ok(format_outcome(&outcome))
    }
}

pub fn format_outcome(outcome: &SendOutcome) -> String {
    match outcome {
        SendOutcome::Replied { reply, .. } => reply.content().to_string(),
        SendOutcome::Failed { error_message, .. } => error_message.content().to_string(),
    }
}
