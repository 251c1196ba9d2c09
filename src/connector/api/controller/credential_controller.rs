use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::super::Container;

pub struct CredentialController<'a> {
    container: &'a Container,
}

impl<'a> CredentialController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Reads one line from standard input so the key never shows up in
    /// shell history or the process list.
    pub async fn set_key(&self) -> Result<String> {
        eprintln!("Paste your API key and press Enter:");
        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .context("Failed to read API key from stdin")?;

        self.container.session().set_credential(&line).await?;
        Ok("API key saved.".to_string())
    }

    pub async fn clear_key(&self) -> Result<String> {
        let fallback = self.container.session().clear_credential().await?;
        if fallback {
            Ok("API key override removed; using the packaged key.".to_string())
        } else {
            Ok("API key override removed; no key is configured.".to_string())
        }
    }
}
