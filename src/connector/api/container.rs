use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::{
    ChatSession, CompletionClient, ConnectivityProbe, CredentialStore, EventBus, SessionServices,
    StateStore,
};
use crate::connector::adapter::{
    ChatCompletionsClient, FileCredentialStore, HttpConnectivityProbe, InMemoryCredentialStore,
    InMemoryStateStore, JsonFileStateStore, ScriptedCompletionClient, StaticConnectivity,
};
use crate::domain::Settings;

const CONFIG_FILE: &str = "config.json";
const MOCK_API_KEY: &str = "mock-key";

pub struct ContainerConfig {
    pub data_dir: String,
    /// Keep conversations and the key override in memory only.
    pub memory_storage: bool,
    /// Answer from a local echo client instead of the network.
    pub mock_completions: bool,
}

/// Wires adapters to the session according to the command line and
/// `<data_dir>/config.json`.
pub struct Container {
    session: ChatSession,
}

impl Container {
    pub async fn new(config: ContainerConfig) -> Result<Self> {
        let mut settings = load_settings(Path::new(&config.data_dir))?.with_env_overrides();
        if config.mock_completions && settings.packaged_credential().is_none() {
            debug!("Mock completions: using a placeholder API key");
            settings.packaged_api_key = Some(MOCK_API_KEY.to_string());
        }

        let (store, credentials): (Arc<dyn StateStore>, Arc<dyn CredentialStore>) =
            if config.memory_storage {
                debug!("Using in-memory conversation storage");
                (
                    Arc::new(InMemoryStateStore::new(settings.session.max_chats)),
                    Arc::new(InMemoryCredentialStore::new()),
                )
            } else {
                let store = JsonFileStateStore::new(&config.data_dir, settings.session.max_chats);
                debug!("Using conversation file {}", store.path().display());
                (
                    Arc::new(store),
                    Arc::new(FileCredentialStore::new(&config.data_dir)),
                )
            };

        let (completion, connectivity): (Arc<dyn CompletionClient>, Arc<dyn ConnectivityProbe>) =
            if config.mock_completions {
                debug!("Using mock completion client");
                (
                    Arc::new(ScriptedCompletionClient::new()),
                    Arc::new(StaticConnectivity::online()),
                )
            } else {
                debug!(
                    "Using completion endpoint {} with model {}",
                    settings.completion.endpoint, settings.completion.model
                );
                (
                    Arc::new(ChatCompletionsClient::new(settings.completion.clone())),
                    Arc::new(HttpConnectivityProbe::new(&settings.completion.endpoint)),
                )
            };

        let services = SessionServices {
            store,
            completion,
            credentials,
            connectivity,
        };
        let session = ChatSession::start(services, &settings, EventBus::new()).await?;

        Ok(Self { session })
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }
}

/// Reads `config.json` from the data directory; defaults when absent.
pub fn load_settings(data_dir: &Path) -> Result<Settings> {
    let path: PathBuf = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let settings = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_settings(dir.path()).unwrap(), Settings::default());
    }

    #[test]
    fn test_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"session": {"max_chats": 4}, "packaged_api_key": "bundled"}"#,
        )
        .unwrap();

        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings.session.max_chats, 4);
        assert_eq!(settings.packaged_credential().unwrap().expose(), "bundled");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ nope").unwrap();
        assert!(load_settings(dir.path()).is_err());
    }

    #[tokio::test]
    async fn test_mock_container_starts_with_placeholder_key() {
        let container = Container::new(ContainerConfig {
            data_dir: tempfile::tempdir().unwrap().path().to_string_lossy().to_string(),
            memory_storage: true,
            mock_completions: true,
        })
        .await
        .unwrap();

        assert!(container.session().has_credential().await);
        assert_eq!(container.session().conversations().await.len(), 1);
    }
}
