pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use cli::Commands;

pub use application::{
    BootstrapSessionUseCase, ChatSession, CompletionClient, ConnectivityProbe, CredentialStore,
    EventBus, ManageConversationsUseCase, ManageCredentialUseCase, SendMessageUseCase,
    SendOutcome, SessionEvent, SessionServices, StateStore,
};

pub use connector::{
    ChatCompletionsClient, Container, ContainerConfig, FileCredentialStore, HttpConnectivityProbe,
    InMemoryCredentialStore, InMemoryStateStore, JsonFileStateStore, Router,
    ScriptedCompletionClient, ScriptedReply, StaticConnectivity,
};

pub use domain::{
    ChatState, CompletionSettings, Conversation, ConversationRepository, ConversationSummary,
    Credential, DomainError, FailureKind, Message, MessageDraft, Role, SessionSettings, Settings,
    StatusNotice,
};
