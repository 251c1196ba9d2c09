use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::application::{ChatSession, SessionEvent};
use crate::connector::api::controller::conversation_controller::{
    format_summaries, format_transcript,
};
use crate::connector::api::controller::message_controller::format_outcome;
use crate::connector::Container;
use crate::domain::{clamp_pasted, counter_label, is_near_limit, NoticeLevel};

const HELP: &str = "\
Commands:
  /new              start a new conversation
  /list             list conversations
  /select <id>      switch to a conversation
  /rename <title>   rename the active conversation
  /delete [id]      delete a conversation (the active one by default)
  /show             print the active conversation
  /paste <text>     send text, cut to the length limit
  /key              enter a new API key
  /clearkey         forget the stored API key
  /help             show this help
  /quit             leave";

/// A line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Message(String),
    Paste(String),
    New,
    List,
    Select(String),
    Rename(String),
    Delete(Option<String>),
    Show,
    Key,
    ClearKey,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return ReplCommand::Empty;
        }
        let Some(command) = trimmed.strip_prefix('/') else {
            return ReplCommand::Message(line.trim_end_matches(['\r', '\n']).to_string());
        };

        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };
        match (name, rest) {
            ("new", _) => ReplCommand::New,
            ("list", _) => ReplCommand::List,
            ("select", id) if !id.is_empty() => ReplCommand::Select(id.to_string()),
            ("rename", title) if !title.is_empty() => ReplCommand::Rename(title.to_string()),
            ("delete", "") => ReplCommand::Delete(None),
            ("delete", id) => ReplCommand::Delete(Some(id.to_string())),
            ("show", _) => ReplCommand::Show,
            ("paste", text) if !text.is_empty() => ReplCommand::Paste(text.to_string()),
            ("key", _) => ReplCommand::Key,
            ("clearkey", _) => ReplCommand::ClearKey,
            ("help", _) => ReplCommand::Help,
            ("quit" | "exit", _) => ReplCommand::Quit,
            _ => ReplCommand::Unknown(trimmed.to_string()),
        }
    }
}

/// Interactive loop over standard input until `/quit` or EOF.
pub async fn run(container: &Container) -> Result<()> {
    let session = container.session();
    let mut events = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let max_length = session.max_message_length();

    if let Some(active) = session.active_conversation().await {
        println!("{}", format_transcript(&active));
    }
    if !session.has_credential().await {
        println!("No API key configured. Use /key to enter one.");
    }
    println!("Type a message, or /help for commands.");

    loop {
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => break,
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Unknown(input) => println!("Unknown command: {input}. Try /help."),
            ReplCommand::Message(text) => {
                let (text, note) = outgoing_text(&text, false, max_length);
                send_text(session, &text, note).await;
            }
            ReplCommand::Paste(text) => {
                let (text, note) = outgoing_text(&text, true, max_length);
                send_text(session, &text, note).await;
            }
            ReplCommand::New => {
                if let Ok(conversation) = session.create_conversation().await {
                    println!("{}", format_transcript(&conversation));
                }
            }
            ReplCommand::List => println!("{}", format_summaries(&session.conversations().await)),
            ReplCommand::Select(id) => {
                if let Ok(conversation) = session.select_conversation(&id).await {
                    println!("{}", format_transcript(&conversation));
                }
            }
            ReplCommand::Rename(title) => {
                if let Some(active) = session.active_conversation().await {
                    let _ = session.rename_conversation(active.id(), &title).await;
                }
            }
            ReplCommand::Delete(id) => {
                let id = match id {
                    Some(id) => Some(id),
                    None => session
                        .active_conversation()
                        .await
                        .map(|c| c.id().to_string()),
                };
                if let Some(id) = id {
                    let _ = session.delete_conversation(&id).await;
                }
            }
            ReplCommand::Show => {
                if let Some(active) = session.active_conversation().await {
                    println!("{}", format_transcript(&active));
                }
            }
            ReplCommand::Key => {
                println!("Paste your API key and press Enter:");
                if let Some(key) = lines.next_line().await? {
                    let _ = session.set_credential(&key).await;
                }
            }
            ReplCommand::ClearKey => {
                let _ = session.clear_credential().await;
            }
        }

        drain_events(&mut events);
    }

    Ok(())
}

/// Text to send and an optional note for the user. Typed lines pass through
/// untouched so an over-length one is rejected by the session; pasted text
/// is cut to the limit.
fn outgoing_text(text: &str, pasted: bool, max_length: usize) -> (String, Option<String>) {
    let (text, truncated) = if pasted {
        clamp_pasted(text, max_length)
    } else {
        (text.to_string(), false)
    };
    let note = if truncated {
        Some(format!("Message truncated to {} characters.", max_length))
    } else if is_near_limit(&text, max_length) {
        Some(counter_label(&text, max_length))
    } else {
        None
    };
    (text, note)
}

async fn send_text(session: &ChatSession, text: &str, note: Option<String>) {
    if let Some(note) = note {
        println!("{note}");
    }
    let spinner = thinking_spinner();
    let result = session.send(text).await;
    spinner.finish_and_clear();
    if let Ok(outcome) = result {
        println!("{}", format_outcome(&outcome));
    }
}

/// Prints notices raised by the last command. Info and success notices are
/// left to the command's own output.
fn drain_events(events: &mut broadcast::Receiver<SessionEvent>) {
    loop {
        match events.try_recv() {
            Ok(SessionEvent::StatusChanged(notice)) => match notice.level {
                NoticeLevel::Warning | NoticeLevel::Error => eprintln!("{}", notice),
                NoticeLevel::Info | NoticeLevel::Success => {}
            },
            Ok(SessionEvent::CredentialRequired) => {
                eprintln!("An API key is required. Use /key to enter one.")
            }
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Thinking...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(
            ReplCommand::parse("Hello there\n"),
            ReplCommand::Message("Hello there".to_string())
        );
        assert_eq!(ReplCommand::parse("   "), ReplCommand::Empty);
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(ReplCommand::parse("/new"), ReplCommand::New);
        assert_eq!(
            ReplCommand::parse("/select chat_1_abc"),
            ReplCommand::Select("chat_1_abc".to_string())
        );
        assert_eq!(
            ReplCommand::parse("/rename  Homework help "),
            ReplCommand::Rename("Homework help".to_string())
        );
        assert_eq!(ReplCommand::parse("/delete"), ReplCommand::Delete(None));
        assert_eq!(ReplCommand::parse("/exit"), ReplCommand::Quit);
        assert_eq!(
            ReplCommand::parse("/select"),
            ReplCommand::Unknown("/select".to_string())
        );
        assert_eq!(
            ReplCommand::parse("/paste  long text "),
            ReplCommand::Paste("long text".to_string())
        );
        assert_eq!(
            ReplCommand::parse("/paste"),
            ReplCommand::Unknown("/paste".to_string())
        );
    }

    #[test]
    fn test_typed_over_length_line_is_sent_unchanged() {
        let typed = "x".repeat(12);
        let (text, note) = outgoing_text(&typed, false, 10);
        assert_eq!(text, typed);
        assert_eq!(note.as_deref(), Some("12/10"));
    }

    #[test]
    fn test_pasted_text_is_cut_to_the_limit() {
        let (text, note) = outgoing_text(&"x".repeat(12), true, 10);
        assert_eq!(text.chars().count(), 10);
        assert_eq!(note.as_deref(), Some("Message truncated to 10 characters."));

        let (text, note) = outgoing_text("short", true, 10);
        assert_eq!(text, "short");
        assert_eq!(note, None);
    }
}
