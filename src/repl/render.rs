//! Text rendering of store state for the terminal.

use std::fmt::Write as _;

use chrono::{DateTime, TimeZone};

use crate::chat::core::conversation::Conversation;
use crate::chat::core::ids::ModelId;
use crate::chat::core::message::{Message, Role};
use crate::chat::reply::catalog::{AVAILABLE_MODELS, PromptCategory, is_listed};
use crate::chat::store::history::HistoryGroup;
use crate::chat::store::state::ConversationStore;

/// Usage text for `/help`.
pub const HELP: &str = "\
Type a message and press enter to send it.

  /new                      start a new chat
  /list                     show the chat history
  /open <n|id>              open a chat by list number or id prefix
  /delete [n|id]            delete a chat (the open one by default)
  /rename <title>           rename the open chat
  /clear                    remove all messages from the open chat
  /model [id]               show or select the model
  /models                   list available models
  /sidebar                  show or hide the history after each change
  /prompts [category]       show example prompts
  /prompt <category> <n>    send an example prompt
  /reset                    delete every chat and the saved history
  /help                     show this help
  /quit                     leave";

/// Conversations in list order, matching the numbers printed by
/// [`history`].
#[must_use]
pub fn flatten<'a>(groups: &[HistoryGroup<'a>]) -> Vec<&'a Conversation> {
    groups
        .iter()
        .flat_map(|g| g.conversations.iter().copied())
        .collect()
}

/// The grouped history with 1-based numbers and an active marker.
#[must_use]
pub fn history(groups: &[HistoryGroup<'_>], active: Option<&Conversation>) -> String {
    if groups.is_empty() {
        return "No conversations yet.".to_string();
    }

    let mut out = String::new();
    let mut n = 0usize;
    for group in groups {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", group.label());
        for conv in &group.conversations {
            n += 1;
            let marker = if active.is_some_and(|a| a.id == conv.id) {
                '*'
            } else {
                ' '
            };
            let _ = writeln!(out, "{n:>3}. {marker} {}  [{}]", conv.title, conv.id.short());
        }
    }
    out.trim_end().to_string()
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "assistant",
    }
}

/// One message with its speaker.
#[must_use]
pub fn message(message: &Message) -> String {
    format!("{}> {}", speaker(message.role), message.content)
}

/// Header and every message of a conversation.
#[must_use]
pub fn conversation(conversation: &Conversation) -> String {
    let mut out = format!("== {} ==", conversation.title);
    if conversation.messages.is_empty() {
        out.push_str("\n(no messages)");
    }
    for m in &conversation.messages {
        out.push_str("\n\n");
        out.push_str(&message(m));
    }
    out
}

/// The empty-state greeting shown when no conversation is open.
#[must_use]
pub fn empty_state(model: &ModelId) -> String {
    format!(
        "What can I help you with?\nModel: {model}\nType a message, or /prompts for ideas."
    )
}

/// Selector entries with the selected one marked. An unlisted selection is
/// shown as a custom entry.
#[must_use]
pub fn models(selected: &ModelId) -> String {
    let mut lines: Vec<String> = AVAILABLE_MODELS
        .iter()
        .map(|m| {
            let marker = if *m == selected.as_str() { '*' } else { ' ' };
            format!("{marker} {m}")
        })
        .collect();
    if !is_listed(selected) {
        lines.push(format!("* {selected} (custom)"));
    }
    lines.join("\n")
}

/// Example prompts, numbered per tab.
#[must_use]
pub fn prompts(category: Option<PromptCategory>) -> String {
    let categories: Vec<PromptCategory> =
        category.map_or_else(|| PromptCategory::ALL.to_vec(), |c| vec![c]);

    let mut out = String::new();
    for c in categories {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "{c}");
        for (i, example) in c.examples().iter().enumerate() {
            let _ = writeln!(out, "  {}. {example}", i + 1);
        }
    }
    out.trim_end().to_string()
}

/// History grouped against `now`, rendered.
#[must_use]
pub fn sidebar<Tz: TimeZone>(store: &ConversationStore, now: &DateTime<Tz>) -> String {
    history(&store.history(now), store.active_conversation())
}
