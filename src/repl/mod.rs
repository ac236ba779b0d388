//! Terminal front end.
//!
//! Reads input lines, applies them to a [`ChatSession`] and prints the
//! resulting state. The loop waits on whichever comes first: the next input
//! line or the deadline of the next scheduled reply.

pub mod command;
pub mod render;

use std::io::Write;

use chrono::Local;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::chat::core::errors::ChatResult;
use crate::chat::core::ids::{ConversationId, ModelId};
use crate::chat::reply::responder::Responder;
use crate::chat::session::{ChatSession, DeliveredReply, SendOutcome};
use crate::chat::storage::blob_store::BlobStore;
use crate::chat::store::state::ConversationStore;

pub use command::{Command, CommandError, Target, parse};

/// Whether the loop keeps reading.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    /// Keep going.
    Continue,
    /// Leave the loop.
    Quit,
}

/// Resolve a list number or id prefix against the current history order.
#[must_use]
pub fn resolve(store: &ConversationStore, target: &Target) -> Option<ConversationId> {
    let groups = store.history(&Local::now());
    let order = render::flatten(&groups);
    match target {
        Target::Index(n) => n.checked_sub(1).and_then(|i| order.get(i)).map(|c| c.id),
        Target::Prefix(prefix) => {
            let mut matches = order.iter().filter(|c| c.id.matches_prefix(prefix));
            match (matches.next(), matches.next()) {
                (Some(c), None) => Some(c.id),
                _ => None,
            }
        }
    }
}

/// Decode a raw input line and empty the buffer for the next one.
///
/// Invalid UTF-8 is replaced rather than rejected; the line ending is
/// dropped.
fn take_line(buf: &mut Vec<u8>) -> String {
    let line = String::from_utf8_lossy(buf)
        .trim_end_matches(['\n', '\r'])
        .to_string();
    buf.clear();
    line
}

async fn reply_deadline(due: Option<Instant>) {
    match due {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Run the event loop until `/quit`, or until input ends and every
/// scheduled reply has landed.
///
/// # Errors
/// Returns an error if reading input or writing output fails.
pub async fn run<B, R, I, W>(
    session: &mut ChatSession<B, R>,
    mut input: I,
    out: &mut W,
) -> ChatResult<()>
where
    B: BlobStore,
    R: Responder,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    // Partial reads from a cancelled `read_until` stay in `buf`.
    let mut buf = Vec::new();
    let mut input_open = true;

    show_main_view(session, out)?;

    loop {
        if !input_open && session.pending_replies() == 0 {
            break;
        }
        let due = session.next_reply_due();

        tokio::select! {
            read = input.read_until(b'\n', &mut buf), if input_open => {
                if read? == 0 {
                    debug!("Input closed");
                    input_open = false;
                }
                if !buf.is_empty() {
                    let line = take_line(&mut buf);
                    if handle_line(session, &line, out)? == Flow::Quit {
                        break;
                    }
                }
            }
            () = reply_deadline(due) => {
                let delivered = session.deliver_due(Instant::now());
                show_replies(session, &delivered, out)?;
            }
        }
        out.flush()?;
    }

    info!("Leaving chat");
    Ok(())
}

/// Apply one input line.
///
/// # Errors
/// Returns an error if writing output fails.
pub fn handle_line<B, R, W>(
    session: &mut ChatSession<B, R>,
    line: &str,
    out: &mut W,
) -> ChatResult<Flow>
where
    B: BlobStore,
    R: Responder,
    W: Write,
{
    match parse(line) {
        Ok(command) => apply(session, command, out),
        Err(err) => {
            writeln!(out, "{err}")?;
            Ok(Flow::Continue)
        }
    }
}

fn apply<B, R, W>(session: &mut ChatSession<B, R>, command: Command, out: &mut W) -> ChatResult<Flow>
where
    B: BlobStore,
    R: Responder,
    W: Write,
{
    match command {
        Command::Nothing => {}
        Command::Send(text) => send(session, &text, out)?,
        Command::New => {
            session.start_new_chat();
            show_main_view(session, out)?;
        }
        Command::List => writeln!(out, "{}", render::sidebar(session.store(), &Local::now()))?,
        Command::Open(target) => match resolve(session.store(), &target) {
            Some(id) => {
                session.open(id);
                show_main_view(session, out)?;
            }
            None => writeln!(out, "No such chat.")?,
        },
        Command::Delete(target) => {
            let id = match target {
                Some(t) => resolve(session.store(), &t),
                None => active_id(session),
            };
            if id.is_some_and(|id| session.delete(id)) {
                writeln!(out, "Chat deleted.")?;
                show_main_view(session, out)?;
                show_sidebar(session, out)?;
            } else {
                writeln!(out, "No such chat.")?;
            }
        }
        Command::Rename(title) => match active_id(session) {
            Some(id) => {
                if session.rename(id, &title) {
                    show_sidebar(session, out)?;
                }
            }
            None => writeln!(out, "No chat is open.")?,
        },
        Command::Clear => match active_id(session) {
            Some(id) => {
                session.clear(id);
                show_main_view(session, out)?;
            }
            None => writeln!(out, "No chat is open.")?,
        },
        Command::Model(None) => writeln!(out, "Model: {}", session.store().selected_model())?,
        Command::Model(Some(raw)) => match ModelId::new(&raw) {
            Ok(model) => {
                session.select_model(model);
                writeln!(out, "Model: {}", session.store().selected_model())?;
            }
            Err(err) => writeln!(out, "{err}")?,
        },
        Command::Models => writeln!(out, "{}", render::models(session.store().selected_model()))?,
        Command::Sidebar => {
            if session.toggle_sidebar() {
                show_sidebar(session, out)?;
            } else {
                writeln!(out, "Sidebar hidden.")?;
            }
        }
        Command::Prompts(category) => writeln!(out, "{}", render::prompts(category))?,
        Command::Prompt(category, n) => match category.example(n) {
            Some(example) => send(session, example, out)?,
            None => writeln!(out, "No example {n} under {category}.")?,
        },
        Command::Reset => match session.reset() {
            Ok(()) => {
                writeln!(out, "History cleared.")?;
                show_main_view(session, out)?;
            }
            Err(err) => {
                warn!("Reset failed: {err}");
                writeln!(out, "Could not clear history: {err}")?;
            }
        },
        Command::Help => writeln!(out, "{}", render::HELP)?,
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn active_id<B: BlobStore, R: Responder>(session: &ChatSession<B, R>) -> Option<ConversationId> {
    session.store().active_conversation().map(|c| c.id)
}

fn send<B, R, W>(session: &mut ChatSession<B, R>, text: &str, out: &mut W) -> ChatResult<()>
where
    B: BlobStore,
    R: Responder,
    W: Write,
{
    match session.send(text, Instant::now()) {
        SendOutcome::Sent { created, .. } => {
            if created {
                show_sidebar(session, out)?;
            }
            writeln!(out, "assistant is typing...")?;
        }
        SendOutcome::Busy => writeln!(out, "Wait for the reply before sending again.")?,
        SendOutcome::Empty => {}
    }
    Ok(())
}

fn show_replies<B, R, W>(
    session: &ChatSession<B, R>,
    delivered: &[DeliveredReply],
    out: &mut W,
) -> ChatResult<()>
where
    B: BlobStore,
    R: Responder,
    W: Write,
{
    let store = session.store();
    let active = store.active_conversation_id();
    for reply in delivered {
        let Some(conv) = store.conversation(reply.conversation_id) else {
            continue;
        };
        if active == Some(conv.id) {
            if let Some(message) = conv.messages.iter().find(|m| m.id == reply.message_id) {
                writeln!(out, "\n{}\n", render::message(message))?;
            }
        } else {
            writeln!(out, "New reply in \"{}\".", conv.title)?;
        }
    }
    Ok(())
}

fn show_main_view<B, R, W>(session: &ChatSession<B, R>, out: &mut W) -> ChatResult<()>
where
    B: BlobStore,
    R: Responder,
    W: Write,
{
    let store = session.store();
    match store.active_conversation() {
        Some(conv) => writeln!(out, "{}", render::conversation(conv))?,
        None => writeln!(out, "{}", render::empty_state(store.selected_model()))?,
    }
    Ok(())
}

fn show_sidebar<B, R, W>(session: &ChatSession<B, R>, out: &mut W) -> ChatResult<()>
where
    B: BlobStore,
    R: Responder,
    W: Write,
{
    let store = session.store();
    if store.sidebar_visible() {
        writeln!(out, "{}", render::sidebar(store, &Local::now()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::chat::core::errors::ChatError;
    use crate::chat::core::title::TitleRule;
    use crate::chat::reply::responder::MockResponder;
    use crate::chat::storage::blob_store::MemoryBlobStore;
    use crate::chat::storage::persisted::PersistedStore;
    use crate::chat::store::state::StoreDefaults;

    /// Backend whose slot cannot be removed.
    #[derive(Default)]
    struct LockedBlobStore {
        inner: MemoryBlobStore,
    }

    impl BlobStore for LockedBlobStore {
        fn get(&self, slot: &str) -> ChatResult<Option<Vec<u8>>> {
            self.inner.get(slot)
        }

        fn put(&mut self, slot: &str, blob: &[u8]) -> ChatResult<()> {
            self.inner.put(slot, blob)
        }

        fn remove(&mut self, _slot: &str) -> ChatResult<()> {
            Err(ChatError::Io(std::io::Error::other("locked")))
        }
    }

    fn session_over<B: BlobStore>(backend: B) -> ChatSession<B, MockResponder> {
        let defaults = StoreDefaults {
            title: TitleRule::default(),
            selected_model: ModelId::new("openai/gpt-4o").unwrap(),
            sidebar_visible: true,
        };
        let store = PersistedStore::load(backend, "chatbot-storage", defaults);
        ChatSession::new(store, MockResponder::with_seed(5)).with_reply_delay(Duration::ZERO)
    }

    fn session() -> ChatSession<MemoryBlobStore, MockResponder> {
        session_over(MemoryBlobStore::new())
    }

    fn output(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_piped_conversation_waits_for_replies() {
        let mut session = session();
        let mut out = Vec::new();
        let input: &[u8] = b"How do lifetimes work?\n/new\nTell me a joke\n";

        run(&mut session, input, &mut out).await.unwrap();

        let store = session.store();
        assert_eq!(store.conversations().len(), 2);
        assert!(store.conversations().iter().all(|c| c.messages.len() == 2));
        assert_eq!(session.pending_replies(), 0);
        assert!(output(out).contains("What can I help you with?"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_end_session() {
        let mut session = session();
        let mut out = Vec::new();
        let input: &[u8] = b"first chat\n/new\n\xff\xfe bad bytes\n/new\nsecond line\n";

        run(&mut session, input, &mut out).await.unwrap();

        let store = session.store();
        let mut titles: Vec<&str> = store
            .conversations()
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        titles.sort_unstable();
        assert_eq!(
            titles,
            vec!["first chat", "second line", "\u{fffd}\u{fffd} bad bytes"]
        );
        assert!(store.conversations().iter().all(|c| c.messages.len() == 2));
        assert_eq!(session.pending_replies(), 0);
    }

    #[tokio::test]
    async fn test_last_line_without_newline_is_read() {
        let mut session = session();
        let mut out = Vec::new();
        let input: &[u8] = b"no trailing newline";

        run(&mut session, input, &mut out).await.unwrap();

        let conv = &session.store().conversations()[0];
        assert_eq!(conv.title, "no trailing newline");
        assert_eq!(conv.messages.len(), 2);
    }

    #[test]
    fn test_take_line_strips_crlf_and_replaces_bad_bytes() {
        let mut buf = b"caf\xe9\r\n".to_vec();
        assert_eq!(take_line(&mut buf), "caf\u{fffd}");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_failed_reset_is_reported_and_keeps_state() {
        let mut session = session_over(LockedBlobStore::default());
        let mut out = Vec::new();
        session.send("hello", Instant::now());

        let flow = handle_line(&mut session, "/reset", &mut out).unwrap();
        assert_eq!(flow, Flow::Continue);
        assert!(output(out).contains("Could not clear history"));
        assert_eq!(session.store().conversations().len(), 1);
        assert_eq!(session.pending_replies(), 1);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut session = session();
        let mut out = Vec::new();
        session.send("hello", Instant::now());

        handle_line(&mut session, "/reset", &mut out).unwrap();
        assert!(session.store().conversations().is_empty());
        assert_eq!(session.pending_replies(), 0);
    }

    #[tokio::test]
    async fn test_quit_stops_reading() {
        let mut session = session();
        let mut out = Vec::new();
        let input: &[u8] = b"/quit\nnever sent\n";

        run(&mut session, input, &mut out).await.unwrap();
        assert!(session.store().conversations().is_empty());
    }

    #[test]
    fn test_open_and_delete_by_number() {
        let mut session = session();
        let mut out = Vec::new();
        let now = Instant::now();
        session.send("first", now);
        session.start_new_chat();
        session.send("second", now);

        handle_line(&mut session, "/open 2", &mut out).unwrap();
        assert_eq!(session.store().active_conversation().unwrap().title, "first");

        handle_line(&mut session, "/delete", &mut out).unwrap();
        assert_eq!(session.store().conversations().len(), 1);
        assert_eq!(session.store().conversations()[0].title, "second");
        assert_eq!(session.store().active_conversation().unwrap().title, "second");
    }

    #[test]
    fn test_resolve_by_prefix() {
        let mut session = session();
        session.send("only", Instant::now());
        let id = session.store().conversations()[0].id;

        let prefix = Target::Prefix(id.short()[..4].to_string());
        assert_eq!(resolve(session.store(), &prefix), Some(id));
        assert_eq!(resolve(session.store(), &Target::Index(0)), None);
        assert_eq!(resolve(session.store(), &Target::Index(2)), None);
    }

    #[test]
    fn test_rename_and_model_commands() {
        let mut session = session();
        let mut out = Vec::new();
        session.send("draft", Instant::now());

        handle_line(&mut session, "/rename Weekend plans", &mut out).unwrap();
        assert_eq!(
            session.store().active_conversation().unwrap().title,
            "Weekend plans"
        );

        handle_line(&mut session, "/model local/llama-3", &mut out).unwrap();
        assert_eq!(session.store().selected_model().as_str(), "local/llama-3");

        handle_line(&mut session, "/model My fine-tune", &mut out).unwrap();
        assert_eq!(session.store().selected_model().as_str(), "My fine-tune");

        handle_line(&mut session, "/model bad\u{1b}[2Jmodel", &mut out).unwrap();
        assert_eq!(session.store().selected_model().as_str(), "My fine-tune");
    }

    #[test]
    fn test_prompt_sends_example() {
        let mut session = session();
        let mut out = Vec::new();

        handle_line(&mut session, "/prompt writing 2", &mut out).unwrap();
        let conv = session.store().active_conversation().unwrap();
        assert_eq!(conv.messages[0].content, "Draft a business email");
    }

    #[test]
    fn test_errors_are_printed_not_returned() {
        let mut session = session();
        let mut out = Vec::new();
        let flow = handle_line(&mut session, "/teleport", &mut out).unwrap();
        assert_eq!(flow, Flow::Continue);
        assert!(output(out).contains("unknown command"));
    }
}
