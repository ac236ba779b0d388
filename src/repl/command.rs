//! Parsing of terminal input lines.
//!
//! Anything not starting with `/` is a chat message. Slash commands map to
//! the sidebar, header and selector actions of the chat page.

use thiserror::Error;

use crate::chat::reply::catalog::PromptCategory;

/// How a command names a conversation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Target {
    /// 1-based position in the `/list` output.
    Index(usize),
    /// Leading characters of the conversation id.
    Prefix(String),
}

impl Target {
    fn parse(raw: &str) -> Self {
        raw.parse::<usize>()
            .map_or_else(|_| Self::Prefix(raw.to_string()), Self::Index)
    }
}

/// A parsed input line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Blank line.
    Nothing,
    /// Chat message for the active conversation.
    Send(String),
    /// Leave the active conversation; the next message opens a new one.
    New,
    /// Print the grouped history.
    List,
    /// Switch to a conversation.
    Open(Target),
    /// Delete a conversation, the active one when no target is given.
    Delete(Option<Target>),
    /// Rename the active conversation.
    Rename(String),
    /// Clear the messages of the active conversation.
    Clear,
    /// Show the selected model, or select one.
    Model(Option<String>),
    /// List selector entries.
    Models,
    /// Toggle the sidebar.
    Sidebar,
    /// Show example prompts, all tabs or one.
    Prompts(Option<PromptCategory>),
    /// Send an example prompt.
    Prompt(PromptCategory, usize),
    /// Delete every conversation and the saved slot.
    Reset,
    /// Print usage.
    Help,
    /// Leave the program.
    Quit,
}

/// Rejected input line.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum CommandError {
    /// Unrecognized slash command.
    #[error("unknown command: /{0} (try /help)")]
    Unknown(String),
    /// A required argument is absent.
    #[error("/{command} needs {what}")]
    MissingArgument {
        /// Command name without the slash.
        command: &'static str,
        /// Description of the argument.
        what: &'static str,
    },
    /// Category name not among the prompt tabs.
    #[error("unknown prompt category: {0}")]
    UnknownCategory(String),
    /// Example number that is not a positive integer.
    #[error("invalid prompt number: {0}")]
    InvalidNumber(String),
}

/// Parse one input line.
///
/// # Errors
/// Returns [`CommandError`] for unknown commands or missing arguments.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Nothing);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Send(line.to_string()));
    };

    let (name, arg) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(n, a)| (n, a.trim()));
    let arg = (!arg.is_empty()).then_some(arg);

    match name.to_ascii_lowercase().as_str() {
        "new" => Ok(Command::New),
        "list" | "ls" => Ok(Command::List),
        "open" => arg.map(|a| Command::Open(Target::parse(a))).ok_or(
            CommandError::MissingArgument {
                command: "open",
                what: "a list number or id prefix",
            },
        ),
        "delete" | "rm" => Ok(Command::Delete(arg.map(Target::parse))),
        "rename" => arg
            .map(|a| Command::Rename(a.to_string()))
            .ok_or(CommandError::MissingArgument {
                command: "rename",
                what: "a title",
            }),
        "clear" => Ok(Command::Clear),
        "model" => Ok(Command::Model(arg.map(str::to_string))),
        "models" => Ok(Command::Models),
        "sidebar" => Ok(Command::Sidebar),
        "prompts" => arg
            .map(parse_category)
            .transpose()
            .map(Command::Prompts),
        "prompt" => parse_prompt(arg),
        "reset" => Ok(Command::Reset),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_category(raw: &str) -> Result<PromptCategory, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::UnknownCategory(raw.to_string()))
}

fn parse_prompt(arg: Option<&str>) -> Result<Command, CommandError> {
    let missing = CommandError::MissingArgument {
        command: "prompt",
        what: "a category and an example number",
    };
    let (category, number) = arg
        .and_then(|a| a.split_once(char::is_whitespace))
        .ok_or(missing)?;
    let category = parse_category(category)?;
    let number = number.trim();
    let n = number
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| CommandError::InvalidNumber(number.to_string()))?;
    Ok(Command::Prompt(category, n))
}
