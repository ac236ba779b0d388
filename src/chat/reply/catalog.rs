//! Model selector entries and empty-state example prompts.

use std::fmt;
use std::str::FromStr;

use crate::chat::core::ids::{ModelId, ModelIdError};

/// Models offered in the selector. Other ids may still be selected.
pub const AVAILABLE_MODELS: [&str; 5] = [
    "openai/gpt-4o",
    "openai/gpt-4o-mini",
    "anthropic/claude-3.5-sonnet",
    "anthropic/claude-3.5-haiku",
    "google/gemini-2.0-flash-exp",
];

/// Selector entries as validated ids.
///
/// # Errors
/// Returns an error if an entry fails `ModelId` validation.
pub fn available_models() -> Result<Vec<ModelId>, ModelIdError> {
    AVAILABLE_MODELS.iter().map(ModelId::new).collect()
}

/// Whether `model` is one of the selector entries.
#[must_use]
pub fn is_listed(model: &ModelId) -> bool {
    AVAILABLE_MODELS.contains(&model.as_str())
}

/// Topic tabs shown under the empty-state input.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PromptCategory {
    /// Drafting text.
    Writing,
    /// Explanations.
    Learning,
    /// Small talk.
    Conversation,
    /// Current events.
    News,
}

impl PromptCategory {
    /// All categories in tab order.
    pub const ALL: [Self; 4] = [Self::Writing, Self::Learning, Self::Conversation, Self::News];

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Writing => "writing",
            Self::Learning => "learning",
            Self::Conversation => "conversation",
            Self::News => "news",
        }
    }

    /// Example prompts for the tab.
    #[must_use]
    pub const fn examples(self) -> &'static [&'static str] {
        match self {
            Self::Writing => &[
                "Write the opening paragraph of a sci-fi novel",
                "Draft a business email",
                "Suggest some blog post ideas",
                "Come up with a creative ad slogan",
            ],
            Self::Learning => &[
                "Explain the basic concepts of quantum mechanics",
                "What is the difference between machine learning and deep learning?",
                "Teach me some basic French phrases",
                "Explain supply and demand in economics",
            ],
            Self::Conversation => &[
                "Let's talk about today's weather",
                "Give me advice on my weekend plans",
                "Recommend ways to relieve stress",
                "Tell me a funny joke",
            ],
            Self::News => &[
                "Summarize recent trends in AI technology",
                "What are today's top news stories?",
                "Explain the latest smartphone trends",
                "Give me an update on renewable energy",
            ],
        }
    }

    /// The `n`th example, 1-based.
    #[must_use]
    pub fn example(self, n: usize) -> Option<&'static str> {
        n.checked_sub(1).and_then(|i| self.examples().get(i).copied())
    }
}

impl fmt::Display for PromptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| value.to_string())
    }
}
