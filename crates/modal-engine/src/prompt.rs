//! # Interactive prompts
//!
//! Some commands (such as `/`) need a line of free text from the user. They request it through
//! the [Prompt] trait, and a failed or cancelled prompt is returned as a [PromptError].
use std::collections::VecDeque;

/// Errors returned by a [Prompt].
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum PromptError {
    /// The user dismissed the prompt.
    #[error("Prompt cancelled")]
    Cancelled,

    /// The host has no way of prompting.
    #[error("No prompt available")]
    Unavailable,
}

/// A source of single-line user input.
pub trait Prompt {
    /// Show `message`, and wait for a line of input.
    fn read_line(&mut self, message: &str) -> Result<String, PromptError>;
}

/// A [Prompt] for hosts that can't ask for input.
#[derive(Clone, Debug, Default)]
pub struct NoPrompt;

impl Prompt for NoPrompt {
    fn read_line(&mut self, _: &str) -> Result<String, PromptError> {
        Err(PromptError::Unavailable)
    }
}

/// A [Prompt] that answers from a queue of canned responses.
///
/// A `None` response is treated as the user cancelling the prompt.
#[derive(Clone, Debug, Default)]
pub struct ScriptedPrompt {
    responses: VecDeque<Option<String>>,
}

impl ScriptedPrompt {
    /// Create a prompt that will give these responses, in order.
    pub fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        ScriptedPrompt { responses: responses.into_iter().collect() }
    }
}

impl Prompt for ScriptedPrompt {
    fn read_line(&mut self, _: &str) -> Result<String, PromptError> {
        match self.responses.pop_front() {
            Some(Some(line)) => Ok(line),
            Some(None) => Err(PromptError::Cancelled),
            None => Err(PromptError::Unavailable),
        }
    }
}
