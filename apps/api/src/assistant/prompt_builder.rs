//! Prompt Builder — system persona, then history in order, then the new utterance.

use std::sync::Arc;

use crate::assistant::conversation::{Speaker, Turn};
use crate::llm_client::{ChatMessage, Role};

/// Builds the message list for one turn. Pure; the persona is injected at construction.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: Arc<str>,
    /// Only the most recent N turns are sent. `None` sends everything. A window
    /// that would open on an assistant turn drops it, so the model always sees
    /// whole exchanges.
    max_history_turns: Option<usize>,
}

impl PromptBuilder {
    pub fn new(system_prompt: impl Into<Arc<str>>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            max_history_turns: None,
        }
    }

    pub fn with_max_history(mut self, max_history_turns: Option<usize>) -> Self {
        self.max_history_turns = max_history_turns;
        self
    }

    pub fn build(&self, history: &[Turn], utterance: &str) -> Vec<ChatMessage> {
        let skip = self
            .max_history_turns
            .map_or(0, |max| history.len().saturating_sub(max));
        let mut history = &history[skip..];
        if let Some((first, rest)) = history.split_first() {
            if skip > 0 && first.speaker == Speaker::Assistant {
                history = rest;
            }
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::new(Role::System, &*self.system_prompt));
        messages.extend(
            history
                .iter()
                .map(|turn| ChatMessage::new(turn.speaker.into(), turn.text.as_str())),
        );
        messages.push(ChatMessage::new(Role::User, utterance));
        messages
    }
}
