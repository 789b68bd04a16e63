//! Conversation State — the history Rodrigo sees on every turn.
//!
//! Append-only and replaced wholesale: `record_exchange` returns a new state
//! instead of mutating the caller's copy. Slot progress (city, date, genre...)
//! is not tracked here; the model reads it back from the history.

use serde::{Deserialize, Serialize};

use crate::llm_client::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl From<Speaker> for Role {
    fn from(speaker: Speaker) -> Self {
        match speaker {
            Speaker::User => Role::User,
            Speaker::Assistant => Role::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    turns: Vec<Turn>,
}

impl ConversationState {
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of recorded turns, user and assistant alike.
    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    /// Number of user utterances answered so far.
    pub fn exchange_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.speaker == Speaker::User)
            .count()
    }

    /// Returns the next state: this history plus the user utterance and the reply.
    pub fn record_exchange(&self, utterance: &str, reply: &str) -> ConversationState {
        let mut turns = Vec::with_capacity(self.turns.len() + 2);
        turns.extend_from_slice(&self.turns);
        turns.push(Turn {
            speaker: Speaker::User,
            text: utterance.to_string(),
        });
        turns.push(Turn {
            speaker: Speaker::Assistant,
            text: reply.to_string(),
        });

        ConversationState { turns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = ConversationState::default();
        assert!(state.turns().is_empty());
        assert_eq!(state.turn_count(), 0);
        assert_eq!(state.exchange_count(), 0);
    }

    #[test]
    fn test_record_exchange_appends_two_turns_without_touching_original() {
        let initial = ConversationState::default();
        let next = initial.record_exchange("Hola", "¡Hola! ¿En qué te ayudo?");

        assert_eq!(initial.turn_count(), 0);
        assert_eq!(next.turn_count(), 2);
        assert_eq!(next.exchange_count(), 1);
        assert_eq!(next.turns()[0].speaker, Speaker::User);
        assert_eq!(next.turns()[1].text, "¡Hola! ¿En qué te ayudo?");
    }

    #[test]
    fn test_history_keeps_order_across_exchanges() {
        let first = ConversationState::default().record_exchange("a", "b");
        let second = first.record_exchange("c", "d");
        let texts: Vec<&str> = second.turns().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
        assert_eq!(second.exchange_count(), 2);
    }

    #[test]
    fn test_state_survives_json_round_trip() {
        let state = ConversationState::default().record_exchange("Busco DJ", "¿En qué ciudad?");
        let json = serde_json::to_string(&state).unwrap();
        let restored: ConversationState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_speaker_maps_to_chat_role() {
        assert_eq!(Role::from(Speaker::User), Role::User);
        assert_eq!(Role::from(Speaker::Assistant), Role::Assistant);
    }
}
