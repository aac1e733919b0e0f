use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Who authored a message in the conversation timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Transient routing signal, recomputed every turn by the collector stage.
///
/// Parsing is closed: any string other than the two known signals is an
/// `InvalidState` error rather than a silent fall-through to "halt".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum NextStep {
    ContinueCollecting,
    ProceedToGeneration,
}

impl FromStr for NextStep {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "continue_collecting" => Ok(NextStep::ContinueCollecting),
            "proceed_to_generation" => Ok(NextStep::ProceedToGeneration),
            other => Err(AppError::InvalidState(format!(
                "unrecognized routing signal '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for NextStep {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Lifecycle of a session. `Completed` once the CV draft has been produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Collecting,
    Completed,
}

/// Everything known about one session. Messages are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<ChatMessage>,
    pub next_step: Option<NextStep>,
    pub phase: SessionPhase,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for ConversationState {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            messages: Vec::new(),
            next_step: None,
            phase: SessionPhase::Collecting,
            created_at: now,
            updated_at: now,
        }
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.updated_at = message.created_at;
        self.messages.push(message);
    }

    /// Newest user-authored message, scanning from the end of the timeline.
    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.is_user())
    }

    pub fn last_assistant_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| !m.is_user())
    }

    /// True when at least one user message has been answered by the assistant.
    pub fn has_completed_exchange(&self) -> bool {
        self.messages
            .iter()
            .position(|m| m.is_user())
            .map(|first_user| self.messages[first_user..].iter().any(|m| !m.is_user()))
            .unwrap_or(false)
    }

    pub fn is_completed(&self) -> bool {
        self.phase == SessionPhase::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_step_parses_known_signals() {
        assert_eq!(
            "proceed_to_generation".parse::<NextStep>().unwrap(),
            NextStep::ProceedToGeneration
        );
        assert_eq!(
            "continue_collecting".parse::<NextStep>().unwrap(),
            NextStep::ContinueCollecting
        );
    }

    #[test]
    fn test_next_step_rejects_unknown_signal() {
        let err = "call_second_model".parse::<NextStep>().unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[test]
    fn test_next_step_deserialization_is_closed() {
        let ok: NextStep = serde_json::from_str("\"proceed_to_generation\"").unwrap();
        assert_eq!(ok, NextStep::ProceedToGeneration);

        let bad: Result<NextStep, _> = serde_json::from_str("\"END\"");
        assert!(bad.is_err(), "unknown routing signal must not deserialize");
    }

    #[test]
    fn test_next_step_wire_name_matches_parser() {
        for step in [NextStep::ContinueCollecting, NextStep::ProceedToGeneration] {
            let wire = serde_json::to_value(step).unwrap();
            assert_eq!(wire.as_str().unwrap().parse::<NextStep>().unwrap(), step);
        }
    }

    #[test]
    fn test_last_user_message_skips_assistant_entries() {
        let mut state = ConversationState::new();
        state.push(ChatMessage::user("first"));
        state.push(ChatMessage::assistant("reply"));
        state.push(ChatMessage::user("second"));
        state.push(ChatMessage::assistant("another reply"));

        assert_eq!(state.last_user_message().unwrap().content, "second");
    }

    #[test]
    fn test_completed_exchange_requires_assistant_after_user() {
        let mut state = ConversationState::new();
        assert!(!state.has_completed_exchange());

        state.push(ChatMessage::user("hello"));
        assert!(!state.has_completed_exchange());

        state.push(ChatMessage::assistant("hi, what is your seniority level?"));
        assert!(state.has_completed_exchange());
    }

    #[test]
    fn test_role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }
}
