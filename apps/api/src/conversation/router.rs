//! Router — decides, right after the collector stage, whether the turn continues
//! into CV generation or yields back to the driver.

use crate::models::conversation::{ConversationState, NextStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    GoToGeneration,
    /// Stop this turn and wait for the next user input. Not an error.
    Halt,
}

/// Pure: reads `next_step` only, never mutates state or performs I/O.
pub fn route(state: &ConversationState) -> RouteDecision {
    match state.next_step {
        Some(NextStep::ProceedToGeneration) => RouteDecision::GoToGeneration,
        Some(NextStep::ContinueCollecting) | None => RouteDecision::Halt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::conversation::ChatMessage;

    #[test]
    fn test_unset_signal_halts() {
        assert_eq!(route(&ConversationState::new()), RouteDecision::Halt);
    }

    #[test]
    fn test_continue_collecting_halts() {
        let mut state = ConversationState::new();
        state.next_step = Some(NextStep::ContinueCollecting);
        assert_eq!(route(&state), RouteDecision::Halt);
    }

    #[test]
    fn test_proceed_goes_to_generation() {
        let mut state = ConversationState::new();
        state.next_step = Some(NextStep::ProceedToGeneration);
        assert_eq!(route(&state), RouteDecision::GoToGeneration);
    }

    #[test]
    fn test_route_is_idempotent_and_read_only() {
        let mut state = ConversationState::new();
        state.push(ChatMessage::user("proceed"));
        state.push(ChatMessage::assistant("Great, generating now."));
        state.next_step = Some(NextStep::ProceedToGeneration);
        let before = serde_json::to_value(&state).unwrap();

        let first = route(&state);
        let second = route(&state);

        assert_eq!(first, second);
        assert_eq!(serde_json::to_value(&state).unwrap(), before);
    }
}
