//! Collector stage — asks the next information-gathering question and watches
//! for the user's request to move on to CV generation.

use std::sync::Arc;

use tracing::{debug, info};

use crate::conversation::prompts::collector_system_prompt;
use crate::conversation::StagePrompt;
use crate::errors::AppError;
use crate::llm_client::{ChatModel, ChatRequest};
use crate::models::conversation::{ChatMessage, ConversationState, NextStep};

/// Literal the user types to leave the collection phase. Matched case-insensitively
/// as a substring of the newest user message.
pub const PROCEED_TRIGGER: &str = "proceed";

pub struct CollectorStage {
    model: Arc<dyn ChatModel>,
    prompt: StagePrompt,
}

impl CollectorStage {
    pub fn new(model: Arc<dyn ChatModel>, temperature: f32) -> Self {
        Self {
            model,
            prompt: StagePrompt {
                system: collector_system_prompt(),
                temperature,
            },
        }
    }

    /// Appends exactly one assistant message and recomputes `next_step`.
    ///
    /// Any incoming `next_step` is discarded. On error `state` is left untouched.
    pub async fn run(&self, state: &mut ConversationState) -> Result<(), AppError> {
        info!(
            "Collector stage: {} messages in history",
            state.messages.len()
        );

        let reply = self
            .model
            .complete(&ChatRequest {
                system: &self.prompt.system,
                messages: &state.messages,
                temperature: self.prompt.temperature,
            })
            .await?;

        state.next_step = detect_proceed(state);
        state.push(ChatMessage::assistant(reply));

        debug!("Collector stage set next_step={:?}", state.next_step);
        Ok(())
    }
}

/// `Some(ProceedToGeneration)` when the newest user message contains the trigger,
/// otherwise unset.
pub fn detect_proceed(state: &ConversationState) -> Option<NextStep> {
    state
        .last_user_message()
        .filter(|m| m.content.to_lowercase().contains(PROCEED_TRIGGER))
        .map(|_| NextStep::ProceedToGeneration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::testing::{transient_failure, ScriptedModel};

    fn state_with_user(text: &str) -> ConversationState {
        let mut state = ConversationState::new();
        state.push(ChatMessage::user(text));
        state
    }

    #[test]
    fn test_detect_proceed_case_insensitive() {
        for text in ["proceed", "PROCEED", "Proceed needed", "ok let's proceed now"] {
            assert_eq!(
                detect_proceed(&state_with_user(text)),
                Some(NextStep::ProceedToGeneration),
                "expected trigger in {text:?}"
            );
        }
    }

    #[test]
    fn test_detect_proceed_absent() {
        assert_eq!(detect_proceed(&state_with_user("I'm a senior analyst")), None);
        assert_eq!(detect_proceed(&ConversationState::new()), None);
    }

    #[test]
    fn test_detect_proceed_only_reads_newest_user_message() {
        let mut state = state_with_user("proceed");
        state.push(ChatMessage::assistant("Before that, what tools do you use?"));
        state.push(ChatMessage::user("Excel and SQL"));
        assert_eq!(detect_proceed(&state), None);
    }

    #[test]
    fn test_detect_proceed_ignores_assistant_messages() {
        let mut state = state_with_user("I have 10 years in audit");
        state.push(ChatMessage::assistant("Write PROCEED when you are ready."));
        assert_eq!(detect_proceed(&state), None);
    }

    #[tokio::test]
    async fn test_run_appends_reply_and_resets_stale_signal() {
        let model = Arc::new(ScriptedModel::new().reply("Are you applying for a specific job?"));
        let stage = CollectorStage::new(model.clone(), 0.2);

        let mut state = state_with_user("I'm a senior analyst");
        state.next_step = Some(NextStep::ProceedToGeneration);

        stage.run(&mut state).await.unwrap();

        assert_eq!(state.messages.len(), 2);
        assert_eq!(
            state.messages[1].content,
            "Are you applying for a specific job?"
        );
        assert_eq!(state.next_step, None);

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].message_count, 1);
        assert_eq!(calls[0].temperature, 0.2);
    }

    #[tokio::test]
    async fn test_run_failure_leaves_state_untouched() {
        let model = Arc::new(ScriptedModel::new().fail(transient_failure()));
        let stage = CollectorStage::new(model, 0.2);

        let mut state = state_with_user("proceed");
        let result = stage.run(&mut state).await;

        assert!(matches!(result, Err(AppError::Generation(_))));
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.next_step, None);
    }
}
