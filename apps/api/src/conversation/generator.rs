//! Generator stage — turns the collected conversation into a narrative CV draft.
//!
//! Terminal step: once it succeeds the session moves to `SessionPhase::Completed`.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::{info, warn};

use crate::conversation::draft::{inspect_draft, DraftReport, MAX_NARRATIVE_PARAGRAPHS};
use crate::conversation::job_ad::looks_like_job_ad;
use crate::conversation::prompts::{generator_system_prompt, JOB_AD_ADDENDUM};
use crate::conversation::StagePrompt;
use crate::errors::AppError;
use crate::llm_client::{ChatModel, ChatRequest};
use crate::models::conversation::{ChatMessage, ConversationState, SessionPhase};

pub struct GeneratorStage {
    model: Arc<dyn ChatModel>,
    prompt: StagePrompt,
}

impl GeneratorStage {
    pub fn new(model: Arc<dyn ChatModel>, temperature: f32) -> Self {
        Self {
            model,
            prompt: StagePrompt {
                system: generator_system_prompt(),
                temperature,
            },
        }
    }

    /// Appends the CV draft and closes the session.
    ///
    /// Requires at least one completed user/assistant exchange; anything less is
    /// `InvalidState`. On error `state` is left untouched.
    pub async fn run(&self, state: &mut ConversationState) -> Result<DraftReport, AppError> {
        if state.messages.is_empty() {
            return Err(AppError::InvalidState(
                "generator stage reached with an empty history".to_string(),
            ));
        }
        if !state.has_completed_exchange() {
            return Err(AppError::InvalidState(
                "generator stage requires at least one completed exchange".to_string(),
            ));
        }

        let tailored = state
            .messages
            .iter()
            .filter(|m| m.is_user())
            .any(|m| looks_like_job_ad(&m.content));

        let system: Cow<'_, str> = if tailored {
            Cow::Owned(format!("{}{}", self.prompt.system, JOB_AD_ADDENDUM))
        } else {
            Cow::Borrowed(self.prompt.system.as_str())
        };

        info!(
            "Generator stage: {} messages in history, job ad present: {}",
            state.messages.len(),
            tailored
        );

        let draft = self
            .model
            .complete(&ChatRequest {
                system: &system,
                messages: &state.messages,
                temperature: self.prompt.temperature,
            })
            .await?;

        let report = inspect_draft(&draft);
        if !report.follows_template() {
            warn!(
                "CV draft deviates from template: key_qualities={}, paragraphs={} (max {}), bullet_lines={}",
                report.has_key_qualities,
                report.narrative_paragraphs,
                MAX_NARRATIVE_PARAGRAPHS,
                report.bullet_lines
            );
        }

        state.push(ChatMessage::assistant(draft));
        state.phase = SessionPhase::Completed;

        info!(
            "CV draft generated: {} narrative paragraphs",
            report.narrative_paragraphs
        );
        Ok(report)
    }
}
