//! Chat engine — runs one turn of the collect → route → generate state machine.
//!
//! Flow per turn: lock session → copy state → append user message → collector →
//! router → (generator) → save → unlock.
//! The stored state is only replaced after every stage has succeeded, so a failed
//! turn leaves no trace and the user can simply repeat their input.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::conversation::collector::CollectorStage;
use crate::conversation::draft::DraftReport;
use crate::conversation::generator::GeneratorStage;
use crate::conversation::router::{route, RouteDecision};
use crate::conversation::store::InMemorySessionStore;
use crate::errors::AppError;
use crate::llm_client::ChatModel;
use crate::models::conversation::{ChatMessage, ConversationState, NextStep, SessionPhase};

/// Sampling temperatures for the two stages.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub collector_temperature: f32,
    pub generator_temperature: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            collector_temperature: 0.2,
            generator_temperature: 0.0,
        }
    }
}

/// Result of one successful turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// Content of the newest assistant message.
    pub reply: String,
    pub next_step: NextStep,
    pub phase: SessionPhase,
    /// Present only when the generator ran this turn.
    pub draft_report: Option<DraftReport>,
    pub message_count: usize,
}

pub struct ChatEngine {
    store: InMemorySessionStore,
    collector: CollectorStage,
    generator: GeneratorStage,
}

impl ChatEngine {
    pub fn new(model: Arc<dyn ChatModel>, settings: EngineSettings) -> Self {
        Self::with_models(model.clone(), model, settings)
    }

    /// Separate backends per stage.
    pub fn with_models(
        collector_model: Arc<dyn ChatModel>,
        generator_model: Arc<dyn ChatModel>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store: InMemorySessionStore::new(),
            collector: CollectorStage::new(collector_model, settings.collector_temperature),
            generator: GeneratorStage::new(generator_model, settings.generator_temperature),
        }
    }

    /// Feeds one user message into the session and returns the assistant's answer.
    ///
    /// On any error the stored history is exactly what it was before the call.
    /// `user_text` is stored verbatim; whitespace-only input is rejected.
    pub async fn advance(
        &self,
        session_key: &str,
        user_text: &str,
    ) -> Result<TurnOutcome, AppError> {
        if user_text.trim().is_empty() {
            return Err(AppError::Validation("user_input cannot be empty".to_string()));
        }

        let mut guard = self.store.acquire(session_key).await;

        if guard.state().is_completed() {
            return Err(AppError::SessionClosed(format!(
                "session {session_key} already produced its CV draft; reset it to start over"
            )));
        }

        let before = guard.state().messages.len();
        let mut working = guard.state().clone();
        working.push(ChatMessage::user(user_text));
        working.next_step = None;

        self.collector.run(&mut working).await.map_err(|e| {
            warn!("Turn failed in collector stage for session {session_key}: {e}");
            e
        })?;

        let draft_report = match route(&working) {
            RouteDecision::Halt => None,
            RouteDecision::GoToGeneration => {
                info!("Session {session_key}: proceeding to CV generation");
                let report = self.generator.run(&mut working).await.map_err(|e| {
                    warn!("Turn failed in generator stage for session {session_key}: {e}");
                    e
                })?;
                Some(report)
            }
        };

        let outcome = outcome_of(&working, draft_report)?;
        guard.save(working);
        if !self.store.is_current(&guard) {
            warn!(
                "Session {} was reset during the turn; its reply was not retained",
                guard.key()
            );
        }

        info!(
            "Session {}: turn complete, {} -> {} messages, phase={:?}",
            guard.key(),
            before,
            outcome.message_count,
            outcome.phase
        );
        Ok(outcome)
    }

    /// Full state of a session, or `None` if the key was never used.
    pub async fn history(&self, session_key: &str) -> Option<ConversationState> {
        self.store.snapshot(session_key).await
    }

    /// Forgets a session so the next turn starts a fresh collection.
    pub fn reset(&self, session_key: &str) -> bool {
        let removed = self.store.remove(session_key);
        if removed {
            info!("Session {session_key} reset");
        }
        removed
    }

    pub fn session_count(&self) -> usize {
        self.store.len()
    }
}

fn outcome_of(
    state: &ConversationState,
    draft_report: Option<DraftReport>,
) -> Result<TurnOutcome, AppError> {
    let reply = state
        .last_assistant_message()
        .map(|m| m.content.clone())
        .ok_or_else(|| AppError::InvalidState("turn ended without an assistant message".into()))?;

    Ok(TurnOutcome {
        reply,
        next_step: state.next_step.unwrap_or(NextStep::ContinueCollecting),
        phase: state.phase,
        draft_report,
        message_count: state.messages.len(),
    })
}
