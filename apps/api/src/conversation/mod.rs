// Conversation core: collector and generator stages, the router between them,
// the per-session store, and the engine that runs one turn.
// All LLM calls go through llm_client — no direct provider calls here.

pub mod collector;
pub mod draft;
pub mod engine;
pub mod generator;
pub mod handlers;
pub mod job_ad;
pub mod prompts;
pub mod router;
pub mod store;

#[cfg(test)]
pub mod testing;

/// System prompt and sampling temperature for one stage, built once at startup.
#[derive(Debug, Clone)]
pub struct StagePrompt {
    pub system: String,
    pub temperature: f32,
}
