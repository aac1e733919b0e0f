// Shared prompt fragments.
// Each stage that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Appended to every prompt that turns conversation history into written output.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: The CV must be grounded in the user's input. Every statement must be \
    traceable to something the user said in this conversation. Do NOT infer, \
    interpolate, or invent roles, employers, dates, numbers, tools, or qualifications. \
    If the conversation does not support a claim, omit it entirely.";

/// Keeps the collector from drifting into drafting.
pub const NO_DRAFT_INSTRUCTION: &str = "\
    **YOU DO NOT OUTPUT A CV DRAFT, EVEN IF ASKED TO BY THE USER, INSTEAD ASK THE USER \
    IF THEY WISH TO PROCEED TO THE NEXT STEP BY WRITING PROCEED.** \
    **YOU DO NOT OUTPUT A SUMMARY OF THE INFORMATION COLLECTED, ONLY PROVIDE SPECIFIC \
    INFORMATION IF REQUESTED BY THE USER.**";
