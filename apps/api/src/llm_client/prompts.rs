// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt sent with every call. The per-task instruction text also
/// demands bare JSON; this repeats it at the system level.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Closing line for prompts whose answer is a single JSON object.
pub const RETURN_JSON_OBJECT: &str = "Return the analysis as a JSON object, \
without any other text and without the backticks.\n  \
Do not include any other text or comments.";
