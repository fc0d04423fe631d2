// Shared prompt constants and prompt-building utilities.
// Each module that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every prompt that works from user-supplied documents.
pub const FACTUAL_INSTRUCTION: &str = "\
    CRITICAL: Work only from the material provided below. \
    Do NOT invent employers, dates, qualifications, figures or legal terms \
    that are not present in the input. If the input does not support a statement, omit it.";

/// Builds a domain system prompt that always ends with the JSON-only rule.
pub fn json_system(persona: &str) -> String {
    format!("{persona} {JSON_ONLY_SYSTEM}")
}
