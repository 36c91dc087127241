// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Output rules appended to every prompt that expects a JSON object back.
pub const JSON_OUTPUT_RULES: &str = "\
Important output rules:
- Return JSON only. Do not include markdown, code fences, explanations, or extra keys.
- Follow the schema exactly.";
