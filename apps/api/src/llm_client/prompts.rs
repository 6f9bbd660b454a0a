// Shared prompt fragments.
// Each feature that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that sees the candidate's resume.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Only use facts present in the resume text provided. \
    Do NOT invent employers, titles, dates, degrees or metrics. \
    If the resume does not support a claim, leave it out.";

/// Fills `{name}` placeholders in a template. Unknown placeholders are left as-is.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

/// Builds a full system prompt from a role description plus the JSON-only rule.
pub fn system_prompt(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}
