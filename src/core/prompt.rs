//! Prompt construction for proof generation and revision.
//!
//! The system prompt carries the output contract the page segmenter relies on:
//! one `<a id="step-N"></a>` anchor directly before each `### N. Title` header.

use serde_json::{Value, json};

use crate::core::formality::Formality;

const SYSTEM_PROMPT: &str = "\
You are a mathematician writing proofs in Markdown with LaTeX math.

Output format (follow exactly):
- Open with at most a few sentences stating the theorem and the strategy.
- Split the proof into numbered steps. Put the anchor <a id=\"step-N\"></a> \
immediately before each step header, with no space between them, where N is \
the step number starting at 1: <a id=\"step-1\"></a>### 1. Title
- Use $...$ for inline math and $$...$$ for display math, with each $$ on its own line.
- Do not wrap the answer in a code block and do not add commentary after the proof.";

/// Messages asking for a fresh proof of `theorem` at `formality`.
pub fn generation_messages(theorem: &str, formality: &Formality) -> Vec<Value> {
    vec![
        json!({"role": "system", "content": SYSTEM_PROMPT}),
        json!({
            "role": "user",
            "content": format!(
                "Prove the following theorem.\n\nTheorem: {}\n\nStyle ({}): {}",
                theorem.trim(),
                formality.label,
                formality.instructions
            ),
        }),
    ]
}

/// Messages asking to rewrite `current` according to `request`, keeping the format.
pub fn revision_messages(
    theorem: &str,
    formality: &Formality,
    current: &str,
    request: &str,
) -> Vec<Value> {
    vec![
        json!({"role": "system", "content": SYSTEM_PROMPT}),
        json!({
            "role": "user",
            "content": format!(
                "Here is a proof of the theorem: {}\n\nStyle ({}): {}\n\n\
                 Current proof:\n\n{}\n\n\
                 Rewrite the whole proof with this change: {}\n\
                 Renumber the steps and anchors from 1 if steps are added or removed.",
                theorem.trim(),
                formality.label,
                formality.instructions,
                current,
                request.trim()
            ),
        }),
    ]
}

/// Remove a Markdown code fence wrapped around the whole response, if any.
/// Models sometimes fence the answer despite the instructions.
pub fn strip_outer_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "markdown") on the opening line.
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => trimmed,
    }
}
