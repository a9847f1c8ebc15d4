//! Copy-exactly prompt and answer extraction.

/// Instruction placed before the context block.
pub const COPY_INSTRUCTION: &str = "Copy the answer text exactly as it appears after 'A:'. \
Do not add or remove words. If the context doesn't contain an answer, \
say \"I don't know based on the provided knowledge.\".";

/// Builds the generation prompt: instruction, context, then the open `A:` slot.
///
/// # Example
/// ```
/// # use answer_engine::build_prompt;
/// let p = build_prompt("Q: a\nA: b", "a?");
/// assert!(p.ends_with("Q: a?\nA:"));
/// ```
pub fn build_prompt(context: &str, question: &str) -> String {
    format!("{COPY_INSTRUCTION}\n\n{context}\n\nQ: {question}\nA:")
}

/// Text after the last `A:` marker, trimmed; the whole text if absent.
pub fn extract_answer(raw: &str) -> String {
    raw.rsplit_once("A:")
        .map_or(raw, |(_, tail)| tail)
        .trim()
        .to_string()
}
