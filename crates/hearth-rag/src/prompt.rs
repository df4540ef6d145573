//! Prompt assembly: retrieved chunks are prepended as context ahead of the
//! user's question.

use hearth_core::types::SearchResult;

/// Render a plain-text prompt. With no retrieved chunks the question is
/// passed through in the bare question/answer frame.
pub fn build_prompt(question: &str, context: &[SearchResult]) -> String {
    if context.is_empty() {
        return format!("Question: {}\n\nAnswer:", question);
    }

    let mut out = String::from(
        "Use the following context to answer the question. If the context is \
         not relevant, answer from general knowledge.\n\nContext:\n",
    );
    for (i, hit) in context.iter().enumerate() {
        out.push_str(&format!("[{}] {}\n", i + 1, hit.chunk_text.trim()));
    }
    out.push_str(&format!("\nQuestion: {}\n\nAnswer:", question));
    out
}
