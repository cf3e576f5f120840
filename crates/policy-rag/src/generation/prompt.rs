//! Prompt templates for grounded answers

/// Prompt builder for questions against the indexed policy
pub struct PromptBuilder;

impl PromptBuilder {
    /// Number the retrieved passages, each followed by a delimiter
    pub fn build_context(chunks: &[String]) -> String {
        let mut context = String::new();

        for (i, chunk) in chunks.iter().enumerate() {
            context.push_str(&format!("[{}]\n{}\n\n---\n\n", i + 1, chunk.trim()));
        }

        context
    }

    /// Build the single grounding instruction sent to the model
    ///
    /// Passages keep their retrieval order; the question is embedded verbatim.
    pub fn grounded_prompt(question: &str, chunks: &[String]) -> String {
        format!(
            r#"You are an assistant that answers questions about an insurance policy document.

RULES:
1. Use ONLY the information in the CONTEXT below
2. If the context does not contain the answer, say that the document does not cover it
3. Do not use outside knowledge or make assumptions beyond what is stated
4. Refer to passages by their bracketed number when it helps the reader

CONTEXT:
{context}
QUESTION: {question}

Answer using only the context above:"#,
            context = Self::build_context(chunks),
            question = question
        )
    }
}
