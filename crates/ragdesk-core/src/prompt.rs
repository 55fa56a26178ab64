//! Prompt template compilation and rendering.
//!
//! A template is a fixed, process-wide string that must contain both the
//! `{context}` and `{question}` placeholders. Rendering substitutes every
//! occurrence of each placeholder in a single left-to-right pass, so text
//! inserted for one placeholder is never re-scanned: a question that itself
//! contains `{context}` is passed through verbatim. Any other brace text is
//! copied unchanged.
//!
//! The default template instructs the generator to answer only from the
//! context and to reply with a fixed fallback phrase otherwise. Whether
//! the generator complies is outside this crate's control.

use crate::error::{RagError, Result};

pub const CONTEXT_PLACEHOLDER: &str = "{context}";
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// Phrase the default template asks the generator to return when the
/// context does not contain the answer.
pub const FALLBACK_ANSWER: &str = "Not available in the knowledge base.";

/// Default instruction template.
pub const DEFAULT_TEMPLATE: &str = "You are an internal insurance knowledge-base assistant.
Answer the question using only the context below. Do not make up answers.
If not available, reply: \"Not available in the knowledge base.\"

CONTEXT:
{context}

QUESTION: {question}
";

/// A validated prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Validate `template` and wrap it.
    ///
    /// # Errors
    ///
    /// [`RagError::Template`] naming the first missing placeholder.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in [CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(RagError::Template { placeholder });
            }
        }
        Ok(Self { template })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitute `context` and `question` into the template.
    pub fn render(&self, context: &str, question: &str) -> String {
        let mut out =
            String::with_capacity(self.template.len() + context.len() + question.len());
        let mut rest = self.template.as_str();

        while let Some(pos) = rest.find('{') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some(after) = tail.strip_prefix(CONTEXT_PLACEHOLDER) {
                out.push_str(context);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(QUESTION_PLACEHOLDER) {
                out.push_str(question);
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Validate `template` and render it in one step.
///
/// ```rust
/// use ragdesk_core::prompt::build_prompt;
///
/// let p = build_prompt("C={context} Q={question}", "ctx", "why?").unwrap();
/// assert_eq!(p, "C=ctx Q=why?");
/// assert!(build_prompt("Q={question}", "ctx", "why?").is_err());
/// ```
pub fn build_prompt(template: &str, context: &str, question: &str) -> Result<String> {
    Ok(PromptTemplate::new(template)?.render(context, question))
}
