//! Context block assembly.
//!
//! Renders retrieved documents, in retrieval order, as
//! `"{title}: {content}"` passages joined by a blank line. Output is a pure
//! function of the input sequence. An empty input yields an empty string,
//! which callers treat as "no relevant context found".

use crate::models::Document;

/// Separator placed between passages.
pub const PASSAGE_SEPARATOR: &str = "\n\n";

/// Assemble documents into a context block with no length bound.
///
/// ```rust
/// use ragdesk_core::context::assemble;
/// use ragdesk_core::Document;
///
/// let docs = vec![
///     Document::new(0, "Policy A", "Covers fire damage."),
///     Document::new(1, "Policy B", "Covers theft."),
/// ];
/// assert_eq!(
///     assemble(&docs),
///     "Policy A: Covers fire damage.\n\nPolicy B: Covers theft."
/// );
/// assert_eq!(assemble(&[]), "");
/// ```
pub fn assemble(documents: &[Document]) -> String {
    ContextAssembler::default().assemble(documents)
}

/// Context assembler with an optional per-passage content bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextAssembler {
    max_passage_chars: Option<usize>,
}

impl ContextAssembler {
    /// `max_passage_chars` caps each document's content, counted in
    /// Unicode scalar values. `None` leaves content untouched.
    pub fn new(max_passage_chars: Option<usize>) -> Self {
        Self { max_passage_chars }
    }

    pub fn max_passage_chars(&self) -> Option<usize> {
        self.max_passage_chars
    }

    pub fn assemble(&self, documents: &[Document]) -> String {
        documents
            .iter()
            .map(|d| {
                let content = match self.max_passage_chars {
                    Some(max) => truncate_chars(&d.content, max),
                    None => d.content.as_str(),
                };
                format!("{}: {}", d.title, content)
            })
            .collect::<Vec<_>>()
            .join(PASSAGE_SEPARATOR)
    }
}

/// Longest prefix of `s` holding at most `max` chars, cut on a char boundary.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}
