//! Core data models shared by the retrieval pipeline.

use serde::Serialize;

/// A corpus document.
///
/// `id` is the document's position in the corpus (0-based) and doubles as
/// its position in the [`VectorIndex`](crate::index::VectorIndex). Documents
/// are never mutated after the index is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: usize,
    pub title: String,
    pub content: String,
}

impl Document {
    pub fn new(id: usize, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
        }
    }
}

/// A document returned by retrieval together with its squared Euclidean
/// distance to the query vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedDocument {
    #[serde(flatten)]
    pub document: Document,
    pub distance: f32,
}

/// The result of one answer-pipeline call.
///
/// `sources` is exactly the retrieval result that was fed to the
/// generator, in ranking order.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<Document>,
}

/// Number `(title, content)` records by position, producing the corpus in
/// document order.
pub fn number_documents<I, T, C>(records: I) -> Vec<Document>
where
    I: IntoIterator<Item = (T, C)>,
    T: Into<String>,
    C: Into<String>,
{
    records
        .into_iter()
        .enumerate()
        .map(|(id, (title, content))| Document::new(id, title, content))
        .collect()
}
