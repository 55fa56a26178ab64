//! Corpus loading.
//!
//! The corpus is a JSON array of `{ "title": ..., "content": ... }` records,
//! read once before the index is built. Each record becomes a
//! [`Document`] whose `id` is its array position. Extra fields are ignored;
//! a record missing `title` or `content` fails startup.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use ragdesk_core::models::number_documents;
use ragdesk_core::Document;

#[derive(Debug, Deserialize)]
struct CorpusRecord {
    title: String,
    content: String,
}

/// Read and parse the corpus file at `path`.
pub fn load_corpus(path: &Path) -> Result<Vec<Document>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus file: {}", path.display()))?;
    parse_corpus(&text).with_context(|| format!("Invalid corpus file: {}", path.display()))
}

/// Parse corpus JSON text into documents in file order.
pub fn parse_corpus(text: &str) -> Result<Vec<Document>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(text).context("corpus must be a JSON array of records")?;

    let records = values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::from_value::<CorpusRecord>(value)
                .with_context(|| format!("record {} is not a {{title, content}} object", i))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(number_documents(
        records.into_iter().map(|r| (r.title, r.content)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assigns_ids_in_order() {
        let docs = parse_corpus(
            r#"[
                {"title": "Policy A", "content": "Covers fire damage."},
                {"title": "Policy B", "content": "Covers theft.", "category": "home"}
            ]"#,
        )
        .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0], Document::new(0, "Policy A", "Covers fire damage."));
        assert_eq!(docs[1].id, 1);
        assert_eq!(docs[1].content, "Covers theft.");
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_corpus("[]").unwrap().is_empty());
    }

    #[test]
    fn test_missing_field_names_record() {
        let err = parse_corpus(
            r#"[{"title": "ok", "content": "fine"}, {"title": "no content"}]"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("record 1"), "{:#}", err);
    }

    #[test]
    fn test_not_an_array() {
        assert!(parse_corpus(r#"{"title": "x", "content": "y"}"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_corpus(Path::new("/nonexistent/documents.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read corpus file"));
    }

    #[test]
    fn test_sample_corpus_parses() {
        let docs = parse_corpus(include_str!("../data/documents.json")).unwrap();
        assert_eq!(docs.len(), 5);
        assert_eq!(docs[4].id, 4);
    }
}
