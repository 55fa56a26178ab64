//! End-to-end retrieval scenarios over a two-policy corpus.

use std::sync::Arc;

use async_trait::async_trait;
use ragdesk_core::context::assemble;
use ragdesk_core::embedding::Embedder;
use ragdesk_core::generation::Generator;
use ragdesk_core::index::VectorIndex;
use ragdesk_core::knowledge::KnowledgeBase;
use ragdesk_core::models::number_documents;
use ragdesk_core::pipeline::Pipeline;
use ragdesk_core::prompt::{PromptTemplate, FALLBACK_ANSWER};
use ragdesk_core::retrieve::retrieve;
use ragdesk_core::{Document, RagError};

struct QueryEmbedder(Vec<f32>);

#[async_trait]
impl Embedder for QueryEmbedder {
    fn model_name(&self) -> &str {
        "query"
    }
    fn dims(&self) -> usize {
        self.0.len()
    }
    async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(self.0.clone())
    }
}

/// Answers with the fallback phrase when the prompt carries no context.
struct FallbackAwareGenerator;

#[async_trait]
impl Generator for FallbackAwareGenerator {
    fn model_name(&self) -> &str {
        "fallback-aware"
    }
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        if prompt.contains("Covers fire damage.") {
            Ok("Yes, fire damage is covered.".to_string())
        } else {
            Ok(FALLBACK_ANSWER.to_string())
        }
    }
}

fn policies() -> Vec<Document> {
    number_documents([
        ("Policy A", "Covers fire damage."),
        ("Policy B", "Covers theft."),
    ])
}

#[test]
fn test_search_scenario_distances() {
    let index = VectorIndex::build(vec![vec![0.0, 0.0], vec![10.0, 10.0]]).unwrap();
    let hits = index.search(&[1.0, 0.0], 2).unwrap();
    assert_eq!((hits[0].index, hits[0].distance), (0, 1.0));
    assert_eq!((hits[1].index, hits[1].distance), (1, 181.0));
}

#[tokio::test]
async fn test_retrieve_and_assemble_scenario() {
    let index = VectorIndex::build(vec![vec![0.0, 0.0], vec![10.0, 10.0]]).unwrap();
    let corpus = policies();
    let docs = retrieve(
        "Is fire damage covered?",
        1,
        &QueryEmbedder(vec![1.0, 0.0]),
        &index,
        &corpus,
    )
    .await
    .unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].title, "Policy A");
    assert_eq!(assemble(&docs), "Policy A: Covers fire damage.");
}

#[test]
fn test_empty_corpus_scenario() {
    assert!(matches!(
        VectorIndex::build(Vec::new()),
        Err(RagError::EmptyCorpus)
    ));
}

#[test]
fn test_equidistant_scenario() {
    let index = VectorIndex::build(vec![vec![1.0, 1.0], vec![1.0, 1.0]]).unwrap();
    let hits = index.search(&[0.0, 0.0], 1).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].index, 0);
}

#[tokio::test]
async fn test_pipeline_answer_scenario() {
    let index = VectorIndex::build(vec![vec![0.0, 0.0], vec![10.0, 10.0]]).unwrap();
    let knowledge = Arc::new(KnowledgeBase::from_parts(policies(), index).unwrap());

    let pipeline = Pipeline::builder(
        knowledge.clone(),
        Arc::new(QueryEmbedder(vec![1.0, 0.0])),
        Arc::new(FallbackAwareGenerator),
    )
    .top_k(1)
    .template(PromptTemplate::default())
    .build()
    .unwrap();

    let answer = pipeline.answer("Is fire damage covered?").await.unwrap();
    assert_eq!(answer.answer, "Yes, fire damage is covered.");
    assert_eq!(answer.sources, vec![knowledge.documents()[0].clone()]);

    let far = Pipeline::builder(
        knowledge,
        Arc::new(QueryEmbedder(vec![10.0, 9.0])),
        Arc::new(FallbackAwareGenerator),
    )
    .top_k(1)
    .build()
    .unwrap();
    let answer = far.answer("Is theft covered?").await.unwrap();
    assert_eq!(answer.answer, FALLBACK_ANSWER);
    assert_eq!(answer.sources[0].title, "Policy B");
}
