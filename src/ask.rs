//! One-shot CLI commands: `ask`, `search`, and `check`.
//!
//! Output goes to stdout; logs go to stderr so answers can be piped.

use anyhow::Result;
use std::fmt::Write;

use ragdesk_core::models::{Answer, RetrievedDocument};

use crate::config::Config;
use crate::corpus::load_corpus;
use crate::startup::build_pipeline;

const EXCERPT_CHARS: usize = 160;

/// Answer a single question and print the answer with its sources.
pub async fn run_ask(config: &Config, question: &str) -> Result<()> {
    let pipeline = build_pipeline(config).await?;
    let answer = pipeline.answer(question).await?;
    print!("{}", format_answer(&answer));
    Ok(())
}

/// Print the nearest documents for a question, without generating.
pub async fn run_search(config: &Config, question: &str, k: Option<usize>) -> Result<()> {
    let pipeline = build_pipeline(config).await?;
    let k = k.unwrap_or_else(|| pipeline.top_k());
    let results = pipeline.search(question, k).await?;
    print!("{}", format_results(&results));
    Ok(())
}

/// Validate config and corpus without contacting any provider.
pub fn run_check(config: &Config) -> Result<()> {
    let documents = load_corpus(&config.corpus.path)?;
    let empty = documents.iter().filter(|d| d.content.trim().is_empty()).count();

    println!("ragdesk: configuration check");
    println!("============================");
    println!();
    println!("  Corpus:      {}", config.corpus.path.display());
    println!("  Documents:   {}", documents.len());
    if empty > 0 {
        println!("  Empty:       {} (no content)", empty);
    }
    println!("  Top-K:       {}", config.retrieval.top_k);
    println!(
        "  Embedding:   {} / {}",
        config.embedding.provider,
        config.embedding.model.as_deref().unwrap_or("default")
    );
    println!(
        "  Generation:  {} / {}",
        config.generation.provider, config.generation.model
    );
    println!("  Bind:        {}", config.server.bind);
    println!();

    if documents.is_empty() {
        anyhow::bail!("corpus is empty; the index cannot be built");
    }
    println!("OK");
    Ok(())
}

/// Render an answer followed by its numbered sources.
pub fn format_answer(answer: &Answer) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", answer.answer);
    if !answer.sources.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Sources:");
        for (i, doc) in answer.sources.iter().enumerate() {
            let _ = writeln!(out, "  {}. {} (id {})", i + 1, doc.title, doc.id);
        }
    }
    out
}

/// Render ranked search results, one block per document.
pub fn format_results(results: &[RetrievedDocument]) -> String {
    if results.is_empty() {
        return "No results.\n".to_string();
    }

    let mut out = String::new();
    for (i, hit) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. [{:.4}] {}",
            i + 1,
            hit.distance,
            hit.document.title
        );
        let _ = writeln!(out, "    excerpt: \"{}\"", excerpt(&hit.document.content));
        let _ = writeln!(out, "    id: {}", hit.document.id);
        let _ = writeln!(out);
    }
    out
}

fn excerpt(content: &str) -> String {
    let flat = content.replace('\n', " ");
    let flat = flat.trim();
    match flat.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}…", &flat[..cut]),
        None => flat.to_string(),
    }
}
