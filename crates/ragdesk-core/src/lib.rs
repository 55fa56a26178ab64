//! # ragdesk core
//!
//! Runtime-agnostic retrieval-augmented generation core: document models,
//! an exact nearest-neighbor vector index, the retriever, context assembly,
//! prompt building, and the answer pipeline that composes them.
//!
//! This crate contains no tokio, HTTP client, filesystem I/O, or other
//! native-only dependencies. Embedding and text generation are reached
//! through the [`embedding::Embedder`] and [`generation::Generator`]
//! traits; concrete providers live in the `ragdesk` app crate.
//!
//! ```text
//! question ─▶ embed ─▶ search ─▶ assemble ─▶ prompt ─▶ generate ─▶ (answer, sources)
//! ```

pub mod context;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod knowledge;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod retrieve;

pub use error::{RagError, Result};
pub use models::Document;
