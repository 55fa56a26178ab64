//! # ragdesk
//!
//! A retrieval-augmented question-answering service over a small, fixed
//! knowledge base.
//!
//! At startup ragdesk loads a JSON corpus, embeds every document, and
//! builds an exact nearest-neighbour index in memory. Each question is
//! embedded, the closest documents are retrieved and inlined into a prompt
//! template, and a text-generation model produces the answer. Answers are
//! returned together with the documents they were grounded on.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ documents.json│──▶│   Embedder   │──▶│ VectorIndex  │
//! └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                               │ top-K
//!  question ──▶ embed ──▶ search ──▶ context ──▶ prompt ──▶ Generator
//!                                                               │
//!                      ┌─────────────────────┬──────────────────┘
//!                      ▼                     ▼
//!                 ┌──────────┐         ┌──────────┐
//!                 │   CLI    │         │   HTTP   │
//!                 │ (ragdesk)│         │  (/chat) │
//!                 └──────────┘         └──────────┘
//! ```
//!
//! The retrieval and prompt logic lives in the `ragdesk-core` crate; this
//! crate adds configuration, corpus loading, concrete model providers,
//! and the CLI and HTTP surfaces.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`corpus`] | Corpus file loading |
//! | [`backoff`] | HTTP retry policy |
//! | [`embedding`] | Embedding providers (OpenAI, Ollama, local) |
//! | [`generation`] | Generation providers (OpenAI, Ollama) |
//! | [`startup`] | One-time pipeline construction |
//! | [`ask`] | One-shot CLI commands |
//! | [`server`] | HTTP chat service |

pub mod ask;
pub mod backoff;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod generation;
pub mod server;
pub mod startup;
