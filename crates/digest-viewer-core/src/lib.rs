//! # Digest Viewer Core
//!
//! Runtime-free logic for Digest Viewer: data models, the CSV tokenizer,
//! record normalization, tag indexing, filtering, and the renderer
//! capability trait driven by the [`viewer::Viewer`] controller.
//!
//! This crate contains no tokio, network, filesystem I/O, or other
//! native-only dependencies. It compiles to both native targets and
//! `wasm32-unknown-unknown`.
//!
//! ## Pipeline
//!
//! ```text
//! raw text ─▶ csv::tokenize ─▶ normalize::to_records ─┬─▶ tags::unique_tags ─▶ chips
//!                                                      └─▶ filter::apply_filters ─▶ cards
//! ```

pub mod csv;
pub mod filter;
pub mod models;
pub mod normalize;
pub mod render;
pub mod tags;
pub mod viewer;
