//! File-backed vector store.
//!
//! Layout: `<root>/index.json` maps document ids to per-document blob pairs
//! under `<root>/documents/` (raw f32 embedding matrix + metadata JSON).
//! Single-writer, best-effort concurrent reads.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod blob;
pub mod store;

pub use store::{IndexEntry, VectorStore};
