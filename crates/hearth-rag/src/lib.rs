//! Retrieval-augmented generation: document ingestion, similarity
//! retrieval and the engine context tying retrieval to the generation
//! loop.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod context;
pub mod prompt;
pub mod retriever;

pub use context::{EngineContext, DEFAULT_RETRIEVAL_K};
pub use retriever::Retriever;
