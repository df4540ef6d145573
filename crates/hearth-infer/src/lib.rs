//! Local text-generation engine: tokenizer codec, sampling, inference
//! session and the streaming generation loop.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod codec;
pub mod device;
pub mod generator;
pub mod model;
pub mod sampler;
pub mod session;

pub use codec::TextCodec;
pub use generator::{run, stream, CancelToken, GenerationRequest, StreamingGeneration};
pub use model::{FakeLanguageModel, LanguageModel};
pub use session::{InferenceSession, ModelBundle, SessionState};
