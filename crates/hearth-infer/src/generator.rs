//! Streaming autoregressive generation loop.
//!
//! The loop is synchronous and CPU-bound; `stream` runs it on a blocking
//! worker and hands tokens to the caller through a channel, with
//! cancellation as a shared flag observed once per generated token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use hearth_core::types::{FinishReason, GenerationParams, GenerationResult};

use crate::codec::TextCodec;
use crate::sampler::Sampler;
use crate::session::{InferenceSession, ModelBundle};

/// One generation call: prompt plus effective sampling parameters.
/// Created per request, never persisted.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub params: GenerationParams,
    /// Fixed RNG seed for reproducible sampling; `None` draws entropy.
    pub seed: Option<u64>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, params: GenerationParams) -> Self {
        Self { prompt: prompt.into(), params, seed: None }
    }
}

/// Cooperative cancellation flag shared between caller and worker.
///
/// Observed at the top of each loop iteration; it never interrupts an
/// in-flight model step.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

fn final_text(codec: &TextCodec, ids: &[u32], fallback: &str) -> String {
    codec.decode(ids).unwrap_or_else(|_| fallback.to_string())
}

/// Run one generation to completion, invoking `on_token` with each freshly
/// decoded token in generation order.
///
/// Termination is checked per iteration in priority order: cancellation,
/// end-of-sequence, token budget. Internal failures abort the request with
/// `FinishReason::Error`; the session stays usable for the next request.
pub fn run(
    session: &mut InferenceSession,
    request: &GenerationRequest,
    cancel: &CancelToken,
    mut on_token: impl FnMut(&str),
) -> GenerationResult {
    let bundle = match session.bundle_mut() {
        Ok(b) => b,
        Err(e) => {
            return GenerationResult { text: String::new(), finish: FinishReason::Error(e.to_string()) }
        }
    };
    let ModelBundle { model, codec, eos_id, .. } = bundle;
    let eos = *eos_id;
    let params = request.params;

    let mut history = match codec.encode(&request.prompt) {
        Ok(ids) => ids,
        Err(e) => {
            return GenerationResult { text: String::new(), finish: FinishReason::Error(e.to_string()) }
        }
    };

    let mut sampler = request.seed.map_or_else(Sampler::new, Sampler::with_seed);
    let mut generated: Vec<u32> = Vec::new();
    let mut streamed = String::new();

    while generated.len() < params.max_tokens {
        if cancel.is_cancelled() {
            return GenerationResult {
                text: final_text(codec, &generated, &streamed),
                finish: FinishReason::Cancelled,
            };
        }

        history = codec.clamp_window(history);
        let logits = match model.step(&history) {
            Ok(l) => l,
            Err(e) => {
                return GenerationResult {
                    text: final_text(codec, &generated, &streamed),
                    finish: FinishReason::Error(e.to_string()),
                }
            }
        };
        let next = match sampler.sample(&logits, params.temperature, params.top_k, params.top_p) {
            Ok(id) => id,
            Err(e) => {
                return GenerationResult {
                    text: final_text(codec, &generated, &streamed),
                    finish: FinishReason::Error(e.to_string()),
                }
            }
        };

        if next == eos {
            return GenerationResult {
                text: final_text(codec, &generated, &streamed),
                finish: FinishReason::Completed,
            };
        }

        history.push(next);
        generated.push(next);
        let piece = match codec.decode_token(next) {
            Ok(p) => p,
            Err(e) => {
                return GenerationResult {
                    text: final_text(codec, &generated, &streamed),
                    finish: FinishReason::Error(e.to_string()),
                }
            }
        };
        on_token(&piece);
        streamed.push_str(&piece);
    }

    GenerationResult {
        text: final_text(codec, &generated, &streamed),
        finish: FinishReason::MaxTokensReached,
    }
}

/// A generation running on a blocking worker: drain `tokens` as they
/// arrive, then `finish()` for the final result.
pub struct StreamingGeneration {
    pub tokens: mpsc::UnboundedReceiver<String>,
    pub cancel: CancelToken,
    handle: JoinHandle<GenerationResult>,
}

impl StreamingGeneration {
    pub async fn finish(self) -> GenerationResult {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => GenerationResult {
                text: String::new(),
                finish: FinishReason::Error(format!("generation worker failed: {}", e)),
            },
        }
    }
}

/// Spawn `run` off the caller's execution context. The session mutex keeps
/// load/unload and concurrent generations mutually exclusive: at most one
/// generation runs per loaded model.
pub fn stream(
    session: Arc<Mutex<InferenceSession>>,
    request: GenerationRequest,
) -> StreamingGeneration {
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = tokio::task::spawn_blocking(move || {
        let mut guard = match session.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        run(&mut guard, &request, &worker_cancel, |piece| {
            // A closed receiver only means the caller stopped listening;
            // generation still runs to its own termination condition.
            let _ = tx.send(piece.to_string());
        })
    });

    StreamingGeneration { tokens: rx, cancel, handle }
}
