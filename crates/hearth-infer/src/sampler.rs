//! Next-token sampling: temperature scaling, top-k, softmax, nucleus
//! filtering, categorical draw.

use hearth_core::error::{EngineError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MIN_TEMPERATURE: f32 = 1e-5;

/// Stateful sampler owning its RNG. A fixed seed makes generation
/// reproducible.
pub struct Sampler {
    rng: StdRng,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler {
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Draw one token id from `logits`.
    ///
    /// The filter order is part of the contract and must not be reordered:
    /// temperature, then top-k on logits, then softmax, then top-p on
    /// probabilities. Top-p keeps at least the single most likely token
    /// even when its own probability already exceeds `top_p`.
    pub fn sample(&mut self, logits: &[f32], temperature: f32, top_k: usize, top_p: f32) -> Result<u32> {
        if logits.is_empty() {
            return Err(EngineError::Generation("empty logits".to_string()));
        }

        // 1. Temperature scaling; the floor keeps t -> 0 greedy instead of
        // dividing by zero.
        let temp = temperature.max(MIN_TEMPERATURE);
        let mut scaled: Vec<f32> = logits.iter().map(|&l| l / temp).collect();

        // 2. Top-k: everything below the k-th highest logit is excluded.
        if top_k > 0 && top_k < scaled.len() {
            let mut sorted = scaled.clone();
            sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
            let cutoff = sorted[top_k - 1];
            for v in &mut scaled {
                if *v < cutoff {
                    *v = f32::NEG_INFINITY;
                }
            }
        }

        // 3. Numerically stable softmax.
        let max = scaled.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if !max.is_finite() {
            return Err(EngineError::Generation("no finite logits to sample from".to_string()));
        }
        let mut probs: Vec<f32> = scaled.iter().map(|&v| (v - max).exp()).collect();
        let sum: f32 = probs.iter().sum();
        if !(sum.is_finite() && sum > 0.0) {
            return Err(EngineError::Generation("degenerate probability mass".to_string()));
        }
        for p in &mut probs {
            *p /= sum;
        }

        // 4. Nucleus filtering: zero everything strictly beyond the first
        // index (in descending probability order) whose cumulative sum
        // exceeds top_p. The crossing token itself survives, so at least
        // one candidate always remains.
        if top_p < 1.0 {
            let mut order: Vec<usize> = (0..probs.len()).collect();
            order.sort_by(|&a, &b| {
                probs[b].partial_cmp(&probs[a]).unwrap_or(std::cmp::Ordering::Equal)
            });
            let mut cumulative = 0.0f32;
            let mut crossed = false;
            for &idx in &order {
                if crossed {
                    probs[idx] = 0.0;
                } else {
                    cumulative += probs[idx];
                    crossed = cumulative > top_p;
                }
            }
        }

        // 5. Renormalize the surviving mass.
        let remaining: f32 = probs.iter().sum();
        if !(remaining.is_finite() && remaining > 0.0) {
            return Err(EngineError::Generation("no candidates after filtering".to_string()));
        }
        for p in &mut probs {
            *p /= remaining;
        }

        // 6. Categorical draw over the nonzero entries.
        let r: f32 = self.rng.gen();
        let mut acc = 0.0f32;
        let mut last_nonzero = None;
        for (idx, &p) in probs.iter().enumerate() {
            if p <= 0.0 {
                continue;
            }
            acc += p;
            last_nonzero = Some(idx);
            if r < acc {
                return Ok(idx as u32);
            }
        }
        // Float rounding can leave acc fractionally below 1.0; fall back to
        // the last surviving candidate.
        last_nonzero
            .map(|idx| idx as u32)
            .ok_or_else(|| EngineError::Generation("no candidates after filtering".to_string()))
    }
}
