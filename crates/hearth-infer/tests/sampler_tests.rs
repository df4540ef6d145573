use hearth_infer::sampler::Sampler;

#[test]
fn near_zero_temperature_is_greedy() {
    let logits = vec![1.0, 5.0, 2.0, 4.9];
    for seed in 0..50 {
        let mut sampler = Sampler::with_seed(seed);
        let id = sampler.sample(&logits, 0.0, 0, 1.0).expect("sample");
        assert_eq!(id, 1, "temperature -> 0 sharpens to argmax");
    }
}

#[test]
fn top_k_one_is_greedy_regardless_of_temperature() {
    let logits = vec![0.5, 0.1, 3.0, 2.9, -1.0];
    for seed in 0..50 {
        let mut sampler = Sampler::with_seed(seed);
        let id = sampler.sample(&logits, 1.5, 1, 1.0).expect("sample");
        assert_eq!(id, 2);
    }
}

#[test]
fn never_selects_a_token_excluded_by_top_k() {
    let logits = vec![5.0, 4.0, 1.0, 0.5, -2.0];
    for seed in 0..200 {
        let mut sampler = Sampler::with_seed(seed);
        let id = sampler.sample(&logits, 1.0, 2, 1.0).expect("sample");
        assert!(id == 0 || id == 1, "only the two highest logits survive, got {}", id);
    }
}

#[test]
fn never_selects_a_token_excluded_by_top_p() {
    // Softmax of ln-probabilities reproduces [0.5, 0.3, 0.2]; with
    // top_p = 0.7 the cumulative sum crosses at the second entry, so the
    // 0.2 tail must never be drawn.
    let logits = vec![0.5f32.ln(), 0.3f32.ln(), 0.2f32.ln()];
    let mut saw_second = false;
    for seed in 0..300 {
        let mut sampler = Sampler::with_seed(seed);
        let id = sampler.sample(&logits, 1.0, 0, 0.7).expect("sample");
        assert!(id < 2, "token beyond the nucleus must be excluded, got {}", id);
        if id == 1 {
            saw_second = true;
        }
    }
    assert!(saw_second, "the crossing token itself stays in the nucleus");
}

#[test]
fn top_p_always_keeps_the_most_likely_token() {
    // The top probability (~0.99) alone exceeds top_p = 0.1; it must
    // still be sampleable, and is the only survivor.
    let logits = vec![10.0, 0.0, -1.0, -2.0];
    for seed in 0..100 {
        let mut sampler = Sampler::with_seed(seed);
        let id = sampler.sample(&logits, 1.0, 0, 0.1).expect("sample");
        assert_eq!(id, 0);
    }
}

#[test]
fn filters_compose_top_k_before_top_p() {
    // top_k = 2 keeps indices 0 and 1; renormalized they are ~[0.73, 0.27],
    // so top_p = 0.5 narrows further to index 0 alone.
    let logits = vec![2.0, 1.0, 0.9, 0.8];
    for seed in 0..100 {
        let mut sampler = Sampler::with_seed(seed);
        let id = sampler.sample(&logits, 1.0, 2, 0.5).expect("sample");
        assert_eq!(id, 0);
    }
}

#[test]
fn sampled_ids_are_always_in_vocabulary() {
    let logits: Vec<f32> = (0..64).map(|i| ((i * 37) % 11) as f32 * 0.3).collect();
    for seed in 0..100 {
        let mut sampler = Sampler::with_seed(seed);
        let id = sampler.sample(&logits, 0.9, 40, 0.9).expect("sample");
        assert!((id as usize) < logits.len());
    }
}

#[test]
fn degenerate_inputs_are_typed_errors() {
    let mut sampler = Sampler::with_seed(7);
    assert!(sampler.sample(&[], 1.0, 0, 1.0).is_err(), "empty logits");
    let all_neg_inf = vec![f32::NEG_INFINITY; 4];
    assert!(sampler.sample(&all_neg_inf, 1.0, 0, 1.0).is_err(), "no finite logits");
}
