//! Small numeric helpers behind the visual panels.
//!
//! ## Sampling Pipeline
//!
//! ```text
//! Logits [vocab]
//!     │
//!     ▼ Temperature scaling
//! Logits / temperature
//!     │
//!     ▼ Top-k filtering (optional)
//! Keep top k tokens
//!     │
//!     ▼ Softmax over kept tokens
//! Probabilities (excluded = 0)
//!     │
//!     ▼ Top-p filtering (optional)
//! Cumulative prob until it crosses p
//!     │
//!     ▼ Renormalize + Sample
//! Selected token
//! ```
//!
//! Everything here works on a handful of values, so plain slices are used
//! throughout.

use std::cmp::Ordering;

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

/// Smoothing added to the standard deviation before dividing.
pub const STD_EPS: f32 = 1e-6;

/// Temperatures below this sample greedily. Dividing by anything smaller
/// can push logits to infinity.
pub const MIN_TEMPERATURE: f32 = 1e-4;

/// Whether `temperature` selects greedy decoding.
pub fn is_greedy(temperature: f32) -> bool {
    !(temperature >= MIN_TEMPERATURE)
}

/// Arithmetic mean. Empty input gives 0.
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Population standard deviation (divides by n).
pub fn population_std(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f32>() / values.len() as f32;
    var.sqrt()
}

/// Group-relative advantages: `(r - mean) / (std + eps)`.
pub fn advantages(rewards: &[f32]) -> Vec<f32> {
    let m = mean(rewards);
    let denom = population_std(rewards) + STD_EPS;
    rewards.iter().map(|r| (r - m) / denom).collect()
}

/// Indices sorted by value, descending. Ties keep their original order.
pub fn argsort_desc(values: &[f32]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| {
        values[b]
            .partial_cmp(&values[a])
            .unwrap_or(Ordering::Equal)
    });
    idx
}

/// Index of the largest value.
pub fn argmax(values: &[f32]) -> Option<usize> {
    argsort_desc(values).first().copied()
}

/// Divide logits by the temperature. Greedy temperatures leave them unchanged.
pub fn scale_by_temperature(logits: &[f32], temperature: f32) -> Vec<f32> {
    if !is_greedy(temperature) && temperature != 1.0 {
        logits.iter().map(|l| l / temperature).collect()
    } else {
        logits.to_vec()
    }
}

/// Mask of the `k` largest values. `k == 0` or `k >= len` keeps everything.
pub fn top_k_mask(values: &[f32], k: usize) -> Vec<bool> {
    if k == 0 || k >= values.len() {
        return vec![true; values.len()];
    }
    let mut mask = vec![false; values.len()];
    for i in argsort_desc(values).into_iter().take(k) {
        mask[i] = true;
    }
    mask
}

/// Softmax over the masked-in entries; masked-out entries get probability 0.
pub fn masked_softmax(values: &[f32], mask: &[bool]) -> Vec<f32> {
    let max = values
        .iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(v, _)| *v)
        .fold(f32::NEG_INFINITY, f32::max);
    if max == f32::NEG_INFINITY {
        return vec![0.0; values.len()];
    }

    let exps: Vec<f32> = values
        .iter()
        .zip(mask)
        .map(|(v, keep)| if *keep { (v - max).exp() } else { 0.0 })
        .collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Plain softmax.
pub fn softmax(values: &[f32]) -> Vec<f32> {
    masked_softmax(values, &vec![true; values.len()])
}

/// Nucleus mask: walk tokens by descending probability until the
/// cumulative mass exceeds `p`, including the token that crosses it.
///
/// `p` outside (0, 1) disables the filter (every non-zero entry is kept).
pub fn nucleus_mask(probs: &[f32], p: f32) -> Vec<bool> {
    if !(p > 0.0 && p < 1.0) {
        return probs.iter().map(|q| *q > 0.0).collect();
    }
    let mut mask = vec![false; probs.len()];
    let mut cumulative = 0.0f32;
    for i in argsort_desc(probs) {
        if probs[i] <= 0.0 {
            break;
        }
        mask[i] = true;
        cumulative += probs[i];
        if cumulative > p {
            break;
        }
    }
    mask
}

/// Cumulative sums in the order given by `order`, written back by index.
pub fn cumulative_by(probs: &[f32], order: &[usize]) -> Vec<f32> {
    let mut out = vec![0.0; probs.len()];
    let mut running = 0.0f32;
    for &i in order {
        running += probs[i];
        out[i] = running;
    }
    out
}

/// Zero the masked-out entries and rescale the rest to sum to 1.
pub fn renormalize(probs: &[f32], mask: &[bool]) -> Vec<f32> {
    let kept: f32 = probs
        .iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(p, _)| *p)
        .sum();
    if kept <= 0.0 {
        return vec![0.0; probs.len()];
    }
    probs
        .iter()
        .zip(mask)
        .map(|(p, keep)| if *keep { p / kept } else { 0.0 })
        .collect()
}

/// Weighted random draw. `None` when no weight is positive.
pub fn weighted_draw<R: Rng + ?Sized>(rng: &mut R, weights: &[f32]) -> Option<usize> {
    let dist = WeightedIndex::new(weights.iter().map(|w| w.max(0.0) as f64)).ok()?;
    Some(dist.sample(rng))
}

/// Sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    /// Temperature (below `MIN_TEMPERATURE` means greedy).
    pub temperature: f32,
    /// Top-k (0 = disabled).
    pub top_k: usize,
    /// Top-p (outside (0, 1) = disabled).
    pub top_p: f32,
}

/// One token's journey through the sampling pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRow {
    /// Token text.
    pub token: &'static str,
    /// Raw logit.
    pub logit: f32,
    /// Logit after temperature scaling.
    pub scaled: f32,
    /// Survived top-k.
    pub in_top_k: bool,
    /// Softmax probability over the top-k set.
    pub prob: f32,
    /// Cumulative probability in descending order.
    pub cumulative: f32,
    /// Survived top-p.
    pub in_nucleus: bool,
    /// Final renormalized probability.
    pub final_prob: f32,
}

/// Run every stage of the pipeline and keep the intermediate values.
pub fn sampling_table(vocab: &[(&'static str, f32)], params: SamplingParams) -> Vec<TokenRow> {
    let logits: Vec<f32> = vocab.iter().map(|(_, l)| *l).collect();
    let greedy = is_greedy(params.temperature);

    let scaled = scale_by_temperature(&logits, params.temperature);
    let top_k = if greedy {
        top_k_mask(&scaled, 1)
    } else {
        top_k_mask(&scaled, params.top_k)
    };
    let probs = masked_softmax(&scaled, &top_k);
    let cumulative = cumulative_by(&probs, &argsort_desc(&probs));
    let nucleus = if greedy {
        top_k.clone()
    } else {
        nucleus_mask(&probs, params.top_p)
    };
    let finals = renormalize(&probs, &nucleus);

    vocab
        .iter()
        .enumerate()
        .map(|(i, &(token, logit))| TokenRow {
            token,
            logit,
            scaled: scaled[i],
            in_top_k: top_k[i],
            prob: probs[i],
            cumulative: if top_k[i] { cumulative[i] } else { 0.0 },
            in_nucleus: nucleus[i],
            final_prob: finals[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), 5.0);
        assert!((population_std(&values) - 2.0).abs() < 1e-6);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_advantages_of_constant_group_are_zero() {
        let adv = advantages(&[0.5, 0.5, 0.5]);
        assert!(adv.iter().all(|a| a.abs() < 1e-3));
    }

    #[test]
    fn test_top_k_mask() {
        let mask = top_k_mask(&[0.1, 0.2, 0.3, 10.0, 9.0], 2);
        assert_eq!(mask, vec![false, false, false, true, true]);
        assert!(top_k_mask(&[1.0, 2.0], 0).iter().all(|m| *m));
    }

    #[test]
    fn test_masked_softmax_zeroes_excluded() {
        let probs = masked_softmax(&[1.0, 2.0, 3.0], &[true, false, true]);
        assert_eq!(probs[1], 0.0);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_nucleus_includes_crossing_token() {
        // 0.5 + 0.3 = 0.8 > 0.6, so two tokens survive.
        let mask = nucleus_mask(&[0.5, 0.3, 0.2], 0.6);
        assert_eq!(mask, vec![true, true, false]);
    }

    #[test]
    fn test_greedy_keeps_only_argmax() {
        let vocab = [("a", 1.0), ("b", 3.0), ("c", 2.0)];
        let rows = sampling_table(
            &vocab,
            SamplingParams {
                temperature: 0.0,
                top_k: 0,
                top_p: 1.0,
            },
        );
        assert_eq!(rows[1].final_prob, 1.0);
        assert_eq!(rows[0].final_prob, 0.0);
        assert_eq!(rows[2].final_prob, 0.0);
    }

    #[test]
    fn test_tiny_temperature_is_greedy() {
        let vocab = [("a", 1.0), ("b", 3.0), ("c", 2.0)];
        let rows = sampling_table(
            &vocab,
            SamplingParams {
                temperature: 1e-40,
                top_k: 2,
                top_p: 0.9,
            },
        );
        assert!(rows.iter().all(|r| r.prob.is_finite() && r.final_prob.is_finite()));
        let total: f32 = rows.iter().map(|r| r.prob).sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert_eq!(rows[1].final_prob, 1.0);
        assert_eq!(rows[0].prob, 0.0);
        assert_eq!(rows[2].prob, 0.0);
        assert_eq!(rows[1].scaled, 3.0);
    }

    #[test]
    fn test_weighted_draw_respects_zero_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let idx = weighted_draw(&mut rng, &[0.0, 1.0, 0.0]).unwrap();
            assert_eq!(idx, 1);
        }
        assert_eq!(weighted_draw(&mut rng, &[0.0, 0.0]), None);
    }
}
