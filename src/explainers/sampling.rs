//! Token sampling: temperature, top-k, softmax, top-p and the final draw.

use crate::core::{Candidate, Controls, Deck, InputField, Step, Visual};
use crate::error::Result;
use crate::mock::data::{SAMPLING_LOGITS, SAMPLING_PROMPT};
use crate::mock::math::{SamplingParams, TokenRow, argsort_desc, is_greedy, sampling_table};
use crate::visualizers::{
    grid, intensity_to_block, pad, probability_bars, ratio_bar, token_sequence_box,
};

const BAR_WIDTH: usize = 30;

/// Visual state of a sampling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingVisual {
    Logits,
    Temperature,
    TopK,
    Softmax,
    TopP,
    Draw,
}

/// Sampling parameters taken from the controls.
pub fn params(controls: &Controls) -> SamplingParams {
    SamplingParams {
        temperature: controls.temperature,
        top_k: controls.top_k,
        top_p: controls.top_p,
    }
}

/// The full pipeline table for the current controls.
pub fn table(controls: &Controls) -> Vec<TokenRow> {
    sampling_table(&SAMPLING_LOGITS, params(controls))
}

impl Visual for SamplingVisual {
    fn draw(&self, controls: &Controls) -> Result<String> {
        let rows = table(controls);
        Ok(match self {
            SamplingVisual::Logits => draw_logits(&rows),
            SamplingVisual::Temperature => draw_temperature(&rows, controls.temperature),
            SamplingVisual::TopK => draw_top_k(&rows, controls.top_k),
            SamplingVisual::Softmax => draw_softmax(&rows),
            SamplingVisual::TopP => draw_top_p(&rows, controls.top_p),
            SamplingVisual::Draw => draw_final(&rows),
        })
    }

    fn draw_candidates(&self, controls: &Controls) -> Option<Vec<Candidate>> {
        if *self != SamplingVisual::Draw {
            return None;
        }
        Some(
            table(controls)
                .into_iter()
                .filter(|r| r.final_prob > 0.0)
                .map(|r| Candidate {
                    label: r.token.to_string(),
                    weight: r.final_prob,
                })
                .collect(),
        )
    }
}

fn draw_logits(rows: &[TokenRow]) -> String {
    let prompt: Vec<&str> = SAMPLING_PROMPT.split(' ').collect();
    let max = rows.iter().map(|r| r.logit).fold(f32::MIN, f32::max);
    let mut lines = vec![token_sequence_box(&prompt, Some(prompt.len()), "prompt: ")];
    lines.push(String::new());
    lines.push("Raw logits for the next token:".to_string());
    for r in rows {
        lines.push(format!(
            "  {} {:5.2}  {}",
            pad(r.token, 4),
            r.logit,
            ratio_bar(r.logit / max, BAR_WIDTH)
        ));
    }
    lines.join("\n")
}

fn draw_temperature(rows: &[TokenRow], temperature: f32) -> String {
    let header = vec!["logit".to_string(), "÷ T".to_string()];
    let body: Vec<(String, Vec<String>)> = rows
        .iter()
        .map(|r| {
            (
                r.token.to_string(),
                vec![format!("{:.2}", r.logit), format!("{:.2}", r.scaled)],
            )
        })
        .collect();

    let note = if is_greedy(temperature) {
        format!("T = {temperature:.2} → greedy: the top logit always wins")
    } else if temperature < 1.0 {
        format!("T = {temperature:.2} < 1 → gaps grow, distribution sharpens")
    } else if temperature > 1.0 {
        format!("T = {temperature:.2} > 1 → gaps shrink, distribution flattens")
    } else {
        "T = 1.00 → logits unchanged".to_string()
    };

    format!("{}\n\n{note}", grid(&header, &body, 7))
}

fn draw_top_k(rows: &[TokenRow], top_k: usize) -> String {
    let kept = rows.iter().filter(|r| r.in_top_k).count();
    let threshold = rows
        .iter()
        .filter(|r| r.in_top_k)
        .map(|r| r.scaled)
        .fold(f32::MAX, f32::min);

    let mut lines: Vec<String> = rows
        .iter()
        .map(|r| {
            let mark = if r.in_top_k { "✔" } else { "✗" };
            format!("  {mark} {} {:6.2}", pad(r.token, 4), r.scaled)
        })
        .collect();
    lines.push(String::new());
    if top_k == 0 || kept == rows.len() {
        lines.push(format!("k = {top_k}: filter disabled, all {kept} tokens kept"));
    } else {
        lines.push(format!(
            "k = {top_k}: kept {kept} tokens with scaled logit ≥ {threshold:.2}"
        ));
    }
    lines.join("\n")
}

fn draw_softmax(rows: &[TokenRow]) -> String {
    let bars: Vec<(String, f32)> = rows.iter().map(|r| (r.token.to_string(), r.prob)).collect();
    let total: f32 = rows.iter().map(|r| r.prob).sum();
    let max = rows.iter().map(|r| r.prob).fold(0.0f32, f32::max);
    let heat: String = rows.iter().map(|r| intensity_to_block(r.prob, max)).collect();
    format!(
        "{}\nheat [{heat}]  Σ p = {total:.3}   (tokens outside top-k get exactly 0)",
        probability_bars(&bars, BAR_WIDTH)
    )
}

fn draw_top_p(rows: &[TokenRow], top_p: f32) -> String {
    let probs: Vec<f32> = rows.iter().map(|r| r.prob).collect();
    let header = vec!["p".to_string(), "Σ p".to_string(), "keep".to_string()];
    let body: Vec<(String, Vec<String>)> = argsort_desc(&probs)
        .into_iter()
        .map(|i| &rows[i])
        .filter(|r| r.in_top_k)
        .map(|r| {
            (
                r.token.to_string(),
                vec![
                    format!("{:.3}", r.prob),
                    format!("{:.3}", r.cumulative),
                    if r.in_nucleus { "✔" } else { "✗" }.to_string(),
                ],
            )
        })
        .collect();
    let kept = rows.iter().filter(|r| r.in_nucleus).count();
    format!(
        "{}\n\np = {top_p:.2}: nucleus holds {kept} token(s), the last one crosses p",
        grid(&header, &body, 7)
    )
}

fn draw_final(rows: &[TokenRow]) -> String {
    let bars: Vec<(String, f32)> = rows
        .iter()
        .map(|r| (r.token.to_string(), r.final_prob))
        .collect();
    format!(
        "{}\nRenormalized over the nucleus. Press s to draw.",
        probability_bars(&bars, BAR_WIDTH)
    )
}

/// The sampling deck.
pub fn deck() -> Deck<SamplingVisual> {
    Deck {
        id: "sampling",
        title: "Token Sampling",
        finish_label: Some("Finish"),
        inputs: &[InputField::Temperature, InputField::TopK, InputField::TopP],
        steps: vec![
            Step {
                title: "Raw logits",
                description: "The LM head produces one unnormalized score per vocabulary entry. \
Higher means more likely, but these are **not** probabilities yet.",
                code: r#"// One raw score per vocabulary entry, straight from the LM head.
let logits: [(&str, f32); 8] = [
    ("The", 4.5), ("Cat", 4.2), ("Dog", 3.8), ("A", 3.1),
    ("Sky", 2.5), ("Is", 1.8), ("Run", 1.5), ("Eat", 0.5),
];"#,
                visual: SamplingVisual::Logits,
            },
            Step {
                title: "Temperature scaling",
                description: "Divide every logit by the [[temperature]]. Values below 1 \
stretch the gaps between tokens so the top choice dominates; values above 1 \
squeeze them and make rare tokens likelier. Try `set temperature 0.5`.",
                code: r#"let scaled: Vec<f32> = logits
    .iter()
    .map(|(_, l)| l / temperature) // T < 1 sharpens, T > 1 flattens
    .collect();"#,
                visual: SamplingVisual::Temperature,
            },
            Step {
                title: "Top-k filtering",
                description: "Keep only the **k** highest-scoring tokens and drop the rest \
before normalizing. [[top-k]] bounds how far down the tail we can ever sample.",
                code: r#"let mut order: Vec<usize> = (0..scaled.len()).collect();
order.sort_by(|&a, &b| scaled[b].total_cmp(&scaled[a]));
let keep: HashSet<usize> = order.into_iter().take(top_k).collect();"#,
                visual: SamplingVisual::TopK,
            },
            Step {
                title: "Softmax",
                description: "Exponentiate and normalize the surviving scores so they sum \
to 1. Tokens removed by top-k get probability **exactly 0**.",
                code: r#"let max = keep.iter().map(|&i| scaled[i]).fold(f32::MIN, f32::max);
let exps: Vec<f32> = (0..scaled.len())
    .map(|i| if keep.contains(&i) { (scaled[i] - max).exp() } else { 0.0 })
    .collect();
let sum: f32 = exps.iter().sum();
let probs: Vec<f32> = exps.iter().map(|e| e / sum).collect();"#,
                visual: SamplingVisual::Softmax,
            },
            Step {
                title: "Top-p (nucleus) filtering",
                description: "Walk tokens from most to least likely, accumulating \
probability until the running total passes **p**. The token that crosses the \
line is kept; everything after it is dropped. [[top-p]] adapts to how peaked \
the distribution is.",
                code: r#"let mut cumulative = 0.0;
let mut nucleus = Vec::new();
for i in order_by_prob_desc(&probs) {
    nucleus.push(i);
    cumulative += probs[i];
    if cumulative > top_p {
        break; // the token that crosses p is kept
    }
}"#,
                visual: SamplingVisual::TopP,
            },
            Step {
                title: "Weighted draw",
                description: "Renormalize over the nucleus and draw one token at random, \
weighted by probability. Press **s** to watch a draw.",
                code: r#"let weights = nucleus.iter().map(|&i| probs[i]);
let dist = WeightedIndex::new(weights)?;
let next_token = nucleus[dist.sample(&mut rng)];"#,
                visual: SamplingVisual::Draw,
            },
        ],
    }
}
