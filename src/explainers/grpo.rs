//! Group-relative policy optimization on one prompt.
//!
//! A group of completions is scored, the scores are normalized within the
//! group, and the normalized advantages drive a clipped policy update. No
//! value network is involved: the group mean is the baseline.

use crate::core::{Controls, Deck, Step, Visual};
use crate::error::Result;
use crate::mock::data::{
    GRPO_CLIP_EPS, GRPO_GROUP, GRPO_KL, GRPO_KL_BETA, GRPO_PROMPT, GRPO_RATIOS,
};
use crate::mock::math::{STD_EPS, advantages, mean, population_std};
use crate::visualizers::{box_text, grid, insight_box, pad};

/// Visual state of a GRPO step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrpoVisual {
    Prompt,
    Rewards,
    GroupStats,
    Advantages,
    ClippedRatio,
    Update,
}

/// Normalized statistics of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub mean: f32,
    pub std: f32,
    pub advantages: Vec<f32>,
}

/// Mean, population std and advantages of `rewards`.
pub fn group_stats(rewards: &[f32]) -> GroupStats {
    GroupStats {
        mean: mean(rewards),
        std: population_std(rewards),
        advantages: advantages(rewards),
    }
}

/// PPO-style surrogate: `min(r·A, clip(r, 1-ε, 1+ε)·A)`.
pub fn clipped_objective(ratio: f32, advantage: f32, eps: f32) -> f32 {
    let clipped = ratio.clamp(1.0 - eps, 1.0 + eps);
    (ratio * advantage).min(clipped * advantage)
}

fn rewards() -> Vec<f32> {
    GRPO_GROUP.iter().map(|c| c.reward).collect()
}

impl Visual for GrpoVisual {
    fn draw(&self, _controls: &Controls) -> Result<String> {
        let stats = group_stats(&rewards());
        Ok(match self {
            GrpoVisual::Prompt => draw_prompt(),
            GrpoVisual::Rewards => draw_rewards(),
            GrpoVisual::GroupStats => draw_stats(&stats),
            GrpoVisual::Advantages => draw_advantages(&stats),
            GrpoVisual::ClippedRatio => draw_clipped(&stats),
            GrpoVisual::Update => draw_update(&stats),
        })
    }
}

fn draw_prompt() -> String {
    let mut lines = vec![box_text(GRPO_PROMPT, "prompt", 44), "        │ policy πθ, G = 4".into()];
    lines.push("        ▼".into());
    for (i, c) in GRPO_GROUP.iter().enumerate() {
        lines.push(format!("  o{} │ {}", i + 1, c.text));
    }
    lines.join("\n")
}

fn draw_rewards() -> String {
    GRPO_GROUP
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "  o{} {} r = {:.1}  ({})",
                i + 1,
                pad(c.text, 32),
                c.reward,
                c.reason
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn draw_stats(stats: &GroupStats) -> String {
    let r: Vec<String> = rewards().iter().map(|v| format!("{v:.1}")).collect();
    [
        format!("rewards = [{}]", r.join(", ")),
        String::new(),
        format!("mean    = Σ r / G           = {:.3}", stats.mean),
        format!("std     = √(Σ (r - μ)² / G) = {:.4}", stats.std),
        String::new(),
        format!("denominator uses std + {STD_EPS:e} so a uniform group never divides by 0"),
    ]
    .join("\n")
}

fn signed_bar(value: f32, max_abs: f32, half: usize) -> String {
    let n = if max_abs > 0.0 {
        ((value.abs() / max_abs) * half as f32).round() as usize
    } else {
        0
    }
    .min(half);
    if value >= 0.0 {
        format!("{}│{}{}", " ".repeat(half), "█".repeat(n), " ".repeat(half - n))
    } else {
        format!("{}{}│{}", " ".repeat(half - n), "█".repeat(n), " ".repeat(half))
    }
}

fn draw_advantages(stats: &GroupStats) -> String {
    let max_abs = stats
        .advantages
        .iter()
        .map(|a| a.abs())
        .fold(0.0f32, f32::max);
    let mut lines = vec!["            worse ◄──┼──► better".to_string()];
    for (i, a) in stats.advantages.iter().enumerate() {
        lines.push(format!(
            "  o{}  {:+.3}  {}",
            i + 1,
            a,
            signed_bar(*a, max_abs, 10)
        ));
    }
    lines.push(String::new());
    lines.push(insight_box(
        "Above-average answers are reinforced,\nbelow-average ones are suppressed.",
        "💡",
    ));
    lines.join("\n")
}

fn draw_clipped(stats: &GroupStats) -> String {
    let header = vec![
        "A".to_string(),
        "ratio".to_string(),
        "clip".to_string(),
        "obj".to_string(),
    ];
    let rows: Vec<(String, Vec<String>)> = stats
        .advantages
        .iter()
        .zip(GRPO_RATIOS)
        .enumerate()
        .map(|(i, (a, ratio))| {
            let clipped = ratio.clamp(1.0 - GRPO_CLIP_EPS, 1.0 + GRPO_CLIP_EPS);
            (
                format!("o{}", i + 1),
                vec![
                    format!("{a:+.3}"),
                    format!("{ratio:.2}"),
                    format!("{clipped:.2}"),
                    format!("{:+.3}", clipped_objective(ratio, *a, GRPO_CLIP_EPS)),
                ],
            )
        })
        .collect();
    format!(
        "{}\n\nε = {GRPO_CLIP_EPS}: ratios outside [{:.1}, {:.1}] stop earning credit",
        grid(&header, &rows, 7),
        1.0 - GRPO_CLIP_EPS,
        1.0 + GRPO_CLIP_EPS
    )
}

fn draw_update(stats: &GroupStats) -> String {
    let objectives: Vec<f32> = stats
        .advantages
        .iter()
        .zip(GRPO_RATIOS)
        .map(|(a, r)| clipped_objective(r, *a, GRPO_CLIP_EPS))
        .collect();
    let surrogate = mean(&objectives);
    let kl = mean(&GRPO_KL);
    let loss = -surrogate + GRPO_KL_BETA * kl;
    [
        format!("surrogate  = mean(obj)       = {surrogate:+.4}"),
        format!("KL(πθ‖πref) ≈ mean(kl)       = {kl:.4}"),
        format!("loss       = -surrogate + β·KL (β = {GRPO_KL_BETA})"),
        format!("           = {loss:+.4}"),
        String::new(),
        "loss.backward(); optimizer.step(); → next group".to_string(),
    ]
    .join("\n")
}

/// The GRPO deck.
pub fn deck() -> Deck<GrpoVisual> {
    Deck {
        id: "grpo",
        title: "Group-Relative Policy Optimization",
        finish_label: Some("Finish"),
        inputs: &[],
        steps: vec![
            Step {
                title: "One prompt, a group of answers",
                description: "GRPO samples **G** completions for the same prompt from the \
current policy. The group is the unit of comparison: there is no critic model.",
                code: r#"let group: Vec<Completion> = (0..G)
    .map(|_| policy.generate(&prompt, &sampling))
    .collect();"#,
                visual: GrpoVisual::Prompt,
            },
            Step {
                title: "Score every completion",
                description: "A reward function grades each answer. Here a rule-based \
checker gives 1.0 for the right number, 0.1 for a near miss and 0 otherwise.",
                code: r#"let rewards: Vec<f32> = group
    .iter()
    .map(|c| reward_fn(&prompt, &c.text))
    .collect(); // [1.0, 0.0, 1.0, 0.1]"#,
                visual: GrpoVisual::Rewards,
            },
            Step {
                title: "Group statistics",
                description: "Compute the mean and the **population** standard deviation \
of the group's rewards. The mean becomes the baseline.",
                code: r#"let mean = rewards.iter().sum::<f32>() / rewards.len() as f32;
let var = rewards.iter().map(|r| (r - mean).powi(2)).sum::<f32>()
    / rewards.len() as f32;
let std = var.sqrt();"#,
                visual: GrpoVisual::GroupStats,
            },
            Step {
                title: "Advantages",
                description: "Each completion's advantage is its reward normalized within \
the group. Positive means better than its siblings, negative means worse. \
[[no critic]]",
                code: r#"let advantages: Vec<f32> = rewards
    .iter()
    .map(|r| (r - mean) / (std + 1e-6))
    .collect();"#,
                visual: GrpoVisual::Advantages,
            },
            Step {
                title: "Clipped probability ratio",
                description: "The update weighs each token by how much more likely the new \
policy makes it. Clipping the ratio to **[1-ε, 1+ε]** keeps one step from \
moving the policy too far.",
                code: r#"let ratio = (logp_new - logp_old).exp();
let clipped = ratio.clamp(1.0 - eps, 1.0 + eps);
let objective = (ratio * adv).min(clipped * adv);"#,
                visual: GrpoVisual::ClippedRatio,
            },
            Step {
                title: "KL penalty and update",
                description: "The loss maximizes the clipped surrogate while a small KL \
term keeps the policy close to the reference model. Then the next prompt's \
group is sampled.",
                code: r#"let loss = -objectives.mean() + beta * kl.mean();
loss.backward()?;
optimizer.step()?;"#,
                visual: GrpoVisual::Update,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipped_objective_caps_gains() {
        // Positive advantage, ratio above 1 + eps: clipped.
        assert!((clipped_objective(1.5, 1.0, 0.2) - 1.2).abs() < 1e-6);
        // Negative advantage, ratio below 1 - eps: the pessimistic term wins.
        assert!((clipped_objective(0.5, -1.0, 0.2) + 0.8).abs() < 1e-6);
        // Inside the range: unchanged.
        assert!((clipped_objective(1.1, 2.0, 0.2) - 2.2).abs() < 1e-6);
    }

    #[test]
    fn test_signed_bar_width_is_constant() {
        let pos = signed_bar(1.0, 1.0, 5);
        let neg = signed_bar(-0.5, 1.0, 5);
        assert_eq!(pos.chars().count(), 11);
        assert_eq!(neg.chars().count(), 11);
    }

    #[test]
    fn test_every_step_draws() {
        let controls = Controls::default();
        for step in deck().steps {
            assert!(!step.visual.draw(&controls).unwrap().is_empty());
        }
    }
}
