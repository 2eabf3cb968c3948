//! End-to-end numeric scenarios on the mock datasets.

use std::collections::HashSet;

use nano_explainers::config::AppConfig;
use nano_explainers::core::Controls;
use nano_explainers::explainers::{batching, grpo, sampling, sharding};
use nano_explainers::mock::data::{BATCH_PROMPTS, GRPO_GROUP, SAMPLING_LOGITS};
use nano_explainers::mock::{SamplingParams, sampling_table};
use nano_explainers::{BufferHost, Widget};

#[test]
fn test_top_k_keeps_five_highest_logits() {
    let rows = sampling_table(
        &SAMPLING_LOGITS,
        SamplingParams {
            temperature: 1.0,
            top_k: 5,
            top_p: 1.0,
        },
    );

    let kept: HashSet<&str> = rows.iter().filter(|r| r.in_top_k).map(|r| r.token).collect();
    let expected: HashSet<&str> = ["The", "Cat", "Dog", "A", "Sky"].into_iter().collect();
    assert_eq!(kept, expected);

    let total: f32 = rows.iter().map(|r| r.prob).sum();
    assert!((total - 1.0).abs() < 1e-5);
    for r in rows.iter().filter(|r| !r.in_top_k) {
        assert_eq!(r.prob, 0.0, "{} should be excluded", r.token);
        assert_eq!(r.final_prob, 0.0);
    }
}

#[test]
fn test_temperature_sharpens_distribution() {
    let table = |temperature| {
        sampling_table(
            &SAMPLING_LOGITS,
            SamplingParams {
                temperature,
                top_k: 0,
                top_p: 1.0,
            },
        )
    };
    let cold = table(0.5);
    let hot = table(2.0);
    assert!(cold[0].prob > hot[0].prob);
    assert!(cold[7].prob < hot[7].prob);

    let greedy = table(0.0);
    assert_eq!(greedy[0].final_prob, 1.0);
    assert!(greedy[1..].iter().all(|r| r.final_prob == 0.0));
}

#[test]
fn test_subnormal_temperature_stays_a_distribution() {
    let mut controls = Controls::default();
    assert!(controls.set(nano_explainers::InputField::Temperature, "1e-40"));
    let rows = sampling::table(&controls);

    let total: f32 = rows.iter().map(|r| r.prob).sum();
    assert!((total - 1.0).abs() < 1e-5);
    for r in rows.iter().filter(|r| !r.in_top_k) {
        assert_eq!(r.prob, 0.0, "{} should be excluded", r.token);
    }
    let winners: Vec<&str> = rows.iter().filter(|r| r.final_prob > 0.0).map(|r| r.token).collect();
    assert_eq!(winners, vec!["The"]);
}

#[test]
fn test_nucleus_keeps_crossing_token() {
    let rows = sampling::table(&Controls::default());
    let nucleus: Vec<&str> = rows.iter().filter(|r| r.in_nucleus).map(|r| r.token).collect();
    // Cumulative mass over the top five: 0.38, 0.66, 0.85, 0.95.
    assert_eq!(nucleus, vec!["The", "Cat", "Dog", "A"]);
    let total: f32 = rows.iter().map(|r| r.final_prob).sum();
    assert!((total - 1.0).abs() < 1e-5);
}

#[test]
fn test_grpo_group_statistics() {
    let rewards: Vec<f32> = GRPO_GROUP.iter().map(|c| c.reward).collect();
    assert_eq!(rewards, vec![1.0, 0.0, 1.0, 0.1]);

    let stats = grpo::group_stats(&rewards);
    assert!((stats.mean - 0.525).abs() < 1e-6);
    // Mean and population std follow Σr/G and √(Σ(r-μ)²/G) exactly: 0.525 and 0.4763.
    assert!((stats.std - 0.4763).abs() < 1e-3);
    assert!(stats.advantages[0] > 0.0);
    assert!(stats.advantages[1] < 0.0);
    assert!((stats.advantages[0] - stats.advantages[2]).abs() < 1e-6);

    let sum: f32 = stats.advantages.iter().sum();
    assert!(sum.abs() < 1e-4);
}

#[test]
fn test_grpo_uniform_group_has_zero_advantage() {
    let stats = grpo::group_stats(&[0.5, 0.5, 0.5]);
    assert_eq!(stats.std, 0.0);
    assert!(stats.advantages.iter().all(|a| *a == 0.0));
}

#[test]
fn test_batch_position_ids() {
    let rows: Vec<&[u32]> = BATCH_PROMPTS.iter().map(|p| p.ids).collect();
    let padded = batching::left_pad(&rows, 0);
    assert!(padded.iter().all(|r| r.len() == 4));
    assert_eq!(padded[1], vec![0, 0, 0, 15496]);

    let mask = batching::attention_mask(&rows);
    let positions = batching::position_ids(&mask);
    assert_eq!(positions[0], vec![1, 0, 1, 2]);
    assert_eq!(positions[1], vec![1, 1, 1, 0]);
    assert_eq!(positions[2], vec![0, 1, 2, 3]);
}

#[test]
fn test_zero_stages_on_mock_model() {
    let psi = sharding::total_params(&nano_explainers::mock::data::SHARD_PARAM_GROUPS);
    assert_eq!(sharding::Strategy::Ddp.bytes_per_gpu(psi, 4), 112_000_000_000);
    assert_eq!(sharding::Strategy::Zero3.bytes_per_gpu(psi, 4), 28_000_000_000);
}

#[test]
fn test_sampling_panel_follows_controls() {
    let mut widget =
        Widget::init(sampling::deck(), BufferHost::new(), &AppConfig::default()).unwrap();
    widget.go_to(1);
    assert!(widget.host().visual().contains("logits unchanged"));
    widget.set_input(nano_explainers::InputField::Temperature, "0");
    assert!(widget.host().visual().contains("greedy"));
}
