//! Start-up of a distributed training job, one stage at a time.

use crate::core::{Controls, Deck, Step, Visual};
use crate::error::Result;
use crate::mock::data::{BOOT_STAGES, BootStage};
use crate::visualizers::{pad, progress_bar};

/// Visual state of an init step: how many stages have completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitVisual {
    pub done: usize,
}

/// Running total of stage durations.
pub fn cumulative_millis(stages: &[BootStage]) -> Vec<u32> {
    stages
        .iter()
        .scan(0u32, |acc, s| {
            *acc += s.millis;
            Some(*acc)
        })
        .collect()
}

/// Render the stage checklist with `done` stages complete.
pub fn checklist(stages: &[BootStage], done: usize) -> String {
    let done = done.min(stages.len());
    let cumulative = cumulative_millis(stages);
    let name_width = stages.iter().map(|s| s.name.len()).max().unwrap_or(0);

    let mut lines = vec![progress_bar("boot", done, stages.len(), 28), String::new()];
    for (i, (stage, total)) in stages.iter().zip(&cumulative).enumerate() {
        let (mark, timing) = if i < done {
            ("✔", format!("{:>5} ms  t={total} ms", stage.millis))
        } else if i == done {
            ("▶", "running".to_string())
        } else {
            ("·", String::new())
        };
        lines.push(
            format!("  {mark} {}  {timing}", pad(stage.name, name_width))
                .trim_end()
                .to_string(),
        );
    }

    lines.push(String::new());
    match stages.get(done) {
        Some(stage) => lines.push(format!("  {}: {}", stage.name, stage.detail)),
        None => {
            let total = cumulative.last().copied().unwrap_or(0);
            lines.push(format!("  ready in {total} ms"));
        }
    }
    lines.join("\n")
}

impl Visual for InitVisual {
    fn draw(&self, _controls: &Controls) -> Result<String> {
        Ok(checklist(&BOOT_STAGES, self.done))
    }
}

/// The init deck.
pub fn deck() -> Deck<InitVisual> {
    Deck {
        id: "init",
        title: "System Initialization",
        finish_label: Some("Start Training"),
        inputs: &[],
        steps: vec![
            Step {
                title: "Parse configuration",
                description: "Everything starts from one resolved config: defaults, then \
the config file, then command-line overrides. Later stages only read it.",
                code: r#"let mut config = TrainConfig::default();
if let Some(path) = &args.config {
    config = TrainConfig::load(path)?;
}
config.apply_overrides(&args);
config.validate()?;"#,
                visual: InitVisual { done: 0 },
            },
            Step {
                title: "Join the process group",
                description: "Every rank connects to the rendezvous point and learns its \
**rank** and the **world size**. Collective ops hang until all ranks arrive.",
                code: r#"let world = ProcessGroup::init(Backend::Nccl, &env::var("MASTER_ADDR")?)?;
let (rank, world_size) = (world.rank(), world.size());"#,
                visual: InitVisual { done: 1 },
            },
            Step {
                title: "Seed the RNGs",
                description: "Seeding happens after the rank is known: adding the rank \
keeps dropout and data order different on each GPU but reproducible overall.",
                code: r#"let mut rng = StdRng::seed_from_u64(config.seed + rank as u64);"#,
                visual: InitVisual { done: 2 },
            },
            Step {
                title: "Load the tokenizer",
                description: "The tokenizer fixes the **vocabulary size** and the special \
ids (pad, eos) that the model and the data pipeline depend on.",
                code: r#"let tokenizer = Tokenizer::from_file(&config.tokenizer_path)?;
let vocab_size = tokenizer.vocab_size();"#,
                visual: InitVisual { done: 3 },
            },
            Step {
                title: "Build the model",
                description: "Construct the module tree without allocating real weights, \
then materialize only the shard this rank owns. [[meta device]]",
                code: r#"let model = Model::new_on_meta(&config.model, vocab_size)?;
let model = model.materialize_shard(rank, world_size)?;"#,
                visual: InitVisual { done: 4 },
            },
            Step {
                title: "Load the checkpoint",
                description: "Usually the slowest stage. Each rank reads its shards and \
checks them against the index before training can touch them.",
                code: r#"let index = CheckpointIndex::load(&config.checkpoint)?;
model.load_shards(&index, rank)?;"#,
                visual: InitVisual { done: 5 },
            },
            Step {
                title: "Build the optimizer",
                description: "The optimizer is created last because its state mirrors the \
**loaded** parameters. The learning-rate schedule is attached here too.",
                code: r#"let optimizer = AdamW::new(model.parameters(), config.lr)?;
let scheduler = CosineSchedule::new(config.warmup_steps, config.total_steps);"#,
                visual: InitVisual { done: 6 },
            },
            Step {
                title: "Ready",
                description: "All stages completed in order. The training loop can start.",
                code: r#"info!(elapsed_ms = boot.elapsed().as_millis(), "startup complete");
trainer.run(model, optimizer, scheduler)?;"#,
                visual: InitVisual { done: 7 },
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cumulative_millis() {
        let totals = cumulative_millis(&BOOT_STAGES);
        assert_eq!(totals.len(), BOOT_STAGES.len());
        assert_eq!(totals[0], 12);
        assert_eq!(totals[1], 352);
        assert_eq!(*totals.last().unwrap(), 2693);
    }

    #[test]
    fn test_checklist_marks_progress() {
        let panel = checklist(&BOOT_STAGES, 2);
        assert!(panel.contains("2/7"));
        assert!(panel.contains("▶ Seed RNGs"));
        assert!(panel.contains("seed + rank"));
    }

    #[test]
    fn test_finished_checklist_reports_total() {
        let panel = checklist(&BOOT_STAGES, 99);
        assert!(panel.contains("7/7"));
        assert!(panel.contains("ready in 2693 ms"));
        assert!(!panel.contains('▶'));
    }

    #[test]
    fn test_deck_walks_every_stage() {
        let deck = deck();
        assert_eq!(deck.len(), BOOT_STAGES.len() + 1);
        for (i, step) in deck.steps.iter().enumerate() {
            assert_eq!(step.visual.done, i);
        }
    }
}
