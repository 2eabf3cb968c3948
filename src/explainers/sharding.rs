//! Checkpoint sharding under ZeRO data parallelism.
//!
//! Mixed-precision Adam keeps 16 bytes per parameter: fp16 weights (2),
//! fp16 gradients (2) and fp32 master weights plus two moments (12). The
//! ZeRO stages partition those three groups across ranks one at a time.

use crate::core::{Controls, Deck, Step, Visual};
use crate::error::Result;
use crate::mock::data::{ParamGroup, SHARD_PARAM_GROUPS, SHARD_WORLD_SIZE};
use crate::visualizers::{format_bytes, grid, memory_bar, pad};

const PARAM_BYTES: u64 = 2;
const GRAD_BYTES: u64 = 2;
const OPTIM_BYTES: u64 = 12;

/// Data-parallel memory strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Ddp,
    Zero1,
    Zero2,
    Zero3,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Ddp,
        Strategy::Zero1,
        Strategy::Zero2,
        Strategy::Zero3,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Strategy::Ddp => "DDP",
            Strategy::Zero1 => "ZeRO-1",
            Strategy::Zero2 => "ZeRO-2",
            Strategy::Zero3 => "ZeRO-3",
        }
    }

    /// Bytes per GPU for (weights, gradients, optimizer state).
    pub fn breakdown(self, params: u64, world_size: usize) -> [u64; 3] {
        let n = world_size.max(1) as u64;
        let weights = PARAM_BYTES * params;
        let grads = GRAD_BYTES * params;
        let optim = OPTIM_BYTES * params;
        match self {
            Strategy::Ddp => [weights, grads, optim],
            Strategy::Zero1 => [weights, grads, optim / n],
            Strategy::Zero2 => [weights, grads / n, optim / n],
            Strategy::Zero3 => [weights / n, grads / n, optim / n],
        }
    }

    /// Total bytes per GPU.
    pub fn bytes_per_gpu(self, params: u64, world_size: usize) -> u64 {
        self.breakdown(params, world_size).iter().sum()
    }
}

/// Visual state of a sharding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardingVisual {
    Memory(Strategy),
    SaveShards,
    Consolidate,
}

/// Total parameter count of the mock model.
pub fn total_params(groups: &[ParamGroup]) -> u64 {
    groups.iter().map(|g| u64::from(g.params_m) * 1_000_000).sum()
}

/// Optimizer state file written by `rank`.
pub fn shard_file_name(rank: usize) -> String {
    format!("zero_pp_rank_{rank}_mp_rank_00_optim_states.pt")
}

/// Split the flattened parameter list evenly across ranks.
///
/// Each rank owns one contiguous range of the flat buffer, so a parameter
/// group may be cut across two or more ranks. Returns, per rank, the
/// groups it touches and how many parameters (in millions) of each.
pub fn partition(groups: &[ParamGroup], world_size: usize) -> Vec<Vec<(&'static str, u32)>> {
    let world = world_size.max(1) as u32;
    let total: u32 = groups.iter().map(|g| g.params_m).sum();
    let per_rank = total.div_ceil(world);

    (0..world)
        .map(|rank| {
            let lo = rank * per_rank;
            let hi = ((rank + 1) * per_rank).min(total);
            let mut owned = Vec::new();
            let mut start = 0u32;
            for g in groups {
                let end = start + g.params_m;
                let overlap = end.min(hi).saturating_sub(start.max(lo));
                if overlap > 0 {
                    owned.push((g.name, overlap));
                }
                start = end;
            }
            owned
        })
        .collect()
}

impl Visual for ShardingVisual {
    fn draw(&self, _controls: &Controls) -> Result<String> {
        let params = total_params(&SHARD_PARAM_GROUPS);
        Ok(match self {
            ShardingVisual::Memory(strategy) => draw_memory(*strategy, params),
            ShardingVisual::SaveShards => draw_save(params),
            ShardingVisual::Consolidate => draw_consolidate(params),
        })
    }
}

fn draw_memory(current: Strategy, params: u64) -> String {
    let [w, g, o] = current.breakdown(params, SHARD_WORLD_SIZE);
    let sharded = |full: u64, part: u64| if part < full { " /N" } else { "" };
    let header = vec!["bytes".to_string(), String::new()];
    let rows = vec![
        (
            "fp16 weights".to_string(),
            vec![format_bytes(w), sharded(PARAM_BYTES * params, w).to_string()],
        ),
        (
            "fp16 grads".to_string(),
            vec![format_bytes(g), sharded(GRAD_BYTES * params, g).to_string()],
        ),
        (
            "fp32 Adam".to_string(),
            vec![format_bytes(o), sharded(OPTIM_BYTES * params, o).to_string()],
        ),
        ("total".to_string(), vec![format_bytes(w + g + o), String::new()]),
    ];

    let ddp = Strategy::Ddp.bytes_per_gpu(params, SHARD_WORLD_SIZE);
    let mut lines = vec![
        format!(
            "{:.1}B params, N = {SHARD_WORLD_SIZE} GPUs, per GPU under {}:",
            params as f64 / 1e9,
            current.label()
        ),
        String::new(),
        grid(&header, &rows, 10),
        String::new(),
    ];
    for s in Strategy::ALL {
        let bytes = s.bytes_per_gpu(params, SHARD_WORLD_SIZE);
        let marker = if s == current { " ◄" } else { "" };
        lines.push(format!(
            "{}  {}{marker}",
            memory_bar(
                bytes as usize,
                ddp as usize,
                24,
                &format!("{} ", pad(s.label(), 6)),
                false
            ),
            format_bytes(bytes)
        ));
    }
    lines.join("\n")
}

fn draw_save(params: u64) -> String {
    let per_rank_optim = OPTIM_BYTES * params / SHARD_WORLD_SIZE as u64;
    let mut lines = vec!["checkpoint/global_step1000/".to_string()];
    lines.push("├── mp_rank_00_model_states.pt".to_string());
    let parts = partition(&SHARD_PARAM_GROUPS, SHARD_WORLD_SIZE);
    for (rank, owned) in parts.iter().enumerate() {
        let branch = if rank + 1 == parts.len() { "└──" } else { "├──" };
        lines.push(format!(
            "{branch} {}  {}",
            shard_file_name(rank),
            format_bytes(per_rank_optim)
        ));
        let groups: Vec<String> = owned.iter().map(|(n, m)| format!("{n} {m}M")).collect();
        let stem = if rank + 1 == parts.len() { "   " } else { "│  " };
        lines.push(format!("{stem}    holds {}", groups.join(", ")));
    }
    lines.push(String::new());
    lines.push("Every rank writes only its own slice, in parallel.".to_string());
    lines.join("\n")
}

fn draw_consolidate(params: u64) -> String {
    let mut lines: Vec<String> = (0..SHARD_WORLD_SIZE)
        .map(|rank| format!("  load  {}", shard_file_name(rank)))
        .collect();
    lines.push("    │ concat flat fp32 partitions in rank order".to_string());
    lines.push("    │ split back into named tensors".to_string());
    lines.push("    ▼".to_string());
    lines.push(format!(
        "  save  pytorch_model.bin  {} (fp32)",
        format_bytes(4 * params)
    ));
    lines.push(String::new());
    lines.push(format!(
        "{} named groups restored; no GPU needed, runs offline",
        SHARD_PARAM_GROUPS.len()
    ));
    lines.join("\n")
}

/// The sharding deck.
pub fn deck() -> Deck<ShardingVisual> {
    Deck {
        id: "sharding",
        title: "Checkpoint Sharding with ZeRO",
        finish_label: Some("Finish"),
        inputs: &[],
        steps: vec![
            Step {
                title: "Plain data parallelism",
                description: "With DDP every GPU holds a full copy of the weights, the \
gradients **and** the optimizer state. Adam's fp32 state alone is 12 bytes per \
parameter.",
                code: r#"// Mixed-precision Adam, bytes per parameter.
const WEIGHTS: u64 = 2;  // fp16
const GRADS: u64 = 2;    // fp16
const OPTIM: u64 = 12;   // fp32 master + momentum + variance
let per_gpu = (WEIGHTS + GRADS + OPTIM) * params;"#,
                visual: ShardingVisual::Memory(Strategy::Ddp),
            },
            Step {
                title: "ZeRO-1: shard optimizer state",
                description: "Each rank keeps only **1/N** of the optimizer state and \
updates just its slice of the master weights. [[stage 1]]",
                code: r#"let per_gpu = (WEIGHTS + GRADS) * params + OPTIM * params / world_size;"#,
                visual: ShardingVisual::Memory(Strategy::Zero1),
            },
            Step {
                title: "ZeRO-2: shard gradients too",
                description: "Gradients are reduce-scattered instead of all-reduced, so \
each rank only ever keeps the gradients for the slice it updates.",
                code: r#"let per_gpu = WEIGHTS * params + (GRADS + OPTIM) * params / world_size;"#,
                visual: ShardingVisual::Memory(Strategy::Zero2),
            },
            Step {
                title: "ZeRO-3: shard the weights",
                description: "Finally the fp16 weights are partitioned as well and \
gathered layer by layer just before use. Memory per GPU now falls as **1/N**.",
                code: r#"let per_gpu = (WEIGHTS + GRADS + OPTIM) * params / world_size;"#,
                visual: ShardingVisual::Memory(Strategy::Zero3),
            },
            Step {
                title: "Saving a sharded checkpoint",
                description: "Each rank saves the slice it owns. Slices follow the \
flattened parameter buffer, so one layer can be split across two files.",
                code: r#"let path = ckpt_dir.join(format!(
    "zero_pp_rank_{rank}_mp_rank_00_optim_states.pt"
));
save(&optimizer.local_state(), &path)?;"#,
                visual: ShardingVisual::SaveShards,
            },
            Step {
                title: "Consolidating for inference",
                description: "To ship the model, read every shard in rank order, \
concatenate the flat fp32 partitions and cut them back into named tensors. \
The result is one ordinary **state dict**.",
                code: r#"let mut flat = Vec::new();
for rank in 0..world_size {
    flat.extend(load_partition(&ckpt_dir, rank)?);
}
let state_dict = unflatten(&flat, &param_shapes)?;
save(&state_dict, "pytorch_model.bin")?;"#,
                visual: ShardingVisual::Consolidate,
            },
        ],
    }
}
