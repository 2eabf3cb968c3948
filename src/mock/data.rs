//! Hardcoded datasets the decks compute their illustrative numbers from.

/// Next-token logits after "Once upon a time".
pub const SAMPLING_LOGITS: [(&str, f32); 8] = [
    ("The", 4.5),
    ("Cat", 4.2),
    ("Dog", 3.8),
    ("A", 3.1),
    ("Sky", 2.5),
    ("Is", 1.8),
    ("Run", 1.5),
    ("Eat", 0.5),
];

/// Prompt the sampling deck pretends to continue.
pub const SAMPLING_PROMPT: &str = "Once upon a time";

/// A prompt with its token ids.
#[derive(Debug, Clone, Copy)]
pub struct MockPrompt {
    pub text: &'static str,
    pub tokens: &'static [&'static str],
    pub ids: &'static [u32],
    /// Tokens produced per decode step; generation stops after EOS.
    pub continuation: &'static [&'static str],
}

/// Padding token id.
pub const PAD_ID: u32 = 0;

/// End-of-sequence marker in continuations.
pub const EOS: &str = "<eos>";

/// Three prompts of different lengths batched together.
pub const BATCH_PROMPTS: [MockPrompt; 3] = [
    MockPrompt {
        text: "The cat sat",
        tokens: &["The", "cat", "sat"],
        ids: &[464, 3797, 3332],
        continuation: &["on", "the", "mat", EOS],
    },
    MockPrompt {
        text: "Hello",
        tokens: &["Hello"],
        ids: &[15496],
        continuation: &["!", EOS],
    },
    MockPrompt {
        text: "Once upon a time",
        tokens: &["Once", "upon", "a", "time"],
        ids: &[7454, 2402, 257, 640],
        continuation: &[",", "there", "was", "a", "fox"],
    },
];

/// Maximum decode steps in the batching deck.
pub const BATCH_MAX_NEW_TOKENS: usize = 4;

/// GRPO prompt.
pub const GRPO_PROMPT: &str = "What is 17 × 3?";

/// A sampled completion and its reward.
#[derive(Debug, Clone, Copy)]
pub struct Completion {
    pub text: &'static str,
    pub reward: f32,
    pub reason: &'static str,
}

/// Group of four completions sampled for [`GRPO_PROMPT`].
pub const GRPO_GROUP: [Completion; 4] = [
    Completion {
        text: "17 × 3 = 51. The answer is 51.",
        reward: 1.0,
        reason: "correct, shows work",
    },
    Completion {
        text: "17 × 3 = 41.",
        reward: 0.0,
        reason: "wrong answer",
    },
    Completion {
        text: "Answer: 51",
        reward: 1.0,
        reason: "correct",
    },
    Completion {
        text: "It is around 50.",
        reward: 0.1,
        reason: "close, not exact",
    },
];

/// Per-token probability ratios `π_new / π_old` after one update step.
pub const GRPO_RATIOS: [f32; 4] = [1.35, 0.70, 1.10, 0.95];

/// PPO-style clipping range.
pub const GRPO_CLIP_EPS: f32 = 0.2;

/// KL penalty coefficient.
pub const GRPO_KL_BETA: f32 = 0.04;

/// Per-sample KL estimates against the reference policy.
pub const GRPO_KL: [f32; 4] = [0.012, 0.020, 0.006, 0.009];

/// Prompt tokens prefilled into the KV cache.
pub const KV_PROMPT: [&str; 4] = ["The", "capital", "of", "France"];

/// Tokens appended one per decode step.
pub const KV_GENERATED: [&str; 3] = ["is", "Paris", "."];

/// Mock model shape for the KV cache deck.
#[derive(Debug, Clone, Copy)]
pub struct MockModelShape {
    pub name: &'static str,
    pub num_layers: usize,
    pub head_dim: usize,
    pub dtype_bytes: usize,
    pub max_seq_len: usize,
    /// Query heads per KV head in the grouped-query comparison.
    pub gqa_group: usize,
}

/// Model used by the KV cache deck.
pub const KV_MODEL: MockModelShape = MockModelShape {
    name: "mock-7b",
    num_layers: 32,
    head_dim: 128,
    dtype_bytes: 2,
    max_seq_len: 4096,
    gqa_group: 4,
};

/// A named parameter group of the sharded model.
#[derive(Debug, Clone, Copy)]
pub struct ParamGroup {
    pub name: &'static str,
    /// Parameters in millions.
    pub params_m: u32,
}

/// Parameter groups of the mock model being checkpointed.
pub const SHARD_PARAM_GROUPS: [ParamGroup; 8] = [
    ParamGroup { name: "embed_tokens", params_m: 262 },
    ParamGroup { name: "layers.0-7", params_m: 1618 },
    ParamGroup { name: "layers.8-15", params_m: 1618 },
    ParamGroup { name: "layers.16-23", params_m: 1618 },
    ParamGroup { name: "layers.24-31", params_m: 1618 },
    ParamGroup { name: "norm", params_m: 1 },
    ParamGroup { name: "lm_head", params_m: 262 },
    ParamGroup { name: "rotary_emb", params_m: 3 },
];

/// Data-parallel ranks in the sharding deck.
pub const SHARD_WORLD_SIZE: usize = 4;

/// A training start-up stage.
#[derive(Debug, Clone, Copy)]
pub struct BootStage {
    pub name: &'static str,
    pub detail: &'static str,
    pub millis: u32,
}

/// Start-up stages of the mock training job, in order.
pub const BOOT_STAGES: [BootStage; 7] = [
    BootStage {
        name: "Parse config",
        detail: "merge defaults, file and CLI overrides",
        millis: 12,
    },
    BootStage {
        name: "Init process group",
        detail: "world_size=4, backend=nccl, rendezvous via MASTER_ADDR",
        millis: 340,
    },
    BootStage {
        name: "Seed RNGs",
        detail: "seed + rank so data order differs per rank",
        millis: 1,
    },
    BootStage {
        name: "Load tokenizer",
        detail: "vocab=32000, pad/eos ids resolved",
        millis: 85,
    },
    BootStage {
        name: "Build model",
        detail: "construct on meta device, then materialize shards",
        millis: 40,
    },
    BootStage {
        name: "Load checkpoint",
        detail: "4 shards, 13.5 GB, verified against index",
        millis: 2150,
    },
    BootStage {
        name: "Build optimizer",
        detail: "AdamW(lr=1e-5), cosine schedule, 100 warmup steps",
        millis: 65,
    },
];
