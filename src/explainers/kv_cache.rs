//! KV-cache growth during generation.
//!
//! Size per layer is `2 (K and V) × heads × head_dim × seq_len × dtype`.
//! The `num-heads` input drives every byte count on this deck.

use crate::core::{Controls, Deck, InputField, Step, Visual};
use crate::error::{Error, Result};
use crate::mock::data::{KV_GENERATED, KV_MODEL, KV_PROMPT, MockModelShape};
use crate::visualizers::{format_bytes, grid, memory_bar, pad};

const SLOT_CAPACITY: usize = 8;

/// Visual state of a KV cache step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvCacheVisual {
    Recompute,
    Prefill,
    Decode,
    Formula,
    FullContext,
    GroupedQuery,
}

/// Total cache bytes for `seq_len` tokens across every layer.
///
/// Fails with a render error when the product does not fit in a `u64`.
pub fn cache_bytes(shape: &MockModelShape, heads: usize, seq_len: usize) -> Result<u64> {
    [heads, shape.head_dim, seq_len, shape.dtype_bytes]
        .into_iter()
        .try_fold(2 * shape.num_layers as u64, |acc, n| acc.checked_mul(n as u64))
        .ok_or_else(|| Error::render("head count too large"))
}

/// KV heads under grouped-query attention. Never below one.
pub fn kv_heads(heads: usize, group: usize) -> usize {
    (heads / group.max(1)).max(1)
}

fn heads(controls: &Controls) -> Result<usize> {
    match controls.num_heads {
        0 => Err(Error::render("num-heads must be at least 1")),
        n => Ok(n),
    }
}

impl Visual for KvCacheVisual {
    fn draw(&self, controls: &Controls) -> Result<String> {
        match self {
            KvCacheVisual::Recompute => Ok(draw_recompute()),
            KvCacheVisual::Prefill => draw_prefill(heads(controls)?),
            KvCacheVisual::Decode => draw_decode(heads(controls)?),
            KvCacheVisual::Formula => draw_formula(heads(controls)?),
            KvCacheVisual::FullContext => draw_full_context(heads(controls)?),
            KvCacheVisual::GroupedQuery => draw_gqa(heads(controls)?),
        }
    }
}

/// One row of cache slots: filled slots show their token, the newest one
/// is bracketed.
fn slot_row(label: &str, tokens: &[&str], newest: Option<usize>) -> String {
    let cells: Vec<String> = (0..SLOT_CAPACITY.max(tokens.len()))
        .map(|i| match tokens.get(i) {
            Some(tok) if newest == Some(i) => format!("[{}]", pad(tok, 7)),
            Some(tok) => format!(" {} ", pad(tok, 7)),
            None => format!(" {} ", pad("·", 7)),
        })
        .collect();
    format!("{label} │{}│", cells.join(""))
}

fn draw_recompute() -> String {
    let total = KV_PROMPT.len() + KV_GENERATED.len();
    let header = vec!["no cache".to_string(), "cached".to_string()];
    let rows: Vec<(String, Vec<String>)> = (KV_PROMPT.len()..=total)
        .map(|n| {
            (
                format!("len {n}"),
                vec![n.to_string(), if n == KV_PROMPT.len() { n } else { 1 }.to_string()],
            )
        })
        .collect();
    let without: usize = (KV_PROMPT.len()..=total).sum();
    let with = KV_PROMPT.len() + KV_GENERATED.len();
    format!(
        "K/V projections computed per forward pass:\n\n{}\n\ntotal: {without} without a cache, {with} with one",
        grid(&header, &rows, 9)
    )
}

fn draw_prefill(heads: usize) -> Result<String> {
    let bytes = cache_bytes(&KV_MODEL, heads, KV_PROMPT.len())?;
    Ok([
        slot_row("K", &KV_PROMPT, None),
        slot_row("V", &KV_PROMPT, None),
        String::new(),
        format!(
            "prefill wrote {} slots × {} layers = {}",
            KV_PROMPT.len(),
            KV_MODEL.num_layers,
            format_bytes(bytes)
        ),
    ]
    .join("\n"))
}

fn draw_decode(heads: usize) -> Result<String> {
    let mut lines = Vec::new();
    let mut tokens: Vec<&str> = KV_PROMPT.to_vec();
    for tok in KV_GENERATED {
        tokens.push(tok);
        let newest = tokens.len() - 1;
        lines.push(format!(
            "+ \"{tok}\"  {}",
            format_bytes(cache_bytes(&KV_MODEL, heads, tokens.len())?)
        ));
        lines.push(slot_row("K", &tokens, Some(newest)));
        lines.push(slot_row("V", &tokens, Some(newest)));
    }
    lines.push(String::new());
    lines.push(format!(
        "each token adds {} across all layers",
        format_bytes(cache_bytes(&KV_MODEL, heads, 1)?)
    ));
    Ok(lines.join("\n"))
}

fn draw_formula(heads: usize) -> Result<String> {
    let per_token = cache_bytes(&KV_MODEL, heads, 1)?;
    Ok([
        format!("model: {}", KV_MODEL.name),
        String::new(),
        "bytes = 2 × layers × heads × head_dim × seq_len × dtype".to_string(),
        format!(
            "      = 2 × {} × {heads} × {} × seq_len × {}",
            KV_MODEL.num_layers, KV_MODEL.head_dim, KV_MODEL.dtype_bytes
        ),
        format!("      = {per_token} B × seq_len  ({} per token)", format_bytes(per_token)),
    ]
    .join("\n"))
}

fn draw_full_context(heads: usize) -> Result<String> {
    let full = cache_bytes(&KV_MODEL, heads, KV_MODEL.max_seq_len)?;
    let seq = KV_PROMPT.len() + KV_GENERATED.len();
    let mut lines = Vec::new();
    for len in [seq, 512, 1024, 2048, KV_MODEL.max_seq_len] {
        let bytes = cache_bytes(&KV_MODEL, heads, len)?;
        let label = format!("{len:>5} tok ");
        lines.push(format!(
            "{}  {}",
            memory_bar(len, KV_MODEL.max_seq_len, 30, &label, false),
            format_bytes(bytes)
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "one sequence at {} tokens: {} (grows linearly, per request)",
        KV_MODEL.max_seq_len,
        format_bytes(full)
    ));
    Ok(lines.join("\n"))
}

fn draw_gqa(heads: usize) -> Result<String> {
    let kv = kv_heads(heads, KV_MODEL.gqa_group);
    let mha = cache_bytes(&KV_MODEL, heads, KV_MODEL.max_seq_len)?;
    let gqa = cache_bytes(&KV_MODEL, kv, KV_MODEL.max_seq_len)?;
    let header = vec!["kv heads".to_string(), "cache".to_string()];
    let rows = vec![
        ("MHA".to_string(), vec![heads.to_string(), format_bytes(mha)]),
        (
            format!("GQA/{}", KV_MODEL.gqa_group),
            vec![kv.to_string(), format_bytes(gqa)],
        ),
    ];
    let saving = if mha == 0 {
        0.0
    } else {
        100.0 * (1.0 - gqa as f64 / mha as f64)
    };
    Ok(format!(
        "{}\n\n{heads} query heads share {kv} K/V head(s): {saving:.0}% smaller cache",
        grid(&header, &rows, 10)
    ))
}

/// The KV cache deck.
pub fn deck() -> Deck<KvCacheVisual> {
    Deck {
        id: "kv-cache",
        title: "KV Cache Growth",
        finish_label: Some("Finish"),
        inputs: &[InputField::NumHeads],
        steps: vec![
            Step {
                title: "Why cache keys and values",
                description: "Every new token attends to all earlier ones. Without a \
cache the model recomputes **K** and **V** for the whole prefix on every step.",
                code: r#"// Without a cache: O(n) projections per step, O(n²) overall.
for step in 0..max_new_tokens {
    let logits = model.forward(&tokens[..])?;
    tokens.push(sample(&logits)?);
}"#,
                visual: KvCacheVisual::Recompute,
            },
            Step {
                title: "Prefill",
                description: "The prompt is processed in one pass. Its keys and values \
are written into the cache, one slot per token in every layer.",
                code: r#"let (logits, cache) = model.prefill(&prompt_ids)?;
assert_eq!(cache.seq_len(), prompt_ids.len());"#,
                visual: KvCacheVisual::Prefill,
            },
            Step {
                title: "Decode: one slot per token",
                description: "Each decode step feeds only the newest token. Its K and V \
are **appended**; everything older is read from the cache.",
                code: r#"for _ in 0..max_new_tokens {
    let logits = model.decode_one(next_id, &mut cache)?;
    next_id = sample(&logits)?;
}"#,
                visual: KvCacheVisual::Decode,
            },
            Step {
                title: "How big is it",
                description: "Size is linear in every dimension. Change the head count \
with `set num-heads 32`. [[bytes ∝ seq_len]]",
                code: r#"fn kv_cache_bytes(layers: usize, heads: usize, head_dim: usize,
                  seq_len: usize, dtype_bytes: usize) -> usize {
    2 * layers * heads * head_dim * seq_len * dtype_bytes
}"#,
                visual: KvCacheVisual::Formula,
            },
            Step {
                title: "Long contexts",
                description: "At the full context window the cache for a **single** \
sequence can rival the weights themselves, and a server holds one per \
request.",
                code: r#"let full = kv_cache_bytes(32, heads, 128, 4096, 2);
println!("{} per request", format_bytes(full));"#,
                visual: KvCacheVisual::FullContext,
            },
            Step {
                title: "Grouped-query attention",
                description: "GQA lets several query heads share one K/V head. The cache \
shrinks by the group size while queries keep their full resolution.",
                code: r#"let kv_heads = num_heads / group_size;
let gqa = kv_cache_bytes(32, kv_heads, 128, 4096, 2);"#,
                visual: KvCacheVisual::GroupedQuery,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_bytes_formula() {
        // 2 × 32 × 8 × 128 × 1 × 2
        assert_eq!(cache_bytes(&KV_MODEL, 8, 1).unwrap(), 131_072);
        assert_eq!(cache_bytes(&KV_MODEL, 8, 4096).unwrap(), 131_072 * 4096);
        assert_eq!(cache_bytes(&KV_MODEL, 8, 0).unwrap(), 0);
    }

    #[test]
    fn test_kv_heads_never_zero() {
        assert_eq!(kv_heads(32, 4), 8);
        assert_eq!(kv_heads(2, 4), 1);
        assert_eq!(kv_heads(8, 0), 8);
    }

    #[test]
    fn test_zero_heads_is_a_render_error() {
        let mut controls = Controls::default();
        controls.set(InputField::NumHeads, "0");
        assert!(matches!(
            KvCacheVisual::Prefill.draw(&controls),
            Err(Error::Render(_))
        ));
        // The recompute panel does not depend on the head count.
        assert!(KvCacheVisual::Recompute.draw(&controls).is_ok());
    }

    #[test]
    fn test_huge_head_count_is_a_render_error() {
        assert!(matches!(
            cache_bytes(&KV_MODEL, usize::MAX, 4096),
            Err(Error::Render(_))
        ));

        let mut controls = Controls::default();
        assert!(controls.set(InputField::NumHeads, &usize::MAX.to_string()));
        for visual in [
            KvCacheVisual::Prefill,
            KvCacheVisual::Decode,
            KvCacheVisual::Formula,
            KvCacheVisual::FullContext,
            KvCacheVisual::GroupedQuery,
        ] {
            assert!(
                matches!(visual.draw(&controls), Err(Error::Render(_))),
                "{visual:?}"
            );
        }
    }

    #[test]
    fn test_slot_row_marks_newest() {
        let row = slot_row("K", &["a", "b"], Some(1));
        assert!(row.contains("[b"));
        assert!(!row.contains("[a"));
    }
}
