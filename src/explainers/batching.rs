//! Batched generation with left padding.
//!
//! Prompts of different lengths are padded on the left so that every row's
//! last real token sits in the same column, which is where a decoder-only
//! model appends the next token.

use crate::core::{Controls, Deck, Step, Visual};
use crate::error::Result;
use crate::mock::data::{BATCH_MAX_NEW_TOKENS, BATCH_PROMPTS, EOS, MockPrompt, PAD_ID};
use crate::visualizers::{grid, pad, token_sequence_box};

const PAD_TOKEN: &str = "<pad>";
const CELL: usize = 7;

/// Visual state of a batching step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchingVisual {
    Prompts,
    Tokenize,
    LeftPad,
    AttentionMask,
    PositionIds,
    Decode,
}

/// Pad every row on the left to the longest row.
pub fn left_pad(rows: &[&[u32]], pad_id: u32) -> Vec<Vec<u32>> {
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    rows.iter()
        .map(|r| {
            let mut padded = vec![pad_id; width - r.len()];
            padded.extend_from_slice(r);
            padded
        })
        .collect()
}

/// 0 for padding, 1 for real tokens, matching [`left_pad`].
pub fn attention_mask(rows: &[&[u32]]) -> Vec<Vec<u8>> {
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    rows.iter()
        .map(|r| {
            let mut mask = vec![0u8; width - r.len()];
            mask.resize(width, 1);
            mask
        })
        .collect()
}

/// `cumsum(mask) - 1`, with padded slots set to 1.
///
/// The first real token of every row gets position 0 no matter how much
/// padding precedes it.
pub fn position_ids(mask: &[Vec<u8>]) -> Vec<Vec<i64>> {
    mask.iter()
        .map(|row| {
            let mut sum = 0i64;
            row.iter()
                .map(|&m| {
                    sum += i64::from(m);
                    if m == 0 { 1 } else { sum - 1 }
                })
                .collect()
        })
        .collect()
}

/// One decode step across the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeStep {
    /// Token emitted per row; `None` once the row has finished.
    pub tokens: Vec<Option<&'static str>>,
    /// Finished mask after this step.
    pub finished: Vec<bool>,
}

/// Run the mock decode loop until every row hits EOS or `max_new_tokens`.
pub fn decode(prompts: &[MockPrompt], max_new_tokens: usize) -> Vec<DecodeStep> {
    let mut finished = vec![false; prompts.len()];
    let mut steps = Vec::new();

    for t in 0..max_new_tokens {
        if finished.iter().all(|&f| f) {
            break;
        }
        let tokens: Vec<Option<&'static str>> = prompts
            .iter()
            .zip(finished.iter_mut())
            .map(|(p, done)| {
                if *done {
                    return None;
                }
                let token = p.continuation.get(t).copied().unwrap_or(EOS);
                if token == EOS {
                    *done = true;
                }
                Some(token)
            })
            .collect();
        steps.push(DecodeStep {
            tokens,
            finished: finished.clone(),
        });
    }
    steps
}

fn id_rows() -> Vec<&'static [u32]> {
    BATCH_PROMPTS.iter().map(|p| p.ids).collect()
}

fn column_header(width: usize) -> Vec<String> {
    (0..width).map(|i| format!("t{i}")).collect()
}

fn row_label(i: usize) -> String {
    format!("row {i}")
}

impl Visual for BatchingVisual {
    fn draw(&self, _controls: &Controls) -> Result<String> {
        Ok(match self {
            BatchingVisual::Prompts => draw_prompts(),
            BatchingVisual::Tokenize => draw_tokenize(),
            BatchingVisual::LeftPad => draw_left_pad(),
            BatchingVisual::AttentionMask => draw_mask(),
            BatchingVisual::PositionIds => draw_positions(),
            BatchingVisual::Decode => draw_decode(),
        })
    }
}

fn draw_prompts() -> String {
    let mut lines: Vec<String> = BATCH_PROMPTS
        .iter()
        .enumerate()
        .map(|(i, p)| format!("  {}  \"{}\"", row_label(i), p.text))
        .collect();
    lines.push(String::new());
    lines.push(format!(
        "{} prompts, one forward pass. Rows must share a length.",
        BATCH_PROMPTS.len()
    ));
    lines.join("\n")
}

fn draw_tokenize() -> String {
    let mut lines = Vec::new();
    for (i, p) in BATCH_PROMPTS.iter().enumerate() {
        let ids: Vec<String> = p.ids.iter().map(u32::to_string).collect();
        lines.push(token_sequence_box(p.tokens, None, &format!("{}: ", row_label(i))));
        lines.push(format!("        ids = [{}]  len = {}", ids.join(", "), p.ids.len()));
    }
    lines.join("\n")
}

fn draw_left_pad() -> String {
    let rows = id_rows();
    let padded = left_pad(&rows, PAD_ID);
    let width = padded.first().map_or(0, Vec::len);
    let body: Vec<(String, Vec<String>)> = padded
        .iter()
        .zip(BATCH_PROMPTS.iter())
        .enumerate()
        .map(|(i, (ids, p))| {
            let pad_count = width - p.tokens.len();
            let cells = ids
                .iter()
                .enumerate()
                .map(|(j, id)| {
                    if j < pad_count {
                        PAD_TOKEN.to_string()
                    } else {
                        id.to_string()
                    }
                })
                .collect();
            (row_label(i), cells)
        })
        .collect();
    format!(
        "{}\n\npad id = {PAD_ID}; the last column holds every row's newest token",
        grid(&column_header(width), &body, CELL)
    )
}

fn draw_mask() -> String {
    let mask = attention_mask(&id_rows());
    let width = mask.first().map_or(0, Vec::len);
    let body: Vec<(String, Vec<String>)> = mask
        .iter()
        .enumerate()
        .map(|(i, m)| (row_label(i), m.iter().map(u8::to_string).collect()))
        .collect();
    format!(
        "{}\n\n0 = padding (never attended to), 1 = real token",
        grid(&column_header(width), &body, CELL)
    )
}

fn draw_positions() -> String {
    let mask = attention_mask(&id_rows());
    let positions = position_ids(&mask);
    let width = positions.first().map_or(0, Vec::len);
    let body: Vec<(String, Vec<String>)> = positions
        .iter()
        .zip(&mask)
        .enumerate()
        .map(|(i, (pos, m))| {
            let cells = pos
                .iter()
                .zip(m)
                .map(|(p, &bit)| if bit == 0 { format!("({p})") } else { p.to_string() })
                .collect();
            (row_label(i), cells)
        })
        .collect();
    format!(
        "{}\n\n(1) marks a padded slot: its position is a placeholder the mask hides",
        grid(&column_header(width), &body, CELL)
    )
}

fn draw_decode() -> String {
    let steps = decode(&BATCH_PROMPTS, BATCH_MAX_NEW_TOKENS);
    let header: Vec<String> = (1..=steps.len()).map(|i| format!("+{i}")).collect();
    let body: Vec<(String, Vec<String>)> = (0..BATCH_PROMPTS.len())
        .map(|row| {
            let cells = steps
                .iter()
                .map(|s| s.tokens[row].unwrap_or(PAD_TOKEN).to_string())
                .collect();
            (row_label(row), cells)
        })
        .collect();

    let mut lines = vec![grid(&header, &body, CELL), String::new()];
    if let Some(last) = steps.last() {
        for (i, done) in last.finished.iter().enumerate() {
            let status = if *done { "finished (EOS)" } else { "hit max_new_tokens" };
            lines.push(format!("  {} {}", pad(&row_label(i), 6), status));
        }
    }
    lines.push(String::new());
    lines.push("Finished rows keep emitting <pad> until the whole batch stops.".to_string());
    lines.join("\n")
}

/// The batching deck.
pub fn deck() -> Deck<BatchingVisual> {
    Deck {
        id: "batching",
        title: "Batch Generation with Padding",
        finish_label: Some("Finish"),
        inputs: &[],
        steps: vec![
            Step {
                title: "Prompts of different lengths",
                description: "Generation is fastest when many prompts share one forward \
pass. The catch: a tensor needs every row to have the **same length**.",
                code: r#"let prompts = ["The cat sat", "Hello", "Once upon a time"];"#,
                visual: BatchingVisual::Prompts,
            },
            Step {
                title: "Tokenize",
                description: "Each prompt becomes a list of token ids. The lengths now \
differ by up to three tokens.",
                code: r#"let encoded: Vec<Vec<u32>> = prompts
    .iter()
    .map(|p| tokenizer.encode(p))
    .collect::<Result<_>>()?;"#,
                visual: BatchingVisual::Tokenize,
            },
            Step {
                title: "Pad on the left",
                description: "Decoder-only models append new tokens on the right, so \
padding goes on the **left**. Every row's newest token then lines up in the \
last column. [[padding_side = left]]",
                code: r#"let width = encoded.iter().map(Vec::len).max().unwrap_or(0);
let input_ids: Vec<Vec<u32>> = encoded
    .iter()
    .map(|ids| {
        let mut row = vec![PAD_ID; width - ids.len()];
        row.extend_from_slice(ids);
        row
    })
    .collect();"#,
                visual: BatchingVisual::LeftPad,
            },
            Step {
                title: "Attention mask",
                description: "The mask tells attention which slots are real. Padding gets \
**0** so no token ever attends to it.",
                code: r#"let attention_mask: Vec<Vec<u8>> = encoded
    .iter()
    .map(|ids| {
        let mut m = vec![0; width - ids.len()];
        m.resize(width, 1);
        m
    })
    .collect();"#,
                visual: BatchingVisual::AttentionMask,
            },
            Step {
                title: "Position ids",
                description: "Positions come from the mask, not the column index: \
`cumsum(mask) - 1`. Each row's first real token is position 0. Padded slots \
get a harmless placeholder of 1.",
                code: r#"let position_ids: Vec<Vec<i64>> = attention_mask
    .iter()
    .map(|row| {
        let mut sum = 0;
        row.iter()
            .map(|&m| { sum += m as i64; if m == 0 { 1 } else { sum - 1 } })
            .collect()
    })
    .collect();"#,
                visual: BatchingVisual::PositionIds,
            },
            Step {
                title: "Batched decoding",
                description: "Each step appends one token per row. A row that emits \
**<eos>** is marked finished and only receives padding afterwards. The loop \
ends when every row is done or the token budget runs out.",
                code: r#"let mut finished = vec![false; batch];
for _ in 0..max_new_tokens {
    let next = model.forward(&input_ids, &attention_mask)?.sample()?;
    for (row, tok) in next.iter().enumerate() {
        finished[row] |= *tok == EOS_ID;
    }
    if finished.iter().all(|&f| f) {
        break;
    }
}"#,
                visual: BatchingVisual::Decode,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_pad_aligns_last_column() {
        let rows: Vec<&[u32]> = vec![&[1, 2, 3], &[4], &[5, 6, 7, 8]];
        let padded = left_pad(&rows, 0);
        assert_eq!(padded[0], vec![0, 1, 2, 3]);
        assert_eq!(padded[1], vec![0, 0, 0, 4]);
        assert_eq!(padded[2], vec![5, 6, 7, 8]);
    }

    #[test]
    fn test_position_ids_from_mask() {
        let rows: Vec<&[u32]> = vec![&[9], &[9, 9, 9]];
        let mask = attention_mask(&rows);
        assert_eq!(mask[0], vec![0, 0, 1]);
        assert_eq!(position_ids(&mask), vec![vec![1, 1, 0], vec![0, 1, 2]]);
    }

    #[test]
    fn test_decode_marks_rows_finished_at_eos() {
        let steps = decode(&BATCH_PROMPTS, BATCH_MAX_NEW_TOKENS);
        assert_eq!(steps.len(), BATCH_MAX_NEW_TOKENS);
        // "Hello" finishes on the second step and emits nothing afterwards.
        assert_eq!(steps[1].tokens[1], Some(EOS));
        assert!(steps[1].finished[1]);
        assert_eq!(steps[2].tokens[1], None);
        // The longest row runs out of budget instead.
        assert!(!steps[3].finished[2]);
    }

    #[test]
    fn test_decode_stops_when_all_finished() {
        let steps = decode(&BATCH_PROMPTS[1..2], 10);
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn test_every_step_draws() {
        let controls = Controls::default();
        for step in deck().steps {
            assert!(!step.visual.draw(&controls).unwrap().is_empty());
        }
    }
}
