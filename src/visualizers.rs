//! ASCII art generators for the visual panels.
//!
//! Widths are counted in characters, so box-drawing glyphs and the block
//! characters below line up in a monospace terminal.

/// Unicode block characters for different intensities.
const BLOCKS: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// Convert a value [0, max_val] to a block character.
pub fn intensity_to_block(value: f32, max_val: f32) -> char {
    if max_val <= 0.0 {
        return BLOCKS[0];
    }
    let normalized = (value / max_val).clamp(0.0, 1.0);
    let idx = (normalized * (BLOCKS.len() - 1) as f32) as usize;
    BLOCKS[idx.min(BLOCKS.len() - 1)]
}

/// Number of characters in `s`.
pub fn char_width(s: &str) -> usize {
    s.chars().count()
}

/// Left-align `s` in `width` characters, truncating if needed.
pub fn pad(s: &str, width: usize) -> String {
    let len = char_width(s);
    if len >= width {
        s.chars().take(width).collect()
    } else {
        format!("{s}{}", " ".repeat(width - len))
    }
}

/// Right-align `s` in `width` characters.
pub fn pad_left(s: &str, width: usize) -> String {
    let len = char_width(s);
    if len >= width {
        s.to_string()
    } else {
        format!("{}{s}", " ".repeat(width - len))
    }
}

/// A filled/empty bar for a fraction in [0, 1].
pub fn ratio_bar(fraction: f32, width: usize) -> String {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = ((fraction * width as f32).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Generate memory usage bar.
///
/// # Arguments
///
/// * `used` - Used memory/blocks
/// * `total` - Total memory/blocks
/// * `width` - Bar width in characters
/// * `label` - Label prefix
/// * `show_percentage` - Show percentage at end
pub fn memory_bar(
    used: usize,
    total: usize,
    width: usize,
    label: &str,
    show_percentage: bool,
) -> String {
    let pct = if total == 0 {
        0.0
    } else {
        used as f32 / total as f32
    };

    let mut result = format!("{label}{}", ratio_bar(pct, width));
    if show_percentage {
        result.push_str(&format!(" {:.0}%", pct * 100.0));
    }
    result
}

/// Step progress bar: `Stage: ███░░ 3/5`.
pub fn progress_bar(label: &str, done: usize, total: usize, width: usize) -> String {
    let pct = if total == 0 {
        0.0
    } else {
        done as f32 / total as f32
    };
    format!("{label}: {} {done}/{total}", ratio_bar(pct, width))
}

/// Probability bars, one row per label, in the order given.
///
/// Rows with zero probability are drawn with a dash so excluded tokens
/// remain visible.
pub fn probability_bars(rows: &[(String, f32)], max_width: usize) -> String {
    let label_width = rows.iter().map(|(l, _)| char_width(l)).max().unwrap_or(0);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!(
        "┌{}┬{}┐",
        "─".repeat(label_width + 2),
        "─".repeat(max_width + 10)
    ));
    for (label, prob) in rows {
        let body = if *prob > 0.0 {
            let bar_len = ((prob * max_width as f32).round() as usize).max(1);
            format!("{:5.1}%  {}", prob * 100.0, "█".repeat(bar_len.min(max_width)))
        } else {
            "    —".to_string()
        };
        lines.push(format!(
            "│ {} │ {} │",
            pad(label, label_width),
            pad(&body, max_width + 8)
        ));
    }
    lines.push(format!(
        "└{}┴{}┘",
        "─".repeat(label_width + 2),
        "─".repeat(max_width + 10)
    ));
    lines.join("\n")
}

/// Display tokens in a box with optional highlighting.
///
/// A `highlight_idx` equal to `tokens.len()` draws a cursor after the
/// last token.
pub fn token_sequence_box(tokens: &[&str], highlight_idx: Option<usize>, prefix: &str) -> String {
    let mut content = if tokens.is_empty() {
        "(empty)".to_string()
    } else {
        tokens
            .iter()
            .enumerate()
            .map(|(i, tok)| {
                if highlight_idx == Some(i) {
                    format!("[{tok}]")
                } else {
                    tok.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    };
    if !tokens.is_empty() && highlight_idx == Some(tokens.len()) {
        content.push_str(" █");
    }

    let line = format!("{prefix}{content}");
    let inner_width = 40.max(char_width(&line) + 2);

    format!(
        "╭{}╮\n│ {} │\n╰{}╯",
        "─".repeat(inner_width),
        pad(&line, inner_width - 2),
        "─".repeat(inner_width)
    )
}

/// Create an insight/tip box.
pub fn insight_box(text: &str, emoji: &str) -> String {
    let mut result = format!("  {emoji} ");
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            result.push_str("\n     ");
        }
        result.push_str(line);
    }
    result
}

/// Create a box around text, wrapping long lines.
pub fn box_text(text: &str, title: &str, width: usize) -> String {
    let width = width.max(char_width(title) + 6).max(8);
    let content_width = width - 4;

    let mut result = Vec::new();

    if !title.is_empty() {
        let title_part = format!(" {title} ");
        let remaining = width - 2 - char_width(&title_part);
        let left = remaining / 2;
        let right = remaining - left;
        result.push(format!(
            "┌{}{}{}┐",
            "─".repeat(left),
            title_part,
            "─".repeat(right)
        ));
    } else {
        result.push(format!("┌{}┐", "─".repeat(width - 2)));
    }

    for line in text.lines() {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            result.push(format!("│ {} │", " ".repeat(content_width)));
            continue;
        }
        for chunk in chars.chunks(content_width) {
            let chunk: String = chunk.iter().collect();
            result.push(format!("│ {} │", pad(&chunk, content_width)));
        }
    }

    result.push(format!("└{}┘", "─".repeat(width - 2)));
    result.join("\n")
}

/// A table with a header row and labelled data rows.
///
/// Every cell is right-aligned in `cell_width` characters.
pub fn grid(header: &[String], rows: &[(String, Vec<String>)], cell_width: usize) -> String {
    let label_width = rows.iter().map(|(l, _)| char_width(l)).max().unwrap_or(0);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let mut head = " ".repeat(label_width + 2);
    for h in header {
        head.push_str(&pad_left(h, cell_width + 1));
    }
    lines.push(head.trim_end().to_string());
    lines.push(format!(
        "{}┼{}",
        "─".repeat(label_width + 1),
        "─".repeat(header.len() * (cell_width + 1))
    ));
    for (label, cells) in rows {
        let mut line = format!("{} │", pad(label, label_width));
        for cell in cells {
            line.push_str(&pad_left(cell, cell_width + 1));
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Format a byte count with a binary unit.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_to_block() {
        assert_eq!(intensity_to_block(0.0, 1.0), ' ');
        assert_eq!(intensity_to_block(1.0, 1.0), '█');
        assert_eq!(intensity_to_block(5.0, 0.0), ' ');
    }

    #[test]
    fn test_memory_bar() {
        assert_eq!(memory_bar(5, 10, 10, "KV ", true), "KV █████░░░░░ 50%");
        assert_eq!(memory_bar(0, 0, 4, "", false), "░░░░");
    }

    #[test]
    fn test_box_text_lines_have_equal_width() {
        let boxed = box_text("short\na much longer line that must wrap around", "Title", 24);
        let widths: Vec<usize> = boxed.lines().map(char_width).collect();
        assert!(widths.iter().all(|w| *w == 24), "{widths:?}");
    }

    #[test]
    fn test_token_sequence_box_highlights() {
        let boxed = token_sequence_box(&["The", "cat"], Some(1), "");
        assert!(boxed.contains("The [cat]"));
        let cursor = token_sequence_box(&["The"], Some(1), "> ");
        assert!(cursor.contains("> The █"));
    }

    #[test]
    fn test_probability_bars_show_excluded_rows() {
        let bars = probability_bars(&[("The".into(), 0.6), ("Eat".into(), 0.0)], 20);
        assert!(bars.contains("60.0%"));
        assert!(bars.lines().any(|l| l.contains("Eat") && l.contains('—')));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2.0 MiB");
    }
}
