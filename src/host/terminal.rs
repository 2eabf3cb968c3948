//! ANSI terminal host for the interactive binary.

use std::io::{self, Write};

use super::{Highlighter, Host, KeywordHighlighter};
use crate::config::DisplayConfig;
use crate::core::markup::{self, Segment};
use crate::core::{Anchor, InputField, NavState};
use crate::visualizers::{char_width, pad};

const BOLD: &str = "\x1B[1m";
const DIM: &str = "\x1B[2m";
const REVERSE: &str = "\x1B[7m";
const RESET: &str = "\x1B[0m";
const CLEAR: &str = "\x1B[2J\x1B[H";

/// Full-screen terminal rendering of one widget.
pub struct TerminalHost {
    deck_title: String,
    inputs: Vec<InputField>,
    width: usize,
    clear_screen: bool,
    highlighter: Option<KeywordHighlighter>,
    title: String,
    description: String,
    code: String,
    visual: String,
    nav: Option<NavState>,
    input_values: Vec<(InputField, String)>,
    status: Option<String>,
}

impl TerminalHost {
    /// Create a terminal host exposing the given input fields.
    pub fn new(deck_title: &str, inputs: &[InputField], display: &DisplayConfig) -> Self {
        Self {
            deck_title: deck_title.to_string(),
            inputs: inputs.to_vec(),
            width: display.width,
            clear_screen: display.clear_screen,
            highlighter: display.highlight.then_some(KeywordHighlighter),
            title: String::new(),
            description: String::new(),
            code: String::new(),
            visual: String::new(),
            nav: None,
            input_values: Vec::new(),
            status: None,
        }
    }

    /// Print the command reference below the current frame.
    pub fn print_help(&self) {
        let mut lines = vec![
            "Commands:".to_string(),
            "  n, Enter, →     next step".to_string(),
            "  p, ←            previous step".to_string(),
            "  r               reset to the first step".to_string(),
            "  s               draw a token (sampling steps)".to_string(),
            "  g <n>           jump to step n".to_string(),
        ];
        if !self.inputs.is_empty() {
            let names: Vec<&str> = self.inputs.iter().map(|f| f.id()).collect();
            lines.push(format!("  set <field> <v>  fields: {}", names.join(", ")));
        }
        lines.push("  q               quit".to_string());
        println!("{}", lines.join("\n"));
    }

    fn render(&self) -> String {
        let w = self.width;
        let mut out = String::new();

        if self.clear_screen {
            out.push_str(CLEAR);
        }

        let progress = self
            .nav
            .map(|n| format!("step {}/{}", n.position + 1, n.len))
            .unwrap_or_default();
        let head_room = w.saturating_sub(6 + char_width(&progress));
        out.push_str(&format!("╔{}╗\n", "═".repeat(w.saturating_sub(2))));
        out.push_str(&format!(
            "║  {}{}  ║\n",
            pad(&self.deck_title, head_room),
            progress
        ));
        out.push_str(&format!("╚{}╝\n\n", "═".repeat(w.saturating_sub(2))));

        out.push_str(&format!("{BOLD}{}{RESET}\n", self.title));
        for line in wrap_markup(&self.description, w) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');

        out.push_str(&section("Code", &self.code, w));
        let visual = if self.visual.is_empty() {
            format!("{DIM}(nothing to show){RESET}")
        } else {
            self.visual.clone()
        };
        out.push_str(&section("Visual", &visual, w));

        if !self.input_values.is_empty() {
            let fields: Vec<String> = self
                .input_values
                .iter()
                .map(|(f, v)| format!("{}={v}", f.id()))
                .collect();
            out.push_str(&format!("{DIM}inputs:{RESET} {}\n", fields.join("  ")));
        }

        if let Some(nav) = &self.nav {
            let prev = button("◀ Prev", nav.prev_enabled);
            let reset = button("↺ Reset", true);
            let next = button(&format!("{} ▶", nav.next_label), nav.next_enabled);
            out.push_str(&format!("\n{prev}  {reset}  {next}\n"));
        }

        if let Some(status) = &self.status {
            out.push_str(&format!("{DIM}{status}{RESET}\n"));
        }
        out.push_str(&format!("{DIM}h for help, q to quit{RESET}\n> "));
        out
    }
}

impl Host for TerminalHost {
    fn has_anchor(&self, anchor: Anchor) -> bool {
        match anchor {
            Anchor::Input(field) => self.inputs.contains(&field),
            _ => true,
        }
    }

    fn write_info(&mut self, title: &str, description: &str) {
        self.title = title.to_string();
        self.description = description.to_string();
        self.status = None;
    }

    fn write_code(&mut self, code: &str) {
        self.code = code.to_string();
    }

    fn clear_visual(&mut self) {
        self.visual.clear();
    }

    fn write_visual(&mut self, content: &str) {
        if !self.visual.is_empty() {
            self.visual.push('\n');
        }
        self.visual.push_str(content);
    }

    fn set_nav(&mut self, nav: &NavState) {
        self.nav = Some(*nav);
    }

    fn set_input(&mut self, field: InputField, value: &str) {
        match self.input_values.iter_mut().find(|(f, _)| *f == field) {
            Some((_, v)) => *v = value.to_string(),
            None => self.input_values.push((field, value.to_string())),
        }
    }

    fn highlighter(&self) -> Option<&dyn Highlighter> {
        self.highlighter.as_ref().map(|h| h as &dyn Highlighter)
    }

    fn notify(&mut self, message: &str) {
        self.status = Some(message.to_string());
    }

    fn present(&mut self) {
        print!("{}", self.render());
        let _ = io::stdout().flush();
    }
}

fn button(label: &str, enabled: bool) -> String {
    if enabled {
        format!("{BOLD}[ {label} ]{RESET}")
    } else {
        format!("{DIM}[ {label} ]{RESET}")
    }
}

fn section(name: &str, body: &str, width: usize) -> String {
    let head = format!("┌─ {name} ");
    let mut out = format!(
        "{head}{}\n",
        "─".repeat(width.saturating_sub(char_width(&head)))
    );
    for line in body.lines() {
        out.push_str(&format!("│ {line}\n"));
    }
    out.push_str(&format!("└{}\n", "─".repeat(width.saturating_sub(1))));
    out
}

/// Word-wrap a marked-up description, styling strong runs and badges.
fn wrap_markup(description: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in description.lines() {
        let mut line = String::new();
        let mut used = 0usize;
        // Whether the previous segment ended on a word boundary.
        let mut at_boundary = true;

        for segment in markup::parse(paragraph) {
            let raw = segment.text();
            let words: Vec<(String, usize)> = match segment {
                Segment::Text(text) => text
                    .split_whitespace()
                    .map(|w| (w.to_string(), char_width(w)))
                    .collect(),
                Segment::Strong(text) => text
                    .split_whitespace()
                    .map(|w| (format!("{BOLD}{w}{RESET}"), char_width(w)))
                    .collect(),
                Segment::Badge(text) => {
                    vec![(format!("{REVERSE} {text} {RESET}"), char_width(text) + 2)]
                }
            };
            let mut glue = !at_boundary && !raw.starts_with(char::is_whitespace);

            for (word, visible) in words {
                if glue {
                    glue = false;
                } else {
                    if used > 0 && used + 1 + visible > width {
                        lines.push(std::mem::take(&mut line));
                        used = 0;
                    }
                    if used > 0 {
                        line.push(' ');
                        used += 1;
                    }
                }
                line.push_str(&word);
                used += visible;
            }
            at_boundary = raw.ends_with(char::is_whitespace) || raw.is_empty();
        }
        lines.push(line);
    }

    lines
}
