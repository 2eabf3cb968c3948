//! In-memory host that records what a widget renders.

use std::collections::{BTreeMap, HashSet};

use super::{Highlighter, Host};
use crate::core::markup;
use crate::core::{Anchor, InputField, NavState};

/// Host recording every panel as plain text.
///
/// Provides all anchors unless told otherwise, and no highlighter unless
/// one is installed.
pub struct BufferHost {
    missing: HashSet<Anchor>,
    highlighter: Option<Box<dyn Highlighter>>,
    title: String,
    description: String,
    code: String,
    visual: String,
    nav: Option<NavState>,
    inputs: BTreeMap<InputField, String>,
    notices: Vec<String>,
    presents: usize,
}

impl BufferHost {
    /// Create a host providing every anchor.
    pub fn new() -> Self {
        Self {
            missing: HashSet::new(),
            highlighter: None,
            title: String::new(),
            description: String::new(),
            code: String::new(),
            visual: String::new(),
            nav: None,
            inputs: BTreeMap::new(),
            notices: Vec::new(),
            presents: 0,
        }
    }

    /// Remove an anchor from the surface.
    pub fn without(mut self, anchor: Anchor) -> Self {
        self.missing.insert(anchor);
        self
    }

    /// Install a highlighter.
    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Some(Box::new(highlighter));
        self
    }

    /// Last written title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Last written description, markers stripped.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Last written code panel.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Current visual panel.
    pub fn visual(&self) -> &str {
        &self.visual
    }

    /// Last navigation state, if any render happened.
    pub fn nav(&self) -> Option<&NavState> {
        self.nav.as_ref()
    }

    /// Last reflected value of an input.
    pub fn input(&self, field: InputField) -> Option<&str> {
        self.inputs.get(&field).map(String::as_str)
    }

    /// Status messages, oldest first.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Number of completed renders.
    pub fn presents(&self) -> usize {
        self.presents
    }

    /// Everything on screen as one text block.
    pub fn snapshot(&self) -> String {
        let mut out = format!("# {}\n{}\n\n{}\n", self.title, self.description, self.code);
        if !self.visual.is_empty() {
            out.push('\n');
            out.push_str(&self.visual);
            out.push('\n');
        }
        if let Some(nav) = &self.nav {
            out.push_str(&format!(
                "\n[{}] step {}/{} [{}{}]\n",
                if nav.prev_enabled { "Prev" } else { "----" },
                nav.position + 1,
                nav.len,
                nav.next_label,
                if nav.next_enabled { "" } else { " (disabled)" }
            ));
        }
        out
    }
}

impl Default for BufferHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for BufferHost {
    fn has_anchor(&self, anchor: Anchor) -> bool {
        !self.missing.contains(&anchor)
    }

    fn write_info(&mut self, title: &str, description: &str) {
        self.title = title.to_string();
        self.description = markup::plain(description);
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
        self.inputs.insert(field, value.to_string());
    }

    fn highlighter(&self) -> Option<&dyn Highlighter> {
        self.highlighter.as_deref()
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn present(&mut self) {
        self.presents += 1;
    }
}
