//! Rendering surfaces a widget draws into.
//!
//! A host owns the panels named by [`Anchor`]s. Two implementations ship
//! with the crate:
//!
//! 1. [`TerminalHost`]: ANSI output on stdout for the interactive binary
//! 2. [`BufferHost`]: records every panel in memory, for tests and dumps

pub mod buffer;
pub mod highlight;
pub mod terminal;

pub use buffer::BufferHost;
pub use highlight::{Highlighter, KeywordHighlighter};
pub use terminal::TerminalHost;

use crate::core::{Anchor, InputField, NavState};

/// Trait for rendering surfaces.
pub trait Host {
    /// Whether the surface provides `anchor`.
    fn has_anchor(&self, anchor: Anchor) -> bool;

    /// Write the step title and its marked-up description.
    fn write_info(&mut self, title: &str, description: &str);

    /// Write the code sample (already highlighted if a highlighter ran).
    fn write_code(&mut self, code: &str);

    /// Empty the visual panel.
    fn clear_visual(&mut self);

    /// Append to the visual panel.
    fn write_visual(&mut self, content: &str);

    /// Update the navigation controls.
    fn set_nav(&mut self, nav: &NavState);

    /// Reflect the current value of an input field.
    fn set_input(&mut self, _field: InputField, _value: &str) {}

    /// Syntax highlighting capability, if the surface has one.
    fn highlighter(&self) -> Option<&dyn Highlighter> {
        None
    }

    /// Show a transient status line.
    fn notify(&mut self, _message: &str) {}

    /// Flush everything written since the last call.
    fn present(&mut self) {}
}

impl<H: Host + ?Sized> Host for &mut H {
    fn has_anchor(&self, anchor: Anchor) -> bool {
        (**self).has_anchor(anchor)
    }

    fn write_info(&mut self, title: &str, description: &str) {
        (**self).write_info(title, description);
    }

    fn write_code(&mut self, code: &str) {
        (**self).write_code(code);
    }

    fn clear_visual(&mut self) {
        (**self).clear_visual();
    }

    fn write_visual(&mut self, content: &str) {
        (**self).write_visual(content);
    }

    fn set_nav(&mut self, nav: &NavState) {
        (**self).set_nav(nav);
    }

    fn set_input(&mut self, field: InputField, value: &str) {
        (**self).set_input(field, value);
    }

    fn highlighter(&self) -> Option<&dyn Highlighter> {
        (**self).highlighter()
    }

    fn notify(&mut self, message: &str) {
        (**self).notify(message);
    }

    fn present(&mut self) {
        (**self).present();
    }
}
