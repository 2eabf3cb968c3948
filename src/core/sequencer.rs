//! Step index state machine.
//!
//! ```text
//!          prev (guarded)          next (guarded)
//!   ┌───┐ ◄──────────── ┌───┐ ────────────► ┌─────┐
//!   │ 0 │               │ i │               │ n-1 │
//!   └───┘ ◄──────────── └───┘ ◄──────────── └─────┘
//!                 reset (from any state)
//! ```
//!
//! Requests past either end are clamped: the index never wraps and no
//! request is an error.

use std::num::NonZeroUsize;

/// Label of the forward control on every step but the last.
pub const NEXT_LABEL: &str = "Next";

/// Owns the current step index of one widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSequencer {
    current: usize,
    len: NonZeroUsize,
}

/// Navigation affordances for the current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    /// Zero-based index.
    pub position: usize,
    /// Number of steps.
    pub len: usize,
    /// Whether "previous" is active.
    pub prev_enabled: bool,
    /// Whether the forward control is active.
    pub next_enabled: bool,
    /// Forward control label.
    pub next_label: &'static str,
}

impl StepSequencer {
    /// Start at index 0 of `len` steps.
    pub fn new(len: NonZeroUsize) -> Self {
        Self { current: 0, len }
    }

    /// Current index.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.len.get()
    }

    /// Whether the index sits on the first step.
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    /// Whether the index sits on the last step.
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.len.get()
    }

    /// Advance one step. Returns whether the index moved.
    pub fn go_next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Go back one step. Returns whether the index moved.
    pub fn go_prev(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Return to the first step.
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Jump to `index`, clamped to the last step.
    pub fn go_to(&mut self, index: usize) {
        self.current = index.min(self.len.get() - 1);
    }

    /// Affordances for the current index.
    pub fn nav(&self, finish_label: Option<&'static str>) -> NavState {
        let is_last = self.is_last();
        NavState {
            position: self.current,
            len: self.len.get(),
            prev_enabled: !self.is_first(),
            next_enabled: !is_last,
            next_label: if is_last {
                finish_label.unwrap_or(NEXT_LABEL)
            } else {
                NEXT_LABEL
            },
        }
    }
}
