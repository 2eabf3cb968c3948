//! Steps, decks and the visual render contract.

use super::controls::{Controls, InputField};
use crate::error::Result;

/// One static slide of a deck.
#[derive(Debug, Clone)]
pub struct Step<V> {
    /// Step title.
    pub title: &'static str,
    /// Description with inline markup (see [`super::markup`]).
    pub description: &'static str,
    /// Literal code sample.
    pub code: &'static str,
    /// Which diagram to draw in the visual panel.
    pub visual: V,
}

/// A draw candidate offered to the sampling animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Token text.
    pub label: String,
    /// Probability weight.
    pub weight: f32,
}

/// Tagged visual state of a step.
///
/// Each deck defines one enum implementing this trait; every variant maps
/// to a dedicated drawing procedure.
pub trait Visual {
    /// Draw the visual panel for the current control values.
    fn draw(&self, controls: &Controls) -> Result<String>;

    /// Candidates for an animated weighted draw, if this state supports one.
    fn draw_candidates(&self, _controls: &Controls) -> Option<Vec<Candidate>> {
        None
    }
}

/// An ordered list of steps plus the metadata a widget needs.
#[derive(Debug, Clone)]
pub struct Deck<V> {
    /// Short identifier (used on the command line).
    pub id: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// Label of the forward control on the last step.
    pub finish_label: Option<&'static str>,
    /// Numeric inputs the deck reads.
    pub inputs: &'static [InputField],
    /// The steps, addressed by zero-based position.
    pub steps: Vec<Step<V>>,
}

impl<V> Deck<V> {
    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the deck has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
