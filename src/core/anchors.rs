//! Host element identifiers a widget binds to at start-up.

use std::fmt;

use super::controls::InputField;

/// A required element of the hosting surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// "Previous" button.
    PrevButton,
    /// "Next" button.
    NextButton,
    /// "Reset" button.
    ResetButton,
    /// Title and description panel.
    StepInfo,
    /// Code sample panel.
    CodeDisplay,
    /// Per-step diagram panel.
    VisualContent,
    /// A numeric input field.
    Input(InputField),
}

impl Anchor {
    /// Anchors every widget needs regardless of its inputs.
    pub const BASE: [Anchor; 6] = [
        Anchor::PrevButton,
        Anchor::NextButton,
        Anchor::ResetButton,
        Anchor::StepInfo,
        Anchor::CodeDisplay,
        Anchor::VisualContent,
    ];

    /// Element identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Anchor::PrevButton => "prev-btn",
            Anchor::NextButton => "next-btn",
            Anchor::ResetButton => "reset-btn",
            Anchor::StepInfo => "step-info",
            Anchor::CodeDisplay => "code-display",
            Anchor::VisualContent => "visual-content",
            Anchor::Input(field) => field.id(),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Full anchor list for a widget exposing `inputs`.
pub fn required_anchors(inputs: &[InputField]) -> Vec<Anchor> {
    Anchor::BASE
        .into_iter()
        .chain(inputs.iter().copied().map(Anchor::Input))
        .collect()
}

/// Navigation buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Prev,
    Next,
    Reset,
}

impl Button {
    /// The anchor the button is bound to.
    pub fn anchor(&self) -> Anchor {
        match self {
            Button::Prev => Anchor::PrevButton,
            Button::Next => Anchor::NextButton,
            Button::Reset => Anchor::ResetButton,
        }
    }
}
