//! Core building blocks shared by every explainer widget.
//!
//! - Step, Deck and the Visual render contract
//! - StepSequencer for index management
//! - Anchors the host must provide
//! - Controls for the numeric inputs
//! - Inline markup for descriptions

pub mod anchors;
pub mod controls;
pub mod markup;
pub mod sequencer;
pub mod step;

pub use anchors::{Anchor, Button, required_anchors};
pub use controls::{Controls, InputField};
pub use sequencer::{NavState, StepSequencer};
pub use step::{Candidate, Deck, Step, Visual};
