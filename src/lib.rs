//! nano-explainers: step-by-step explainers for LLM inference and training.
//!
//! Each explainer is a deck of immutable steps driven by a clamped step
//! sequencer:
//! - Batch generation with left padding
//! - Checkpoint sharding with ZeRO
//! - Group-relative policy optimization
//! - KV cache growth
//! - Token sampling with an animated draw
//! - Training job initialization
//!
//! All numbers come from small hardcoded datasets; nothing here runs a
//! real model.

pub mod config;
pub mod error;

pub mod core;
pub mod explainers;
pub mod host;
pub mod input;
pub mod mock;
pub mod visualizers;
pub mod widget;

pub use config::{AnimationConfig, AppConfig, ControlDefaults, DisplayConfig};
pub use core::{Anchor, Button, Controls, Deck, InputField, NavState, Step, StepSequencer, Visual};
pub use error::{Error, Result};
pub use explainers::{DeckId, DeckVisitor};
pub use host::{BufferHost, Host, KeywordHighlighter, TerminalHost};
pub use input::{Command, Key, parse_line};
pub use widget::Widget;
