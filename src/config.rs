//! Configuration types for nano-explainers.
//!
//! Every section has a `Default` so a config file only needs to name the
//! fields it changes:
//!
//! ```json
//! { "animation": { "frames": 20, "seed": 7 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Defaults for the numeric input fields.
    pub controls: ControlDefaults,
    /// Sampling draw animation.
    pub animation: AnimationConfig,
    /// Terminal display options.
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make a widget unusable.
    pub fn validate(&self) -> Result<()> {
        if self.animation.frames == 0 {
            return Err(Error::Config("animation.frames must be at least 1".into()));
        }
        if self.display.width < 40 {
            return Err(Error::Config(format!(
                "display.width must be at least 40, got {}",
                self.display.width
            )));
        }
        Ok(())
    }
}

/// Fallback values for the numeric inputs.
///
/// An input that fails to parse takes the value configured here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlDefaults {
    /// Temperature for logit scaling (1.0 = no change).
    pub temperature: f32,
    /// Top-k cutoff (0 = disabled).
    pub top_k: usize,
    /// Nucleus mass (1.0 = disabled).
    pub top_p: f32,
    /// Attention head count for the KV cache deck.
    pub num_heads: usize,
}

impl Default for ControlDefaults {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_k: 5,
            top_p: 0.9,
            num_heads: 8,
        }
    }
}

/// Sampling draw animation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Number of frames, the last one being the reveal.
    pub frames: u32,
    /// Delay between frames in milliseconds.
    pub interval_ms: u64,
    /// Seed for the draw. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames: 12,
            interval_ms: 90,
            seed: None,
        }
    }
}

/// Terminal display options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Highlight code samples with ANSI colors.
    pub highlight: bool,
    /// Clear the screen before every frame.
    pub clear_screen: bool,
    /// Panel width in columns.
    pub width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            highlight: true,
            clear_screen: true,
            width: 72,
        }
    }
}
