//! Numeric input fields that parametrize the mock computations.
//!
//! Inputs arrive as raw text. Anything that does not parse to a finite
//! number in range falls back to the field's configured default; no error
//! ever reaches the user.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::config::ControlDefaults;

/// Identifier of a numeric input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputField {
    /// Logit temperature.
    Temperature,
    /// Top-k cutoff.
    TopK,
    /// Nucleus probability mass.
    TopP,
    /// Attention head count.
    NumHeads,
}

impl InputField {
    /// All fields, in display order.
    pub const ALL: [InputField; 4] = [
        InputField::Temperature,
        InputField::TopK,
        InputField::TopP,
        InputField::NumHeads,
    ];

    /// Anchor identifier of the field.
    pub fn id(&self) -> &'static str {
        match self {
            InputField::Temperature => "temperature",
            InputField::TopK => "top-k",
            InputField::TopP => "top-p",
            InputField::NumHeads => "num-heads",
        }
    }

    /// Look a field up by its anchor identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.id() == id)
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Current values of the numeric inputs.
#[derive(Debug, Clone)]
pub struct Controls {
    /// Temperature for logit scaling.
    pub temperature: f32,
    /// Top-k cutoff (0 = disabled).
    pub top_k: usize,
    /// Nucleus mass (values outside (0, 1) disable the filter).
    pub top_p: f32,
    /// Attention head count.
    pub num_heads: usize,
    defaults: ControlDefaults,
}

impl Controls {
    /// Create controls holding the given defaults.
    pub fn new(defaults: ControlDefaults) -> Self {
        Self {
            temperature: defaults.temperature,
            top_k: defaults.top_k,
            top_p: defaults.top_p,
            num_heads: defaults.num_heads,
            defaults,
        }
    }

    /// Set a field from raw user text.
    ///
    /// Returns `false` when the text was rejected and the default applied.
    pub fn set(&mut self, field: InputField, raw: &str) -> bool {
        let raw = raw.trim();
        let accepted = match field {
            InputField::Temperature => {
                let value = parse_finite(raw).filter(|v| *v >= 0.0);
                self.temperature = value.unwrap_or(self.defaults.temperature);
                value.is_some()
            }
            InputField::TopK => {
                let value = parse_or_none::<usize>(raw);
                self.top_k = value.unwrap_or(self.defaults.top_k);
                value.is_some()
            }
            InputField::TopP => {
                let value = parse_finite(raw).filter(|v| (0.0..=1.0).contains(v));
                self.top_p = value.unwrap_or(self.defaults.top_p);
                value.is_some()
            }
            InputField::NumHeads => {
                let value = parse_or_none::<usize>(raw);
                self.num_heads = value.unwrap_or(self.defaults.num_heads);
                value.is_some()
            }
        };
        if !accepted {
            debug!(field = field.id(), raw, "unparsable input, using default");
        }
        accepted
    }

    /// Display text for a field's current value.
    pub fn display(&self, field: InputField) -> String {
        match field {
            InputField::Temperature => format!("{:.2}", self.temperature),
            InputField::TopK => self.top_k.to_string(),
            InputField::TopP => format!("{:.2}", self.top_p),
            InputField::NumHeads => self.num_heads.to_string(),
        }
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(ControlDefaults::default())
    }
}

fn parse_or_none<T: FromStr>(raw: &str) -> Option<T> {
    raw.parse::<T>().ok()
}

fn parse_finite(raw: &str) -> Option<f32> {
    parse_or_none::<f32>(raw).filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_inputs_are_applied() {
        let mut controls = Controls::default();
        assert!(controls.set(InputField::Temperature, "0.7"));
        assert!(controls.set(InputField::TopK, " 3 "));
        assert!(controls.set(InputField::TopP, "0.5"));
        assert!(controls.set(InputField::NumHeads, "32"));

        assert_eq!(controls.temperature, 0.7);
        assert_eq!(controls.top_k, 3);
        assert_eq!(controls.top_p, 0.5);
        assert_eq!(controls.num_heads, 32);
    }

    #[test]
    fn test_unparsable_inputs_fall_back_to_defaults() {
        let mut controls = Controls::default();
        controls.set(InputField::TopK, "2");

        assert!(!controls.set(InputField::TopK, "many"));
        assert_eq!(controls.top_k, 5);

        assert!(!controls.set(InputField::Temperature, "NaN"));
        assert_eq!(controls.temperature, 1.0);

        assert!(!controls.set(InputField::TopP, "1.5"));
        assert_eq!(controls.top_p, 0.9);

        assert!(!controls.set(InputField::NumHeads, "-4"));
        assert_eq!(controls.num_heads, 8);
    }

    #[test]
    fn test_field_ids_round_trip() {
        for field in InputField::ALL {
            assert_eq!(InputField::from_id(field.id()), Some(field));
        }
        assert_eq!(InputField::from_id("batch-size"), None);
    }
}
