//! Mock datasets and the arithmetic run on them for display.
//!
//! Nothing here touches a real model: every number shown by a deck is
//! computed from the constants in [`data`].

pub mod data;
pub mod math;

pub use math::{SamplingParams, TokenRow, sampling_table};
