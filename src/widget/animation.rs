//! Animated weighted draw for the sampling deck.
//!
//! The winner is decided when the animation starts. Intermediate frames
//! only flicker between candidates; the last frame reveals the precomputed
//! winner. The owner cancels the task by dropping it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::Candidate;
use crate::mock::math::weighted_draw;

/// One animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Flicker: a random candidate is highlighted.
    Spin { highlighted: usize },
    /// Final frame: the winner.
    Reveal { winner: usize },
}

/// A bounded draw animation.
#[derive(Debug, Clone)]
pub struct SamplingAnimation {
    candidates: Vec<Candidate>,
    winner: usize,
    frames: u32,
    shown: u32,
    flicker: StdRng,
}

impl SamplingAnimation {
    /// Draw a winner from `candidates` and schedule `frames` frames.
    ///
    /// Returns `None` when no candidate has positive weight.
    pub fn start<R: Rng + ?Sized>(
        candidates: Vec<Candidate>,
        frames: u32,
        rng: &mut R,
    ) -> Option<Self> {
        let weights: Vec<f32> = candidates.iter().map(|c| c.weight).collect();
        let winner = weighted_draw(rng, &weights)?;
        Some(Self {
            candidates,
            winner,
            frames: frames.max(1),
            shown: 0,
            flicker: StdRng::seed_from_u64(rng.r#gen()),
        })
    }

    /// The precomputed winner.
    pub fn winner(&self) -> &Candidate {
        &self.candidates[self.winner]
    }

    /// All candidates, in display order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Frames not yet shown.
    pub fn remaining(&self) -> u32 {
        self.frames - self.shown
    }

    /// Whether the reveal has been shown.
    pub fn is_finished(&self) -> bool {
        self.shown >= self.frames
    }

    /// Produce the next frame. After the reveal, keeps returning it.
    pub fn next_frame(&mut self) -> Frame {
        if self.shown < self.frames {
            self.shown += 1;
        }
        if self.is_finished() {
            Frame::Reveal {
                winner: self.winner,
            }
        } else {
            Frame::Spin {
                highlighted: self.flicker.gen_range(0..self.candidates.len()),
            }
        }
    }

    /// Text for a frame, drawn under the visual panel.
    pub fn render_frame(&self, frame: Frame) -> String {
        let marked = match frame {
            Frame::Spin { highlighted } => highlighted,
            Frame::Reveal { winner } => winner,
        };
        let row: Vec<String> = self
            .candidates
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if i == marked {
                    format!("[{}]", c.label)
                } else {
                    format!(" {} ", c.label)
                }
            })
            .collect();

        let status = match frame {
            Frame::Spin { .. } => format!("🎲 drawing... {}/{}", self.shown, self.frames),
            Frame::Reveal { winner } => {
                let c = &self.candidates[winner];
                format!("✅ sampled \"{}\" (p = {:.3})", c.label, c.weight)
            }
        };

        format!("{}\n{status}", row.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate {
                label: "The".into(),
                weight: 0.6,
            },
            Candidate {
                label: "Cat".into(),
                weight: 0.4,
            },
        ]
    }

    #[test]
    fn test_runs_fixed_number_of_frames() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut anim = SamplingAnimation::start(candidates(), 5, &mut rng).unwrap();

        for _ in 0..4 {
            assert!(matches!(anim.next_frame(), Frame::Spin { .. }));
        }
        assert_eq!(anim.remaining(), 1);
        let last = anim.next_frame();
        assert!(anim.is_finished());
        assert_eq!(
            last,
            Frame::Reveal {
                winner: candidates()
                    .iter()
                    .position(|c| c.label == anim.winner().label)
                    .unwrap()
            }
        );
    }

    #[test]
    fn test_same_seed_same_winner() {
        let a = SamplingAnimation::start(candidates(), 3, &mut StdRng::seed_from_u64(11)).unwrap();
        let b = SamplingAnimation::start(candidates(), 3, &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(a.winner(), b.winner());
    }

    #[test]
    fn test_zero_weights_do_not_start() {
        let zero = vec![Candidate {
            label: "Eat".into(),
            weight: 0.0,
        }];
        assert!(SamplingAnimation::start(zero, 3, &mut StdRng::seed_from_u64(1)).is_none());
    }

    #[test]
    fn test_reveal_frame_names_winner() {
        let mut anim = SamplingAnimation::start(candidates(), 1, &mut StdRng::seed_from_u64(3)).unwrap();
        let frame = anim.next_frame();
        let text = anim.render_frame(frame);
        assert!(text.contains(&format!("[{}]", anim.winner().label)));
        assert!(text.contains("sampled"));
    }
}
