//! A step-sequencer widget bound to a host.
//!
//! The widget owns its sequencer, controls and animation; the host owns the
//! panels. Every state change re-renders the current step:
//!
//! ```text
//!   Button / Key / set_input
//!            │
//!            ▼
//!   cancel running animation
//!            │
//!            ▼
//!   StepSequencer (clamped move)
//!            │
//!            ▼
//!   render(): info ─► code (highlighted) ─► visual ─► nav ─► present
//!                                            │
//!                                 error: logged, panel left empty
//! ```

pub mod animation;

use std::num::NonZeroUsize;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info};

pub use animation::{Frame, SamplingAnimation};

use crate::config::{AnimationConfig, AppConfig};
use crate::core::{
    Button, Controls, Deck, InputField, NavState, StepSequencer, Visual, required_anchors,
};
use crate::error::{Error, Result};
use crate::host::Host;
use crate::input::Key;

/// One interactive explainer.
pub struct Widget<V, H> {
    deck: Deck<V>,
    sequencer: StepSequencer,
    controls: Controls,
    host: H,
    animation: Option<SamplingAnimation>,
    animation_config: AnimationConfig,
    rng: StdRng,
}

impl<V: Visual, H: Host> Widget<V, H> {
    /// Bind `deck` to `host` and draw the first step.
    ///
    /// Fails without rendering anything if the deck is empty or the host
    /// lacks one of the anchors the deck needs.
    pub fn init(deck: Deck<V>, host: H, config: &AppConfig) -> Result<Self> {
        let Some(len) = NonZeroUsize::new(deck.len()) else {
            error!(deck = deck.id, "deck has no steps, widget not initialized");
            return Err(Error::EmptyDeck(deck.id));
        };

        if let Some(anchor) = required_anchors(deck.inputs)
            .into_iter()
            .find(|a| !host.has_anchor(*a))
        {
            error!(
                deck = deck.id,
                anchor = anchor.id(),
                "required anchor missing, widget not initialized"
            );
            return Err(Error::MissingAnchor(anchor.id()));
        }

        let rng = match config.animation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut widget = Self {
            deck,
            sequencer: StepSequencer::new(len),
            controls: Controls::new(config.controls.clone()),
            host,
            animation: None,
            animation_config: config.animation.clone(),
            rng,
        };

        for &field in widget.deck.inputs {
            let value = widget.controls.display(field);
            widget.host.set_input(field, &value);
        }

        info!(
            deck = widget.deck.id,
            steps = widget.deck.len(),
            "widget initialized"
        );
        widget.render();
        Ok(widget)
    }

    /// Current step index.
    pub fn current_index(&self) -> usize {
        self.sequencer.current()
    }

    /// Number of steps.
    pub fn step_count(&self) -> usize {
        self.sequencer.len()
    }

    /// Navigation affordances for the current step.
    pub fn nav(&self) -> NavState {
        self.sequencer.nav(self.deck.finish_label)
    }

    /// The bound deck.
    pub fn deck(&self) -> &Deck<V> {
        &self.deck
    }

    /// Current input values.
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Give the host back.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Advance one step. No-op on the last step.
    pub fn go_next(&mut self) -> bool {
        self.navigate(StepSequencer::go_next)
    }

    /// Go back one step. No-op on the first step.
    pub fn go_prev(&mut self) -> bool {
        self.navigate(StepSequencer::go_prev)
    }

    /// Return to the first step.
    pub fn reset(&mut self) {
        self.cancel_animation();
        self.sequencer.reset();
        debug!(deck = self.deck.id, "reset");
        self.render();
    }

    /// Jump straight to `index` (clamped).
    pub fn go_to(&mut self, index: usize) {
        self.cancel_animation();
        self.sequencer.go_to(index);
        self.render();
    }

    /// Activate a navigation button.
    pub fn press(&mut self, button: Button) {
        match button {
            Button::Prev => {
                self.go_prev();
            }
            Button::Next => {
                self.go_next();
            }
            Button::Reset => self.reset(),
        }
    }

    /// Handle a key press. Returns whether the key was bound.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::ArrowLeft => {
                self.go_prev();
                true
            }
            Key::ArrowRight => {
                self.go_next();
                true
            }
            Key::Other => false,
        }
    }

    /// Change a numeric input and re-render.
    ///
    /// Returns `false` if the deck does not read `field` or the text was
    /// rejected (in which case the default applies).
    pub fn set_input(&mut self, field: InputField, raw: &str) -> bool {
        if !self.deck.inputs.contains(&field) {
            debug!(deck = self.deck.id, field = field.id(), "input not used by deck");
            return false;
        }
        self.cancel_animation();
        let accepted = self.controls.set(field, raw);
        let value = self.controls.display(field);
        self.host.set_input(field, &value);
        debug!(deck = self.deck.id, field = field.id(), %value, "input changed");
        self.render();
        accepted
    }

    /// Redraw every panel for the current step.
    pub fn render(&mut self) {
        let step = &self.deck.steps[self.sequencer.current()];
        self.host.write_info(step.title, step.description);

        let code = match self.host.highlighter() {
            Some(highlighter) => highlighter.highlight(step.code),
            None => step.code.to_string(),
        };
        self.host.write_code(&code);

        self.draw_visual();
        let nav = self.nav();
        self.host.set_nav(&nav);
        self.host.present();
    }

    /// Whether a draw animation is running.
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// The running animation, if any.
    pub fn animation(&self) -> Option<&SamplingAnimation> {
        self.animation.as_ref()
    }

    /// Delay between animation frames.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.animation_config.interval_ms)
    }

    /// Start a weighted draw on the current step.
    ///
    /// Restarts a running draw. Returns `false` if the step offers no
    /// candidates or none has probability mass.
    pub fn start_draw(&mut self) -> bool {
        self.cancel_animation();

        let step = &self.deck.steps[self.sequencer.current()];
        let Some(candidates) = step.visual.draw_candidates(&self.controls) else {
            self.host.notify("nothing to draw on this step");
            self.host.present();
            return false;
        };

        match SamplingAnimation::start(candidates, self.animation_config.frames, &mut self.rng) {
            Some(animation) => {
                debug!(
                    deck = self.deck.id,
                    winner = %animation.winner().label,
                    frames = self.animation_config.frames,
                    "draw started"
                );
                self.animation = Some(animation);
                true
            }
            None => {
                self.host.notify("nothing to draw: no token has probability mass");
                self.host.present();
                false
            }
        }
    }

    /// Show the next animation frame. Returns whether more frames remain.
    pub fn tick(&mut self) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        let frame = animation.next_frame();
        let text = animation.render_frame(frame);
        let winner = animation.winner().label.clone();

        self.draw_visual();
        self.host.write_visual(&text);

        let finished = matches!(frame, Frame::Reveal { .. });
        if finished {
            self.animation = None;
            self.host.notify(&format!("sampled \"{winner}\""));
            debug!(deck = self.deck.id, %winner, "draw finished");
        }
        self.host.present();
        !finished
    }

    /// Stop a running animation. Returns whether one was running.
    pub fn cancel_animation(&mut self) -> bool {
        let cancelled = self.animation.take().is_some();
        if cancelled {
            debug!(deck = self.deck.id, "draw cancelled");
        }
        cancelled
    }

    fn navigate(&mut self, step: fn(&mut StepSequencer) -> bool) -> bool {
        let cancelled = self.cancel_animation();
        let moved = step(&mut self.sequencer);
        if moved {
            debug!(deck = self.deck.id, index = self.sequencer.current(), "navigated");
        }
        if moved || cancelled {
            self.render();
        }
        moved
    }

    fn draw_visual(&mut self) {
        let index = self.sequencer.current();
        self.host.clear_visual();
        match self.deck.steps[index].visual.draw(&self.controls) {
            Ok(panel) => self.host.write_visual(&panel),
            Err(err) => {
                error!(deck = self.deck.id, step = index, error = %err, "visual render failed");
                self.host.notify("visual unavailable");
            }
        }
    }
}
