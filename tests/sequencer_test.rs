//! Integration tests for step navigation.

use std::num::NonZeroUsize;

use nano_explainers::config::AppConfig;
use nano_explainers::explainers::{DeckId, DeckVisitor};
use nano_explainers::{BufferHost, Button, Deck, Key, StepSequencer, Visual, Widget};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Next,
    Prev,
    Reset,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Next), Just(Op::Prev), Just(Op::Reset)]
}

proptest! {
    #[test]
    fn index_stays_in_bounds(len in 1usize..12, ops in prop::collection::vec(op(), 0..64)) {
        let mut seq = StepSequencer::new(NonZeroUsize::new(len).unwrap());
        let mut expected = 0usize;
        for op in ops {
            match op {
                Op::Next => {
                    seq.go_next();
                    expected = (expected + 1).min(len - 1);
                }
                Op::Prev => {
                    seq.go_prev();
                    expected = expected.saturating_sub(1);
                }
                Op::Reset => {
                    seq.reset();
                    expected = 0;
                }
            }
            prop_assert!(seq.current() < len);
            prop_assert_eq!(seq.current(), expected);
        }
    }

    #[test]
    fn widget_buttons_stay_in_bounds(ops in prop::collection::vec(op(), 0..40)) {
        let deck = nano_explainers::explainers::sampling::deck();
        let len = deck.len();
        let mut widget = Widget::init(deck, BufferHost::new(), &AppConfig::default()).unwrap();
        for op in ops {
            widget.press(match op {
                Op::Next => Button::Next,
                Op::Prev => Button::Prev,
                Op::Reset => Button::Reset,
            });
            prop_assert!(widget.current_index() < len);
            let nav = *widget.host().nav().unwrap();
            prop_assert_eq!(nav.position, widget.current_index());
        }
    }
}

#[test]
fn test_reset_returns_to_first_step() {
    let mut widget = Widget::init(
        nano_explainers::explainers::grpo::deck(),
        BufferHost::new(),
        &AppConfig::default(),
    )
    .unwrap();
    widget.go_next();
    widget.go_next();
    assert_eq!(widget.current_index(), 2);
    widget.reset();
    assert_eq!(widget.current_index(), 0);
    assert_eq!(widget.host().title(), widget.deck().steps[0].title);
}

#[test]
fn test_nav_affordances_at_edges() {
    let mut widget = Widget::init(
        nano_explainers::explainers::init::deck(),
        BufferHost::new(),
        &AppConfig::default(),
    )
    .unwrap();

    let first = widget.nav();
    assert!(!first.prev_enabled);
    assert!(first.next_enabled);
    assert_eq!(first.next_label, "Next");

    widget.go_to(usize::MAX);
    let last = widget.nav();
    assert_eq!(last.position, widget.step_count() - 1);
    assert!(last.prev_enabled);
    assert!(!last.next_enabled);
    assert_eq!(last.next_label, "Start Training");

    // Further next is a no-op.
    assert!(!widget.go_next());
    assert_eq!(widget.current_index(), widget.step_count() - 1);
}

#[test]
fn test_prev_at_first_step_is_noop() {
    let mut widget = Widget::init(
        nano_explainers::explainers::batching::deck(),
        BufferHost::new(),
        &AppConfig::default(),
    )
    .unwrap();
    let presents = widget.host().presents();
    assert!(!widget.go_prev());
    assert_eq!(widget.current_index(), 0);
    assert_eq!(widget.host().presents(), presents);
}

/// Walks a deck with the right arrow and reports where it ended up.
struct ArrowWalk;

impl DeckVisitor for ArrowWalk {
    type Output = (usize, usize, usize, bool);

    fn visit<V: Visual>(self, deck: Deck<V>) -> Self::Output {
        let mut widget = Widget::init(deck, BufferHost::new(), &AppConfig::default()).unwrap();
        let len = widget.step_count();
        for _ in 0..len - 1 {
            assert!(widget.handle_key(Key::ArrowRight));
        }
        let at_last = widget.current_index();
        widget.handle_key(Key::ArrowRight);
        let after_extra = widget.current_index();
        (len, at_last, after_extra, widget.nav().next_enabled)
    }
}

#[test]
fn test_right_arrows_reach_last_step_in_every_deck() {
    for id in DeckId::ALL {
        let (len, at_last, after_extra, next_enabled) = id.visit(ArrowWalk);
        assert_eq!(at_last, len - 1, "{id}");
        assert_eq!(after_extra, len - 1, "{id}");
        assert!(!next_enabled, "{id}");
    }
}

#[test]
fn test_left_arrow_and_unbound_keys() {
    let mut widget = Widget::init(
        nano_explainers::explainers::kv_cache::deck(),
        BufferHost::new(),
        &AppConfig::default(),
    )
    .unwrap();
    widget.go_to(3);
    assert!(widget.handle_key(Key::ArrowLeft));
    assert_eq!(widget.current_index(), 2);
    assert!(!widget.handle_key(Key::Other));
    assert_eq!(widget.current_index(), 2);
}
