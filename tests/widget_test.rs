//! Integration tests for widget rendering, inputs and the draw animation.

use nano_explainers::config::AppConfig;
use nano_explainers::explainers::{kv_cache, sampling};
use nano_explainers::{Anchor, BufferHost, Error, InputField, KeywordHighlighter, Widget};
use pretty_assertions::assert_eq;

fn seeded_config(frames: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.animation.seed = Some(42);
    config.animation.frames = frames;
    config
}

#[test]
fn test_init_renders_first_step() {
    let widget = Widget::init(sampling::deck(), BufferHost::new(), &AppConfig::default()).unwrap();
    let host = widget.host();
    assert_eq!(host.title(), "Raw logits");
    assert!(host.code().contains("(\"The\", 4.5)"));
    assert!(host.visual().contains("Once"));
    assert_eq!(host.presents(), 1);
    assert_eq!(host.input(InputField::TopK), Some("5"));
}

#[test]
fn test_missing_anchor_is_fatal_and_renders_nothing() {
    let mut host = BufferHost::new().without(Anchor::CodeDisplay);
    let err = Widget::init(sampling::deck(), &mut host, &AppConfig::default()).err();
    assert!(matches!(err, Some(Error::MissingAnchor("code-display"))));
    assert_eq!(host.presents(), 0);
    assert_eq!(host.title(), "");
    assert!(host.nav().is_none());
}

#[test]
fn test_missing_input_anchor_is_fatal() {
    let host = BufferHost::new().without(Anchor::Input(InputField::TopP));
    let result = Widget::init(sampling::deck(), host, &AppConfig::default());
    assert!(matches!(result, Err(Error::MissingAnchor("top-p"))));

    // A deck that does not read top-p does not care.
    let host = BufferHost::new().without(Anchor::Input(InputField::TopP));
    assert!(Widget::init(kv_cache::deck(), host, &AppConfig::default()).is_ok());
}

#[test]
fn test_render_is_idempotent() {
    let mut widget =
        Widget::init(sampling::deck(), BufferHost::new(), &AppConfig::default()).unwrap();
    widget.go_to(3);
    let first = widget.host().snapshot();
    widget.render();
    assert_eq!(widget.host().snapshot(), first);

    widget.go_next();
    widget.go_prev();
    assert_eq!(widget.host().snapshot(), first);
}

#[test]
fn test_failing_visual_still_renders_text_code_and_nav() {
    let mut widget =
        Widget::init(kv_cache::deck(), BufferHost::new(), &AppConfig::default()).unwrap();
    assert!(widget.set_input(InputField::NumHeads, "0"));
    widget.go_next();

    let host = widget.host();
    assert_eq!(host.title(), "Prefill");
    assert!(host.code().contains("prefill"));
    assert_eq!(host.visual(), "");
    assert_eq!(host.nav().unwrap().position, 1);
    assert!(host.notices().iter().any(|n| n == "visual unavailable"));

    // Steps that do not depend on the head count are unaffected.
    widget.go_prev();
    assert!(!widget.host().visual().is_empty());
}

#[test]
fn test_oversized_head_count_does_not_take_down_the_widget() {
    let mut widget =
        Widget::init(kv_cache::deck(), BufferHost::new(), &AppConfig::default()).unwrap();
    widget.go_to(4);
    assert!(widget.set_input(InputField::NumHeads, "300000000000"));

    let host = widget.host();
    assert_eq!(host.title(), "Long contexts");
    assert_eq!(host.visual(), "");
    assert_eq!(host.nav().unwrap().position, 4);
    assert!(host.notices().iter().any(|n| n == "visual unavailable"));

    // A sane value brings the panel back.
    assert!(widget.set_input(InputField::NumHeads, "8"));
    assert!(widget.host().visual().contains("4096 tokens"));
}

#[test]
fn test_unparsable_input_falls_back_to_default() {
    let mut widget =
        Widget::init(sampling::deck(), BufferHost::new(), &AppConfig::default()).unwrap();
    assert!(widget.set_input(InputField::Temperature, "0.5"));
    assert_eq!(widget.controls().temperature, 0.5);

    assert!(!widget.set_input(InputField::Temperature, "warm"));
    assert_eq!(widget.controls().temperature, 1.0);
    assert_eq!(widget.host().input(InputField::Temperature), Some("1.00"));

    assert!(!widget.set_input(InputField::TopP, "1.5"));
    assert_eq!(widget.controls().top_p, 0.9);
}

#[test]
fn test_input_unused_by_deck_is_ignored() {
    let mut widget =
        Widget::init(sampling::deck(), BufferHost::new(), &AppConfig::default()).unwrap();
    let presents = widget.host().presents();
    assert!(!widget.set_input(InputField::NumHeads, "4"));
    assert_eq!(widget.controls().num_heads, 8);
    assert_eq!(widget.host().presents(), presents);
}

#[test]
fn test_input_change_rerenders_current_step() {
    let mut widget =
        Widget::init(sampling::deck(), BufferHost::new(), &AppConfig::default()).unwrap();
    widget.go_to(2);
    assert!(widget.host().visual().contains("kept 5 tokens"));
    widget.set_input(InputField::TopK, "3");
    assert!(widget.host().visual().contains("kept 3 tokens"));
    assert_eq!(widget.current_index(), 2);
}

#[test]
fn test_highlighter_applied_when_present() {
    let plain = Widget::init(sampling::deck(), BufferHost::new(), &AppConfig::default()).unwrap();
    let highlighted = Widget::init(
        sampling::deck(),
        BufferHost::new().with_highlighter(KeywordHighlighter),
        &AppConfig::default(),
    )
    .unwrap();

    assert_eq!(plain.host().code(), plain.deck().steps[0].code);
    assert!(highlighted.host().code().contains('\x1B'));
}

#[test]
fn test_draw_only_on_sampling_step() {
    let mut widget = Widget::init(sampling::deck(), BufferHost::new(), &seeded_config(4)).unwrap();
    assert!(!widget.start_draw());
    assert!(!widget.is_animating());
    assert_eq!(
        widget.host().notices().last().map(String::as_str),
        Some("nothing to draw on this step")
    );
}

#[test]
fn test_draw_reveals_precomputed_winner() {
    let mut widget = Widget::init(sampling::deck(), BufferHost::new(), &seeded_config(5)).unwrap();
    widget.go_to(usize::MAX);
    assert!(widget.start_draw());

    let winner = widget.animation().unwrap().winner().label.clone();
    let mut ticks = 1;
    while widget.tick() {
        ticks += 1;
    }
    assert_eq!(ticks, 5);
    assert!(!widget.is_animating());
    assert!(widget.host().visual().contains(&format!("\"{winner}\"")));
    assert_eq!(
        widget.host().notices().last().cloned(),
        Some(format!("sampled \"{winner}\""))
    );
    assert!(["The", "Cat", "Dog", "A"].contains(&winner.as_str()));
}

#[test]
fn test_same_seed_same_winner() {
    let winner = |seed| {
        let mut config = seeded_config(3);
        config.animation.seed = Some(seed);
        let mut widget = Widget::init(sampling::deck(), BufferHost::new(), &config).unwrap();
        widget.go_to(5);
        widget.start_draw();
        widget.animation().unwrap().winner().label.clone()
    };
    assert_eq!(winner(9), winner(9));
}

#[test]
fn test_navigation_cancels_animation() {
    let mut widget = Widget::init(sampling::deck(), BufferHost::new(), &seeded_config(12)).unwrap();
    widget.go_to(5);
    assert!(widget.start_draw());
    widget.tick();
    assert!(widget.is_animating());

    widget.go_prev();
    assert!(!widget.is_animating());
    assert!(!widget.tick());
    assert_eq!(widget.current_index(), 4);
    assert!(!widget.host().notices().iter().any(|n| n.starts_with("sampled")));
}

#[test]
fn test_noop_navigation_still_cancels_animation() {
    let mut widget = Widget::init(sampling::deck(), BufferHost::new(), &seeded_config(12)).unwrap();
    widget.go_to(5);
    widget.start_draw();
    widget.tick();

    assert!(!widget.go_next());
    assert!(!widget.is_animating());
    // The cancelled frame is replaced by the step's own panel.
    assert!(widget.host().visual().contains("Renormalized over the nucleus"));
    assert!(!widget.host().visual().contains("drawing"));
}

#[test]
fn test_second_draw_restarts_animation() {
    let mut widget = Widget::init(sampling::deck(), BufferHost::new(), &seeded_config(6)).unwrap();
    widget.go_to(5);
    widget.start_draw();
    widget.tick();
    widget.tick();
    assert!(widget.start_draw());
    assert_eq!(widget.animation().unwrap().remaining(), 6);
}

#[test]
fn test_empty_deck_is_rejected() {
    let mut deck = sampling::deck();
    deck.steps.clear();
    let result = Widget::init(deck, BufferHost::new(), &AppConfig::default());
    assert!(matches!(result, Err(Error::EmptyDeck("sampling"))));
}
