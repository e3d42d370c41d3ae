//! End-to-end gesture tests: full panel, scripted touch streams, and a
//! deterministic frame clock driving the settle animation to completion.

use slideup_core::{FrameScheduler, ManualFrameClock};
use slideup_foundation::{PointerSample, TouchAction, TouchEvent};
use slideup_ui::{Constraints, PanelContent, PanelState, Size, SlidingUpPanel};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct Content {
    size: Size,
}

impl PanelContent for Content {
    fn measure(&mut self, _constraints: Constraints) -> Size {
        self.size
    }

    fn layout(&mut self, _x: f32, _y: f32, _size: Size) {}
}

struct Harness {
    clock: Rc<ManualFrameClock>,
    panel: SlidingUpPanel,
    opened: Rc<Cell<u32>>,
    closed: Rc<Cell<u32>>,
    ratios: Rc<RefCell<Vec<f32>>>,
    handling: bool,
}

impl Harness {
    fn new(height: f32) -> Self {
        let clock = Rc::new(ManualFrameClock::new());
        let panel = SlidingUpPanel::new(clock.clone());
        panel.add_content(Box::new(Content {
            size: Size::new(400.0, height),
        }));
        panel
            .measure(Constraints::new(400.0, height))
            .expect("one child");
        panel.layout().expect("one child");

        let opened = Rc::new(Cell::new(0));
        let closed = Rc::new(Cell::new(0));
        let ratios: Rc<RefCell<Vec<f32>>> = Rc::new(RefCell::new(Vec::new()));

        let opened_cb = Rc::clone(&opened);
        panel.set_on_panel_opened(move || opened_cb.set(opened_cb.get() + 1));
        let closed_cb = Rc::clone(&closed);
        panel.set_on_panel_closed(move || closed_cb.set(closed_cb.get() + 1));
        let ratios_cb = Rc::clone(&ratios);
        panel.set_on_panel_scrolled(move |ratio| ratios_cb.borrow_mut().push(ratio));

        Self {
            clock,
            panel,
            opened,
            closed,
            ratios,
            handling: false,
        }
    }

    /// Host-side touch routing: interception always sees the down, then the
    /// panel handles its own stream for the rest of the gesture. The frame
    /// clock is kept in step with event time, running any frames that were
    /// due in between, as a real display pipeline would.
    fn dispatch(&mut self, event: &TouchEvent) {
        let behind = event.time_ms - self.clock.now_ms();
        if behind > 0 {
            self.clock.advance_frame(behind);
        }
        match event.action {
            TouchAction::Down => {
                self.panel.on_intercept_touch_event(event);
                self.handling = self.panel.on_touch_event(event);
            }
            _ => {
                if self.handling {
                    self.panel.on_touch_event(event);
                } else if self.panel.on_intercept_touch_event(event) {
                    self.handling = true;
                }
                if matches!(event.action, TouchAction::Up | TouchAction::Cancel) {
                    self.handling = false;
                }
            }
        }
    }

    fn settle(&self) {
        self.clock.run_until_idle(16, 400);
    }

    /// Drags straight up from `y_from` to `y_to` and holds long enough that
    /// the release velocity is zero.
    fn slow_drag(&mut self, y_from: f32, y_to: f32) {
        self.dispatch(&TouchEvent::down(0, 100.0, y_from, 0));
        self.dispatch(&TouchEvent::moved([PointerSample::new(0, 100.0, y_to)], 16));
        self.dispatch(&TouchEvent::moved(
            [PointerSample::new(0, 100.0, y_to)],
            1_000,
        ));
        self.dispatch(&TouchEvent::up([PointerSample::new(0, 100.0, y_to)], 2_000));
    }

    fn open_fully(&mut self) {
        self.panel.open_panel();
        self.settle();
        assert_eq!(self.panel.state(), PanelState::Opened);
    }
}

#[test]
fn slow_release_below_threshold_settles_closed() {
    let mut h = Harness::new(1000.0);

    // Anchor clamps one slop-width past the down point, so this lands the
    // offset at exactly 250 px: 25% of the height, under the 30% threshold.
    h.slow_drag(900.0, 634.0);
    assert_eq!(h.panel.scroll_offset(), 250);

    h.settle();
    assert_eq!(h.panel.state(), PanelState::Closed);
    assert_eq!(h.panel.scroll_offset(), 0);
    assert!(!h.panel.is_open());
    assert_eq!(h.closed.get(), 1);
    assert_eq!(h.opened.get(), 0);
}

#[test]
fn slow_release_past_threshold_settles_open() {
    let mut h = Harness::new(1000.0);

    // Offset 400 px: past the 30% open threshold.
    h.slow_drag(900.0, 484.0);
    assert_eq!(h.panel.scroll_offset(), 400);

    h.settle();
    assert_eq!(h.panel.state(), PanelState::Opened);
    assert_eq!(h.panel.scroll_offset(), 1000);
    assert!(h.panel.is_open());
    assert_eq!(h.opened.get(), 1);
    assert_eq!(h.closed.get(), 0);
}

#[test]
fn fast_fling_opens_from_low_offset() {
    let mut h = Harness::new(1000.0);

    h.dispatch(&TouchEvent::down(0, 100.0, 900.0, 0));
    let mut y = 900.0;
    let mut t = 0;
    for _ in 0..5 {
        y -= 40.0;
        t += 16;
        h.dispatch(&TouchEvent::moved([PointerSample::new(0, 100.0, y)], t));
    }
    // Offset is still well under the 30% threshold; velocity decides.
    assert!(h.panel.scroll_offset() < 300);
    h.dispatch(&TouchEvent::up([PointerSample::new(0, 100.0, y)], t + 16));

    h.settle();
    assert_eq!(h.panel.state(), PanelState::Opened);
    assert_eq!(h.panel.scroll_offset(), 1000);
    assert_eq!(h.opened.get(), 1);
}

#[test]
fn close_then_open_mid_flight_fires_open_once() {
    let mut h = Harness::new(1000.0);
    h.open_fully();
    h.opened.set(0);

    h.panel.close_panel();
    // A couple of frames into the close animation, reverse course.
    h.clock.advance_frame(16);
    h.clock.advance_frame(16);
    assert_eq!(h.panel.state(), PanelState::Flinging);
    h.panel.open_panel();

    h.settle();
    assert_eq!(h.panel.state(), PanelState::Opened);
    assert_eq!(h.panel.scroll_offset(), 1000);
    assert_eq!(h.opened.get(), 1, "exactly one open for the round trip");
    assert_eq!(h.closed.get(), 0, "the aborted close must not fire");
}

#[test]
fn down_catches_panel_mid_fling() {
    let mut h = Harness::new(1000.0);
    h.open_fully();
    h.opened.set(0);

    h.panel.close_panel();
    h.clock.advance_frame(16);
    h.clock.advance_frame(16);
    assert_eq!(h.panel.state(), PanelState::Flinging);
    let caught_at = h.panel.scroll_offset();

    // The down lands mid-animation and grabs the panel where it is.
    let now = h.clock.now_ms();
    h.dispatch(&TouchEvent::down(0, 100.0, 500.0, now));
    assert_eq!(h.panel.state(), PanelState::Dragging);
    assert_eq!(h.panel.scroll_offset(), caught_at);

    // No terminal callback fired for the aborted close.
    assert_eq!(h.closed.get(), 0);

    // Hold and release: the offset is far past the 30% threshold, so the
    // panel settles back open.
    h.dispatch(&TouchEvent::moved(
        [PointerSample::new(0, 100.0, 500.0)],
        now + 1_000,
    ));
    h.dispatch(&TouchEvent::up(
        [PointerSample::new(0, 100.0, 500.0)],
        now + 2_000,
    ));
    h.settle();
    assert_eq!(h.panel.state(), PanelState::Opened);
    assert_eq!(h.opened.get(), 1);
    assert_eq!(h.closed.get(), 0);
}

#[test]
fn horizontal_gesture_is_left_alone_for_good() {
    let mut h = Harness::new(1000.0);

    h.dispatch(&TouchEvent::down(0, 100.0, 500.0, 0));
    // Strongly horizontal first...
    h.dispatch(&TouchEvent::moved([PointerSample::new(0, 160.0, 502.0)], 16));
    // ...then strongly vertical within the same gesture.
    h.dispatch(&TouchEvent::moved([PointerSample::new(0, 160.0, 200.0)], 32));
    h.dispatch(&TouchEvent::up([PointerSample::new(0, 160.0, 200.0)], 48));

    assert_eq!(h.panel.state(), PanelState::Closed);
    assert_eq!(h.panel.scroll_offset(), 0);
    assert_eq!(h.opened.get(), 0);
    assert_eq!(h.closed.get(), 0);
}

#[test]
fn opened_panel_passes_touch_through() {
    let mut h = Harness::new(1000.0);
    h.open_fully();

    assert!(!h.panel.on_touch_event(&TouchEvent::down(0, 100.0, 500.0, 5_000)));
}

#[test]
fn scroll_listener_steps_always_exceed_epsilon() {
    let h = Harness::new(1000.0);
    h.panel.open_panel();
    h.settle();

    let ratios = h.ratios.borrow();
    assert!(!ratios.is_empty());
    assert!(ratios.iter().all(|r| (0.0..=1.0).contains(r)));
    let last = *ratios.last().unwrap();
    assert!(last > 0.95, "panel should report arriving nearly open, got {last}");

    // Every delivered change exceeds the suppression epsilon.
    for pair in ratios.windows(2) {
        assert!(
            (pair[1] - pair[0]).abs() > 0.009,
            "suppressed-size step delivered: {pair:?}"
        );
    }
}

#[test]
fn offset_never_leaves_bounds_during_wild_drag() {
    let mut h = Harness::new(1000.0);

    h.dispatch(&TouchEvent::down(0, 100.0, 500.0, 0));
    h.dispatch(&TouchEvent::moved([PointerSample::new(0, 100.0, 450.0)], 16));
    let wild = [-4_000.0, 3_000.0, -250.0, 800.0, -10_000.0, 9_999.0];
    let mut t = 16;
    let mut y: f32 = 450.0;
    for step in wild {
        y = (y - step).clamp(-20_000.0, 20_000.0);
        t += 16;
        h.dispatch(&TouchEvent::moved([PointerSample::new(0, 100.0, y)], t));
        let offset = h.panel.scroll_offset();
        assert!((0..=1000).contains(&offset), "offset {offset} out of bounds");
    }
}
