//! Scripted demo for the sliding up panel.
//!
//! Drives the widget headlessly against a manual frame clock: programmatic
//! open/close, a slow under-threshold drag, a fast fling, a mid-fling catch,
//! and an instance-state restore, printing every transition.
//!
//! Run with:
//! ```bash
//! RUST_LOG=debug cargo run --package slideup-demo
//! ```

use slideup_core::{FrameScheduler, ManualFrameClock};
use slideup_foundation::{PointerSample, TouchAction, TouchEvent};
use slideup_ui::{Constraints, PanelContent, PanelSavedState, Size, SlidingUpPanel};
use std::rc::Rc;

struct CoverContent;

impl PanelContent for CoverContent {
    fn measure(&mut self, _constraints: Constraints) -> Size {
        Size::new(480.0, 800.0)
    }

    fn layout(&mut self, x: f32, y: f32, size: Size) {
        log::debug!("cover laid out at ({x}, {y}) size {size:?}");
    }

    fn set_cache_enabled(&mut self, enabled: bool) {
        log::debug!("cover draw cache {}", if enabled { "on" } else { "off" });
    }
}

struct Demo {
    clock: Rc<ManualFrameClock>,
    panel: SlidingUpPanel,
    handling: bool,
}

impl Demo {
    fn new() -> Self {
        let clock = Rc::new(ManualFrameClock::new());
        let panel = SlidingUpPanel::new(clock.clone());
        panel.add_content(Box::new(CoverContent));
        panel
            .measure(Constraints::new(480.0, 800.0))
            .expect("demo hosts a single cover view");
        panel.layout().expect("demo hosts a single cover view");

        panel.set_on_panel_opened(|| println!("  • panel opened"));
        panel.set_on_panel_closed(|| println!("  • panel closed"));
        panel.set_on_panel_scrolled(|ratio| println!("  • scrolled to {ratio:.3}"));
        panel.set_parent_intercept_request(|disallow| {
            log::debug!("parent intercept disallowed: {disallow}");
        });

        Self {
            clock,
            panel,
            handling: false,
        }
    }

    /// Two-phase touch routing the way a host view tree would run it.
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
        let frames = self.clock.run_until_idle(16, 400);
        println!(
            "  settled after {frames} frames: state={:?} offset={}",
            self.panel.state(),
            self.panel.scroll_offset()
        );
    }

    fn now(&self) -> i64 {
        self.clock.now_ms()
    }
}

fn main() {
    env_logger::init();
    println!("=== slideup demo ===\n");
    let mut demo = Demo::new();

    println!("-- programmatic open");
    demo.panel.open_panel();
    demo.settle();

    println!("-- programmatic close");
    demo.panel.close_panel();
    demo.settle();

    println!("-- slow drag to 20%, released: falls back closed");
    let t = demo.now();
    demo.dispatch(&TouchEvent::down(0, 240.0, 700.0, t));
    demo.dispatch(&TouchEvent::moved([PointerSample::new(0, 240.0, 524.0)], t + 16));
    demo.dispatch(&TouchEvent::moved(
        [PointerSample::new(0, 240.0, 524.0)],
        t + 1_000,
    ));
    demo.dispatch(&TouchEvent::up(
        [PointerSample::new(0, 240.0, 524.0)],
        t + 1_100,
    ));
    demo.settle();

    println!("-- fast upward fling: opens from anywhere");
    let t = demo.now();
    demo.dispatch(&TouchEvent::down(0, 240.0, 700.0, t));
    let mut y = 700.0;
    for frame in 1..=5 {
        y -= 45.0;
        demo.dispatch(&TouchEvent::moved(
            [PointerSample::new(0, 240.0, y)],
            t + frame * 16,
        ));
    }
    demo.dispatch(&TouchEvent::up([PointerSample::new(0, 240.0, y)], t + 96));
    demo.settle();

    println!("-- close, then catch the panel mid-fling and fling it back open");
    demo.panel.close_panel();
    demo.clock.advance_frame(16);
    demo.clock.advance_frame(16);
    let t = demo.now();
    demo.dispatch(&TouchEvent::down(0, 240.0, 400.0, t));
    println!(
        "  caught at offset {} in state {:?}",
        demo.panel.scroll_offset(),
        demo.panel.state()
    );
    let mut y = 400.0;
    for frame in 1..=4 {
        y -= 40.0;
        demo.dispatch(&TouchEvent::moved(
            [PointerSample::new(0, 240.0, y)],
            t + frame * 16,
        ));
    }
    demo.dispatch(&TouchEvent::up([PointerSample::new(0, 240.0, y)], t + 80));
    demo.settle();

    println!("-- save, recreate, restore: reopened on the next layout");
    let saved: PanelSavedState = demo.panel.save_state();
    println!("  saved state: is_open={}", saved.is_open);
    let restored = Demo::new();
    restored.panel.restore_state(saved);
    restored
        .panel
        .measure(Constraints::new(480.0, 800.0))
        .expect("demo hosts a single cover view");
    restored.panel.layout().expect("demo hosts a single cover view");
    println!(
        "  restored panel: state={:?} offset={}",
        restored.panel.state(),
        restored.panel.scroll_offset()
    );

    println!("\n=== demo complete ===");
}
