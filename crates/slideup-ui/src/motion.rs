//! Panel state machine and settle animation.
//!
//! [`MotionEngine`] is the sole owner of the scroll offset: the classifier
//! feeds it drag deltas, release hands it a settle request, and the panel's
//! frame loop calls [`MotionEngine::tick`] until the scroller finishes. The
//! offset is kept in whole pixels (platform scroll semantics); sub-pixel
//! remainders travel back to the caller so repeated drags never drift.

use crate::easing::{distance_influence_for_settle_duration, Easing};
use crate::scroller::Scroller;
use std::rc::Rc;

/// Hard cap on a computed settle duration.
pub const MAX_SETTLE_DURATION_MS: i64 = 900;

/// Offset-ratio changes at or below this are not delivered to the scroll
/// listener.
const SCROLL_RATIO_EPSILON: f32 = 0.009;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelState {
    /// Resting hidden; offset 0.
    Closed,
    /// Resting fully visible; offset = panel height.
    Opened,
    /// A pointer owns the offset.
    Dragging,
    /// The settle animation owns the offset.
    Flinging,
}

/// Outcome of one drive step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickResult {
    /// Animation still in flight; schedule another frame.
    Continue,
    /// The scroller finished this frame; dispatch
    /// [`MotionEngine::resolve_scroll_end`] on the next frame boundary.
    Settled,
    /// Nothing to drive.
    Idle,
}

type StateListener = Rc<dyn Fn()>;
type ScrollListener = Rc<dyn Fn(f32)>;
type MotionHint = Rc<dyn Fn(bool)>;

pub struct MotionEngine {
    state: PanelState,
    /// Committed target: the resting position the panel is at or heading to.
    is_open: bool,
    scroll_y: i32,
    height: i32,
    has_content: bool,
    scroller: Scroller,
    min_fling_velocity: f32,
    last_scrolled_offset: f32,
    motion_active: bool,
    on_opened: Option<StateListener>,
    on_closed: Option<StateListener>,
    on_scrolled: Option<ScrollListener>,
    on_motion_active: Option<MotionHint>,
}

impl MotionEngine {
    pub fn new(min_fling_velocity: f32) -> Self {
        Self {
            state: PanelState::Closed,
            is_open: false,
            scroll_y: 0,
            height: 0,
            has_content: false,
            scroller: Scroller::new(Easing::Bounce),
            min_fling_velocity,
            last_scrolled_offset: 0.0,
            motion_active: false,
            on_opened: None,
            on_closed: None,
            on_scrolled: None,
            on_motion_active: None,
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn scroll_y(&self) -> i32 {
        self.scroll_y
    }

    pub fn extent(&self) -> i32 {
        self.height
    }

    pub fn set_on_opened(&mut self, listener: impl Fn() + 'static) {
        self.on_opened = Some(Rc::new(listener));
    }

    pub fn set_on_closed(&mut self, listener: impl Fn() + 'static) {
        self.on_closed = Some(Rc::new(listener));
    }

    pub fn set_on_scrolled(&mut self, listener: impl Fn(f32) + 'static) {
        self.on_scrolled = Some(Rc::new(listener));
    }

    /// Hint fired when the panel starts/stops moving; the host uses it to
    /// toggle drawing caches on the child.
    pub fn set_on_motion_active(&mut self, listener: impl Fn(bool) + 'static) {
        self.on_motion_active = Some(Rc::new(listener));
    }

    /// Updates the opened resting offset; called from the layout pass.
    pub fn set_extent(&mut self, height: i32) {
        self.height = height.max(0);
    }

    pub fn set_has_content(&mut self, has_content: bool) {
        self.has_content = has_content;
    }

    /// Restores the committed open flag without animating (instance-state
    /// restore; the next layout pass resolves it).
    pub fn restore_open(&mut self, is_open: bool) {
        self.is_open = is_open;
    }

    /// Moves the offset without notifying the scroll listener (layout snap).
    pub fn scroll_to(&mut self, y: i32) {
        self.scroll_y = y.clamp(0, self.height);
    }

    pub fn open_panel(&mut self, now_ms: i64) {
        if !self.is_open {
            self.settle(true, 0.0, now_ms);
        }
    }

    pub fn close_panel(&mut self, now_ms: i64) {
        if self.is_open {
            self.settle(false, 0.0, now_ms);
        }
    }

    /// Direct manipulation: applies a drag delta, clamped to
    /// `[0, height]`, and returns the sub-pixel remainder left after
    /// snapping to whole pixels.
    pub fn drag_by(&mut self, delta: f32) -> f32 {
        let mut target = self.scroll_y as f32 + delta;
        let top_bound = self.height as f32;
        if target > top_bound {
            target = top_bound;
        } else if target < 0.0 {
            target = 0.0;
        }
        let snapped = target as i32;
        self.scroll_y = snapped;
        self.notify_scrolled(target);
        target - snapped as f32
    }

    /// Commits the target and animates toward it.
    pub fn settle(&mut self, open: bool, velocity: f32, now_ms: i64) {
        self.is_open = open;
        let target = if open { self.height } else { 0 };
        self.smooth_scroll_to(target, velocity, now_ms);
    }

    fn smooth_scroll_to(&mut self, target_y: i32, velocity: f32, now_ms: i64) {
        if !self.has_content {
            // Nothing hosted; the committed flag stays, the offset does not
            // move.
            return;
        }

        let dy = target_y - self.scroll_y;
        if dy == 0 || self.height == 0 {
            // Degenerate geometry resolves straight to the terminal state.
            self.complete_scroll(false);
            self.set_state(self.terminal_state());
            return;
        }

        self.set_state(PanelState::Flinging);
        let duration = settle_duration(dy, self.height, velocity, self.min_fling_velocity);
        log::debug!(
            "settle to y={target_y} velocity={velocity} duration={duration}ms"
        );
        self.scroller.start_scroll(self.scroll_y, dy, duration, now_ms);
    }

    /// One drive step of the settle loop.
    pub fn tick(&mut self, now_ms: i64) -> TickResult {
        if !self.scroller.is_finished() && self.scroller.compute_scroll_offset(now_ms) {
            let y = self.scroller.curr_y();
            if y != self.scroll_y {
                self.scroll_y = y;
                self.notify_scrolled(y as f32);
            }
            // Keep driving until the scroller reports done.
            return TickResult::Continue;
        }

        if self.complete_scroll(true) {
            TickResult::Settled
        } else {
            TickResult::Idle
        }
    }

    /// Terminal-state dispatch, run one frame after [`TickResult::Settled`]
    /// so completion never re-enters layout callbacks.
    pub fn resolve_scroll_end(&mut self) {
        self.set_state(self.terminal_state());
    }

    /// Pointer-down while a settle is running "catches" the panel: the
    /// animation is discarded without its terminal callback and the state
    /// moves to `Dragging`. Otherwise any finished-but-unresolved scroll is
    /// finalized synchronously.
    pub fn catch_if_settling(&mut self, now_ms: i64) -> bool {
        self.scroller.compute_scroll_offset(now_ms);
        if self.state == PanelState::Flinging {
            self.scroller.abort_animation();
            self.set_state(PanelState::Dragging);
            true
        } else {
            self.complete_scroll(false);
            false
        }
    }

    /// Stops the scroller without touching panel state.
    pub fn abort_settle(&mut self) {
        self.scroller.abort_animation();
    }

    pub fn begin_drag(&mut self) {
        self.set_state(PanelState::Dragging);
    }

    /// Finishes an in-flight settle: snaps to the exact target and either
    /// reports that terminal dispatch must be posted (`post_events`) or
    /// resolves it synchronously. Returns true when dispatch was deferred.
    fn complete_scroll(&mut self, post_events: bool) -> bool {
        if self.state != PanelState::Flinging {
            return false;
        }
        self.scroller.abort_animation();
        let y = self.scroller.curr_y();
        if y != self.scroll_y {
            self.scroll_y = y;
        }
        if post_events {
            true
        } else {
            self.resolve_scroll_end();
            false
        }
    }

    fn terminal_state(&self) -> PanelState {
        if self.is_open {
            PanelState::Opened
        } else {
            PanelState::Closed
        }
    }

    fn set_state(&mut self, new_state: PanelState) {
        if self.state == new_state {
            return;
        }
        log::debug!("panel state {:?} -> {:?}", self.state, new_state);
        self.state = new_state;

        let motion_active = matches!(new_state, PanelState::Dragging | PanelState::Flinging);
        if motion_active != self.motion_active {
            self.motion_active = motion_active;
            if let Some(hint) = self.on_motion_active.clone() {
                hint(motion_active);
            }
        }

        match new_state {
            PanelState::Closed => {
                if let Some(listener) = self.on_closed.clone() {
                    listener();
                }
            }
            PanelState::Opened => {
                if let Some(listener) = self.on_opened.clone() {
                    listener();
                }
            }
            _ => {}
        }
    }

    fn notify_scrolled(&mut self, scroll_y: f32) {
        let Some(listener) = self.on_scrolled.clone() else {
            return;
        };
        let offset = if self.height > 0 {
            (scroll_y / self.height as f32).abs().clamp(0.0, 1.0)
        } else {
            0.0
        };
        if (self.last_scrolled_offset - offset).abs() > SCROLL_RATIO_EPSILON {
            self.last_scrolled_offset = offset;
            listener(offset);
        }
    }
}

/// Settle duration from travel distance and release velocity.
///
/// The travel fraction is bent through the sine influence curve to produce a
/// pseudo-distance, divided by the velocity (floored so a dead-slow release
/// cannot divide by zero), and hard-capped.
pub(crate) fn settle_duration(dy: i32, height: i32, velocity: f32, min_velocity: f32) -> i64 {
    let half_height = height / 2;
    let distance_ratio = (dy.abs() as f32 / height as f32).min(1.0);
    let distance = half_height as f32
        + half_height as f32 * distance_influence_for_settle_duration(distance_ratio);
    let velocity = velocity.abs().max(min_velocity);
    let duration = 4 * (1000.0 * (distance / velocity).abs()).round() as i64;
    duration.min(MAX_SETTLE_DURATION_MS)
}

#[cfg(test)]
#[path = "tests/motion_tests.rs"]
mod tests;
