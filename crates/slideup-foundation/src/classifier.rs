//! Gesture classification for the sliding panel.
//!
//! Consumes the raw touch stream and decides, per event, whether the panel
//! should claim the gesture, how far a claimed drag has moved, and where the
//! panel should settle when the pointer lifts. The classifier owns pointer
//! identity and velocity tracking; offset ownership stays on the widget side
//! behind [`DragSurface`].
//!
//! Interception is two-phase, matching the host's touch routing: the panel
//! first answers "do I claim this gesture before descendants see it?"
//! ([`GestureClassifier::on_intercept`]) and separately handles the events
//! routed to it once claimed or unclaimed-by-children
//! ([`GestureClassifier::on_touch`]).

use crate::gesture_constants::{
    MAX_FLING_VELOCITY, MIN_DISTANCE_FOR_FLING, MIN_FLING_VELOCITY, PAGING_TOUCH_SLOP,
};
use crate::touch::{PointerId, TouchAction, TouchEvent};
use crate::velocity_tracker::VelocityTracker;

/// Density-scaled gesture thresholds, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    pub touch_slop: f32,
    pub min_fling_velocity: f32,
    pub max_fling_velocity: f32,
    pub fling_distance: f32,
}

impl GestureConfig {
    /// Scales the standard dip thresholds by the display density.
    pub fn with_density(density: f32) -> Self {
        Self {
            touch_slop: PAGING_TOUCH_SLOP * density,
            min_fling_velocity: MIN_FLING_VELOCITY * density,
            max_fling_velocity: MAX_FLING_VELOCITY,
            fling_distance: MIN_DISTANCE_FOR_FLING * density,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::with_density(1.0)
    }
}

/// The widget side of the gesture seam.
///
/// Implemented by the panel over its motion engine; every mutation the
/// classifier wants to make goes through here. Timestamps are the event
/// times, so settle animations start exactly where the gesture ended.
pub trait DragSurface {
    /// Committed open flag (the target of the last settle, not the state).
    fn is_open(&self) -> bool;

    /// True while the panel rests fully open; gestures pass through then.
    fn fully_open(&self) -> bool;

    /// Current scroll offset in pixels, `0` = closed.
    fn scroll_offset(&self) -> f32;

    /// Panel height in pixels (the opened resting offset).
    fn extent(&self) -> f32;

    /// If a settle animation is running, aborts it, enters the dragging
    /// state and returns true so the gesture "catches" the panel.
    /// Otherwise finalizes any pending terminal state and returns false.
    fn catch_if_settling(&mut self, now_ms: i64) -> bool;

    /// Stops the settle scroller without touching the panel state.
    fn abort_settle(&mut self);

    /// A move crossed the slop threshold; the panel is now dragging.
    fn begin_drag(&mut self);

    /// Applies a drag delta (positive = toward open), clamped by the
    /// surface. Returns the sub-pixel residual the classifier must fold
    /// back into its tracked position so nothing is lost across frames.
    fn drag_by(&mut self, delta: f32) -> f32;

    /// The gesture ended; animate toward the chosen resting position.
    fn settle(&mut self, open: bool, velocity: f32, now_ms: i64);

    /// Asks the ancestor chain to stop intercepting while we drag.
    fn disallow_parent_intercept(&mut self, disallow: bool);
}

/// Per-gesture tracking record.
///
/// Created on pointer-down, destroyed on up/cancel or when a new gesture
/// starts; a session exists iff a pointer sequence is in progress.
#[derive(Clone, Copy, Debug)]
pub struct TouchSession {
    pub active_pointer: PointerId,
    pub initial_x: f32,
    pub initial_y: f32,
    pub last_x: f32,
    pub last_y: f32,
    /// The gesture was classified vertical and the panel claimed it.
    pub dragging: bool,
    /// The gesture was classified horizontal; it stays rejected until the
    /// session ends, even if it later turns vertical.
    pub horizontal_reject: bool,
}

pub struct GestureClassifier {
    config: GestureConfig,
    session: Option<TouchSession>,
    velocity: VelocityTracker,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            session: None,
            velocity: VelocityTracker::new(),
        }
    }

    pub fn session(&self) -> Option<&TouchSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some_and(|s| s.dragging)
    }

    /// Interception phase: should the panel claim this gesture before its
    /// descendants see it?
    ///
    /// Returns true exactly while the gesture is classified as a vertical
    /// drag. Once a gesture is rejected as horizontal it stays unclaimed.
    pub fn on_intercept(&mut self, surface: &mut dyn DragSurface, event: &TouchEvent) -> bool {
        if matches!(event.action, TouchAction::Up | TouchAction::Cancel) {
            log::trace!("intercept: gesture complete, releasing drag");
            self.end_drag();
            return false;
        }

        // Once classified, the answer no longer changes per event.
        if event.action != TouchAction::Down {
            if let Some(session) = &self.session {
                if session.dragging {
                    return true;
                }
                if session.horizontal_reject {
                    return false;
                }
            }
        }

        match event.action {
            TouchAction::Down => self.intercept_down(surface, event),
            TouchAction::Move => self.classify_move(surface, event, true),
            TouchAction::PointerUp => self.on_pointer_up(event),
            _ => {}
        }

        self.track(event);
        self.session.is_some_and(|s| s.dragging)
    }

    /// Handling phase: processes events routed to the panel itself.
    ///
    /// Returns false when the panel refuses the stream (fully open, or an
    /// edge-flagged down that may belong to a descendant).
    pub fn on_touch(&mut self, surface: &mut dyn DragSurface, event: &TouchEvent) -> bool {
        if surface.fully_open() {
            // Once open, internal content handles its own touch.
            return false;
        }
        if event.action == TouchAction::Down && event.edge_flags != 0 {
            return false;
        }

        self.track(event);

        match event.action {
            TouchAction::Down => {
                self.record_down(event);
                surface.abort_settle();
            }
            TouchAction::Move => self.classify_move(surface, event, false),
            TouchAction::Up => {
                self.finish_drag(surface, event);
                self.end_drag();
            }
            TouchAction::Cancel => {
                if self.is_dragging() {
                    surface.settle(surface.is_open(), 0.0, event.time_ms);
                }
                self.end_drag();
            }
            TouchAction::PointerDown => self.on_pointer_down(event),
            TouchAction::PointerUp => self.on_pointer_up(event),
        }

        true
    }

    /// Down seen during interception: fresh session, and a chance to catch
    /// a settle animation mid-flight.
    fn intercept_down(&mut self, surface: &mut dyn DragSurface, event: &TouchEvent) {
        let Some(primary) = event.primary() else {
            return;
        };
        let mut session = TouchSession {
            active_pointer: primary.id,
            initial_x: primary.x,
            initial_y: primary.y,
            last_x: primary.x,
            last_y: primary.y,
            dragging: false,
            horizontal_reject: false,
        };
        if surface.catch_if_settling(event.time_ms) {
            log::debug!("down caught settle animation, dragging from current offset");
            session.dragging = true;
            surface.disallow_parent_intercept(true);
        }
        self.session = Some(session);
    }

    /// Down seen in the handling phase. The interception pass of the same
    /// event may already have recorded a session; keep its classification
    /// and only refresh the anchor.
    fn record_down(&mut self, event: &TouchEvent) {
        let Some(primary) = event.primary() else {
            return;
        };
        match self.session.as_mut() {
            Some(session) => {
                session.active_pointer = primary.id;
                session.initial_x = primary.x;
                session.initial_y = primary.y;
                session.last_x = primary.x;
                session.last_y = primary.y;
            }
            None => {
                self.session = Some(TouchSession {
                    active_pointer: primary.id,
                    initial_x: primary.x,
                    initial_y: primary.y,
                    last_x: primary.x,
                    last_y: primary.y,
                    dragging: false,
                    horizontal_reject: false,
                });
            }
        }
    }

    fn classify_move(
        &mut self,
        surface: &mut dyn DragSurface,
        event: &TouchEvent,
        intercepting: bool,
    ) {
        let slop = self.config.touch_slop;
        let Some(session) = self.session.as_mut() else {
            // The down never reached us; nothing to classify.
            return;
        };
        if !intercepting && session.horizontal_reject {
            return;
        }
        let Some(index) = event.find_pointer_index(session.active_pointer) else {
            // Stale pointer id, ignore.
            return;
        };
        let sample = event.pointers[index];
        let x_diff = (sample.x - session.initial_x).abs();
        let y_diff = (sample.y - session.initial_y).abs();

        if !session.dragging {
            if y_diff > slop && y_diff * 0.5 > x_diff {
                log::debug!("vertical drag started, dy={y_diff} dx={x_diff}");
                session.dragging = true;
                surface.disallow_parent_intercept(true);
                surface.begin_drag();
                // Anchor one slop-width past the initial point so the first
                // drag frame does not jump by the slop distance.
                session.last_x = if sample.x > session.initial_x {
                    session.initial_x + slop
                } else {
                    session.initial_x - slop
                };
                session.last_y = if sample.y > session.initial_y {
                    session.initial_y + slop
                } else {
                    session.initial_y - slop
                };
            } else if x_diff > slop {
                // Horizontal wins; leave the gesture to scrolling children
                // for the rest of this session.
                log::debug!("horizontal motion, gesture rejected, dx={x_diff}");
                session.horizontal_reject = true;
            }
        }

        // Not `else`: the same move that crossed the slop also drags.
        if session.dragging {
            let delta = session.last_y - sample.y;
            session.last_x = sample.x;
            session.last_y = sample.y;
            let residual = surface.drag_by(delta);
            session.last_y += residual;
        }
    }

    /// Up while dragging: pick the resting position and hand off.
    fn finish_drag(&mut self, surface: &mut dyn DragSurface, event: &TouchEvent) {
        let Some(session) = self.session else {
            return;
        };
        if !session.dragging {
            return;
        }
        let velocity = self
            .velocity
            .velocity_capped(self.config.max_fling_velocity);
        match event.find_pointer_index(session.active_pointer) {
            Some(index) => {
                let total_delta = event.pointers[index].y - session.initial_y;
                let to_open = self.decide_open(surface, velocity, total_delta);
                log::debug!(
                    "drag released, velocity={velocity} delta={total_delta} to_open={to_open}"
                );
                surface.settle(to_open, velocity, event.time_ms);
            }
            None => {
                // The up does not carry our pointer; treat like a cancel so
                // the panel is never left mid-drag.
                surface.settle(surface.is_open(), 0.0, event.time_ms);
            }
        }
    }

    /// Open/close verdict at release.
    ///
    /// A genuine fling (far enough, fast enough) follows the velocity
    /// direction; negative velocity moves toward open. Anything else falls
    /// back to position: past 70% of the height closes an open panel, past
    /// 30% opens a closed one.
    fn decide_open(&self, surface: &dyn DragSurface, velocity: f32, total_delta: f32) -> bool {
        if total_delta.abs() > self.config.fling_distance
            && velocity.abs() > self.config.min_fling_velocity
        {
            velocity < 0.0
        } else {
            let threshold = if surface.is_open() {
                surface.extent() * 0.7
            } else {
                surface.extent() * 0.3
            };
            surface.scroll_offset() > threshold
        }
    }

    /// A secondary pointer landed; it becomes the active pointer.
    fn on_pointer_down(&mut self, event: &TouchEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(sample) = event.action_pointer() else {
            return;
        };
        session.last_x = sample.x;
        session.last_y = sample.y;
        session.active_pointer = sample.id;
    }

    /// A secondary pointer lifted. If it was the active one, re-anchor to
    /// the remaining pointer and restart velocity accumulation.
    fn on_pointer_up(&mut self, event: &TouchEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(sample) = event.action_pointer() else {
            return;
        };
        if sample.id != session.active_pointer {
            return;
        }
        let new_index = if event.action_index == 0 { 1 } else { 0 };
        let Some(replacement) = event.pointer(new_index) else {
            return;
        };
        session.last_x = replacement.x;
        session.last_y = replacement.y;
        session.active_pointer = replacement.id;
        self.velocity.reset();
    }

    /// Feeds the active pointer's position into the velocity tracker.
    fn track(&mut self, event: &TouchEvent) {
        let sample = match &self.session {
            Some(session) => event
                .find_pointer_index(session.active_pointer)
                .and_then(|index| event.pointer(index)),
            None => event.primary(),
        };
        if let Some(sample) = sample {
            self.velocity.add_sample(event.time_ms, sample.y);
        }
    }

    fn end_drag(&mut self) {
        self.session = None;
        self.velocity.reset();
    }
}

#[cfg(test)]
#[path = "tests/classifier_tests.rs"]
mod tests;
