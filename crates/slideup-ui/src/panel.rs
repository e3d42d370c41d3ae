//! The sliding panel controller.
//!
//! [`SlidingUpPanel`] composes the gesture classifier and the motion engine
//! behind the capability set a host view tree expects: measure, layout,
//! touch interception/handling, a draw-cache hook, and attach/detach. It is
//! a cheap-clone handle; frame callbacks hold weak references so a dropped
//! panel never keeps animating.
//!
//! Listeners are invoked synchronously from whatever call mutated the panel
//! (always the single UI thread). Re-entering the panel handle from inside a
//! listener is not supported.

use crate::layout::{Constraints, Size};
use crate::motion::{MotionEngine, PanelState, TickResult};
use slideup_core::{FrameCallbackRegistration, FrameScheduler};
use slideup_foundation::{DragSurface, GestureClassifier, GestureConfig, TouchEvent};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PanelError {
    /// The panel hosts exactly one child view; configuring more is fatal
    /// and reported at measure/layout time.
    #[error("sliding up panel can only contain one child view")]
    MultipleChildren,
}

/// Capabilities the hosted child must provide.
pub trait PanelContent {
    fn measure(&mut self, constraints: Constraints) -> Size;

    fn layout(&mut self, x: f32, y: f32, size: Size);

    /// Hidden children are skipped by measure/layout, like a gone view.
    fn is_visible(&self) -> bool {
        true
    }

    /// Draw-cache hint: true while the panel is dragging or flinging.
    fn set_cache_enabled(&mut self, _enabled: bool) {}
}

/// The single bit that survives instance recreation.
///
/// After [`SlidingUpPanel::restore_state`] the host must run a layout pass;
/// a restored open panel snaps to the open offset there and resolves to
/// `Opened`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelSavedState {
    pub is_open: bool,
}

struct PanelInner {
    scheduler: Rc<dyn FrameScheduler>,
    classifier: GestureClassifier,
    engine: MotionEngine,
    content: Vec<Box<dyn PanelContent>>,
    content_size: Size,
    attached: bool,
    cache_enabled: bool,
    parent_intercept_request: Option<Rc<dyn Fn(bool)>>,
    drive_frame: Option<FrameCallbackRegistration>,
    end_scroll: Option<FrameCallbackRegistration>,
}

/// Vertically sliding panel container hosting one child view.
#[derive(Clone)]
pub struct SlidingUpPanel {
    inner: Rc<RefCell<PanelInner>>,
}

impl SlidingUpPanel {
    pub fn new(scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self::with_config(scheduler, GestureConfig::default())
    }

    pub fn with_config(scheduler: Rc<dyn FrameScheduler>, config: GestureConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PanelInner {
                scheduler,
                classifier: GestureClassifier::new(config),
                engine: MotionEngine::new(config.min_fling_velocity),
                content: Vec::new(),
                content_size: Size::ZERO,
                attached: true,
                cache_enabled: false,
                parent_intercept_request: None,
                drive_frame: None,
                end_scroll: None,
            })),
        }
    }

    /// Adds a child. More than one is rejected at the next measure/layout.
    pub fn add_content(&self, content: Box<dyn PanelContent>) {
        let mut inner = self.inner.borrow_mut();
        inner.content.push(content);
        let has_content = !inner.content.is_empty();
        inner.engine.set_has_content(has_content);
    }

    pub fn set_on_panel_opened(&self, listener: impl Fn() + 'static) {
        self.inner.borrow_mut().engine.set_on_opened(listener);
    }

    pub fn set_on_panel_closed(&self, listener: impl Fn() + 'static) {
        self.inner.borrow_mut().engine.set_on_closed(listener);
    }

    pub fn set_on_panel_scrolled(&self, listener: impl Fn(f32) + 'static) {
        self.inner.borrow_mut().engine.set_on_scrolled(listener);
    }

    /// Hook through which the panel asks its ancestors to stop intercepting
    /// while a drag is in progress.
    pub fn set_parent_intercept_request(&self, request: impl Fn(bool) + 'static) {
        self.inner.borrow_mut().parent_intercept_request = Some(Rc::new(request));
    }

    pub fn is_open(&self) -> bool {
        self.inner.borrow().engine.is_open()
    }

    pub fn state(&self) -> PanelState {
        self.inner.borrow().engine.state()
    }

    /// Current scroll offset in pixels; 0 = closed.
    pub fn scroll_offset(&self) -> i32 {
        self.inner.borrow().engine.scroll_y()
    }

    pub fn open_panel(&self) {
        {
            let inner = &mut *self.inner.borrow_mut();
            let now = inner.scheduler.now_ms();
            inner.engine.open_panel(now);
        }
        self.after_motion();
    }

    pub fn close_panel(&self) {
        {
            let inner = &mut *self.inner.borrow_mut();
            let now = inner.scheduler.now_ms();
            inner.engine.close_panel(now);
        }
        self.after_motion();
    }

    /// Interception phase of the host's two-phase touch routing: should the
    /// panel claim this gesture before descendants see it?
    pub fn on_intercept_touch_event(&self, event: &TouchEvent) -> bool {
        let intercept = {
            let inner = &mut *self.inner.borrow_mut();
            let mut surface = PanelSurface {
                engine: &mut inner.engine,
                parent_intercept_request: inner.parent_intercept_request.clone(),
            };
            inner.classifier.on_intercept(&mut surface, event)
        };
        self.after_motion();
        intercept
    }

    /// Handling phase: events routed to the panel itself.
    pub fn on_touch_event(&self, event: &TouchEvent) -> bool {
        let handled = {
            let inner = &mut *self.inner.borrow_mut();
            let mut surface = PanelSurface {
                engine: &mut inner.engine,
                parent_intercept_request: inner.parent_intercept_request.clone(),
            };
            inner.classifier.on_touch(&mut surface, event)
        };
        self.after_motion();
        handled
    }

    /// Measures the hosted child within `constraints`.
    pub fn measure(&self, constraints: Constraints) -> Result<Size, PanelError> {
        let inner = &mut *self.inner.borrow_mut();
        if inner.content.len() > 1 {
            return Err(PanelError::MultipleChildren);
        }
        let mut measured = Size::ZERO;
        if let Some(child) = inner.content.first_mut() {
            if child.is_visible() {
                measured = child.measure(constraints);
            }
        }
        inner.content_size = measured;
        Ok(constraints.constrain(measured))
    }

    /// Positions the child and refreshes the panel extent. A panel restored
    /// (or already committed) open snaps to the open offset and re-issues
    /// `open_panel`, which resolves immediately as a degenerate settle.
    pub fn layout(&self) -> Result<(), PanelError> {
        let reopen = {
            let inner = &mut *self.inner.borrow_mut();
            if inner.content.len() > 1 {
                return Err(PanelError::MultipleChildren);
            }
            let mut reopen = false;
            let content_size = inner.content_size;
            if let Some(child) = inner.content.first_mut() {
                if child.is_visible() {
                    child.layout(0.0, 0.0, content_size);
                    let height = content_size.height as i32;
                    inner.engine.set_extent(height);
                    if inner.engine.is_open() {
                        inner.engine.scroll_to(height);
                        inner.engine.restore_open(false);
                        reopen = true;
                    }
                }
            }
            reopen
        };
        if reopen {
            self.open_panel();
        }
        Ok(())
    }

    pub fn save_state(&self) -> PanelSavedState {
        PanelSavedState {
            is_open: self.inner.borrow().engine.is_open(),
        }
    }

    /// Restores the saved open bit. The host must run a layout pass next;
    /// the restore takes effect there.
    pub fn restore_state(&self, state: PanelSavedState) {
        self.inner.borrow_mut().engine.restore_open(state.is_open);
    }

    /// Reattaches the panel to a display surface, resuming an interrupted
    /// settle animation.
    pub fn attach(&self) {
        self.inner.borrow_mut().attached = true;
        self.after_motion();
    }

    /// Detaches from the display surface, cancelling any pending frame
    /// callback so nothing acts on a torn-down widget.
    pub fn detach(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.attached = false;
        inner.drive_frame.take();
        inner.end_scroll.take();
    }

    /// Post-mutation bookkeeping: keep the settle loop scheduled while
    /// flinging and mirror the motion state onto the child's draw cache.
    fn after_motion(&self) {
        Self::ensure_drive(&self.inner);
        Self::sync_cache_hint(&self.inner);
    }

    fn ensure_drive(inner: &Rc<RefCell<PanelInner>>) {
        let mut inner_mut = inner.borrow_mut();
        if !inner_mut.attached
            || inner_mut.drive_frame.is_some()
            || inner_mut.engine.state() != PanelState::Flinging
        {
            return;
        }
        let scheduler = Rc::clone(&inner_mut.scheduler);
        let weak = Rc::downgrade(inner);
        let id = scheduler.post_frame_callback(Box::new(move |now| {
            if let Some(inner) = weak.upgrade() {
                SlidingUpPanel::on_drive_frame(&inner, now);
            }
        }));
        inner_mut.drive_frame = Some(FrameCallbackRegistration::new(scheduler, id));
    }

    fn on_drive_frame(inner: &Rc<RefCell<PanelInner>>, now_ms: i64) {
        let result = {
            let mut inner_mut = inner.borrow_mut();
            inner_mut.drive_frame = None;
            inner_mut.engine.tick(now_ms)
        };
        match result {
            TickResult::Continue => Self::ensure_drive(inner),
            TickResult::Settled => Self::schedule_end_scroll(inner),
            TickResult::Idle => {}
        }
        Self::sync_cache_hint(inner);
    }

    /// Terminal-state dispatch runs on the frame after completion.
    fn schedule_end_scroll(inner: &Rc<RefCell<PanelInner>>) {
        let mut inner_mut = inner.borrow_mut();
        if !inner_mut.attached || inner_mut.end_scroll.is_some() {
            return;
        }
        let scheduler = Rc::clone(&inner_mut.scheduler);
        let weak = Rc::downgrade(inner);
        let id = scheduler.post_frame_callback(Box::new(move |_now| {
            if let Some(inner) = weak.upgrade() {
                {
                    let mut inner_mut = inner.borrow_mut();
                    inner_mut.end_scroll = None;
                    inner_mut.engine.resolve_scroll_end();
                }
                SlidingUpPanel::sync_cache_hint(&inner);
            }
        }));
        inner_mut.end_scroll = Some(FrameCallbackRegistration::new(scheduler, id));
    }

    fn sync_cache_hint(inner: &Rc<RefCell<PanelInner>>) {
        let inner = &mut *inner.borrow_mut();
        let active = matches!(
            inner.engine.state(),
            PanelState::Dragging | PanelState::Flinging
        );
        if active != inner.cache_enabled {
            inner.cache_enabled = active;
            for child in inner.content.iter_mut() {
                child.set_cache_enabled(active);
            }
        }
    }
}

/// Adapter giving the classifier its mutation seam over the engine, plus the
/// route out to the ancestor chain.
struct PanelSurface<'a> {
    engine: &'a mut MotionEngine,
    parent_intercept_request: Option<Rc<dyn Fn(bool)>>,
}

impl DragSurface for PanelSurface<'_> {
    fn is_open(&self) -> bool {
        self.engine.is_open()
    }

    fn fully_open(&self) -> bool {
        self.engine.state() == PanelState::Opened
    }

    fn scroll_offset(&self) -> f32 {
        self.engine.scroll_y() as f32
    }

    fn extent(&self) -> f32 {
        self.engine.extent() as f32
    }

    fn catch_if_settling(&mut self, now_ms: i64) -> bool {
        self.engine.catch_if_settling(now_ms)
    }

    fn abort_settle(&mut self) {
        self.engine.abort_settle();
    }

    fn begin_drag(&mut self) {
        self.engine.begin_drag();
    }

    fn drag_by(&mut self, delta: f32) -> f32 {
        self.engine.drag_by(delta)
    }

    fn settle(&mut self, open: bool, velocity: f32, now_ms: i64) {
        self.engine.settle(open, velocity, now_ms);
    }

    fn disallow_parent_intercept(&mut self, disallow: bool) {
        if let Some(request) = &self.parent_intercept_request {
            request(disallow);
        }
    }
}

#[cfg(test)]
#[path = "tests/panel_tests.rs"]
mod tests;
