use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Callback invoked with the frame time in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(i64)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameCallbackId(u64);

/// Host-provided "run on next animation frame" primitive.
///
/// The widget posts one callback per frame it wants to drive and cancels
/// whatever is still pending on teardown. Implementations are expected to be
/// single-threaded; `&self` methods use interior mutability.
pub trait FrameScheduler {
    /// Current animation time in milliseconds.
    fn now_ms(&self) -> i64;

    /// Schedules `callback` to run on the next frame.
    fn post_frame_callback(&self, callback: FrameCallback) -> FrameCallbackId;

    /// Removes a pending callback. Unknown ids are ignored.
    fn cancel_frame_callback(&self, id: FrameCallbackId);
}

/// Keeps a posted frame callback alive; cancels it when dropped.
pub struct FrameCallbackRegistration {
    scheduler: Rc<dyn FrameScheduler>,
    id: Option<FrameCallbackId>,
}

impl FrameCallbackRegistration {
    pub fn new(scheduler: Rc<dyn FrameScheduler>, id: FrameCallbackId) -> Self {
        Self {
            scheduler,
            id: Some(id),
        }
    }

    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.scheduler.cancel_frame_callback(id);
        }
    }
}

impl Drop for FrameCallbackRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.scheduler.cancel_frame_callback(id);
        }
    }
}

/// Deterministic scheduler for tests and headless demos.
///
/// Time only moves when the caller advances it. Callbacks posted while a
/// frame is running land on the following frame, matching the
/// post-on-animation contract of a real display surface.
pub struct ManualFrameClock {
    now: Cell<i64>,
    next_id: Cell<u64>,
    callbacks: RefCell<FxHashMap<u64, FrameCallback>>,
    order: RefCell<Vec<u64>>,
}

impl ManualFrameClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(0),
            next_id: Cell::new(1),
            callbacks: RefCell::new(FxHashMap::default()),
            order: RefCell::new(Vec::new()),
        }
    }

    /// Advances the clock by `delta_ms` and runs every callback that was
    /// pending before this frame started.
    pub fn advance_frame(&self, delta_ms: i64) {
        self.now.set(self.now.get() + delta_ms);
        let due: Vec<u64> = self.order.borrow_mut().drain(..).collect();
        for id in due {
            // A callback may have been cancelled after it was queued.
            let callback = self.callbacks.borrow_mut().remove(&id);
            if let Some(callback) = callback {
                callback(self.now.get());
            }
        }
    }

    /// Runs frames of `frame_ms` until nothing is pending or `max_frames`
    /// is reached. Returns the number of frames run.
    pub fn run_until_idle(&self, frame_ms: i64, max_frames: usize) -> usize {
        let mut frames = 0;
        while self.pending_callbacks() > 0 && frames < max_frames {
            self.advance_frame(frame_ms);
            frames += 1;
        }
        frames
    }

    pub fn pending_callbacks(&self) -> usize {
        self.callbacks.borrow().len()
    }
}

impl Default for ManualFrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for ManualFrameClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }

    fn post_frame_callback(&self, callback: FrameCallback) -> FrameCallbackId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.callbacks.borrow_mut().insert(id, callback);
        self.order.borrow_mut().push(id);
        FrameCallbackId(id)
    }

    fn cancel_frame_callback(&self, id: FrameCallbackId) {
        self.callbacks.borrow_mut().remove(&id.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn callbacks_run_with_frame_time() {
        let clock = ManualFrameClock::new();
        let seen = Rc::new(Cell::new(0i64));
        let seen_in_cb = Rc::clone(&seen);
        clock.post_frame_callback(Box::new(move |now| seen_in_cb.set(now)));
        clock.advance_frame(16);
        assert_eq!(seen.get(), 16);
        assert_eq!(clock.pending_callbacks(), 0);
    }

    #[test]
    fn cancelled_callback_does_not_run() {
        let clock = ManualFrameClock::new();
        let ran = Rc::new(Cell::new(false));
        let ran_in_cb = Rc::clone(&ran);
        let id = clock.post_frame_callback(Box::new(move |_| ran_in_cb.set(true)));
        clock.cancel_frame_callback(id);
        clock.advance_frame(16);
        assert!(!ran.get());
    }

    #[test]
    fn callback_posted_during_frame_runs_next_frame() {
        let clock = Rc::new(ManualFrameClock::new());
        let times = Rc::new(RefCell::new(Vec::new()));

        let clock_in_cb = Rc::clone(&clock);
        let times_in_cb = Rc::clone(&times);
        clock.post_frame_callback(Box::new(move |now| {
            times_in_cb.borrow_mut().push(now);
            let times_inner = Rc::clone(&times_in_cb);
            clock_in_cb.post_frame_callback(Box::new(move |now| {
                times_inner.borrow_mut().push(now);
            }));
        }));

        clock.advance_frame(16);
        assert_eq!(*times.borrow(), vec![16]);
        clock.advance_frame(16);
        assert_eq!(*times.borrow(), vec![16, 32]);
    }

    #[test]
    fn registration_drop_cancels() {
        let clock: Rc<ManualFrameClock> = Rc::new(ManualFrameClock::new());
        let ran = Rc::new(Cell::new(false));
        let ran_in_cb = Rc::clone(&ran);
        let id = clock.post_frame_callback(Box::new(move |_| ran_in_cb.set(true)));
        let scheduler: Rc<dyn FrameScheduler> = clock.clone();
        let registration = FrameCallbackRegistration::new(scheduler, id);
        drop(registration);
        clock.advance_frame(16);
        assert!(!ran.get());
    }
}
