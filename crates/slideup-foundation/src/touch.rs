//! Touch event stream types.
//!
//! A [`TouchEvent`] is a snapshot of every pointer currently on the surface,
//! plus the action that produced the snapshot. Secondary pointers arrive and
//! leave through `PointerDown`/`PointerUp` with [`TouchEvent::action_index`]
//! naming the pointer concerned, mirroring the platform's motion-event
//! shape.

use smallvec::SmallVec;

pub type PointerId = u64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub id: PointerId,
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    pub fn new(id: PointerId, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchAction {
    /// First pointer went down; starts a gesture.
    Down,
    Move,
    /// Last pointer went up; ends the gesture.
    Up,
    Cancel,
    /// An additional pointer went down.
    PointerDown,
    /// A non-last pointer went up.
    PointerUp,
}

#[derive(Clone, Debug)]
pub struct TouchEvent {
    pub action: TouchAction,
    /// Index into [`pointers`](Self::pointers) of the pointer that produced a
    /// `PointerDown`/`PointerUp`; 0 for the other actions.
    pub action_index: usize,
    pub pointers: SmallVec<[PointerSample; 2]>,
    /// Nonzero when the down landed on a display edge; edge touches may
    /// belong to a descendant and are not handled immediately.
    pub edge_flags: u8,
    /// Event timestamp in milliseconds, used for velocity tracking and as
    /// "now" for settle animations started from this event.
    pub time_ms: i64,
}

impl TouchEvent {
    pub fn down(id: PointerId, x: f32, y: f32, time_ms: i64) -> Self {
        Self::new(TouchAction::Down, 0, [PointerSample::new(id, x, y)], time_ms)
    }

    pub fn moved(
        pointers: impl IntoIterator<Item = PointerSample>,
        time_ms: i64,
    ) -> Self {
        Self::new(TouchAction::Move, 0, pointers, time_ms)
    }

    pub fn up(pointers: impl IntoIterator<Item = PointerSample>, time_ms: i64) -> Self {
        Self::new(TouchAction::Up, 0, pointers, time_ms)
    }

    pub fn cancel(pointers: impl IntoIterator<Item = PointerSample>, time_ms: i64) -> Self {
        Self::new(TouchAction::Cancel, 0, pointers, time_ms)
    }

    pub fn pointer_down(
        pointers: impl IntoIterator<Item = PointerSample>,
        action_index: usize,
        time_ms: i64,
    ) -> Self {
        Self::new(TouchAction::PointerDown, action_index, pointers, time_ms)
    }

    pub fn pointer_up(
        pointers: impl IntoIterator<Item = PointerSample>,
        action_index: usize,
        time_ms: i64,
    ) -> Self {
        Self::new(TouchAction::PointerUp, action_index, pointers, time_ms)
    }

    fn new(
        action: TouchAction,
        action_index: usize,
        pointers: impl IntoIterator<Item = PointerSample>,
        time_ms: i64,
    ) -> Self {
        Self {
            action,
            action_index,
            pointers: pointers.into_iter().collect(),
            edge_flags: 0,
            time_ms,
        }
    }

    pub fn with_edge_flags(mut self, edge_flags: u8) -> Self {
        self.edge_flags = edge_flags;
        self
    }

    /// The pointer that triggered this event, for indexed actions.
    pub fn action_pointer(&self) -> Option<&PointerSample> {
        self.pointers.get(self.action_index)
    }

    /// Index-0 pointer; `Down` always refers to it.
    pub fn primary(&self) -> Option<&PointerSample> {
        self.pointers.first()
    }

    pub fn find_pointer_index(&self, id: PointerId) -> Option<usize> {
        self.pointers.iter().position(|sample| sample.id == id)
    }

    pub fn pointer(&self, index: usize) -> Option<&PointerSample> {
        self.pointers.get(index)
    }
}
