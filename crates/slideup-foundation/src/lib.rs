//! Touch input types and gesture classification for the slideup panel.
//!
//! This crate owns everything that happens between a raw touch event and a
//! decision: pointer tracking, slop classification, fling velocity, and the
//! open/close verdict at gesture end. It never owns the scroll offset; the
//! widget side implements [`DragSurface`] and receives deltas and settle
//! requests through it.

pub mod classifier;
pub mod gesture_constants;
pub mod touch;
pub mod velocity_tracker;

pub use classifier::{DragSurface, GestureClassifier, GestureConfig, TouchSession};
pub use touch::{PointerId, PointerSample, TouchAction, TouchEvent};
pub use velocity_tracker::VelocityTracker;
