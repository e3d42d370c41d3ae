//! Core scheduling primitives for the slideup widget.
//!
//! The widget never reads a wall clock: frame times enter through the
//! scheduler so animation code stays deterministic and unit-testable.

mod frame_clock;

pub use frame_clock::{
    FrameCallback, FrameCallbackId, FrameCallbackRegistration, FrameScheduler, ManualFrameClock,
};
