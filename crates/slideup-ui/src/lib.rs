//! Sliding up panel widget.
//!
//! A container hosting a single child view that slides vertically between a
//! closed (hidden) and an opened (fully visible) resting position, driven by
//! touch gestures, fling velocity, or programmatic calls.
//!
//! The split mirrors the layering underneath: `slideup-foundation` classifies
//! the touch stream, [`MotionEngine`] owns the offset/state machine and the
//! settle animation, and [`SlidingUpPanel`] composes both behind the host's
//! view-tree capabilities (measure, layout, handle-input, draw-hook).

pub mod easing;
pub mod layout;
pub mod motion;
pub mod panel;
pub mod scroller;

pub use layout::{Constraints, Size};
pub use motion::{MotionEngine, PanelState, TickResult};
pub use panel::{PanelContent, PanelError, PanelSavedState, SlidingUpPanel};
pub use scroller::Scroller;
