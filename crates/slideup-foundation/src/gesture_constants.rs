//! Shared gesture thresholds for the panel's touch handling.
//!
//! Values are in density-independent pixels and follow the platform's
//! standard view configuration; [`GestureConfig`](crate::GestureConfig)
//! scales them by display density at construction time.

/// Paging touch slop in dip.
///
/// A pointer must travel more than this distance from its down position
/// before the gesture is classified at all. The paging slop (double the
/// plain touch slop) is used because the panel competes with scrollable
/// children for vertical motion, and claiming too eagerly makes their
/// content impossible to scroll.
pub const PAGING_TOUCH_SLOP: f32 = 16.0;

/// Minimum fling velocity in dip/second.
///
/// Releases slower than this fall back to the position-threshold rule
/// instead of following the fling direction.
pub const MIN_FLING_VELOCITY: f32 = 400.0;

/// Maximum fling velocity in pixels/second the tracker will report.
///
/// Matches the platform's scaled maximum fling velocity on a baseline
/// density display.
pub const MAX_FLING_VELOCITY: f32 = 8_000.0;

/// Minimum travel distance in dip for a release to count as a fling.
pub const MIN_DISTANCE_FOR_FLING: f32 = 25.0;
