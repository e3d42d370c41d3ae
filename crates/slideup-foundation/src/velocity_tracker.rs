//! Fling velocity estimation for the vertical drag axis.
//!
//! Impulse-strategy 1D tracker: velocity is recovered from the kinetic
//! energy the recent samples would have imparted, which is far more robust
//! against jittery release frames than a two-point difference. Samples are
//! position snapshots of the active pointer; the classifier resets the
//! tracker whenever the active pointer changes.

use smallvec::SmallVec;

/// Ring capacity; ~a third of a second of samples at touch sample rates.
const CAPACITY: usize = 20;

/// Samples older than this (relative to the newest) are ignored.
const HORIZON_MS: i64 = 100;

/// A gap this long between consecutive samples means the pointer stopped;
/// older history must not contribute to the release velocity.
const ASSUME_STOPPED_MS: i64 = 40;

#[derive(Clone, Copy)]
struct Sample {
    time_ms: i64,
    position: f32,
}

#[derive(Clone, Default)]
pub struct VelocityTracker {
    samples: [Option<Sample>; CAPACITY],
    head: usize,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the active pointer's position at `time_ms`.
    pub fn add_sample(&mut self, time_ms: i64, position: f32) {
        self.head = (self.head + 1) % CAPACITY;
        self.samples[self.head] = Some(Sample { time_ms, position });
    }

    /// Drops all history. Called when tracking re-anchors to another pointer.
    pub fn reset(&mut self) {
        self.samples = [None; CAPACITY];
        self.head = 0;
    }

    /// Velocity in pixels/second over the recent sample window.
    ///
    /// Returns 0.0 with fewer than two usable samples or after a
    /// pointer-stopped gap.
    pub fn velocity(&self) -> f32 {
        let newest = match self.samples[self.head] {
            Some(sample) => sample,
            None => return 0.0,
        };

        // Newest-first sweep of the ring; `times` hold negative ages so the
        // impulse accumulation below works in a single time base.
        let mut positions: SmallVec<[f32; CAPACITY]> = SmallVec::new();
        let mut times: SmallVec<[f32; CAPACITY]> = SmallVec::new();

        let mut index = self.head;
        let mut newer_time = newest.time_ms;
        while let Some(sample) = self.samples[index] {
            let age = newest.time_ms - sample.time_ms;
            let gap = newer_time - sample.time_ms;
            if age > HORIZON_MS || gap > ASSUME_STOPPED_MS {
                break;
            }
            newer_time = sample.time_ms;

            positions.push(sample.position);
            times.push(-(age as f32));

            index = if index == 0 { CAPACITY - 1 } else { index - 1 };
            if positions.len() >= CAPACITY {
                break;
            }
        }

        if positions.len() < 2 {
            return 0.0;
        }

        impulse_velocity(&positions, &times) * 1000.0
    }

    /// Velocity in pixels/second, clamped to `±max`.
    pub fn velocity_capped(&self, max: f32) -> f32 {
        if !max.is_finite() || max <= 0.0 {
            return 0.0;
        }
        let velocity = self.velocity();
        if velocity == 0.0 || velocity.is_nan() {
            return 0.0;
        }
        velocity.clamp(-max, max)
    }
}

/// Impulse accumulation over newest-first samples; result is units/ms.
fn impulse_velocity(positions: &[f32], times: &[f32]) -> f32 {
    let count = positions.len();
    if count < 2 {
        return 0.0;
    }

    let mut work = 0.0f32;
    let oldest = count - 1;
    let mut next_time = times[oldest];

    for i in (1..=oldest).rev() {
        let current_time = next_time;
        next_time = times[i - 1];
        if current_time == next_time {
            continue;
        }
        let segment_delta = positions[i - 1] - positions[i];
        let v_segment = segment_delta / (next_time - current_time);
        let v_so_far = kinetic_energy_to_velocity(work);
        work += (v_segment - v_so_far) * v_segment.abs();
        if i == oldest {
            work *= 0.5;
        }
    }

    kinetic_energy_to_velocity(work)
}

/// E = v²/2 with unit mass, sign carried through.
#[inline]
fn kinetic_energy_to_velocity(energy: f32) -> f32 {
    energy.signum() * (2.0 * energy.abs()).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tracker_reports_zero() {
        assert_eq!(VelocityTracker::new().velocity(), 0.0);
    }

    #[test]
    fn single_sample_reports_zero() {
        let mut tracker = VelocityTracker::new();
        tracker.add_sample(0, 100.0);
        assert_eq!(tracker.velocity(), 0.0);
    }

    #[test]
    fn constant_velocity_recovered() {
        let mut tracker = VelocityTracker::new();
        // 100 px per 10 ms = 10_000 px/s.
        tracker.add_sample(0, 0.0);
        tracker.add_sample(10, 100.0);
        tracker.add_sample(20, 200.0);
        tracker.add_sample(30, 300.0);

        let velocity = tracker.velocity();
        assert!(
            (velocity - 10_000.0).abs() < 1_000.0,
            "expected ~10000, got {velocity}"
        );
    }

    #[test]
    fn upward_drag_is_negative() {
        let mut tracker = VelocityTracker::new();
        tracker.add_sample(0, 300.0);
        tracker.add_sample(10, 200.0);
        tracker.add_sample(20, 100.0);
        assert!(tracker.velocity() < 0.0);
    }

    #[test]
    fn capped_in_both_directions() {
        let mut tracker = VelocityTracker::new();
        tracker.add_sample(0, 0.0);
        tracker.add_sample(1, 10_000.0);
        assert_eq!(tracker.velocity_capped(8_000.0), 8_000.0);

        tracker.reset();
        tracker.add_sample(0, 10_000.0);
        tracker.add_sample(1, 0.0);
        assert_eq!(tracker.velocity_capped(8_000.0), -8_000.0);
    }

    #[test]
    fn reset_clears_history() {
        let mut tracker = VelocityTracker::new();
        tracker.add_sample(0, 0.0);
        tracker.add_sample(10, 100.0);
        tracker.reset();
        assert_eq!(tracker.velocity(), 0.0);
    }

    #[test]
    fn stopped_gap_discards_older_history() {
        let mut tracker = VelocityTracker::new();
        tracker.add_sample(0, 0.0);
        tracker.add_sample(ASSUME_STOPPED_MS + 1, 100.0);
        assert_eq!(tracker.velocity(), 0.0);
    }

    #[test]
    fn samples_beyond_horizon_ignored() {
        let mut tracker = VelocityTracker::new();
        tracker.add_sample(0, 0.0);
        tracker.add_sample(150, 100.0);
        tracker.add_sample(160, 200.0);
        tracker.add_sample(170, 300.0);
        assert!(tracker.velocity().abs() > 0.0);
    }
}
