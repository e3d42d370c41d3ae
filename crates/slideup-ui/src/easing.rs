//! Easing curves for the settle animation.

use std::f32::consts::PI;

/// Position-vs-time profile applied by the [`Scroller`](crate::Scroller).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Decelerating bounce: the panel lands on its resting position and
    /// rebounds a few shrinking times, the ballistic curve the platform
    /// scroll physics supplies.
    #[default]
    Bounce,
}

impl Easing {
    /// Maps a linear fraction in `[0, 1]` onto the curve.
    pub fn transform(&self, fraction: f32) -> f32 {
        match self {
            Easing::Linear => fraction,
            Easing::Bounce => bounce(fraction),
        }
    }
}

fn bounce_segment(t: f32) -> f32 {
    t * t * 8.0
}

fn bounce(fraction: f32) -> f32 {
    // Piecewise parabolas; the 1.1226 stretch makes the last bounce end
    // exactly at 1.0.
    let t = fraction * 1.1226;
    if t < 0.3535 {
        bounce_segment(t)
    } else if t < 0.7408 {
        bounce_segment(t - 0.547_19) + 0.7
    } else if t < 0.9644 {
        bounce_segment(t - 0.8526) + 0.9
    } else {
        bounce_segment(t - 1.0435) + 0.95
    }
}

/// Moderates how travel distance influences settle duration.
///
/// The input is `min(1, |dy| / height)`; the output biases the
/// pseudo-distance used for the duration so short and long settles do not
/// scale purely linearly.
pub fn distance_influence_for_settle_duration(fraction: f32) -> f32 {
    let centered = fraction - 0.5;
    (centered * 0.3 * PI / 2.0).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounce_starts_at_zero_and_ends_at_one() {
        assert!(Easing::Bounce.transform(0.0).abs() < 1e-3);
        assert!((Easing::Bounce.transform(1.0) - 1.0).abs() < 1e-2);
    }

    #[test]
    fn linear_is_identity() {
        assert_eq!(Easing::Linear.transform(0.25), 0.25);
        assert_eq!(Easing::Linear.transform(1.0), 1.0);
    }

    #[test]
    fn distance_influence_is_odd_around_half() {
        let low = distance_influence_for_settle_duration(0.0);
        let high = distance_influence_for_settle_duration(1.0);
        assert!((low + high).abs() < 1e-6);
        assert!(distance_influence_for_settle_duration(0.5).abs() < 1e-6);
    }
}
