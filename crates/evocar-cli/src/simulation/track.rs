use std::f64::consts::TAU;

use crate::config::TrackConfig;

/// Steps used to march a sensor ray across its range.
const RAY_STEPS: u32 = 50;

/// A sine-shaped lane running along the x axis from `x = 0` to the finish line.
///
/// The lane has no end wall: past the finish line it continues, so sensors keep working
/// for the last few meters. Driving back past `x = 0` counts as leaving the lane.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    config: TrackConfig,
}

impl Track {
    pub fn new(config: TrackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn length(&self) -> f64 {
        self.config.length
    }

    pub fn centre_y(&self, x: f64) -> f64 {
        self.config.amplitude * (TAU * x / self.config.wavelength).sin()
    }

    /// Direction of the lane centre at `x`, in radians.
    pub fn centre_heading(&self, x: f64) -> f64 {
        let slope = self.config.amplitude * TAU / self.config.wavelength
            * (TAU * x / self.config.wavelength).cos();
        slope.atan()
    }

    pub fn is_on_lane(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && (y - self.centre_y(x)).abs() <= self.config.half_width
    }

    /// Index of the last checkpoint at or before `x`; the start line is checkpoint 0.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn checkpoint_index(&self, x: f64) -> u32 {
        (x.max(0.0) / self.config.checkpoint_spacing).floor() as u32
    }

    /// Fraction of the track covered when reaching `x`, in `[0, 1]`.
    pub fn completion(&self, x: f64) -> f64 {
        (x / self.config.length).clamp(0.0, 1.0)
    }

    /// Distance from `(x, y)` to the lane edge along `heading`, capped at `range`.
    pub fn ray_distance(&self, x: f64, y: f64, heading: f64, range: f64) -> f64 {
        let (sin, cos) = heading.sin_cos();
        let step = range / f64::from(RAY_STEPS);
        for i in 1..=RAY_STEPS {
            let distance = step * f64::from(i);
            if !self.is_on_lane(x + cos * distance, y + sin * distance) {
                return distance - step;
            }
        }
        range
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    fn straight() -> Track {
        Track::new(TrackConfig {
            amplitude: 0.0,
            ..TrackConfig::default()
        })
    }

    #[test]
    fn test_centre_line() {
        let track = Track::new(TrackConfig::default());
        assert_eq!(track.centre_y(0.0), 0.0);
        assert!((track.centre_y(20.0) - 10.0).abs() < 1e-9);
        assert!((track.centre_y(60.0) + 10.0).abs() < 1e-9);
        assert!(track.centre_heading(0.0) > 0.0);
        assert!(track.centre_heading(20.0).abs() < 1e-9);
    }

    #[test]
    fn test_lane_bounds() {
        let track = straight();
        assert!(track.is_on_lane(0.0, 0.0));
        assert!(track.is_on_lane(10.0, 4.0));
        assert!(!track.is_on_lane(10.0, 4.1));
        assert!(!track.is_on_lane(-0.1, 0.0));
        assert!(track.is_on_lane(500.0, 0.0));
    }

    #[test]
    fn test_checkpoints_and_completion() {
        let track = straight();
        assert_eq!(track.checkpoint_index(0.0), 0);
        assert_eq!(track.checkpoint_index(9.9), 0);
        assert_eq!(track.checkpoint_index(10.0), 1);
        assert_eq!(track.checkpoint_index(-5.0), 0);
        assert_eq!(track.completion(50.0), 0.25);
        assert_eq!(track.completion(-1.0), 0.0);
        assert_eq!(track.completion(250.0), 1.0);
    }

    #[test]
    fn test_ray_distance() {
        let track = straight();
        // sideways from the centre the edge is half_width away
        let left = track.ray_distance(10.0, 0.0, FRAC_PI_2, 10.0);
        assert!((left - 4.0).abs() <= 0.2, "{left}");
        let right = track.ray_distance(10.0, 0.0, -FRAC_PI_2, 10.0);
        assert!((right - 4.0).abs() <= 0.2, "{right}");
        // straight ahead is open up to the sensor range
        assert_eq!(track.ray_distance(10.0, 0.0, 0.0, 10.0), 10.0);
        // backwards over the start line
        let back = track.ray_distance(2.0, 0.0, std::f64::consts::PI, 10.0);
        assert!((back - 2.0).abs() <= 0.2, "{back}");
    }
}
