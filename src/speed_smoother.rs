/// Centered moving average over the derived speed field, to suppress GPS
/// noise before display and interpolation.
use crate::telemetry::TelemetryPoint;

pub const DEFAULT_SPEED_WINDOW: usize = 5;

/// Smooth speeds with a centered moving average of `window_size` (odd,
/// typically 5).
///
/// Every average is computed against one snapshot of the original speeds,
/// never against already-smoothed neighbors. Points within half a window of
/// either end keep their original speed - no edge extrapolation. Sequences
/// shorter than the window are returned unchanged. All other fields are
/// untouched.
pub fn smooth_speeds(points: &[TelemetryPoint], window_size: usize) -> Vec<TelemetryPoint> {
    let mut smoothed: Vec<TelemetryPoint> = points.to_vec();

    if points.len() < window_size || window_size == 0 {
        return smoothed;
    }

    let half = window_size / 2;
    let original: Vec<f64> = points.iter().map(|p| p.speed).collect();

    for i in half..points.len() - half {
        let sum: f64 = original[i - half..=i + half].iter().sum();
        smoothed[i].speed = sum / window_size as f64;
    }

    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn point_with_speed(index: usize, speed: f64) -> TelemetryPoint {
        TelemetryPoint {
            index,
            lat: 45.0,
            lon: 7.0,
            elevation: None,
            time: Utc.timestamp_opt(1_700_000_000 + index as i64, 0).unwrap(),
            speed,
            distance: index as f64 * 10.0,
            slope: 0.0,
            elapsed: index as f64,
            bearing: 0.0,
            heart_rate: None,
            cadence: None,
            power: None,
            temperature: None,
        }
    }

    fn speeds(points: &[TelemetryPoint]) -> Vec<f64> {
        points.iter().map(|p| p.speed).collect()
    }

    #[test]
    fn test_sequence_shorter_than_window_is_unchanged() {
        let points: Vec<_> = (0..4).map(|i| point_with_speed(i, i as f64)).collect();
        let result = smooth_speeds(&points, 5);
        assert_eq!(speeds(&result), speeds(&points));
    }

    #[test]
    fn test_boundary_points_keep_original_speed() {
        let points: Vec<_> = (0..7)
            .map(|i| point_with_speed(i, (i * i) as f64))
            .collect();
        let result = smooth_speeds(&points, 5);
        assert_eq!(result[0].speed, points[0].speed);
        assert_eq!(result[1].speed, points[1].speed);
        assert_eq!(result[5].speed, points[5].speed);
        assert_eq!(result[6].speed, points[6].speed);
    }

    #[test]
    fn test_interior_points_average_pre_smoothing_window() {
        let raw = [10.0, 0.0, 20.0, 0.0, 30.0, 0.0, 40.0];
        let points: Vec<_> = raw
            .iter()
            .enumerate()
            .map(|(i, &s)| point_with_speed(i, s))
            .collect();
        let result = smooth_speeds(&points, 5);
        // Each interior mean uses the ORIGINAL values, not cascaded output.
        assert_eq!(result[2].speed, (10.0 + 0.0 + 20.0 + 0.0 + 30.0) / 5.0);
        assert_eq!(result[3].speed, (0.0 + 20.0 + 0.0 + 30.0 + 0.0) / 5.0);
        assert_eq!(result[4].speed, (20.0 + 0.0 + 30.0 + 0.0 + 40.0) / 5.0);
    }

    #[test]
    fn test_other_fields_untouched() {
        let points: Vec<_> = (0..9).map(|i| point_with_speed(i, i as f64)).collect();
        let result = smooth_speeds(&points, 5);
        for (before, after) in points.iter().zip(result.iter()) {
            assert_eq!(before.distance, after.distance);
            assert_eq!(before.elapsed, after.elapsed);
            assert_eq!(before.bearing, after.bearing);
            assert_eq!(before.time, after.time);
        }
    }

    #[test]
    fn test_constant_speed_is_fixed_point() {
        let points: Vec<_> = (0..10).map(|i| point_with_speed(i, 3.5)).collect();
        let result = smooth_speeds(&points, 5);
        assert!(result.iter().all(|p| (p.speed - 3.5).abs() < 1e-12));
    }
}
