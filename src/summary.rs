/// Summary statistics over a telemetry sequence, recomputed on demand in a
/// single forward pass.
use crate::telemetry::{TelemetryPoint, TelemetrySummary};
use crate::telemetry_calculator::haversine_distance_m;

/// Speeds at or below this are treated as standing still and excluded from
/// the moving average.
const MOVING_SPEED_THRESHOLD_MS: f64 = 0.5;

/// Calculate summary statistics for a set of telemetry points.
///
/// An empty sequence yields the zeroed summary - the "no data" state is not
/// an error. Total distance is recomputed from the positions rather than
/// read off the last cumulative `distance`, so a sliced sequence reports the
/// length of its own path without drift from the full track.
pub fn calculate_summary(points: &[TelemetryPoint]) -> TelemetrySummary {
    if points.is_empty() {
        return TelemetrySummary::empty();
    }

    let total_distance = points
        .windows(2)
        .map(|w| haversine_distance_m(w[0].lat, w[0].lon, w[1].lat, w[1].lon))
        .sum();

    let total_duration = points.last().unwrap().elapsed;

    let mut max_speed = 0.0f64;
    let mut speed_sum = 0.0;
    let mut moving_count = 0usize;
    let mut max_elevation: Option<f64> = None;
    let mut min_elevation: Option<f64> = None;
    let mut elevation_gain = 0.0;
    let mut elevation_loss = 0.0;

    for (i, p) in points.iter().enumerate() {
        if p.speed > max_speed {
            max_speed = p.speed;
        }

        if p.speed > MOVING_SPEED_THRESHOLD_MS {
            speed_sum += p.speed;
            moving_count += 1;
        }

        if let Some(elevation) = p.elevation {
            max_elevation = Some(max_elevation.map_or(elevation, |m: f64| m.max(elevation)));
            min_elevation = Some(min_elevation.map_or(elevation, |m: f64| m.min(elevation)));

            if i > 0 {
                if let Some(prev_elevation) = points[i - 1].elevation {
                    let diff = elevation - prev_elevation;
                    if diff > 0.0 {
                        elevation_gain += diff;
                    } else {
                        elevation_loss += -diff;
                    }
                }
            }
        }
    }

    TelemetrySummary {
        total_distance,
        total_duration,
        max_speed,
        avg_speed: if moving_count > 0 {
            speed_sum / moving_count as f64
        } else {
            0.0
        },
        max_elevation,
        min_elevation,
        elevation_gain,
        elevation_loss,
        point_count: points.len(),
    }
}
