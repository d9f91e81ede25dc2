/// Geodetic point deriver - turns raw timed trackpoints into enriched
/// telemetry points (speed, cumulative distance, slope, continuous bearing,
/// elapsed time).
///
/// Only points with a timestamp participate: untimed points cannot be placed
/// on the time axis and are dropped before derivation. Zero timed points is
/// a normal state and yields an empty sequence.
use geo::{point, HaversineBearing, HaversineDistance};

use crate::telemetry::{GpxTrackPoint, TelemetryPoint};

/// Time deltas below this are treated as unreliable and produce speed 0
/// rather than a spike.
const MIN_TIME_DELTA_S: f64 = 0.5;

/// Great-circle distance in meters between two (lat, lon) positions.
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let a = point!(x: lon1, y: lat1);
    let b = point!(x: lon2, y: lat2);
    a.haversine_distance(&b)
}

/// Initial bearing (forward azimuth) in degrees from the first position to
/// the second, in (-180, 180], 0 = North, clockwise.
pub fn initial_bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let a = point!(x: lon1, y: lat1);
    let b = point!(x: lon2, y: lat2);
    a.haversine_bearing(b)
}

/// Unwrap angle so it is continuous with ref (avoids 360 degree jumps when
/// crossing the +-180 heading).
pub fn unwrap_bearing(angle: f64, reference: f64) -> f64 {
    let mut a = angle;
    while a - reference > 180.0 {
        a -= 360.0;
    }
    while a - reference < -180.0 {
        a += 360.0;
    }
    a
}

/// Derive telemetry for a sequence of raw trackpoints.
///
/// Per point: elapsed seconds since the first timed point, haversine segment
/// distance accumulated into `distance`, speed (suppressed to 0 on sub-0.5s
/// or zero-distance segments), slope percent (0 unless the segment has
/// length and both endpoints carry elevation), and an unwrapped bearing.
/// The first point borrows the bearing towards the second; a single-point
/// track gets bearing 0. Sensor fields pass through unchanged.
pub fn calculate_telemetry(points: &[GpxTrackPoint]) -> Vec<TelemetryPoint> {
    let timed: Vec<&GpxTrackPoint> = points.iter().filter(|p| p.time.is_some()).collect();

    if timed.is_empty() {
        return Vec::new();
    }

    let start_time = timed[0].time.unwrap();

    let mut cumulative_distance = 0.0;
    let mut prev_unwrapped_bearing: Option<f64> = None;

    let mut telemetry = Vec::with_capacity(timed.len());
    for (i, current) in timed.iter().enumerate() {
        let current_time = current.time.unwrap();

        let mut speed = 0.0;
        let mut slope = 0.0;
        let mut bearing = 0.0;

        if i > 0 {
            let prev = timed[i - 1];
            bearing = initial_bearing_deg(prev.lat, prev.lon, current.lat, current.lon);

            let segment_distance =
                haversine_distance_m(prev.lat, prev.lon, current.lat, current.lon);
            cumulative_distance += segment_distance;

            let time_delta = (current_time - prev.time.unwrap()).num_milliseconds() as f64 / 1000.0;
            if time_delta >= MIN_TIME_DELTA_S && segment_distance > 0.0 {
                speed = segment_distance / time_delta;
            }

            if segment_distance > 0.0 {
                if let (Some(cur_ele), Some(prev_ele)) = (current.elevation, prev.elevation) {
                    slope = (cur_ele - prev_ele) / segment_distance * 100.0;
                }
            }
        } else if timed.len() > 1 {
            let next = timed[1];
            bearing = initial_bearing_deg(current.lat, current.lon, next.lat, next.lon);
        }

        if let Some(reference) = prev_unwrapped_bearing {
            bearing = unwrap_bearing(bearing, reference);
        }
        prev_unwrapped_bearing = Some(bearing);

        telemetry.push(TelemetryPoint {
            index: i,
            lat: current.lat,
            lon: current.lon,
            elevation: current.elevation,
            time: current_time,
            speed,
            distance: cumulative_distance,
            slope,
            elapsed: (current_time - start_time).num_milliseconds() as f64 / 1000.0,
            bearing,
            heart_rate: current.heart_rate,
            cadence: current.cadence,
            power: current.power,
            temperature: current.temperature,
        });
    }

    telemetry
}
