/// Per-frame telemetry sampling: binary search over the monotonic `elapsed`
/// axis plus linear interpolation between the two surrounding points.
///
/// The render loop calls this once per output frame, so the lookup stays
/// O(log n) with no caching and no state between calls. The sequence passed
/// in is the full (unsliced) smoothed track; the trim window enters only as
/// the `gpx_trim_start_seconds` offset in the frame-to-elapsed mapping.
use chrono::Duration;

use crate::lerp::{lerp, lerp_opt};
use crate::telemetry::{TelemetryFrame, TelemetryPoint};
use crate::telemetry_calculator::{initial_bearing_deg, unwrap_bearing};

/// Largest index with `points[idx].elapsed <= elapsed`. Returns 0 when the
/// target lies before the first point.
pub fn find_point_index(points: &[TelemetryPoint], elapsed: f64) -> usize {
    let mut low = 0;
    let mut high = points.len() - 1;

    while low < high {
        let mid = (low + high + 1) / 2;
        if points[mid].elapsed <= elapsed {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    low
}

/// Interpolate telemetry at `elapsed` seconds into the track.
///
/// Returns None for sequences with fewer than 2 points - that is the normal
/// "no track loaded" state, not an error. At or past the last point the last
/// point is returned verbatim with `progress = 1`.
pub fn interpolate_at_time(
    points: &[TelemetryPoint],
    elapsed: f64,
    frame: i64,
    total_duration: f64,
) -> Option<TelemetryFrame> {
    if points.len() < 2 {
        return None;
    }

    let idx = find_point_index(points, elapsed);
    let p1 = &points[idx];

    if idx >= points.len() - 1 {
        let last = points.last().unwrap();
        return Some(TelemetryFrame {
            frame,
            index: last.index,
            lat: last.lat,
            lon: last.lon,
            elevation: last.elevation,
            time: last.time,
            speed: last.speed,
            distance: last.distance,
            slope: last.slope,
            elapsed: last.elapsed,
            bearing: last.bearing,
            heart_rate: last.heart_rate,
            cadence: last.cadence,
            power: last.power,
            temperature: last.temperature,
            progress: 1.0,
        });
    }

    let p2 = &points[idx + 1];
    let segment_duration = p2.elapsed - p1.elapsed;
    let t = if segment_duration > 0.0 {
        (elapsed - p1.elapsed) / segment_duration
    } else {
        0.0
    };

    let time_span_ms = (p2.time - p1.time).num_milliseconds() as f64;
    let time = p1.time + Duration::milliseconds((time_span_ms * t).round() as i64);

    // The frame bearing is the azimuth of the segment itself, unwrapped
    // against the previous segment's azimuth so heading stays continuous
    // from frame to frame, not just from point to point.
    let segment_bearing_raw = initial_bearing_deg(p1.lat, p1.lon, p2.lat, p2.lon);
    let bearing = if idx > 0 {
        let p0 = &points[idx - 1];
        let previous_segment_bearing = initial_bearing_deg(p0.lat, p0.lon, p1.lat, p1.lon);
        unwrap_bearing(segment_bearing_raw, previous_segment_bearing)
    } else {
        segment_bearing_raw
    };

    Some(TelemetryFrame {
        frame,
        index: p1.index,
        lat: lerp(p1.lat, p2.lat, t),
        lon: lerp(p1.lon, p2.lon, t),
        elevation: lerp_opt(p1.elevation, p2.elevation, t),
        time,
        speed: lerp(p1.speed, p2.speed, t),
        distance: lerp(p1.distance, p2.distance, t),
        slope: lerp(p1.slope, p2.slope, t),
        elapsed,
        bearing,
        heart_rate: lerp_opt(p1.heart_rate, p2.heart_rate, t),
        cadence: lerp_opt(p1.cadence, p2.cadence, t),
        power: lerp_opt(p1.power, p2.power, t),
        temperature: lerp_opt(p1.temperature, p2.temperature, t),
        progress: if total_duration > 0.0 {
            elapsed / total_duration
        } else {
            0.0
        },
    })
}

/// Interpolated telemetry for a single export frame.
///
/// Export second 0 maps to `gpx_trim_start_seconds` in the track, so the
/// caller iterates `frame in 0..duration_in_frames` with the full point
/// sequence and never re-slices per frame.
pub fn get_frame_data(
    points: &[TelemetryPoint],
    frame: i64,
    fps: f64,
    gpx_trim_start_seconds: f64,
) -> Option<TelemetryFrame> {
    if points.len() < 2 {
        return None;
    }

    let total_duration = points.last().unwrap().elapsed;
    let elapsed = gpx_trim_start_seconds + frame as f64 / fps;

    interpolate_at_time(points, elapsed, frame, total_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn point(index: usize, elapsed: f64, lat: f64, lon: f64) -> TelemetryPoint {
        TelemetryPoint {
            index,
            lat,
            lon,
            elevation: Some(100.0 + elapsed),
            time: ts(elapsed as i64),
            speed: 2.0 + elapsed / 10.0,
            distance: elapsed * 10.0,
            slope: 1.0,
            elapsed,
            bearing: 0.0,
            heart_rate: Some(120.0),
            cadence: None,
            power: Some(200.0),
            temperature: None,
        }
    }

    fn straight_track() -> Vec<TelemetryPoint> {
        vec![
            point(0, 0.0, 45.000, 7.0),
            point(1, 10.0, 45.001, 7.0),
            point(2, 20.0, 45.002, 7.0),
            point(3, 30.0, 45.003, 7.0),
        ]
    }

    #[test]
    fn test_fewer_than_two_points_is_no_data() {
        assert!(interpolate_at_time(&[], 0.0, 0, 0.0).is_none());
        assert!(interpolate_at_time(&[point(0, 0.0, 45.0, 7.0)], 0.0, 0, 10.0).is_none());
        assert!(get_frame_data(&[], 0, 30.0, 0.0).is_none());
    }

    #[test]
    fn test_find_point_index_boundaries() {
        let points = straight_track();
        assert_eq!(find_point_index(&points, -5.0), 0);
        assert_eq!(find_point_index(&points, 0.0), 0);
        assert_eq!(find_point_index(&points, 9.99), 0);
        assert_eq!(find_point_index(&points, 10.0), 1);
        assert_eq!(find_point_index(&points, 29.99), 2);
        assert_eq!(find_point_index(&points, 30.0), 3);
        assert_eq!(find_point_index(&points, 1000.0), 3);
    }

    #[test]
    fn test_at_time_zero_equals_first_point_with_progress_zero() {
        let points = straight_track();
        let frame = interpolate_at_time(&points, 0.0, 0, 30.0).unwrap();
        assert_eq!(frame.lat, points[0].lat);
        assert_eq!(frame.lon, points[0].lon);
        assert_eq!(frame.speed, points[0].speed);
        assert_eq!(frame.distance, points[0].distance);
        assert_eq!(frame.time, points[0].time);
        assert_eq!(frame.progress, 0.0);
    }

    #[test]
    fn test_at_total_duration_equals_last_point_with_progress_one() {
        let points = straight_track();
        let frame = interpolate_at_time(&points, 30.0, 900, 30.0).unwrap();
        assert_eq!(frame.lat, points[3].lat);
        assert_eq!(frame.distance, points[3].distance);
        assert_eq!(frame.elapsed, 30.0);
        assert_eq!(frame.progress, 1.0);
        assert_eq!(frame.frame, 900);
    }

    #[test]
    fn test_past_the_end_clamps_to_last_point() {
        let points = straight_track();
        let frame = interpolate_at_time(&points, 99.0, 0, 30.0).unwrap();
        assert_eq!(frame.lat, points[3].lat);
        assert_eq!(frame.elapsed, points[3].elapsed);
        assert_eq!(frame.progress, 1.0);
    }

    #[test]
    fn test_midpoint_blends_linearly() {
        let points = straight_track();
        let frame = interpolate_at_time(&points, 5.0, 150, 30.0).unwrap();
        assert!((frame.lat - 45.0005).abs() < 1e-12);
        assert_eq!(frame.distance, 50.0);
        assert_eq!(frame.speed, (points[0].speed + points[1].speed) / 2.0);
        assert_eq!(frame.elevation, Some(105.0));
        assert_eq!(frame.time, ts(5));
        assert_eq!(frame.index, 0);
        assert!((frame.progress - 5.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_elapsed_does_not_divide_by_zero() {
        let mut points = straight_track();
        points[1].elapsed = 0.0; // degenerate on purpose
        let frame = interpolate_at_time(&points, 0.0, 0, 30.0).unwrap();
        // The search lands on the later of the duplicates and t stays 0.
        assert_eq!(frame.lat, points[1].lat);
        assert_eq!(frame.distance, points[1].distance);
        assert!(frame.speed.is_finite());
    }

    #[test]
    fn test_optional_sensors_blend_null_tolerantly() {
        let mut points = straight_track();
        points[0].heart_rate = Some(100.0);
        points[1].heart_rate = Some(140.0);
        points[0].power = Some(210.0);
        points[1].power = None;
        points[0].cadence = None;
        points[1].cadence = Some(90.0);
        let frame = interpolate_at_time(&points, 5.0, 0, 30.0).unwrap();
        assert_eq!(frame.heart_rate, Some(120.0));
        assert_eq!(frame.power, Some(210.0));
        assert_eq!(frame.cadence, Some(90.0));
        assert_eq!(frame.temperature, None);
    }

    #[test]
    fn test_frame_bearing_is_continuous_across_segments() {
        // Zig-zag around due south, where raw azimuths flip sign near 180.
        let points = vec![
            point(0, 0.0, 45.000, 7.0000),
            point(1, 10.0, 44.999, 7.0001),
            point(2, 20.0, 44.998, 7.0000),
        ];
        let first = interpolate_at_time(&points, 5.0, 0, 20.0).unwrap();
        let second = interpolate_at_time(&points, 15.0, 0, 20.0).unwrap();
        assert!(
            (second.bearing - first.bearing).abs() <= 180.0,
            "bearing snapped between segments: {} -> {}",
            first.bearing,
            second.bearing
        );
    }

    #[test]
    fn test_get_frame_data_applies_trim_offset() {
        let points = straight_track();
        let frame = get_frame_data(&points, 0, 30.0, 10.0).unwrap();
        assert_eq!(frame.elapsed, 10.0);
        assert_eq!(frame.lat, points[1].lat);

        let frame = get_frame_data(&points, 150, 30.0, 10.0).unwrap();
        assert_eq!(frame.elapsed, 15.0);
    }

    #[test]
    fn test_get_frame_data_maps_frames_through_fps() {
        let points = straight_track();
        let frame = get_frame_data(&points, 300, 30.0, 0.0).unwrap();
        assert_eq!(frame.elapsed, 10.0);
        assert_eq!(frame.frame, 300);
    }
}
