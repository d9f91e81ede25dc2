/// Telemetry data model shared by every processing stage.
///
/// All types here are plain values: each stage takes a slice and returns a
/// fresh Vec, nothing is mutated in place and nothing is retained across
/// calls.
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Raw trackpoint as extracted from a GPX file, before any derivation.
/// Points with non-numeric coordinates are never constructed - the reader
/// skips them.
#[derive(Debug, Clone, PartialEq)]
pub struct GpxTrackPoint {
    pub lat: f64,
    pub lon: f64,
    /// Elevation in meters
    pub elevation: Option<f64>,
    pub time: Option<DateTime<Utc>>,
    /// Heart rate in bpm (from extensions)
    pub heart_rate: Option<f64>,
    /// Cadence in rpm (from extensions)
    pub cadence: Option<f64>,
    /// Power in watts (from extensions)
    pub power: Option<f64>,
    /// Temperature in celsius (from extensions)
    pub temperature: Option<f64>,
}

/// A trackpoint enriched with derived telemetry.
///
/// Sequences of these are ordered by `elapsed` (strictly increasing when the
/// sequence has at least 2 points) and `distance` is non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryPoint {
    /// Index in the derived sequence
    pub index: usize,
    pub lat: f64,
    pub lon: f64,
    /// Elevation in meters
    pub elevation: Option<f64>,
    pub time: DateTime<Utc>,
    /// Speed in m/s
    pub speed: f64,
    /// Cumulative distance from start in meters
    pub distance: f64,
    /// Slope as a percentage (rise/run * 100)
    pub slope: f64,
    /// Elapsed time from start in seconds
    pub elapsed: f64,
    /// Bearing in degrees (0 = North, clockwise). Unwrapped for continuity:
    /// values may leave [-180, 180) over a long route so that consecutive
    /// points never differ by an artificial 360 degree snap. Re-wrap with
    /// `((b % 360.0) + 360.0) % 360.0` when a compass heading is needed.
    pub bearing: f64,
    pub heart_rate: Option<f64>,
    pub cadence: Option<f64>,
    pub power: Option<f64>,
    pub temperature: Option<f64>,
}

/// Interpolated telemetry for a single output frame. Built fresh per call,
/// never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryFrame {
    /// Frame number in the export
    pub frame: i64,
    /// Index of the segment start point in the source sequence
    pub index: usize,
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
    pub time: DateTime<Utc>,
    pub speed: f64,
    pub distance: f64,
    pub slope: f64,
    pub elapsed: f64,
    pub bearing: f64,
    pub heart_rate: Option<f64>,
    pub cadence: Option<f64>,
    pub power: Option<f64>,
    pub temperature: Option<f64>,
    /// Progress through the track (0 to 1)
    pub progress: f64,
}

/// Summary statistics for a telemetry sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySummary {
    /// Total distance in meters
    pub total_distance: f64,
    /// Total duration in seconds
    pub total_duration: f64,
    /// Maximum speed in m/s
    pub max_speed: f64,
    /// Average speed in m/s (excluding stops)
    pub avg_speed: f64,
    pub max_elevation: Option<f64>,
    pub min_elevation: Option<f64>,
    /// Total elevation gain in meters
    pub elevation_gain: f64,
    /// Total elevation loss in meters
    pub elevation_loss: f64,
    pub point_count: usize,
}

impl TelemetrySummary {
    /// Zeroed summary used for the "no data" state (e.g. before any GPX is
    /// loaded).
    pub fn empty() -> Self {
        TelemetrySummary {
            total_distance: 0.0,
            total_duration: 0.0,
            max_speed: 0.0,
            avg_speed: 0.0,
            max_elevation: None,
            min_elevation: None,
            elevation_gain: 0.0,
            elevation_loss: 0.0,
            point_count: 0,
        }
    }
}
