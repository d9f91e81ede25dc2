/// Temporal slicing of a telemetry sequence to the export segment.
use crate::telemetry::TelemetryPoint;

/// Keep only points with `elapsed` in `[start_elapsed_seconds,
/// end_elapsed_seconds]`, order preserved. This is the single place where
/// "trim" is applied to the route for display and summary; boundary points
/// are not synthesized here (per-frame consumers interpolate instead).
pub fn slice_telemetry_by_elapsed(
    points: &[TelemetryPoint],
    start_elapsed_seconds: f64,
    end_elapsed_seconds: f64,
) -> Vec<TelemetryPoint> {
    points
        .iter()
        .filter(|p| p.elapsed >= start_elapsed_seconds && p.elapsed <= end_elapsed_seconds)
        .cloned()
        .collect()
}
