/// Duration reconciliation between the trimmed GPX segment and an optional
/// trimmed background video segment.
///
/// The export is always the intersection of both timelines: never longer
/// than the GPX segment nor than the video segment. Trim-end 0 means "no end
/// trim, use the full duration".
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDurationInputs {
    pub gpx_duration_seconds: f64,
    pub gpx_trim_start_seconds: f64,
    /// 0 = no end trim
    pub gpx_trim_end_seconds: f64,
    pub video_duration_seconds: Option<f64>,
    pub video_trim_start_seconds: f64,
    /// 0 = no end trim
    pub video_trim_end_seconds: f64,
    pub fps: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportDuration {
    pub effective_duration_seconds: f64,
    /// Always >= 1, a render of zero frames is never produced.
    pub duration_in_frames: i64,
}

/// Pure computation of the effective export duration from trim and duration
/// inputs. All intermediate segment lengths are clamped to >= 0 so inverted
/// trim windows cannot produce a negative duration.
pub fn compute_effective_export_duration(inputs: &ExportDurationInputs) -> ExportDuration {
    let gpx_segment_end = if inputs.gpx_trim_end_seconds > 0.0 {
        inputs.gpx_trim_end_seconds.min(inputs.gpx_duration_seconds)
    } else {
        inputs.gpx_duration_seconds
    };
    let max_from_gpx = (gpx_segment_end - inputs.gpx_trim_start_seconds).max(0.0);

    let max_from_video = match inputs.video_duration_seconds {
        Some(video_duration) if video_duration > 0.0 => {
            let video_segment_end = if inputs.video_trim_end_seconds > 0.0 {
                inputs.video_trim_end_seconds.min(video_duration)
            } else {
                video_duration
            };
            (video_segment_end - inputs.video_trim_start_seconds).max(0.0)
        }
        _ => f64::INFINITY,
    };

    let effective_duration_seconds = max_from_gpx.min(max_from_video);
    let duration_in_frames = ((effective_duration_seconds * inputs.fps).ceil() as i64).max(1);

    ExportDuration {
        effective_duration_seconds,
        duration_in_frames,
    }
}
