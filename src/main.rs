use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use gpx_telemetry::export_duration::{
    compute_effective_export_duration, ExportDuration, ExportDurationInputs,
};
use gpx_telemetry::frame_interpolator::get_frame_data;
use gpx_telemetry::gpx_reader::{first_track_points, read_gpx_file};
use gpx_telemetry::speed_smoother::{smooth_speeds, DEFAULT_SPEED_WINDOW};
use gpx_telemetry::summary::calculate_summary;
use gpx_telemetry::telemetry::{TelemetryPoint, TelemetrySummary};
use gpx_telemetry::telemetry_calculator::calculate_telemetry;
use gpx_telemetry::telemetry_slicer::slice_telemetry_by_elapsed;

#[derive(Debug, Clone)]
struct CliOptions {
    input: PathBuf,
    fps: f64,
    gpx_trim_start: f64,
    gpx_trim_end: f64,
    video_duration: Option<f64>,
    video_trim_start: f64,
    video_trim_end: f64,
    frames_csv: Option<PathBuf>,
    report_csv: Option<PathBuf>,
}

/// One row of the batch report CSV
#[derive(Debug, Serialize)]
struct RouteRecord {
    filename: String,
    point_count: usize,
    distance_km: f64,
    duration_seconds: f64,
    avg_speed_kmh: f64,
    max_speed_kmh: f64,
    elevation_gain_m: f64,
    elevation_loss_m: f64,
}

fn main() {
    let options = match parse_args(env::args().skip(1).collect()) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("❌ {}", message);
            print_usage();
            process::exit(2);
        }
    };

    let result = if options.input.is_dir() {
        run_batch(&options)
    } else {
        run_single(&options)
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage: gpx-telemetry <file.gpx | folder> [options]");
    eprintln!("  --fps <n>               frame rate for the export window (default 30)");
    eprintln!("  --trim-start <s>        GPX trim start in seconds (default 0)");
    eprintln!("  --trim-end <s>          GPX trim end in seconds, 0 = no end trim");
    eprintln!("  --video-duration <s>    background video duration in seconds");
    eprintln!("  --video-trim-start <s>  video trim start in seconds");
    eprintln!("  --video-trim-end <s>    video trim end in seconds, 0 = no end trim");
    eprintln!("  --frames <path>         write per-frame telemetry CSV (single file only)");
    eprintln!("  --report <path>         write batch summary CSV (folder only)");
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut input: Option<PathBuf> = None;
    let mut options = CliOptions {
        input: PathBuf::new(),
        fps: 30.0,
        gpx_trim_start: 0.0,
        gpx_trim_end: 0.0,
        video_duration: None,
        video_trim_start: 0.0,
        video_trim_end: 0.0,
        frames_csv: None,
        report_csv: None,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--fps" => options.fps = next_number(&mut iter, "--fps")?,
            "--trim-start" => options.gpx_trim_start = next_number(&mut iter, "--trim-start")?,
            "--trim-end" => options.gpx_trim_end = next_number(&mut iter, "--trim-end")?,
            "--video-duration" => {
                options.video_duration = Some(next_number(&mut iter, "--video-duration")?)
            }
            "--video-trim-start" => {
                options.video_trim_start = next_number(&mut iter, "--video-trim-start")?
            }
            "--video-trim-end" => {
                options.video_trim_end = next_number(&mut iter, "--video-trim-end")?
            }
            "--frames" => {
                options.frames_csv = Some(PathBuf::from(next_value(&mut iter, "--frames")?))
            }
            "--report" => {
                options.report_csv = Some(PathBuf::from(next_value(&mut iter, "--report")?))
            }
            other if other.starts_with("--") => {
                return Err(format!("Unknown option: {}", other));
            }
            other => {
                if input.is_some() {
                    return Err(format!("Unexpected extra argument: {}", other));
                }
                input = Some(PathBuf::from(other));
            }
        }
    }

    options.input = input.ok_or("Missing input file or folder")?;
    if options.fps <= 0.0 {
        return Err("--fps must be positive".to_string());
    }
    Ok(options)
}

fn next_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    iter.next().ok_or(format!("{} needs a value", flag))
}

fn next_number(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<f64, String> {
    next_value(iter, flag)?
        .parse::<f64>()
        .map_err(|_| format!("{} needs a numeric value", flag))
}

fn run_single(options: &CliOptions) -> Result<(), Box<dyn Error>> {
    let (smoothed, window) = load_track(&options.input, options)?;

    let start = options.gpx_trim_start;
    let end = options.gpx_trim_start + window.effective_duration_seconds;
    let sliced = slice_telemetry_by_elapsed(&smoothed, start, end);
    let summary = calculate_summary(&sliced);

    println!(
        "📍 {} - {} points",
        options
            .input
            .file_name()
            .unwrap_or_default()
            .to_string_lossy(),
        smoothed.len()
    );
    print_summary(&summary);
    println!(
        "🎬 Export window: {:.1}s → {:.1}s, {} frames at {} fps",
        start, end, window.duration_in_frames, options.fps
    );

    if let Some(frames_path) = &options.frames_csv {
        write_frames_csv(frames_path, &smoothed, &window, options)?;
        println!(
            "✅ Wrote {} frame samples to {}",
            window.duration_in_frames,
            frames_path.display()
        );
    }

    Ok(())
}

fn run_batch(options: &CliOptions) -> Result<(), Box<dyn Error>> {
    let mut gpx_files = Vec::new();
    for entry in WalkDir::new(&options.input) {
        let entry = entry?;
        if entry.file_type().is_file() {
            let is_gpx = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("gpx"))
                .unwrap_or(false);
            if is_gpx {
                gpx_files.push(entry.path().to_path_buf());
            }
        }
    }

    println!("🔍 Found {} GPX files to process", gpx_files.len());
    println!("⚡ Processing in parallel on {} cores", num_cpus::get());

    let results: Vec<Result<RouteRecord, String>> = gpx_files
        .par_iter()
        .map(|path| {
            summarize_file(path, options).map_err(|e| format!("{}: {}", path.display(), e))
        })
        .collect();

    let mut records = Vec::new();
    let mut error_count = 0;
    for result in results {
        match result {
            Ok(record) => records.push(record),
            Err(message) => {
                eprintln!("   ❌ {}", message);
                error_count += 1;
            }
        }
    }

    for record in &records {
        println!(
            "   {} - {:.1} km, {}, avg {:.1} km/h, +{:.0}m/-{:.0}m",
            record.filename,
            record.distance_km,
            seconds_to_hms(record.duration_seconds),
            record.avg_speed_kmh,
            record.elevation_gain_m,
            record.elevation_loss_m
        );
    }
    println!("✅ Processed {} files, {} errors", records.len(), error_count);

    if let Some(report_path) = &options.report_csv {
        let mut writer = csv::Writer::from_path(report_path)?;
        for record in &records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        println!("📊 Report written to {}", report_path.display());
    }

    Ok(())
}

fn load_track(
    path: &Path,
    options: &CliOptions,
) -> Result<(Vec<TelemetryPoint>, ExportDuration), Box<dyn Error>> {
    let file = read_gpx_file(path)?;
    let points = first_track_points(&file)?;
    let derived = calculate_telemetry(points);
    let smoothed = smooth_speeds(&derived, DEFAULT_SPEED_WINDOW);

    let gpx_duration = smoothed.last().map(|p| p.elapsed).unwrap_or(0.0);
    let window = compute_effective_export_duration(&ExportDurationInputs {
        gpx_duration_seconds: gpx_duration,
        gpx_trim_start_seconds: options.gpx_trim_start,
        gpx_trim_end_seconds: options.gpx_trim_end,
        video_duration_seconds: options.video_duration,
        video_trim_start_seconds: options.video_trim_start,
        video_trim_end_seconds: options.video_trim_end,
        fps: options.fps,
    });

    Ok((smoothed, window))
}

fn summarize_file(path: &Path, options: &CliOptions) -> Result<RouteRecord, Box<dyn Error>> {
    let (smoothed, window) = load_track(path, options)?;
    let start = options.gpx_trim_start;
    let end = options.gpx_trim_start + window.effective_duration_seconds;
    let summary = calculate_summary(&slice_telemetry_by_elapsed(&smoothed, start, end));

    Ok(RouteRecord {
        filename: path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string(),
        point_count: summary.point_count,
        distance_km: summary.total_distance / 1000.0,
        duration_seconds: summary.total_duration,
        avg_speed_kmh: ms_to_kmh(summary.avg_speed),
        max_speed_kmh: ms_to_kmh(summary.max_speed),
        elevation_gain_m: summary.elevation_gain,
        elevation_loss_m: summary.elevation_loss,
    })
}

fn write_frames_csv(
    path: &Path,
    points: &[TelemetryPoint],
    window: &ExportDuration,
    options: &CliOptions,
) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    for frame in 0..window.duration_in_frames {
        if let Some(sample) = get_frame_data(points, frame, options.fps, options.gpx_trim_start) {
            writer.serialize(sample)?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn print_summary(summary: &TelemetrySummary) {
    println!("   Distance:   {:.2} km", summary.total_distance / 1000.0);
    println!("   Duration:   {}", seconds_to_hms(summary.total_duration));
    println!(
        "   Speed:      avg {:.1} km/h, max {:.1} km/h",
        ms_to_kmh(summary.avg_speed),
        ms_to_kmh(summary.max_speed)
    );
    println!(
        "   Elevation:  +{:.0} m / -{:.0} m",
        summary.elevation_gain, summary.elevation_loss
    );
    match (summary.min_elevation, summary.max_elevation) {
        (Some(min), Some(max)) => println!("   Range:      {:.0} m - {:.0} m", min, max),
        _ => println!("   Range:      no elevation data"),
    }
}

fn ms_to_kmh(meters_per_second: f64) -> f64 {
    meters_per_second * 3.6
}

fn seconds_to_hms(seconds: f64) -> String {
    let total = seconds.floor() as i64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{}:{:02}:{:02}", h, m, s)
}
