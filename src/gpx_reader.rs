/// GPX reading: structured parsing via the `gpx` crate plus a raw-text pass
/// that recovers sensor extensions (heart rate, cadence, power,
/// temperature), which the structured parser does not surface.
///
/// Extension tags are matched by their local (namespace-stripped) name at
/// any nesting depth, so `<gpxtpx:hr>`, `<ns3:hr>` and a bare `<hr>` all
/// resolve, wrapped in a TrackPointExtension element or not.
use std::error::Error;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::telemetry::GpxTrackPoint;

/// Metadata extracted from the GPX file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpxMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

/// A parsed GPX track (one <trk> element), segments flattened in order
#[derive(Debug, Clone, PartialEq)]
pub struct GpxTrack {
    pub name: Option<String>,
    pub points: Vec<GpxTrackPoint>,
}

/// Complete parsed GPX file
#[derive(Debug, Clone, PartialEq)]
pub struct GpxFile {
    pub metadata: GpxMetadata,
    pub tracks: Vec<GpxTrack>,
}

#[derive(Debug, Clone, Copy, Default)]
struct SensorReadings {
    heart_rate: Option<f64>,
    cadence: Option<f64>,
    power: Option<f64>,
    temperature: Option<f64>,
}

pub fn read_gpx_file(path: &Path) -> Result<GpxFile, Box<dyn Error>> {
    let content = fs::read_to_string(path)?;
    parse_gpx(&content)
}

/// Parse a GPX XML string into a structured GpxFile.
pub fn parse_gpx(content: &str) -> Result<GpxFile, Box<dyn Error>> {
    let document = gpx::read(Cursor::new(content.as_bytes()))?;

    // One SensorReadings per <trkpt> in document order; waypoints come back
    // from the structured parse in the same order, so a running index lines
    // the two passes up.
    let sensors = extract_sensor_readings(content);

    let metadata = document
        .metadata
        .as_ref()
        .map(|m| GpxMetadata {
            name: m.name.clone(),
            description: m.description.clone(),
            author: m.author.as_ref().and_then(|a| a.name.clone()),
            time: m.time.clone().and_then(to_chrono),
        })
        .unwrap_or_default();

    let mut global_index = 0;
    let mut tracks = Vec::new();
    for track in &document.tracks {
        let mut points = Vec::new();
        for segment in &track.segments {
            for waypoint in &segment.points {
                let position = waypoint.point();
                let readings = sensors.get(global_index).copied().unwrap_or_default();
                global_index += 1;

                points.push(GpxTrackPoint {
                    lat: position.y(),
                    lon: position.x(),
                    elevation: waypoint.elevation,
                    time: waypoint.time.clone().and_then(to_chrono),
                    heart_rate: readings.heart_rate,
                    cadence: readings.cadence,
                    power: readings.power,
                    temperature: readings.temperature,
                });
            }
        }
        tracks.push(GpxTrack {
            name: track.name.clone(),
            points,
        });
    }

    Ok(GpxFile { metadata, tracks })
}

/// First track of the file, validated the way the loader surface expects:
/// missing tracks, fewer than 2 points or a fully untimed track are reader
/// errors (the core downstream never re-validates).
pub fn first_track_points(file: &GpxFile) -> Result<&[GpxTrackPoint], Box<dyn Error>> {
    let track = file
        .tracks
        .first()
        .ok_or("No tracks found in the GPX file")?;
    if track.points.len() < 2 {
        return Err("The track needs at least 2 points".into());
    }
    if !track.points.iter().any(|p| p.time.is_some()) {
        return Err("The track must have timestamps".into());
    }
    Ok(&track.points)
}

fn to_chrono(timestamp: gpx::Time) -> Option<DateTime<Utc>> {
    let odt = time::OffsetDateTime::from(timestamp);
    DateTime::<Utc>::from_timestamp(odt.unix_timestamp(), odt.nanosecond())
}

/// Raw-text pass over every <trkpt> block, in document order.
fn extract_sensor_readings(content: &str) -> Vec<SensorReadings> {
    let mut readings = Vec::new();
    let mut search_from = 0;

    while let Some(found) = content[search_from..].find("<trkpt") {
        let start = search_from + found;
        let tag_end = match content[start..].find('>') {
            Some(rel) => start + rel,
            None => break,
        };

        if content[..tag_end].ends_with('/') {
            // Self-closing point, no children at all.
            readings.push(SensorReadings::default());
            search_from = tag_end + 1;
            continue;
        }

        let (block, next) = match content[tag_end..].find("</trkpt>") {
            Some(rel) => (
                &content[tag_end + 1..tag_end + rel],
                tag_end + rel + "</trkpt>".len(),
            ),
            None => ("", tag_end + 1),
        };
        readings.push(read_point_sensors(block));
        search_from = next;
    }

    readings
}

fn read_point_sensors(trkpt_block: &str) -> SensorReadings {
    match local_tag_block(trkpt_block, "extensions") {
        Some(extensions) => SensorReadings {
            heart_rate: find_extension_value(extensions, "hr"),
            cadence: find_extension_value(extensions, "cad"),
            power: find_extension_value(extensions, "power"),
            temperature: find_extension_value(extensions, "atemp"),
        },
        None => SensorReadings::default(),
    }
}

/// "gpxtpx:hr" -> "hr"
fn local_name(tag_name: &str) -> &str {
    tag_name.rsplit(':').next().unwrap_or(tag_name)
}

/// Content of the first element whose local tag name matches, or None.
fn local_tag_block<'a>(xml: &'a str, local: &str) -> Option<&'a str> {
    let mut pos = 0;
    while let Some(found) = xml[pos..].find('<') {
        let start = pos + found;
        let rest = &xml[start + 1..];
        if rest.starts_with('/') || rest.starts_with('!') || rest.starts_with('?') {
            pos = start + 1;
            continue;
        }

        let name_end = rest.find(|c: char| c.is_whitespace() || c == '>' || c == '/')?;
        let tag_close = rest.find('>')?;

        if local_name(&rest[..name_end]) == local {
            if rest[..tag_close].ends_with('/') {
                return Some("");
            }
            let content_start = start + 1 + tag_close + 1;
            let close = find_local_close_tag(&xml[content_start..], local)?;
            return Some(&xml[content_start..content_start + close]);
        }
        pos = start + 1;
    }
    None
}

/// Offset of the first closing tag with the given local name.
fn find_local_close_tag(xml: &str, local: &str) -> Option<usize> {
    let mut pos = 0;
    while let Some(found) = xml[pos..].find("</") {
        let start = pos + found;
        let name_start = start + 2;
        let gt = xml[name_start..].find('>')?;
        if local_name(xml[name_start..name_start + gt].trim()) == local {
            return Some(start);
        }
        pos = name_start + gt + 1;
    }
    None
}

/// First numeric value of an element with the given local name, searching
/// the whole payload (which covers tags nested below wrapper elements such
/// as TrackPointExtension). Non-numeric matches are skipped and the search
/// continues.
fn find_extension_value(xml: &str, field: &str) -> Option<f64> {
    let mut pos = 0;
    while let Some(found) = xml[pos..].find('<') {
        let start = pos + found;
        let rest = &xml[start + 1..];
        if rest.starts_with('/') || rest.starts_with('!') || rest.starts_with('?') {
            pos = start + 1;
            continue;
        }

        let name_end = rest.find(|c: char| c.is_whitespace() || c == '>' || c == '/')?;
        let tag_close = rest.find('>')?;

        if local_name(&rest[..name_end]) == field && !rest[..tag_close].ends_with('/') {
            let content_start = start + 1 + tag_close + 1;
            if let Some(text_end) = xml[content_start..].find('<') {
                if let Ok(value) = xml[content_start..content_start + text_end]
                    .trim()
                    .parse::<f64>()
                {
                    return Some(value);
                }
            }
        }
        pos = start + 1;
    }
    None
}
