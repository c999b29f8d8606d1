//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe -print_format json -show_format -show_streams` and maps the
//! result onto a [`MediaItem`]. TBN comes from the stream `time_base`, TBR
//! from `r_frame_rate` and TBC from `codec_time_base`; newer ffprobe builds
//! no longer print the latter, in which case the inverse of the average
//! frame rate stands in for it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    binary: PathBuf,
}

impl FfprobeAdapter {
    /// Create new FFprobe adapter running `binary`
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe_media(&self, file_path: &Path) -> Result<MediaItem, DomainError> {
        debug!(path = %file_path.display(), "Probing media file");

        let output = Command::new(&self.binary)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(file_path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                DomainError::ProbeFail(format!(
                    "Failed to run {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(DomainError::ProbeFail(format!(
                "ffprobe failed for {}: {}",
                file_path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_probe_output(file_path, &String::from_utf8_lossy(&output.stdout))
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    codec_tag_string: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    pix_fmt: Option<String>,
    time_base: Option<String>,
    codec_time_base: Option<String>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    disposition: HashMap<String, i64>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Map ffprobe JSON output for `path` onto a valid media item
pub fn parse_probe_output(path: &Path, json: &str) -> Result<MediaItem, DomainError> {
    let probe: ProbeOutput = serde_json::from_str(json).map_err(|e| {
        DomainError::ProbeFail(format!("Unreadable ffprobe output for {}: {}", path.display(), e))
    })?;

    if probe.streams.is_empty() {
        return Err(DomainError::ProbeFail(format!(
            "No media streams found in {}",
            path.display()
        )));
    }

    let video_streams = probe
        .streams
        .iter()
        .filter(|s| s.codec_type.as_deref() == Some("video"))
        .filter(|s| s.disposition.get("attached_pic").copied().unwrap_or(0) == 0)
        .map(|s| video_descriptor(path, s))
        .collect::<Result<Vec<_>, _>>()?;

    let duration = media_duration(&probe).ok_or_else(|| {
        DomainError::ProbeFail(format!(
            "Could not determine media duration of {}",
            path.display()
        ))
    })?;

    Ok(MediaItem::valid(path, duration, video_streams))
}

fn video_descriptor(
    path: &Path,
    stream: &ProbeStream,
) -> Result<VideoStreamDescriptor, DomainError> {
    let missing = |field: &str| {
        DomainError::ProbeFail(format!(
            "Video stream {} of {} has no usable {}",
            stream.index,
            path.display(),
            field
        ))
    };

    let width = stream.width.ok_or_else(|| missing("width"))?;
    let height = stream.height.ok_or_else(|| missing("height"))?;
    let tbn = rational(&stream.time_base).ok_or_else(|| missing("time_base"))?;
    let tbr = rational(&stream.r_frame_rate).ok_or_else(|| missing("r_frame_rate"))?;
    let tbc = rational(&stream.codec_time_base)
        .or_else(|| rational(&stream.avg_frame_rate).and_then(|r| r.inverted().ok()))
        .or_else(|| tbr.inverted().ok())
        .ok_or_else(|| missing("codec time base"))?;

    let mut descriptor = VideoStreamDescriptor::new(
        width,
        height,
        stream.codec_tag_string.clone().unwrap_or_default(),
        tbn,
        tbc,
        tbr,
    )
    .with_index(stream.index);
    if let Some(codec_name) = &stream.codec_name {
        descriptor = descriptor.with_codec_name(codec_name.clone());
    }
    if let Some(pix_fmt) = &stream.pix_fmt {
        descriptor = descriptor.with_pixel_format(pix_fmt.clone());
    }
    Ok(descriptor)
}

/// `num/den` with a non-zero numerator and denominator
fn rational(value: &Option<String>) -> Option<Timebase> {
    value
        .as_deref()
        .and_then(|v| v.parse::<Timebase>().ok())
        .filter(|tb| tb.num != 0)
}

fn media_duration(probe: &ProbeOutput) -> Option<TimeSpec> {
    let seconds = |value: &Option<String>| {
        value
            .as_deref()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|s| s.is_finite() && *s > 0.0)
    };

    probe
        .format
        .as_ref()
        .and_then(|f| seconds(&f.duration))
        .or_else(|| {
            probe
                .streams
                .iter()
                .filter_map(|s| seconds(&s.duration))
                .reduce(f64::max)
        })
        .map(TimeSpec::from_seconds)
}
