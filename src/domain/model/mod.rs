// Domain models - Core types and data structures

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Time specification with precision - represents time in seconds with fractional precision
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Zero-length time span
    pub fn zero() -> Self {
        Self { seconds: 0.0 }
    }

    /// Convert to Duration, saturating negative and non-finite values to zero
    pub fn to_duration(&self) -> Duration {
        if self.seconds.is_finite() && self.seconds > 0.0 {
            Duration::from_secs_f64(self.seconds)
        } else {
            Duration::ZERO
        }
    }

    /// Parse time string in various formats
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();

        // Try parsing as seconds (float)
        if let Ok(seconds) = trimmed.parse::<f64>() {
            if seconds < 0.0 {
                return Err(DomainError::BadArgs("Time cannot be negative".to_string()));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        let (hours, minutes, seconds_part) = match parts.as_slice() {
            [minutes, seconds] => (0, *minutes, *seconds),
            [hours, minutes, seconds] => {
                let hours = hours
                    .parse::<u32>()
                    .map_err(|_| DomainError::BadArgs("Invalid hours format".to_string()))?;
                (hours, *minutes, *seconds)
            }
            _ => {
                return Err(DomainError::BadArgs(
                    "Invalid time format. Supported formats: seconds (e.g., 123.45), MM:SS.ms (e.g., 2:30.5), HH:MM:SS.ms (e.g., 1:02:30.5)".to_string(),
                ))
            }
        };

        let minutes = minutes
            .parse::<u32>()
            .map_err(|_| DomainError::BadArgs("Invalid minutes format".to_string()))?;
        let seconds = seconds_part
            .parse::<f64>()
            .map_err(|_| DomainError::BadArgs("Invalid seconds format".to_string()))?;

        if parts.len() == 3 && minutes >= 60 {
            return Err(DomainError::BadArgs("Minutes must be less than 60".to_string()));
        }
        if !(0.0..60.0).contains(&seconds) {
            return Err(DomainError::BadArgs("Seconds must be less than 60".to_string()));
        }

        Ok(Self::from_seconds(
            hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
        ))
    }

    /// Format as H:MM:SS.mmm (or M:SS.mmm below an hour)
    pub fn format_hms(&self) -> String {
        let total_millis = (self.seconds.max(0.0) * 1000.0).round() as u64;
        let hours = total_millis / 3_600_000;
        let minutes = (total_millis % 3_600_000) / 60_000;
        let seconds = (total_millis % 60_000) / 1000;
        let millis = total_millis % 1000;

        if hours > 0 {
            format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
        } else {
            format!("{}:{:02}.{:03}", minutes, seconds, millis)
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

impl Add for TimeSpec {
    type Output = TimeSpec;

    fn add(self, rhs: TimeSpec) -> TimeSpec {
        TimeSpec::from_seconds(self.seconds + rhs.seconds)
    }
}

impl Sum for TimeSpec {
    fn sum<I: Iterator<Item = TimeSpec>>(iter: I) -> Self {
        iter.fold(TimeSpec::zero(), Add::add)
    }
}

/// Rational time unit as reported by the container (`num/den`).
///
/// Compared field by field: `1/25` and `2/50` are different timebases here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Timebase {
    pub num: i32,
    pub den: i32,
}

impl Timebase {
    /// Create a new timebase
    pub fn new(num: i32, den: i32) -> Result<Self, DomainError> {
        if den == 0 {
            return Err(DomainError::BadArgs("Timebase denominator cannot be zero".to_string()));
        }
        Ok(Self { num, den })
    }

    /// Swap numerator and denominator (frame rate <-> frame duration)
    pub fn inverted(&self) -> Result<Self, DomainError> {
        Self::new(self.den, self.num)
    }
}

impl fmt::Display for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl FromStr for Timebase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (num, den) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| DomainError::BadArgs(format!("Invalid timebase: {}", s)))?;
        let num = num
            .parse::<i32>()
            .map_err(|_| DomainError::BadArgs(format!("Invalid timebase numerator: {}", s)))?;
        let den = den
            .parse::<i32>()
            .map_err(|_| DomainError::BadArgs(format!("Invalid timebase denominator: {}", s)))?;
        Self::new(num, den)
    }
}

impl From<Timebase> for String {
    fn from(tb: Timebase) -> Self {
        tb.to_string()
    }
}

impl TryFrom<String> for Timebase {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Video stream attributes consulted when deciding whether items can be stream-copied together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStreamDescriptor {
    /// Position of the stream inside its container
    pub index: usize,
    pub width: u32,
    pub height: u32,
    /// Container codec tag (e.g. `avc1`)
    pub codec_tag: String,
    /// Container timebase
    pub tbn: Timebase,
    /// Codec timebase
    pub tbc: Timebase,
    /// Real base frame rate
    pub tbr: Timebase,
    /// Codec name, informational only
    pub codec_name: Option<String>,
    /// Pixel format, informational only
    pub pixel_format: Option<String>,
}

impl VideoStreamDescriptor {
    /// Create a descriptor with the fields that take part in compatibility checks
    pub fn new(
        width: u32,
        height: u32,
        codec_tag: impl Into<String>,
        tbn: Timebase,
        tbc: Timebase,
        tbr: Timebase,
    ) -> Self {
        Self {
            index: 0,
            width,
            height,
            codec_tag: codec_tag.into(),
            tbn,
            tbc,
            tbr,
            codec_name: None,
            pixel_format: None,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_codec_name(mut self, codec_name: impl Into<String>) -> Self {
        self.codec_name = Some(codec_name.into());
        self
    }

    pub fn with_pixel_format(mut self, pixel_format: impl Into<String>) -> Self {
        self.pixel_format = Some(pixel_format.into());
        self
    }
}

/// Lifecycle of an item as seen by whoever populates its metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    InProgress,
    Valid,
    Invalid,
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemState::InProgress => write!(f, "in progress"),
            ItemState::Valid => write!(f, "valid"),
            ItemState::Invalid => write!(f, "invalid"),
        }
    }
}

/// Read-only view of an item that can take part in a concatenation
pub trait Concatenable {
    /// Location of the media file
    fn path(&self) -> &Path;

    /// Current lifecycle state
    fn state(&self) -> ItemState;

    /// Playback duration; only meaningful once the item is valid
    fn duration(&self) -> TimeSpec;

    /// Video streams in container order, empty when the item has no video
    fn video_streams(&self) -> &[VideoStreamDescriptor];
}

/// A media file together with the metadata gathered for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub path: PathBuf,
    pub state: ItemState,
    pub duration: TimeSpec,
    pub video_streams: Vec<VideoStreamDescriptor>,
    /// Why the item ended up invalid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

impl MediaItem {
    /// An item whose metadata has not been gathered yet
    pub fn pending(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: ItemState::InProgress,
            duration: TimeSpec::zero(),
            video_streams: Vec::new(),
            problem: None,
        }
    }

    /// A fully probed item
    pub fn valid(
        path: impl Into<PathBuf>,
        duration: TimeSpec,
        video_streams: Vec<VideoStreamDescriptor>,
    ) -> Self {
        Self {
            path: path.into(),
            state: ItemState::Valid,
            duration,
            video_streams,
            problem: None,
        }
    }

    /// An item that could not be probed
    pub fn invalid(path: impl Into<PathBuf>, problem: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            state: ItemState::Invalid,
            duration: TimeSpec::zero(),
            video_streams: Vec::new(),
            problem: Some(problem.into()),
        }
    }
}

impl Concatenable for MediaItem {
    fn path(&self) -> &Path {
        &self.path
    }

    fn state(&self) -> ItemState {
        self.state
    }

    fn duration(&self) -> TimeSpec {
        self.duration
    }

    fn video_streams(&self) -> &[VideoStreamDescriptor] {
        &self.video_streams
    }
}

/// How the items get joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcatStrategy {
    /// Concat demuxer with stream copy (fast, needs uniform video streams)
    Demuxer,
    /// Concat filter with re-encoding (slow, accepts anything)
    Filter,
}

impl fmt::Display for ConcatStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcatStrategy::Demuxer => write!(f, "demuxer"),
            ConcatStrategy::Filter => write!(f, "filter"),
        }
    }
}

/// Ordered items to join and the file that receives the result
#[derive(Debug, Clone)]
pub struct ConcatRequest<I = MediaItem> {
    pub items: Vec<I>,
    pub output: PathBuf,
}

impl<I: Concatenable> ConcatRequest<I> {
    pub fn new(items: Vec<I>, output: impl Into<PathBuf>) -> Self {
        Self {
            items,
            output: output.into(),
        }
    }
}
