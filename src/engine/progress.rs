//! Progress reading for dispatched jobs and callbacks for UI integration
//!
//! ffmpeg's `-progress <file>` writes blocks of `key=value` lines, each block
//! terminated by `progress=continue` or, for the last one, `progress=end`:
//!
//! ```text
//! frame=250
//! fps=48.3
//! out_time_us=10000000
//! out_time=00:00:10.000000
//! total_size=1048576
//! speed=1.93x
//! progress=continue
//! ```
//!
//! Only complete blocks are trusted; a partially written trailing block is
//! ignored until its terminator shows up.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::domain::model::TimeSpec;
use crate::ports::{JobHandle, JobOutcome};

/// One complete block of ffmpeg progress output
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub frame: Option<u64>,
    pub fps: Option<f64>,
    /// Media time written to the output so far
    pub out_time: Option<TimeSpec>,
    pub total_size: Option<u64>,
    /// Processing speed as a multiple of real time
    pub speed: Option<f64>,
    /// ffmpeg reported `progress=end`
    pub finished: bool,
}

impl ProgressSnapshot {
    /// Parse the last complete block of a progress file, if any
    pub fn parse(contents: &str) -> Option<Self> {
        let mut current = BlockParser::default();
        let mut last = None;

        for line in contents.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            if key == "progress" {
                last = Some(current.finish(value.trim() == "end"));
                current = BlockParser::default();
            } else {
                current.feed(key.trim(), value.trim());
            }
        }

        last
    }

    /// Read and parse a progress sink; a missing or empty file yields `None`
    pub fn read(path: &Path) -> Result<Option<Self>, DomainError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Self::parse(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::FsFail(format!(
                "Failed to read progress file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[derive(Default)]
struct BlockParser {
    snapshot: ProgressSnapshot,
    out_time_us: Option<i64>,
    out_time_ms: Option<i64>,
    out_time: Option<TimeSpec>,
}

impl BlockParser {
    fn feed(&mut self, key: &str, value: &str) {
        match key {
            "frame" => self.snapshot.frame = value.parse().ok(),
            "fps" => self.snapshot.fps = value.parse().ok(),
            "total_size" => self.snapshot.total_size = value.parse().ok(),
            "speed" => {
                self.snapshot.speed = value.trim_end_matches('x').trim().parse().ok();
            }
            "out_time_us" => self.out_time_us = value.parse().ok(),
            // microseconds despite the name
            "out_time_ms" => self.out_time_ms = value.parse().ok(),
            "out_time" => self.out_time = TimeSpec::parse(value).ok(),
            _ => {}
        }
    }

    fn finish(mut self, finished: bool) -> ProgressSnapshot {
        let micros = self.out_time_us.or(self.out_time_ms).filter(|us| *us >= 0);
        self.snapshot.out_time = micros
            .map(|us| TimeSpec::from_seconds(us as f64 / 1_000_000.0))
            .or(self.out_time);
        self.snapshot.finished = finished;
        self.snapshot
    }
}

/// Completion estimate derived from a snapshot and the expected output duration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEstimate {
    /// 0.0 - 100.0
    pub percent: f64,
    pub processed: TimeSpec,
    pub expected: TimeSpec,
    /// Remaining wall-clock time, when ffmpeg reports its speed
    pub eta: Option<Duration>,
    pub finished: bool,
}

impl ProgressEstimate {
    pub fn from_snapshot(snapshot: &ProgressSnapshot, expected: TimeSpec) -> Self {
        let processed = snapshot.out_time.unwrap_or_default();

        if snapshot.finished {
            return Self {
                percent: 100.0,
                processed,
                expected,
                eta: Some(Duration::ZERO),
                finished: true,
            };
        }

        let percent = if expected.seconds > 0.0 {
            (processed.seconds / expected.seconds * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        let eta = snapshot.speed.filter(|s| *s > 0.0).map(|speed| {
            let remaining = (expected.seconds - processed.seconds).max(0.0);
            TimeSpec::from_seconds(remaining / speed).to_duration()
        });

        Self {
            percent,
            processed,
            expected,
            eta,
            finished: false,
        }
    }

    /// Estimate before ffmpeg has written anything
    pub fn not_started(expected: TimeSpec) -> Self {
        Self {
            percent: 0.0,
            processed: TimeSpec::zero(),
            expected,
            eta: None,
            finished: false,
        }
    }
}

/// Progress callback trait for UI integration
pub trait ProgressCallback: Send + Sync {
    /// Called once the job has been accepted
    fn on_start(&self, job: &JobHandle);

    /// Called whenever a newer estimate is available
    fn on_progress(&self, estimate: &ProgressEstimate);

    /// Called when the job finished, successfully or not
    fn on_complete(&self, outcome: &JobOutcome);

    /// Called when the job could not be observed to the end
    fn on_error(&self, error: &str);
}

/// Console progress callback
pub struct ConsoleProgressCallback {
    verbose: bool,
}

impl ConsoleProgressCallback {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressCallback for ConsoleProgressCallback {
    fn on_start(&self, job: &JobHandle) {
        eprintln!(
            "Joining into {} ({} strategy, {} expected)",
            job.output.display(),
            job.strategy,
            job.expected_duration
        );
        if self.verbose {
            eprintln!("  progress file: {}", job.progress_path.display());
        }
    }

    fn on_progress(&self, estimate: &ProgressEstimate) {
        let bar_length = 30;
        let filled = ((estimate.percent / 100.0) * bar_length as f64) as usize;
        let bar = "#".repeat(filled) + &"-".repeat(bar_length - filled.min(bar_length));
        let eta = estimate
            .eta
            .map(|d| format!(" ETA {:.0}s", d.as_secs_f64()))
            .unwrap_or_default();
        eprint!(
            "\r[{}] {:>5.1}% {} / {}{}",
            bar, estimate.percent, estimate.processed, estimate.expected, eta
        );
    }

    fn on_complete(&self, outcome: &JobOutcome) {
        eprintln!();
        if outcome.success() {
            eprintln!(
                "Done: {} in {:.1}s",
                outcome.output.display(),
                outcome.elapsed.as_secs_f64()
            );
        } else {
            eprintln!("ffmpeg exited with {:?}", outcome.exit_code);
            if self.verbose {
                for line in &outcome.stderr_tail {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    fn on_error(&self, error: &str) {
        eprintln!();
        eprintln!("Error: {}", error);
    }
}

/// JSON progress callback, one event object per line on stdout
pub struct JsonProgressCallback;

impl ProgressCallback for JsonProgressCallback {
    fn on_start(&self, job: &JobHandle) {
        let event = serde_json::json!({
            "event": "start",
            "job_id": job.id,
            "strategy": job.strategy,
            "output": job.output,
            "progress_file": job.progress_path,
            "expected_seconds": job.expected_duration.seconds,
            "accepted_at": job.accepted_at,
        });
        println!("{}", event);
    }

    fn on_progress(&self, estimate: &ProgressEstimate) {
        let event = serde_json::json!({ "event": "progress", "estimate": estimate });
        println!("{}", event);
    }

    fn on_complete(&self, outcome: &JobOutcome) {
        let event = serde_json::json!({
            "event": "complete",
            "success": outcome.success(),
            "outcome": outcome,
        });
        println!("{}", event);
    }

    fn on_error(&self, error: &str) {
        let event = serde_json::json!({ "event": "error", "message": error });
        println!("{}", event);
    }
}

/// No-op progress callback
pub struct NoOpProgressCallback;

impl ProgressCallback for NoOpProgressCallback {
    fn on_start(&self, _job: &JobHandle) {}
    fn on_progress(&self, _estimate: &ProgressEstimate) {}
    fn on_complete(&self, _outcome: &JobOutcome) {}
    fn on_error(&self, _error: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_BLOCKS: &str = "frame=10\nfps=25.0\nout_time_us=2000000\nout_time_ms=2000000\nout_time=00:00:02.000000\ntotal_size=4096\nspeed=2.00x\nprogress=continue\nframe=50\nfps=25.0\nout_time_us=5000000\nout_time_ms=5000000\nout_time=00:00:05.000000\ntotal_size=8192\nspeed=2.5x\nprogress=continue\n";

    #[test]
    fn test_last_complete_block_wins() {
        let snapshot = ProgressSnapshot::parse(TWO_BLOCKS).unwrap();
        assert_eq!(snapshot.frame, Some(50));
        assert_eq!(snapshot.out_time, Some(TimeSpec::from_seconds(5.0)));
        assert_eq!(snapshot.total_size, Some(8192));
        assert_eq!(snapshot.speed, Some(2.5));
        assert!(!snapshot.finished);
    }

    #[test]
    fn test_partial_trailing_block_is_ignored() {
        let contents = format!("{}frame=99\nout_time_us=9000000\n", TWO_BLOCKS);
        let snapshot = ProgressSnapshot::parse(&contents).unwrap();
        assert_eq!(snapshot.frame, Some(50));
    }

    #[test]
    fn test_no_complete_block() {
        assert_eq!(ProgressSnapshot::parse(""), None);
        assert_eq!(ProgressSnapshot::parse("frame=1\nout_time_us=1\n"), None);
    }

    #[test]
    fn test_out_time_fallbacks() {
        let ms_only = ProgressSnapshot::parse("out_time_ms=1500000\nprogress=continue\n").unwrap();
        assert_eq!(ms_only.out_time, Some(TimeSpec::from_seconds(1.5)));

        let text_only = ProgressSnapshot::parse("out_time=00:01:02.500000\nprogress=continue\n").unwrap();
        assert_eq!(text_only.out_time, Some(TimeSpec::from_seconds(62.5)));

        let not_available = ProgressSnapshot::parse("out_time_us=N/A\nspeed=N/A\nprogress=continue\n").unwrap();
        assert_eq!(not_available.out_time, None);
        assert_eq!(not_available.speed, None);
    }

    #[test]
    fn test_end_marker() {
        let snapshot = ProgressSnapshot::parse("out_time_us=3000000\nprogress=end\n").unwrap();
        assert!(snapshot.finished);

        let estimate = ProgressEstimate::from_snapshot(&snapshot, TimeSpec::from_seconds(30.0));
        assert_eq!(estimate.percent, 100.0);
        assert!(estimate.finished);
    }

    #[test]
    fn test_estimate_percent_and_eta() {
        let snapshot = ProgressSnapshot::parse(TWO_BLOCKS).unwrap();
        let estimate = ProgressEstimate::from_snapshot(&snapshot, TimeSpec::from_seconds(20.0));
        assert_eq!(estimate.percent, 25.0);
        assert_eq!(estimate.eta, Some(Duration::from_secs(6)));
    }

    #[test]
    fn test_estimate_is_clamped() {
        let snapshot = ProgressSnapshot::parse("out_time_us=50000000\nprogress=continue\n").unwrap();
        let estimate = ProgressEstimate::from_snapshot(&snapshot, TimeSpec::from_seconds(30.0));
        assert_eq!(estimate.percent, 100.0);
        assert!(!estimate.finished);
    }

    #[test]
    fn test_zero_expected_duration() {
        let snapshot = ProgressSnapshot::parse("out_time_us=5000000\nprogress=continue\n").unwrap();
        let estimate = ProgressEstimate::from_snapshot(&snapshot, TimeSpec::zero());
        assert_eq!(estimate.percent, 0.0);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ProgressSnapshot::read(&dir.path().join("nope")).unwrap(), None);
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress");
        std::fs::write(&path, TWO_BLOCKS).unwrap();
        let snapshot = ProgressSnapshot::read(&path).unwrap().unwrap();
        assert_eq!(snapshot.frame, Some(50));
    }
}
