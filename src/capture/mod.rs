//! Periodic frame capture into a flat image directory.
//!
//! Frames come from a [`FrameSource`] as already-encoded image bytes; decoding
//! and display belong to whoever implements the source. Saved frames are named
//! `frame_<stamp>_<index>.<ext>` and are meant to be labeled and then split
//! with [`crate::split`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::error::YoloSplitError;

/// Delay before the first capture, giving the camera time to settle.
pub const DEFAULT_WARMUP: Duration = Duration::from_secs(10);

/// A stream of encoded frames.
pub trait FrameSource {
    /// The next frame, or `None` once the stream has ended.
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, YoloSplitError>;
}

impl<I> FrameSource for I
where
    I: Iterator<Item = Vec<u8>>,
{
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, YoloSplitError> {
        Ok(self.next())
    }
}

/// Elapsed time since an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Monotonic wall clock.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Capture options.
#[derive(Clone, Debug)]
pub struct CaptureOptions {
    pub output_dir: PathBuf,
    /// Total time to keep pulling frames.
    pub duration: Duration,
    /// Time between saved frames.
    pub interval: Duration,
    pub warmup: Duration,
    /// File extension for saved frames, without the dot.
    pub extension: String,
    /// Session tag embedded in every file name.
    pub stamp: String,
}

impl CaptureOptions {
    /// Options with default warm-up, `jpg` extension and a local-time stamp.
    pub fn new(output_dir: impl Into<PathBuf>, duration: Duration, interval: Duration) -> Self {
        Self {
            output_dir: output_dir.into(),
            duration,
            interval,
            warmup: DEFAULT_WARMUP,
            extension: "jpg".to_string(),
            stamp: session_stamp(),
        }
    }
}

/// What a capture run produced.
#[derive(Clone, Debug, Default)]
pub struct CaptureSummary {
    /// Frames pulled from the source.
    pub frames_read: usize,
    /// Paths of saved frames, in capture order.
    pub saved: Vec<PathBuf>,
}

/// Local time as `YYYYmmdd-HHMMSS`.
pub fn session_stamp() -> String {
    chrono::Local::now().format("%Y%m%d-%H%M%S").to_string()
}

/// Validate capture options before running.
pub fn validate_capture_options(opts: &CaptureOptions) -> Result<(), YoloSplitError> {
    if opts.interval.is_zero() {
        return Err(YoloSplitError::InvalidCaptureParams {
            message: "interval must be greater than zero".to_string(),
        });
    }
    if opts.duration.is_zero() {
        return Err(YoloSplitError::InvalidCaptureParams {
            message: "duration must be greater than zero".to_string(),
        });
    }
    if opts.extension.is_empty() || opts.extension.contains(['.', '/', '\\']) {
        return Err(YoloSplitError::InvalidCaptureParams {
            message: format!("invalid frame extension '{}'", opts.extension),
        });
    }
    Ok(())
}

/// Pull frames from `source` and save one every `interval`, after `warmup`.
///
/// Stops when the source ends or `duration` has elapsed. A frame that arrives
/// late is still saved, but the slots it overran are skipped rather than
/// filled by the next frames.
pub fn collect_frames<S, C>(
    source: &mut S,
    clock: &C,
    opts: &CaptureOptions,
) -> Result<CaptureSummary, YoloSplitError>
where
    S: FrameSource + ?Sized,
    C: Clock + ?Sized,
{
    validate_capture_options(opts)?;
    fs::create_dir_all(&opts.output_dir).map_err(YoloSplitError::Io)?;

    let start = clock.now();
    let mut next_capture = opts.warmup;
    let mut summary = CaptureSummary::default();

    loop {
        let elapsed = clock.now().saturating_sub(start);
        if elapsed >= opts.duration {
            break;
        }

        let Some(frame) = source.next_frame()? else {
            debug!("frame source ended after {} frame(s)", summary.frames_read);
            break;
        };
        summary.frames_read += 1;

        let elapsed = clock.now().saturating_sub(start);
        if elapsed < next_capture {
            continue;
        }

        let path = frame_path(&opts.output_dir, &opts.stamp, summary.saved.len(), &opts.extension);
        fs::write(&path, &frame).map_err(YoloSplitError::Io)?;
        info!(
            "saved frame #{} at {:.4}s",
            summary.saved.len(),
            elapsed.as_secs_f64()
        );
        summary.saved.push(path);

        next_capture = next_slot_after(next_capture, elapsed, opts.interval);
    }

    Ok(summary)
}

/// First slot `current + k * interval` (k >= 1) strictly after `elapsed`.
///
/// Saturates at `Duration::MAX` instead of overflowing.
fn next_slot_after(current: Duration, elapsed: Duration, interval: Duration) -> Duration {
    let interval_ns = interval.as_nanos().max(1);
    let behind = elapsed.saturating_sub(current).as_nanos() / interval_ns;
    let next_ns = interval_ns
        .saturating_mul(behind.saturating_add(1))
        .saturating_add(current.as_nanos());
    duration_from_nanos(next_ns)
}

fn duration_from_nanos(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    match u64::try_from(nanos / NANOS_PER_SEC) {
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}

fn frame_path(dir: &Path, stamp: &str, index: usize, extension: &str) -> PathBuf {
    dir.join(format!("frame_{stamp}_{index}.{extension}"))
}
