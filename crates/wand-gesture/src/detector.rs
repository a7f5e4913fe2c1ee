use crate::parse::{parse_sample, parse_window, MalformedSampleError};
use crate::ring::{SampleRing, WindowSnapshot};
use crate::schema::{BUFFERED_WINDOW_SAMPLES, MIN_WINDOW_SAMPLES, STATELESS_WINDOW_SAMPLES};
use crate::types::{GestureResult, Sample, TwistScan};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureError {
    #[error(transparent)]
    Malformed(#[from] MalformedSampleError),
    #[error("Window of {len} samples is too short to contain a transition")]
    WindowTooShort { len: usize },
}

/// Scan consecutive sample pairs for negative-to-positive flips on Y and Z.
///
/// Each flag latches on its first occurrence and is never cleared, so the two
/// flips may happen at different indices and in either order.
pub fn scan(samples: &[Sample]) -> Result<TwistScan, GestureError> {
    if samples.len() < MIN_WINDOW_SAMPLES {
        return Err(GestureError::WindowTooShort { len: samples.len() });
    }

    let mut scan = TwistScan::default();
    for (i, pair) in samples.windows(2).enumerate() {
        let (prev, cur) = (pair[0], pair[1]);
        if scan.y_flip_at.is_none() && prev.y < 0 && cur.y > 0 {
            scan.y_flip_at = Some(i + 1);
        }
        if scan.z_flip_at.is_none() && prev.z < 0 && cur.z > 0 {
            scan.z_flip_at = Some(i + 1);
        }
    }
    Ok(scan)
}

pub fn detect_twist(samples: &[Sample]) -> Result<GestureResult, GestureError> {
    let scan = scan(samples)?;
    tracing::trace!(
        y_flip_at = ?scan.y_flip_at,
        z_flip_at = ?scan.z_flip_at,
        len = samples.len(),
        "Window scanned"
    );
    Ok(scan.result())
}

/// Per-message detector: every payload carries a full window.
///
/// Holds no state between calls, so one instance can be shared freely.
#[derive(Debug, Clone, Copy)]
pub struct GestureDetector {
    window_samples: usize,
}

impl GestureDetector {
    /// Fails when `window_samples` could never hold a transition.
    pub fn new(window_samples: usize) -> Result<Self, GestureError> {
        if window_samples < MIN_WINDOW_SAMPLES {
            return Err(GestureError::WindowTooShort {
                len: window_samples,
            });
        }
        Ok(Self { window_samples })
    }

    /// Parse `payload` as exactly one window and evaluate it.
    pub fn evaluate(&self, payload: &str) -> Result<GestureResult, GestureError> {
        let samples = parse_window(payload, self.window_samples)?;
        detect_twist(&samples)
    }
}

impl Default for GestureDetector {
    fn default() -> Self {
        Self {
            window_samples: STATELESS_WINDOW_SAMPLES,
        }
    }
}

/// Detector fed one sample per message.
///
/// Samples accumulate in an owned ring; once it fills, the full window is
/// evaluated from a snapshot and the ring starts over.
#[derive(Debug, Clone)]
pub struct BufferedDetector {
    ring: SampleRing,
}

impl BufferedDetector {
    /// Fails when `capacity` could never hold a transition.
    pub fn new(capacity: usize) -> Result<Self, GestureError> {
        Ok(Self {
            ring: SampleRing::new(capacity)?,
        })
    }

    /// Store one `"x y z"` record.
    ///
    /// Returns `Ok(None)` while the window is still filling. Malformed
    /// records are rejected and not stored.
    pub fn push(&mut self, record: &str) -> Result<Option<GestureResult>, GestureError> {
        let sample = parse_sample(record)?;
        match self.ring.push(sample) {
            Some(snapshot) => evaluate_snapshot(&snapshot).map(Some),
            None => Ok(None),
        }
    }

    /// Samples stored since the last evaluation.
    pub fn snapshot(&self) -> WindowSnapshot {
        self.ring.snapshot()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    pub fn reset(&mut self) {
        self.ring.clear();
    }
}

impl Default for BufferedDetector {
    fn default() -> Self {
        Self {
            ring: SampleRing::sized(BUFFERED_WINDOW_SAMPLES),
        }
    }
}

fn evaluate_snapshot(snapshot: &WindowSnapshot) -> Result<GestureResult, GestureError> {
    detect_twist(snapshot.samples())
}
