// Sampling error taxonomy shared by readers and samplers.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or deriving counters.
///
/// None of these are fatal to the process: samplers log them and drop the
/// affected entity (or the whole family) from the current tick.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The pseudo-file could not be opened or read.
    #[error("source unavailable: {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The pseudo-file was readable but its layout is not what we expect.
    #[error("source unavailable: {}: {reason}", path.display())]
    Schema { path: PathBuf, reason: String },

    /// A numeric field did not parse.
    #[error("parse error: {}: field {field} = {value:?}", path.display())]
    Parse {
        path: PathBuf,
        field: &'static str,
        value: String,
    },

    /// Non-positive time delta between two samples.
    #[error("clock anomaly: previous sample at {previous_ms} ms, now {now_ms} ms")]
    ClockAnomaly { previous_ms: u64, now_ms: u64 },
}

impl SampleError {
    /// True for the "source unavailable" family (missing file or unexpected layout).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. } | Self::Schema { .. })
    }

    pub(crate) fn schema(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = SampleError> = std::result::Result<T, E>;
