use std::collections::HashMap;

use crate::error::AnalysisError;
use crate::types::Record;

/// External record source: resolves a record name to its waveform data.
/// May fail per record; the pipeline skips and continues.
pub trait RecordReader: Send + Sync {
    fn read(&self, name: &str) -> Result<Record, AnalysisError>;
}

/// External fiducial detector. `signal` is the already-validated channel of
/// `record`; implementations return ordered sample indices. Detection
/// algorithms live outside this crate — in-crate implementations are
/// lookups over precomputed tables.
pub trait FiducialDetector: Send + Sync {
    fn detect(&self, record: &Record, signal: &[f32]) -> Result<Vec<usize>, AnalysisError>;
}

/// External classifier capability: one class-score vector per feature row.
/// Opaque beyond the output shape contract used by fusion.
pub trait Classifier: Send + Sync {
    fn classify(&self, batch: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, AnalysisError>;
}

/// Where fiducial points come from: a detector capability, or a
/// caller-supplied map of record name to event-onset seconds.
pub enum FiducialSource {
    Detector(Box<dyn FiducialDetector>),
    OnsetSeconds(HashMap<String, f64>),
}
