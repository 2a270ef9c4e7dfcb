use std::collections::HashMap;

/// A multi-channel waveform recording as produced by an external record
/// reader. Read-only once constructed.
#[derive(Debug, Clone)]
pub struct Record {
    pub name: String,
    pub sampling_rate_hz: f64,
    /// One signal per channel; channels share a length.
    pub channels: Vec<Vec<f32>>,
}

impl Record {
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiducialKind {
    /// Heartbeat apex (R peak).
    BeatApex,
    /// Onset of a longer event (e.g. fibrillation onset).
    EventOnset,
}

/// A clinically meaningful time anchor within one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiducialPoint {
    pub sample: usize,
    pub kind: FiducialKind,
}

/// One extracted window at the canonical target rate, plus the per-symbol
/// template distances when the run scored it. `scores` is a sparse map:
/// symbols with no length-compatible template are absent and consumers must
/// tolerate the missing keys.
#[derive(Debug, Clone)]
pub struct ExtractedSegment {
    pub record: String,
    pub fiducial: FiducialPoint,
    pub samples: Vec<f32>,
    pub scores: Option<HashMap<String, f32>>,
}
