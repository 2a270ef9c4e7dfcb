use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AnalysisError;
use crate::pipeline::traits::{FiducialDetector, RecordReader};
use crate::types::Record;

pub const SIGNAL_DATASET: &str = "signal";
pub const SAMPLING_RATE_ATTR: &str = "fs";

/// Record reader over a directory of per-record HDF5 containers
/// (`<root>/<name>.h5`, 2-D `signal` dataset of channels x samples, `fs`
/// attribute). Read failures are per-record and recoverable.
pub struct Hdf5RecordReader {
    root: PathBuf,
}

impl Hdf5RecordReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.h5"))
    }
}

impl RecordReader for Hdf5RecordReader {
    fn read(&self, name: &str) -> Result<Record, AnalysisError> {
        let path = self.record_path(name);
        let file = hdf5::File::open(&path)
            .map_err(|e| AnalysisError::hdf5("opening record container", e))?;
        let dataset = file
            .dataset(SIGNAL_DATASET)
            .map_err(|e| AnalysisError::hdf5("reading record signal", e))?;

        let shape = dataset.shape();
        if shape.len() != 2 {
            return Err(AnalysisError::runtime(
                "reading record signal",
                format!("expected channels x samples, got shape {shape:?}"),
            ));
        }
        let raw: Vec<f32> = dataset
            .read_raw()
            .map_err(|e| AnalysisError::hdf5("reading record signal", e))?;
        let samples_per_channel = shape[1];
        let channels = raw
            .chunks(samples_per_channel.max(1))
            .map(<[f32]>::to_vec)
            .collect();

        let sampling_rate_hz = file
            .attr(SAMPLING_RATE_ATTR)
            .and_then(|attr| attr.read_scalar::<f64>())
            .map_err(|e| AnalysisError::hdf5("reading record sampling rate", e))?;

        Ok(Record {
            name: name.to_string(),
            sampling_rate_hz,
            channels,
        })
    }
}

/// Precomputed beat indices per record, loaded from a JSON table. This is
/// a lookup standing in for an external R-peak detector; no detection
/// algorithm lives in this crate.
pub struct BeatTable {
    beats: HashMap<String, Vec<usize>>,
}

impl BeatTable {
    pub fn new(beats: HashMap<String, Vec<usize>>) -> Self {
        Self { beats }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, AnalysisError> {
        let data =
            fs::read_to_string(path).map_err(|e| AnalysisError::io("reading beat table", e))?;
        let beats = serde_json::from_str(&data)
            .map_err(|e| AnalysisError::json("parsing beat table", e))?;
        Ok(Self { beats })
    }
}

impl FiducialDetector for BeatTable {
    fn detect(&self, record: &Record, _signal: &[f32]) -> Result<Vec<usize>, AnalysisError> {
        self.beats.get(&record.name).cloned().ok_or_else(|| {
            AnalysisError::runtime("looking up beats", format!("no entry for '{}'", record.name))
        })
    }
}

/// Caller-supplied event-onset table: record name -> onset seconds.
pub fn load_onset_table(path: &Path) -> Result<HashMap<String, f64>, AnalysisError> {
    let data = fs::read_to_string(path).map_err(|e| AnalysisError::io("reading onset table", e))?;
    serde_json::from_str(&data).map_err(|e| AnalysisError::json("parsing onset table", e))
}
