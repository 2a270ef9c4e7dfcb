use std::path::Path;
use std::str::FromStr;

use hdf5::types::{VarLenArray, VarLenUnicode};
use serde_json::json;

use crate::error::AnalysisError;
use crate::types::{ExtractedSegment, FiducialKind};

pub const SEGMENTS_DATASET: &str = "X";
pub const RECORDS_DATASET: &str = "records";
pub const ANNOTATIONS_DATASET: &str = "annotations";

/// Write a beat-extraction run: rectangular `X` matrix (`segment_len`
/// columns), parallel `records` names, and per-row `annotations` (the JSON
/// score map when the run scored, fiducial metadata otherwise). An
/// unwritable output path aborts the run.
pub fn write_beat_artifact(
    path: &Path,
    segments: &[ExtractedSegment],
    segment_len: usize,
) -> Result<(), AnalysisError> {
    if let Some(bad) = segments.iter().find(|s| s.samples.len() != segment_len) {
        return Err(AnalysisError::invalid_input(format!(
            "segment from record '{}' has length {}, expected {segment_len}",
            bad.record,
            bad.samples.len()
        )));
    }

    let file = hdf5::File::create(path)
        .map_err(|e| AnalysisError::config("creating output artifact", e))?;

    let mut flat = Vec::with_capacity(segments.len() * segment_len);
    for segment in segments {
        flat.extend_from_slice(&segment.samples);
    }
    let dataset = file
        .new_dataset::<f32>()
        .shape([segments.len(), segment_len])
        .create(SEGMENTS_DATASET)
        .map_err(|e| AnalysisError::hdf5("creating segment matrix", e))?;
    if !flat.is_empty() {
        dataset
            .write_raw(&flat)
            .map_err(|e| AnalysisError::hdf5("writing segment matrix", e))?;
    }

    write_names_and_annotations(&file, segments)?;
    tracing::info!(segments = segments.len(), path = %path.display(), "wrote beat artifact");
    Ok(())
}

/// Write an event-window run: windows vary in length, so `X` is a dataset
/// of variable-length rows.
pub fn write_event_artifact(
    path: &Path,
    segments: &[ExtractedSegment],
) -> Result<(), AnalysisError> {
    let file = hdf5::File::create(path)
        .map_err(|e| AnalysisError::config("creating output artifact", e))?;

    let rows: Vec<VarLenArray<f32>> = segments
        .iter()
        .map(|segment| VarLenArray::from_slice(&segment.samples))
        .collect();
    file.new_dataset_builder()
        .with_data(&rows)
        .create(SEGMENTS_DATASET)
        .map_err(|e| AnalysisError::hdf5("writing segment rows", e))?;

    write_names_and_annotations(&file, segments)?;
    tracing::info!(segments = segments.len(), path = %path.display(), "wrote event artifact");
    Ok(())
}

fn write_names_and_annotations(
    file: &hdf5::File,
    segments: &[ExtractedSegment],
) -> Result<(), AnalysisError> {
    let names = segments
        .iter()
        .map(|segment| to_vlen(&segment.record))
        .collect::<Result<Vec<_>, _>>()?;
    file.new_dataset_builder()
        .with_data(&names)
        .create(RECORDS_DATASET)
        .map_err(|e| AnalysisError::hdf5("writing record names", e))?;

    let annotations = segments
        .iter()
        .map(|segment| to_vlen(&annotation_json(segment)?))
        .collect::<Result<Vec<_>, _>>()?;
    file.new_dataset_builder()
        .with_data(&annotations)
        .create(ANNOTATIONS_DATASET)
        .map_err(|e| AnalysisError::hdf5("writing annotations", e))?;
    Ok(())
}

fn annotation_json(segment: &ExtractedSegment) -> Result<String, AnalysisError> {
    let value = match &segment.scores {
        Some(scores) => serde_json::to_value(scores)
            .map_err(|e| AnalysisError::json("encoding score annotations", e))?,
        None => json!({
            "fiducial_sample": segment.fiducial.sample,
            "kind": match segment.fiducial.kind {
                FiducialKind::BeatApex => "beat",
                FiducialKind::EventOnset => "event",
            },
        }),
    };
    Ok(value.to_string())
}

fn to_vlen(s: &str) -> Result<VarLenUnicode, AnalysisError> {
    VarLenUnicode::from_str(s).map_err(|e| AnalysisError::runtime("encoding string field", e))
}
