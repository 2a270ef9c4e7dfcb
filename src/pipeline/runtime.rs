use std::sync::Arc;

use rayon::prelude::*;

use crate::error::AnalysisError;
use crate::pipeline::traits::{FiducialSource, RecordReader};
use crate::segment::SegmentExtractor;
use crate::templates::{score_segment, TemplateLibrary};
use crate::types::{ExtractedSegment, FiducialKind, FiducialPoint};

/// One logical pass over a record set. Records are independent, so the
/// pass fans out across rayon workers; the template library is shared
/// read-only and extraction keeps no mutable state. Per-record failures
/// are logged and skipped — they never abort the pass.
pub struct BatchPipeline {
    pub(crate) extractor: SegmentExtractor,
    pub(crate) reader: Box<dyn RecordReader>,
    pub(crate) fiducials: FiducialSource,
    pub(crate) library: Option<Arc<TemplateLibrary>>,
}

#[derive(Debug, Default)]
pub struct ExtractionOutput {
    /// All extracted segments in manifest order.
    pub segments: Vec<ExtractedSegment>,
    pub records_processed: usize,
    pub records_failed: usize,
}

impl BatchPipeline {
    pub fn run(&self, record_names: &[String]) -> ExtractionOutput {
        let per_record: Vec<Option<Vec<ExtractedSegment>>> = record_names
            .par_iter()
            .map(|name| match self.process_record(name) {
                Ok(segments) => Some(segments),
                Err(err) => {
                    tracing::warn!(record = %name, error = %err, "record failed, skipping");
                    None
                }
            })
            .collect();

        let mut output = ExtractionOutput::default();
        for result in per_record {
            match result {
                Some(segments) => {
                    output.records_processed += 1;
                    output.segments.extend(segments);
                }
                None => output.records_failed += 1,
            }
        }
        tracing::info!(
            records = record_names.len(),
            failed = output.records_failed,
            segments = output.segments.len(),
            "extraction pass complete"
        );
        output
    }

    fn process_record(&self, name: &str) -> Result<Vec<ExtractedSegment>, AnalysisError> {
        let record = self.reader.read(name)?;
        let Some(signal) = self.extractor.validate_signal(&record) else {
            return Ok(Vec::new());
        };
        let fs = record.sampling_rate_hz;

        match &self.fiducials {
            FiducialSource::Detector(detector) => {
                let beats = detector.detect(&record, signal)?;
                if beats.is_empty() {
                    tracing::debug!(record = %name, "no fiducial points supplied, skipping");
                    return Ok(Vec::new());
                }
                Ok(beats
                    .into_iter()
                    .map(|sample| {
                        let samples = self.extractor.carve(signal, fs, sample);
                        let scores = self
                            .library
                            .as_deref()
                            .map(|library| score_segment(&samples, library));
                        ExtractedSegment {
                            record: name.to_string(),
                            fiducial: FiducialPoint {
                                sample,
                                kind: FiducialKind::BeatApex,
                            },
                            samples,
                            scores,
                        }
                    })
                    .collect())
            }
            FiducialSource::OnsetSeconds(onsets) => {
                let Some(&onset_sec) = onsets.get(name) else {
                    tracing::debug!(record = %name, "record has no onset entry, skipping");
                    return Ok(Vec::new());
                };
                let Some(samples) = self.extractor.extract_event_window(signal, fs, onset_sec)
                else {
                    return Ok(Vec::new());
                };
                tracing::debug!(record = %name, samples = samples.len(), "extracted event window");
                Ok(vec![ExtractedSegment {
                    record: name.to_string(),
                    fiducial: FiducialPoint {
                        sample: (onset_sec * fs).round() as usize,
                        kind: FiducialKind::EventOnset,
                    },
                    samples,
                    scores: None,
                }])
            }
        }
    }
}
