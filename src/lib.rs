pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod segment;
pub mod templates;
pub mod types;

pub use analysis::{
    analyze_events, build_report, canonical_distance_vector, diagnose, fuse_scores,
    insert_column, AggregateStats, AnalysisReport, Diagnosis, ScoreAccumulator,
    CANONICAL_CLASS_NAMES,
};
pub use config::{AnalysisConfig, ExtractionConfig};
pub use error::AnalysisError;
pub use io::{read_manifest, write_beat_artifact, write_event_artifact};
pub use pipeline::{
    BatchPipeline, BatchPipelineBuilder, Classifier, ExtractionOutput, FiducialDetector,
    FiducialSource, RecordReader,
};
pub use segment::SegmentExtractor;
pub use templates::{score_segment, TemplateLibrary};
pub use types::{ExtractedSegment, FiducialKind, FiducialPoint, Record};
