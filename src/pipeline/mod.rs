pub mod builder;
pub mod defaults;
pub mod runtime;
pub mod traits;

pub use builder::BatchPipelineBuilder;
pub use runtime::{BatchPipeline, ExtractionOutput};
pub use traits::{Classifier, FiducialDetector, FiducialSource, RecordReader};
