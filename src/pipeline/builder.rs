use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ExtractionConfig;
use crate::error::AnalysisError;
use crate::pipeline::runtime::BatchPipeline;
use crate::pipeline::traits::{FiducialSource, RecordReader};
use crate::segment::SegmentExtractor;
use crate::templates::TemplateLibrary;

pub struct BatchPipelineBuilder {
    config: ExtractionConfig,
    reader: Option<Box<dyn RecordReader>>,
    fiducials: Option<FiducialSource>,
    library: Option<Arc<TemplateLibrary>>,
    library_path: Option<PathBuf>,
}

impl BatchPipelineBuilder {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            reader: None,
            fiducials: None,
            library: None,
            library_path: None,
        }
    }

    pub fn with_reader(mut self, reader: Box<dyn RecordReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn with_fiducial_source(mut self, fiducials: FiducialSource) -> Self {
        self.fiducials = Some(fiducials);
        self
    }

    /// Score every beat segment against an already-loaded library.
    pub fn with_template_library(mut self, library: Arc<TemplateLibrary>) -> Self {
        self.library = Some(library);
        self
    }

    /// Load the library from an HDF5 container at build time. A missing or
    /// malformed container is fatal, not a per-record skip.
    pub fn with_template_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<BatchPipeline, AnalysisError> {
        let extractor = SegmentExtractor::new(self.config)?;
        let reader = self
            .reader
            .ok_or_else(|| AnalysisError::invalid_input("pipeline needs a record reader"))?;
        let fiducials = self
            .fiducials
            .ok_or_else(|| AnalysisError::invalid_input("pipeline needs a fiducial source"))?;

        let library = match (self.library, self.library_path) {
            (Some(library), _) => Some(library),
            (None, Some(path)) => Some(Arc::new(TemplateLibrary::load(&path)?)),
            (None, None) => None,
        };

        Ok(BatchPipeline {
            extractor,
            reader,
            fiducials,
            library,
        })
    }
}
