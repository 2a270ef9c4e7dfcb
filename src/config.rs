use crate::error::AnalysisError;

/// Window geometry for fiducial-centered extraction.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub fs_target_hz: f64,
    pub pre_sec: f64,
    pub post_sec: f64,
    pub channel_index: usize,
}

impl ExtractionConfig {
    pub const DEFAULT_TARGET_RATE_HZ: f64 = 360.0;
    pub const DEFAULT_PRE_SEC: f64 = 0.25;
    pub const DEFAULT_POST_SEC: f64 = 0.25;

    /// Segment length at the canonical target rate.
    pub fn target_len(&self) -> usize {
        ((self.pre_sec + self.post_sec) * self.fs_target_hz).round() as usize
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.fs_target_hz > 0.0) {
            return Err(AnalysisError::invalid_input(format!(
                "target sampling rate must be positive, got {}",
                self.fs_target_hz
            )));
        }
        if self.pre_sec < 0.0 || self.post_sec < 0.0 {
            return Err(AnalysisError::invalid_input(format!(
                "window seconds must be non-negative, got pre={} post={}",
                self.pre_sec, self.post_sec
            )));
        }
        if self.target_len() == 0 {
            return Err(AnalysisError::invalid_input(
                "window rounds to zero samples at the target rate",
            ));
        }
        Ok(())
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fs_target_hz: Self::DEFAULT_TARGET_RATE_HZ,
            pre_sec: Self::DEFAULT_PRE_SEC,
            post_sec: Self::DEFAULT_POST_SEC,
            channel_index: 0,
        }
    }
}

/// Knobs for batched statistical analysis of classifier outputs.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub batch_size: usize,
    /// Confidence level for the per-class interval, e.g. 0.95.
    pub confidence_level: f64,
}

impl AnalysisConfig {
    pub const DEFAULT_BATCH_SIZE: usize = 1024;
    pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.batch_size == 0 {
            return Err(AnalysisError::invalid_input("batch size must be non-zero"));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(AnalysisError::invalid_input(format!(
                "confidence level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            batch_size: Self::DEFAULT_BATCH_SIZE,
            confidence_level: Self::DEFAULT_CONFIDENCE_LEVEL,
        }
    }
}
