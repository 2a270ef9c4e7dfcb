pub mod resample;

use crate::config::ExtractionConfig;
use crate::error::AnalysisError;
use crate::types::Record;

use self::resample::{resample_fft, resize_cyclic};

/// Signals whose standard deviation falls below this are treated as flat
/// (disconnected lead, saturated sensor) and skipped whole.
pub const FLAT_SIGNAL_EPSILON: f64 = 1e-6;
const MIN_SIGNAL_LEN: usize = 2;

/// Carves fixed-duration windows around fiducial points, edge-padding at
/// the record boundaries and resampling to the canonical target rate.
#[derive(Debug, Clone)]
pub struct SegmentExtractor {
    config: ExtractionConfig,
}

impl SegmentExtractor {
    pub fn new(config: ExtractionConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Record-level skip checks. Returns the configured channel when the
    /// record is usable; `None` skips the record (logged, never fatal).
    pub fn validate_signal<'a>(&self, record: &'a Record) -> Option<&'a [f32]> {
        if !(record.sampling_rate_hz > 0.0) {
            tracing::warn!(record = %record.name, "missing sampling rate, skipping");
            return None;
        }
        let Some(signal) = record.channel(self.config.channel_index) else {
            tracing::warn!(
                record = %record.name,
                channel = self.config.channel_index,
                channels = record.channels.len(),
                "channel out of range, skipping"
            );
            return None;
        };
        if signal.len() < MIN_SIGNAL_LEN {
            tracing::warn!(record = %record.name, len = signal.len(), "signal too short, skipping");
            return None;
        }
        if signal_std(signal) < FLAT_SIGNAL_EPSILON {
            tracing::warn!(record = %record.name, "flat signal, skipping");
            return None;
        }
        Some(signal)
    }

    /// Extract one fiducial-centered segment from a record, or skip it when
    /// the record fails validation. A skip never aborts the batch.
    pub fn extract(&self, record: &Record, fiducial_sample: usize) -> Option<Vec<f32>> {
        let signal = self.validate_signal(record)?;
        Some(self.carve(signal, record.sampling_rate_hz, fiducial_sample))
    }

    /// Window carve for a signal that already passed `validate_signal`.
    /// Out-of-bounds window edges are clipped and the missing samples
    /// restored by edge padding, so the result always has the exact length
    /// `round((pre+post) * fs_target)`.
    pub fn carve(&self, signal: &[f32], fs_orig: f64, fiducial_sample: usize) -> Vec<f32> {
        let cfg = &self.config;
        let desired_orig = ((cfg.pre_sec + cfg.post_sec) * fs_orig).round() as usize;
        let desired_target = cfg.target_len();

        let start = fiducial_sample as i64 - (cfg.pre_sec * fs_orig).round() as i64;
        let end = fiducial_sample as i64 + (cfg.post_sec * fs_orig).round() as i64;
        let last = signal.len() as i64 - 1;
        let start_clip = start.clamp(0, last) as usize;
        let end_clip = end.clamp(start_clip as i64 + 1, signal.len() as i64) as usize;

        let pad_left = (start_clip as i64 - start).max(0) as usize;
        let pad_right = (end - end_clip as i64).max(0) as usize;
        let retained = &signal[start_clip..end_clip];

        let mut segment = Vec::with_capacity(pad_left + retained.len() + pad_right);
        segment.extend(std::iter::repeat(retained[0]).take(pad_left));
        segment.extend_from_slice(retained);
        segment.extend(std::iter::repeat(retained[retained.len() - 1]).take(pad_right));

        // Rounding of the two window edges can leave the padded window one
        // sample off `desired_orig`; force the exact length before resampling.
        match segment.len().cmp(&desired_orig) {
            std::cmp::Ordering::Greater => segment.truncate(desired_orig),
            std::cmp::Ordering::Less => {
                let edge = segment[segment.len() - 1];
                segment.resize(desired_orig, edge);
            }
            std::cmp::Ordering::Equal => {}
        }

        if (fs_orig - cfg.fs_target_hz).abs() > f64::EPSILON {
            resample_fft(&segment, desired_target)
        } else if segment.len() != desired_target {
            resize_cyclic(&segment, desired_target)
        } else {
            segment
        }
    }

    /// Long event-centered window (onset given in elapsed seconds). Clips
    /// to the record bounds without padding and resamples proportionally,
    /// so the output length varies with how much signal was available.
    pub fn extract_event_window(
        &self,
        signal: &[f32],
        fs_orig: f64,
        onset_sec: f64,
    ) -> Option<Vec<f32>> {
        let cfg = &self.config;
        let onset = (onset_sec * fs_orig).round() as i64;
        let start = (onset - (cfg.pre_sec * fs_orig).round() as i64).max(0) as usize;
        let end = ((onset + (cfg.post_sec * fs_orig).round() as i64).max(0) as usize)
            .min(signal.len());
        if start >= end {
            tracing::warn!(onset_sec, "event window empty after clipping, skipping");
            return None;
        }

        let window = &signal[start..end];
        if (fs_orig - cfg.fs_target_hz).abs() > f64::EPSILON {
            let target = (window.len() as f64 * cfg.fs_target_hz / fs_orig).round() as usize;
            Some(resample_fft(window, target))
        } else {
            Some(window.to_vec())
        }
    }
}

/// Population standard deviation, accumulated in f64.
pub fn signal_std(signal: &[f32]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let n = signal.len() as f64;
    let mean = signal.iter().map(|&x| x as f64).sum::<f64>() / n;
    let var = signal
        .iter()
        .map(|&x| {
            let d = x as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    var.sqrt()
}
