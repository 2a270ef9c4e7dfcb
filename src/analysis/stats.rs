use serde::Serialize;
use statrs::function::erf::erf_inv;

use crate::error::AnalysisError;

/// Floor added to the standard error in the interval half-width so a
/// zero-variance class still yields finite bounds.
pub const CI_EPSILON: f64 = 1e-12;

/// Final per-class statistics over the complete batch set.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateStats {
    pub row_count: usize,
    pub class_count: usize,
    pub confidence_level: f64,
    pub mean: Vec<f64>,
    pub variance: Vec<f64>,
    pub std_error: Vec<f64>,
    pub ci_lower: Vec<f64>,
    pub ci_upper: Vec<f64>,
}

/// Consumes fused score rows batch by batch: keeps a running per-class sum
/// and retains every row, because the variance is a two-pass statistic over
/// the full matrix (memory scales with rows x classes). Sums are
/// commutative, so worker output may arrive in any order.
#[derive(Debug, Default)]
pub struct ScoreAccumulator {
    sums: Vec<f64>,
    rows: Vec<Vec<f32>>,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one batch. The whole batch is validated before any state
    /// changes, so a malformed row never leaves a partial update behind.
    pub fn accumulate(&mut self, batch: &[Vec<f32>]) -> Result<(), AnalysisError> {
        let Some(first) = batch.first() else {
            return Ok(());
        };
        let width = if self.sums.is_empty() {
            first.len()
        } else {
            self.sums.len()
        };
        if width == 0 {
            return Err(AnalysisError::invalid_input("score rows must be non-empty"));
        }
        if let Some(bad) = batch.iter().find(|row| row.len() != width) {
            return Err(AnalysisError::invalid_input(format!(
                "score row width {} does not match class count {width}",
                bad.len()
            )));
        }

        if self.sums.is_empty() {
            self.sums = vec![0.0; width];
        }
        for row in batch {
            for (sum, &value) in self.sums.iter_mut().zip(row.iter()) {
                *sum += value as f64;
            }
        }
        self.rows.extend_from_slice(batch);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn class_count(&self) -> usize {
        self.sums.len()
    }

    /// Predicted class per row: arg-max over the canonical vector, ties
    /// resolving to the lowest index.
    pub fn predicted_classes(&self) -> Vec<usize> {
        self.rows
            .iter()
            .map(|row| {
                let mut best = 0usize;
                for (i, &value) in row.iter().enumerate().skip(1) {
                    if value > row[best] {
                        best = i;
                    }
                }
                best
            })
            .collect()
    }

    /// Final two-pass statistics. Only valid once every batch has been
    /// consumed; call it exactly when the run is complete.
    ///
    /// The interval half-width is `-erf_inv(-c) / (std_error + eps)` with
    /// bounds `(sum ± half_width) / N`. This reproduces the source system's
    /// estimator verbatim (see DESIGN.md) and is intentionally not the
    /// textbook normal/Student-t interval.
    pub fn finalize(&self, confidence_level: f64) -> Result<AggregateStats, AnalysisError> {
        let n = self.rows.len();
        if n == 0 {
            return Err(AnalysisError::invalid_input(
                "cannot finalize statistics over zero rows",
            ));
        }
        let width = self.sums.len();
        let n_f = n as f64;

        let mean: Vec<f64> = self.sums.iter().map(|&s| s / n_f).collect();

        let mut variance = vec![0.0f64; width];
        for row in &self.rows {
            for (j, &value) in row.iter().enumerate() {
                let d = value as f64 - mean[j];
                variance[j] += d * d;
            }
        }
        let denom = (n - 1).max(1) as f64;
        for v in &mut variance {
            *v /= denom;
        }

        let std_error: Vec<f64> = variance.iter().map(|&v| (v / n_f).sqrt()).collect();

        let critical = -erf_inv(-confidence_level);
        let mut ci_lower = Vec::with_capacity(width);
        let mut ci_upper = Vec::with_capacity(width);
        for j in 0..width {
            let half_width = critical / (std_error[j] + CI_EPSILON);
            ci_lower.push((self.sums[j] - half_width) / n_f);
            ci_upper.push((self.sums[j] + half_width) / n_f);
        }

        Ok(AggregateStats {
            row_count: n,
            class_count: width,
            confidence_level,
            mean,
            variance,
            std_error,
            ci_lower,
            ci_upper,
        })
    }
}
