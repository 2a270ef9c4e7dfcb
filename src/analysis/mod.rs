pub mod classes;
pub mod diagnosis;
pub mod fuse;
pub mod report;
pub mod stats;

pub use classes::{canonical_distance_vector, BINARY_INSERT_POSITION, CANONICAL_CLASS_NAMES};
pub use diagnosis::{diagnose, Diagnosis};
pub use fuse::{fuse_scores, insert_column};
pub use report::{build_report, AnalysisReport, ClassStats, ReportMeta};
pub use stats::{AggregateStats, ScoreAccumulator};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::pipeline::traits::Classifier;

const ZSCORE_EPSILON: f64 = 1e-12;

/// Z-score a feature matrix per column across the whole set, with an
/// epsilon-guarded denominator. Classifier inputs are normalized this way
/// before any chunk is dispatched.
pub fn zscore_columns(rows: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, AnalysisError> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let width = first.len();
    if width == 0 || rows.iter().any(|row| row.len() != width) {
        return Err(AnalysisError::invalid_input(
            "feature rows must be non-empty and rectangular",
        ));
    }
    let n = rows.len() as f64;

    let mut mean = vec![0.0f64; width];
    for row in rows {
        for (m, &v) in mean.iter_mut().zip(row.iter()) {
            *m += v as f64;
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut sigma = vec![0.0f64; width];
    for row in rows {
        for (j, &v) in row.iter().enumerate() {
            let d = v as f64 - mean[j];
            sigma[j] += d * d;
        }
    }
    for s in &mut sigma {
        *s = (*s / n).sqrt() + ZSCORE_EPSILON;
    }

    Ok(rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(j, &v)| ((v as f64 - mean[j]) / sigma[j]) as f32)
                .collect()
        })
        .collect())
}

/// Full batched analysis: normalize the feature matrix, drive both
/// classifiers in bounded chunks, fuse and accumulate every chunk, then
/// finalize the two-pass statistics and apply the diagnosis rules.
pub fn analyze_events(
    features: &[Vec<f32>],
    arrhythmia: &dyn Classifier,
    binary: &dyn Classifier,
    secondary_channel: Option<&[f32]>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    config.validate()?;
    if features.is_empty() {
        return Err(AnalysisError::invalid_input("no feature rows to analyze"));
    }

    let normalized = zscore_columns(features)?;
    let chunk_count = normalized.len().div_ceil(config.batch_size);

    let mut accumulator = ScoreAccumulator::new();
    for (index, chunk) in normalized.chunks(config.batch_size).enumerate() {
        let arrhythmia_rows = arrhythmia.classify(chunk)?;
        let binary_rows = binary.classify(chunk)?;
        let fused = fuse_scores(&arrhythmia_rows, &binary_rows)?;
        accumulator.accumulate(&fused)?;
        tracing::debug!(
            chunk = index + 1,
            chunks = chunk_count,
            rows = accumulator.row_count(),
            "accumulated classifier chunk"
        );
    }

    if accumulator.class_count() != CANONICAL_CLASS_NAMES.len() {
        return Err(AnalysisError::invalid_input(format!(
            "fused width {} does not match the canonical class set ({})",
            accumulator.class_count(),
            CANONICAL_CLASS_NAMES.len()
        )));
    }

    let stats = accumulator.finalize(config.confidence_level)?;
    let predicted = accumulator.predicted_classes();
    let diagnosis = diagnose(&predicted, &CANONICAL_CLASS_NAMES, secondary_channel);
    Ok(build_report(&stats, diagnosis, &CANONICAL_CLASS_NAMES))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstantClassifier {
        width: usize,
        hot: usize,
        hot_value: f32,
    }

    impl Classifier for ConstantClassifier {
        fn classify(&self, batch: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, AnalysisError> {
            Ok(batch
                .iter()
                .map(|_| {
                    let mut row = vec![0.1f32; self.width];
                    row[self.hot] = self.hot_value;
                    row
                })
                .collect())
        }
    }

    #[test]
    fn zscore_centers_every_column() {
        let rows = vec![vec![1.0f32, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]];
        let normalized = zscore_columns(&rows).unwrap();
        for j in 0..2 {
            let mean: f64 = normalized.iter().map(|r| r[j] as f64).sum::<f64>() / 3.0;
            assert!(mean.abs() < 1e-6);
        }
    }

    #[test]
    fn zscore_survives_a_constant_column() {
        let rows = vec![vec![5.0f32, 1.0], vec![5.0, 2.0]];
        let normalized = zscore_columns(&rows).unwrap();
        assert!(normalized.iter().all(|r| r[0].abs() < 1e-3));
    }

    #[test]
    fn zscore_rejects_ragged_input() {
        let rows = vec![vec![1.0f32, 2.0], vec![3.0]];
        assert!(zscore_columns(&rows).is_err());
    }

    #[test]
    fn analyze_events_end_to_end() {
        // Arrhythmia net always votes for its column 11 ("V" once the
        // binary column lands at 9); binary net emits a low score.
        let arrhythmia = ConstantClassifier {
            width: 21,
            hot: 11,
            hot_value: 0.9,
        };
        let binary = ConstantClassifier {
            width: 1,
            hot: 0,
            hot_value: 0.2,
        };
        let features: Vec<Vec<f32>> = (0..50).map(|i| vec![i as f32, (i * 2) as f32]).collect();

        let report = analyze_events(
            &features,
            &arrhythmia,
            &binary,
            None,
            &AnalysisConfig {
                batch_size: 16,
                confidence_level: 0.95,
            },
        )
        .unwrap();

        assert_eq!(report.meta.row_count, 50);
        assert_eq!(report.classes.len(), 22);
        // Column 11 of the arrhythmia output shifts to canonical index 12 ("V").
        assert_eq!(report.classes[12].symbol, "V");
        assert!((report.classes[12].mean - 0.9).abs() < 1e-6);
        assert_eq!(report.diagnosis.frequent_pvcs, Some(true));
        assert_eq!(report.diagnosis.pvc_percent, Some(1.0));
        assert!(!report.diagnosis.vf_detected);
    }

    #[test]
    fn analyze_events_rejects_empty_input() {
        let arrhythmia = ConstantClassifier {
            width: 21,
            hot: 0,
            hot_value: 0.9,
        };
        let binary = ConstantClassifier {
            width: 1,
            hot: 0,
            hot_value: 0.2,
        };
        assert!(analyze_events(
            &[],
            &arrhythmia,
            &binary,
            None,
            &AnalysisConfig::default()
        )
        .is_err());
    }
}
