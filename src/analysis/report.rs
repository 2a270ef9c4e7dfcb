use chrono::Utc;
use serde::Serialize;

use crate::analysis::diagnosis::Diagnosis;
use crate::analysis::stats::AggregateStats;

pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Serialized summary of one batch analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub schema_version: u32,
    pub meta: ReportMeta,
    /// Per-class statistics in canonical class order.
    pub classes: Vec<ClassStats>,
    pub diagnosis: Diagnosis,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub generated_at: String,
    pub row_count: usize,
    pub class_count: usize,
    pub confidence_level: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassStats {
    pub symbol: String,
    pub mean: f64,
    pub variance: f64,
    pub std_error: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

pub fn build_report(
    stats: &AggregateStats,
    diagnosis: Diagnosis,
    class_names: &[&str],
) -> AnalysisReport {
    debug_assert_eq!(stats.class_count, class_names.len());
    let classes = class_names
        .iter()
        .enumerate()
        .map(|(j, &symbol)| ClassStats {
            symbol: symbol.to_string(),
            mean: stats.mean[j],
            variance: stats.variance[j],
            std_error: stats.std_error[j],
            ci_lower: stats.ci_lower[j],
            ci_upper: stats.ci_upper[j],
        })
        .collect();

    AnalysisReport {
        schema_version: REPORT_SCHEMA_VERSION,
        meta: ReportMeta {
            generated_at: Utc::now().to_rfc3339(),
            row_count: stats.row_count,
            class_count: stats.class_count,
            confidence_level: stats.confidence_level,
        },
        classes,
        diagnosis,
    }
}
