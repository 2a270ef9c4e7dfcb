use std::collections::HashMap;

/// Canonical class ordering shared by scoring, aggregation, and diagnosis.
/// Index 9 (`"N"`) is the binary classifier's column, spliced into the
/// arrhythmia classifier's 21-column output; renumbering here must be
/// propagated to the diagnosis rules below.
pub const CANONICAL_CLASS_NAMES: [&str; 22] = [
    "!", "\"", "+", "/", "A", "E", "F", "J", "L", "N", //
    "Q", "R", "V", "[", "]", "a", "e", "f", "j", "x", "|", "~",
];

/// Where the binary classifier's single column lands in the fused vector.
pub const BINARY_INSERT_POSITION: usize = 9;

// Symbol identities shared between the template scorer's library keys and
// the diagnosis rule engine.
pub const SYM_PVC: &str = "V";
pub const SYM_LBBB: &str = "L";
pub const SYM_RBBB: &str = "R";
pub const SYM_PACED: &str = "/";
pub const SYM_VF_ONSET: &str = "[";
pub const SYM_VF_OFFSET: &str = "]";

// Diagnosis thresholds.
pub const PVC_FRACTION_THRESHOLD: f64 = 0.10;
pub const PACED_FRACTION_THRESHOLD: f64 = 0.80;
pub const TACHY_RATE_LIMIT: f32 = 100.0;
pub const BRADY_RATE_LIMIT: f32 = 50.0;
pub const RATE_FRACTION_THRESHOLD: f64 = 0.05;

/// Convert a sparse per-symbol distance map into the fixed-width canonical
/// vector. Missing symbols become `+inf` distance so they can never win a
/// best-match comparison downstream.
pub fn canonical_distance_vector(
    scores: &HashMap<String, f32>,
    class_names: &[&str],
) -> Vec<f32> {
    class_names
        .iter()
        .map(|&symbol| scores.get(symbol).copied().unwrap_or(f32::INFINITY))
        .collect()
}
