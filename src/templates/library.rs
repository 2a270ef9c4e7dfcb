use std::collections::HashMap;
use std::path::Path;

use crate::error::AnalysisError;

pub const FEATURES_DATASET: &str = "X_templates";
pub const LABELS_DATASET: &str = "Y_templates";

/// Labeled reference-waveform store: symbol -> ordered set of equal-length
/// template vectors. Loaded once per run and shared read-only (wrap in an
/// `Arc` for concurrent scoring workers); never mutated after load.
///
/// Replicate templates under one symbol are all kept, never averaged, so
/// scoring can pick the best match per symbol.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    buckets: HashMap<String, Vec<Vec<f32>>>,
}

impl TemplateLibrary {
    /// Load from an HDF5 container holding two parallel datasets:
    /// `X_templates` (2-D float matrix, one template per row) and
    /// `Y_templates` (2-D matrix of zero-padded character codes, one label
    /// row per template). Missing or mismatched datasets abort the run.
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let file = hdf5::File::open(path)
            .map_err(|e| AnalysisError::config("opening template library", e))?;

        let features = file.dataset(FEATURES_DATASET).map_err(|e| {
            AnalysisError::config(
                "reading template library",
                format!("missing dataset '{FEATURES_DATASET}': {e}"),
            )
        })?;
        let labels = file.dataset(LABELS_DATASET).map_err(|e| {
            AnalysisError::config(
                "reading template library",
                format!("missing dataset '{LABELS_DATASET}': {e}"),
            )
        })?;

        let feat_shape = features.shape();
        let label_shape = labels.shape();
        if feat_shape.len() != 2 || label_shape.len() != 2 {
            return Err(AnalysisError::config(
                "reading template library",
                format!(
                    "expected 2-D '{FEATURES_DATASET}' and '{LABELS_DATASET}', \
                     got shapes {feat_shape:?} and {label_shape:?}"
                ),
            ));
        }
        if feat_shape[0] != label_shape[0] {
            return Err(AnalysisError::config(
                "reading template library",
                format!(
                    "parallel arrays disagree: {} templates vs {} labels",
                    feat_shape[0], label_shape[0]
                ),
            ));
        }

        let template_len = feat_shape[1];
        let code_len = label_shape[1];
        let feat_raw: Vec<f32> = features
            .read_raw()
            .map_err(|e| AnalysisError::hdf5("reading template features", e))?;
        let label_raw: Vec<u32> = labels
            .read_raw()
            .map_err(|e| AnalysisError::hdf5("reading template labels", e))?;

        let mut buckets: HashMap<String, Vec<Vec<f32>>> = HashMap::new();
        for i in 0..feat_shape[0] {
            let codes = &label_raw[i * code_len..(i + 1) * code_len];
            let symbol = decode_symbol(codes).ok_or_else(|| {
                AnalysisError::config(
                    "reading template library",
                    format!("label row {i} does not decode to a symbol"),
                )
            })?;
            let template = feat_raw[i * template_len..(i + 1) * template_len].to_vec();
            buckets.entry(symbol).or_default().push(template);
        }

        tracing::info!(
            symbols = buckets.len(),
            templates = feat_shape[0],
            template_len,
            "loaded template library"
        );
        Ok(Self { buckets })
    }

    /// Build directly from symbol buckets (tests, in-memory callers).
    pub fn from_buckets(buckets: HashMap<String, Vec<Vec<f32>>>) -> Self {
        Self { buckets }
    }

    pub fn bucket(&self, symbol: &str) -> Option<&[Vec<f32>]> {
        self.buckets.get(symbol).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Vec<f32>>)> {
        self.buckets.iter()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn template_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Character codes are zero-padded on the right; decode up to the first 0.
fn decode_symbol(codes: &[u32]) -> Option<String> {
    let mut symbol = String::new();
    for &code in codes {
        if code == 0 {
            break;
        }
        symbol.push(char::from_u32(code)?);
    }
    if symbol.is_empty() {
        None
    } else {
        Some(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_symbol_stops_at_padding() {
        assert_eq!(decode_symbol(&[86, 0, 0]), Some("V".to_string()));
        assert_eq!(decode_symbol(&[78, 83, 0]), Some("NS".to_string()));
        assert_eq!(decode_symbol(&[0, 0]), None);
        assert_eq!(decode_symbol(&[0x110000]), None);
    }

    #[test]
    fn replicates_share_a_bucket_in_order() {
        let mut buckets = HashMap::new();
        buckets.insert(
            "V".to_string(),
            vec![vec![1.0f32, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
        );
        buckets.insert("N".to_string(), vec![vec![0.0f32, 0.0]]);
        let lib = TemplateLibrary::from_buckets(buckets);
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.template_count(), 4);
        let v = lib.bucket("V").unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v[1], vec![3.0, 4.0]);
        assert!(lib.bucket("x").is_none());
    }

    #[test]
    fn load_missing_file_is_a_config_error() {
        let err = TemplateLibrary::load(Path::new("/nonexistent/templates.h5")).unwrap_err();
        assert!(err.is_fatal());
    }
}
