use std::fs;
use std::path::Path;

use crate::error::AnalysisError;

/// Read a batch manifest: UTF-8 text, one record name per line. Surrounding
/// whitespace is trimmed and blank lines are skipped.
pub fn read_manifest(path: &Path) -> Result<Vec<String>, AnalysisError> {
    let data =
        fs::read_to_string(path).map_err(|e| AnalysisError::io("reading records manifest", e))?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_trims_and_skips_blanks() {
        let path = std::env::temp_dir().join("arrhythmia_rs_manifest_test");
        fs::write(&path, "100\n  101 \n\n102\n\n").unwrap();
        let names = read_manifest(&path).unwrap();
        assert_eq!(names, vec!["100", "101", "102"]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_manifest_is_an_io_error() {
        let err = read_manifest(Path::new("/nonexistent/RECORDS")).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }
}
