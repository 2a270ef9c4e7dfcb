use crate::analysis::classes::BINARY_INSERT_POSITION;
use crate::error::AnalysisError;

/// Splice one value per row into every row at `position`. The explicit
/// primitive behind classifier output fusion, kept separate so the column
/// arithmetic is independently testable.
pub fn insert_column(
    rows: &[Vec<f32>],
    column: &[f32],
    position: usize,
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    if rows.len() != column.len() {
        return Err(AnalysisError::invalid_input(format!(
            "column length {} does not match row count {}",
            column.len(),
            rows.len()
        )));
    }
    let mut out = Vec::with_capacity(rows.len());
    for (row, &value) in rows.iter().zip(column.iter()) {
        if position > row.len() {
            return Err(AnalysisError::invalid_input(format!(
                "insert position {position} exceeds row width {}",
                row.len()
            )));
        }
        let mut fused = Vec::with_capacity(row.len() + 1);
        fused.extend_from_slice(&row[..position]);
        fused.push(value);
        fused.extend_from_slice(&row[position..]);
        out.push(fused);
    }
    Ok(out)
}

/// Fuse the two classifier outputs into canonical score vectors: the binary
/// classifier's first column is inserted at position 9 of each arrhythmia
/// row. A row-count disagreement is recoverable: both sources truncate to
/// the common prefix.
pub fn fuse_scores(
    arrhythmia_rows: &[Vec<f32>],
    binary_rows: &[Vec<f32>],
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    let mut arrhythmia = arrhythmia_rows;
    let mut binary = binary_rows;
    if arrhythmia.len() != binary.len() {
        let common = arrhythmia.len().min(binary.len());
        tracing::warn!(
            arrhythmia_rows = arrhythmia.len(),
            binary_rows = binary.len(),
            common,
            "classifier outputs disagree on row count, truncating"
        );
        arrhythmia = &arrhythmia[..common];
        binary = &binary[..common];
    }

    let column = binary
        .iter()
        .map(|row| {
            row.first().copied().ok_or_else(|| {
                AnalysisError::invalid_input("binary classifier produced an empty row")
            })
        })
        .collect::<Result<Vec<f32>, _>>()?;

    insert_column(arrhythmia, &column, BINARY_INSERT_POSITION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize, width: usize, base: f32) -> Vec<Vec<f32>> {
        (0..n)
            .map(|i| (0..width).map(|j| base + (i * width + j) as f32).collect())
            .collect()
    }

    #[test]
    fn insert_column_at_start_middle_end() {
        let data = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let column = vec![9.0, 8.0];

        let front = insert_column(&data, &column, 0).unwrap();
        assert_eq!(front[0], vec![9.0, 1.0, 2.0, 3.0]);

        let middle = insert_column(&data, &column, 2).unwrap();
        assert_eq!(middle[1], vec![4.0, 5.0, 8.0, 6.0]);

        let end = insert_column(&data, &column, 3).unwrap();
        assert_eq!(end[0], vec![1.0, 2.0, 3.0, 9.0]);
    }

    #[test]
    fn insert_column_rejects_bad_shapes() {
        let data = vec![vec![1.0, 2.0]];
        assert!(insert_column(&data, &[1.0, 2.0], 0).is_err());
        assert!(insert_column(&data, &[1.0], 3).is_err());
    }

    #[test]
    fn fused_width_and_placement() {
        let arr = rows(4, 21, 0.0);
        let bin = rows(4, 1, 100.0);
        let fused = fuse_scores(&arr, &bin).unwrap();
        assert_eq!(fused.len(), 4);
        for (i, row) in fused.iter().enumerate() {
            assert_eq!(row.len(), 22);
            assert_eq!(row[9], 100.0 + i as f32);
            assert_eq!(row[8], arr[i][8]);
            assert_eq!(row[10], arr[i][9]);
        }
    }

    #[test]
    fn row_count_disagreement_truncates_to_common_prefix() {
        let arr = rows(100, 21, 0.0);
        let bin = rows(98, 1, 0.0);
        let fused = fuse_scores(&arr, &bin).unwrap();
        assert_eq!(fused.len(), 98);

        let fused = fuse_scores(&rows(98, 21, 0.0), &rows(100, 1, 0.0)).unwrap();
        assert_eq!(fused.len(), 98);
    }

    #[test]
    fn binary_rows_must_carry_a_column() {
        let arr = rows(2, 21, 0.0);
        let bin = vec![vec![1.0], vec![]];
        assert!(fuse_scores(&arr, &bin).is_err());
    }
}
