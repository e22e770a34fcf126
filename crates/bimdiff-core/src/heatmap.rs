//! Heatmap normalization of a comparison matrix.

use crate::matrix::MultiComparisonCell;

/// Rescale `totalChanges` into `[0, 1]` by the largest off-diagonal value.
///
/// The grid has the same shape as `matrix`. When no off-diagonal cell has a
/// change the grid is all zeros. Diagonal cells are divided like any other
/// cell and clamped, so a hand-built matrix with a non-zero diagonal still
/// stays in range.
pub fn generate_heatmap(matrix: &[Vec<MultiComparisonCell>]) -> Vec<Vec<f64>> {
    let max = matrix
        .iter()
        .enumerate()
        .flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(move |(j, _)| *j != i)
                .map(|(_, cell)| cell.total_changes)
        })
        .max()
        .unwrap_or(0);

    matrix
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    if max == 0 {
                        0.0
                    } else {
                        (cell.total_changes as f64 / max as f64).min(1.0)
                    }
                })
                .collect()
        })
        .collect()
}
