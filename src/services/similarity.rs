use crate::error::{AppError, AppResult};
use crate::services::featurizer::FeatureMatrix;

/// A catalog row and its cosine distance from the queried row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f64,
}

/// Brute-force cosine nearest-neighbour search over a feature matrix
///
/// Catalogs are small enough that every query compares against every row.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    matrix: FeatureMatrix,
    norms: Vec<f64>,
}

impl SimilarityIndex {
    pub fn build(matrix: FeatureMatrix) -> Self {
        let norms = matrix.rows().iter().map(|row| row.norm()).collect();
        Self { matrix, norms }
    }

    pub fn len(&self) -> usize {
        self.matrix.n_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.n_rows() == 0
    }

    /// Cosine distance between two rows, 1.0 when either row is all zeros
    pub fn distance(&self, a: usize, b: usize) -> AppResult<f64> {
        self.check_bounds(a)?;
        self.check_bounds(b)?;
        Ok(self.distance_unchecked(a, b))
    }

    /// The `k + 1` rows closest to `row`, the row itself first
    ///
    /// Remaining rows are ordered by ascending distance, ties broken by
    /// ascending row index. Fewer pairs come back when the matrix is smaller.
    pub fn query(&self, row: usize, k: usize) -> AppResult<Vec<Neighbor>> {
        self.check_bounds(row)?;

        let mut others: Vec<Neighbor> = (0..self.len())
            .filter(|&other| other != row)
            .map(|other| Neighbor {
                row: other,
                distance: self.distance_unchecked(row, other),
            })
            .collect();

        others.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.row.cmp(&b.row))
        });
        others.truncate(k);

        let mut neighbors = Vec::with_capacity(others.len() + 1);
        neighbors.push(Neighbor { row, distance: 0.0 });
        neighbors.extend(others);
        Ok(neighbors)
    }

    fn check_bounds(&self, row: usize) -> AppResult<()> {
        if row >= self.len() {
            return Err(AppError::InvalidQuery {
                row,
                rows: self.len(),
            });
        }
        Ok(())
    }

    fn distance_unchecked(&self, a: usize, b: usize) -> f64 {
        if a == b {
            return 0.0;
        }
        let (norm_a, norm_b) = (self.norms[a], self.norms[b]);
        if norm_a == 0.0 || norm_b == 0.0 {
            return 1.0;
        }
        let rows = self.matrix.rows();
        let cosine = rows[a].dot(&rows[b]) / (norm_a * norm_b);
        (1.0 - cosine).clamp(0.0, 2.0)
    }
}
