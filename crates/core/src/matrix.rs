//! The full pairwise similarity table. Building it is the O(n²) step of
//! the pipeline and runs only on explicit host action, never per frame.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::ImageEntry;
use crate::error::Result;
use crate::scoring;

/// Dense symmetric n×n similarity table indexed by image position.
/// The diagonal is fixed at 1.0; every unordered pair is scored exactly
/// once and mirrored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    n: usize,
    cells: Vec<f64>,
}

impl SimilarityMatrix {
    /// An n×n matrix with 1.0 on the diagonal and 0.0 elsewhere.
    pub fn identity(n: usize) -> Self {
        let mut cells = vec![0.0; n * n];
        for i in 0..n {
            cells[i * n + i] = 1.0;
        }
        Self { n, cells }
    }

    /// Score every unordered pair of entries. Pair scores are computed on
    /// the rayon pool (read-only fingerprint access, disjoint result
    /// slots) and applied sequentially.
    pub fn build(entries: &[ImageEntry]) -> Result<Self> {
        let n = entries.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();

        let scored = pairs
            .par_iter()
            .map(|&(i, j)| scoring::similarity(&entries[i], &entries[j]).map(|s| (i, j, s)))
            .collect::<Result<Vec<_>>>()?;

        let mut matrix = Self::identity(n);
        for (i, j, similarity) in scored {
            matrix.set_pair(i, j, similarity);
        }
        Ok(matrix)
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.cells[i * self.n + j]
    }

    /// Write both mirrored cells of an unordered pair.
    pub fn set_pair(&mut self, i: usize, j: usize, similarity: f64) {
        self.cells[i * self.n + j] = similarity;
        self.cells[j * self.n + i] = similarity;
    }

    /// All positions (excluding `index` itself) whose similarity to
    /// `index` meets the threshold, sorted by descending similarity.
    /// This backs the host's "highlight similar images" interaction.
    pub fn neighbors(&self, index: usize, threshold: f64) -> Vec<(usize, f64)> {
        let mut out: Vec<(usize, f64)> = (0..self.n)
            .filter(|&j| j != index)
            .map(|j| (j, self.get(index, j)))
            .filter(|&(_, s)| s >= threshold)
            .collect();
        out.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Fingerprint;

    fn entry(id: i64, word: u64) -> ImageEntry {
        ImageEntry {
            id,
            filename: format!("img_{id:04}.jpg"),
            fingerprint: Fingerprint::from_words(vec![word], 64),
        }
    }

    #[test]
    fn test_identity_diagonal() {
        let m = SimilarityMatrix::identity(3);
        for i in 0..3 {
            assert_eq!(m.get(i, i), 1.0);
        }
        assert_eq!(m.get(0, 1), 0.0);
    }

    #[test]
    fn test_build_is_symmetric_with_unit_diagonal() {
        let entries = vec![entry(1, 0), entry(2, 0xFFFF), entry(3, 0xFF00_00FF)];
        let m = SimilarityMatrix::build(&entries).unwrap();

        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert_eq!(m.get(i, i), 1.0);
            for j in 0..3 {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
    }

    #[test]
    fn test_build_matches_scorer() {
        let entries = vec![entry(1, 0xABCD), entry(2, 0xABCF)];
        let m = SimilarityMatrix::build(&entries).unwrap();
        let expected = crate::scoring::similarity(&entries[0], &entries[1]).unwrap();
        assert_eq!(m.get(0, 1), expected);
    }

    #[test]
    fn test_build_empty_set() {
        let m = SimilarityMatrix::build(&[]).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn test_neighbors_sorted_and_thresholded() {
        let mut m = SimilarityMatrix::identity(4);
        m.set_pair(0, 1, 0.9);
        m.set_pair(0, 2, 0.95);
        m.set_pair(0, 3, 0.4);

        let neighbors = m.neighbors(0, 0.75);
        assert_eq!(neighbors, vec![(2, 0.95), (1, 0.9)]);
    }

    #[test]
    fn test_neighbors_excludes_self() {
        let m = SimilarityMatrix::identity(2);
        let neighbors = m.neighbors(0, 0.5);
        assert!(neighbors.is_empty());
    }
}
