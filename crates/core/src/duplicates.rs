//! Near-identity duplicate detection: the strict-threshold consumer of
//! the similarity matrix.

use crate::cluster::{flood_fill_partition, sort_groups};
use crate::domain::{Group, ImageEntry};
use crate::matrix::SimilarityMatrix;

/// Default threshold for flagging re-saved/re-exported copies, as opposed
/// to "same subject" grouping.
pub const DUPLICATE_THRESHOLD: f64 = 0.95;

/// Find groups of near-identical images. Runs the same flood-fill
/// partition as automatic grouping but only reports groups of two or
/// more; an image without a close match appears in no group.
pub fn find_duplicates(
    entries: &[ImageEntry],
    matrix: &SimilarityMatrix,
    threshold: f64,
) -> Vec<Group> {
    let mut seed_order: Vec<usize> = (0..entries.len()).collect();
    seed_order.sort_by_key(|&i| entries[i].id);

    let mut groups: Vec<Group> = flood_fill_partition(matrix, &seed_order, threshold)
        .into_iter()
        .filter(|(positions, _)| positions.len() >= 2)
        .map(|(positions, avg_similarity)| Group {
            members: positions.into_iter().map(|p| entries[p].id).collect(),
            avg_similarity,
        })
        .collect();

    sort_groups(&mut groups);
    groups
}
