pub mod cluster;
pub mod domain;
pub mod duplicates;
pub mod error;
pub mod hasher;
pub mod matrix;
pub mod scoring;

use std::collections::HashSet;

pub use cluster::{cluster_by_similarity, ClusterRecord, ClusterSet, GROUPING_THRESHOLD};
pub use domain::{Fingerprint, Group, ImageEntry, SourceImage, FINGERPRINT_BITS};
pub use duplicates::{find_duplicates, DUPLICATE_THRESHOLD};
pub use error::{Error, Result};
pub use hasher::{compute_fingerprint, fingerprint_batch};
pub use matrix::SimilarityMatrix;
pub use scoring::similarity;

/// Default threshold for the single-image "show me everything like this"
/// lookup; stricter than grouping, looser than duplicate detection.
pub const SIMILARITY_THRESHOLD: f64 = 0.75;

/// Outcome of loading a snapshot: how many images were fingerprinted and
/// which ones could not be sampled (the host skips those and continues).
pub struct LoadOutcome {
    pub loaded: usize,
    pub skipped: Vec<(i64, Error)>,
}

/// The engine facade the host holds on to.
///
/// A `Desk` owns the fingerprinted snapshot of the current image set and
/// the durable registry of manually-created clusters. One `load` is one
/// atomic snapshot: it replaces the previous image set wholesale, so a
/// host that cancels and re-runs simply loads again — partial results
/// from two different input sets never mix. Automatic groups are
/// recomputed from the full snapshot on every `arrange` call and are not
/// retained.
#[derive(Default)]
pub struct Desk {
    entries: Vec<ImageEntry>,
    clusters: ClusterSet,
}

impl Desk {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            clusters: ClusterSet::new(),
        }
    }

    /// Fingerprint `sources` in parallel and make them the current
    /// snapshot. Images that cannot be sampled are reported in the
    /// outcome and left out; the rest of the batch is unaffected.
    /// Cluster members that are no longer present are released, with the
    /// usual representative reassignment.
    pub fn load(&mut self, sources: &[SourceImage<'_>]) -> LoadOutcome {
        let results = hasher::fingerprint_batch(sources);

        let mut entries = Vec::with_capacity(sources.len());
        let mut skipped = Vec::new();
        for (source, (id, fingerprint)) in sources.iter().zip(results) {
            match fingerprint {
                Ok(fingerprint) => entries.push(ImageEntry {
                    id,
                    filename: source.filename.to_string(),
                    fingerprint,
                }),
                Err(err) => skipped.push((id, err)),
            }
        }

        let alive: HashSet<i64> = entries.iter().map(|e| e.id).collect();
        self.clusters.retain_images(&alive);

        let loaded = entries.len();
        self.entries = entries;
        LoadOutcome { loaded, skipped }
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn entry(&self, id: i64) -> Option<&ImageEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Build the full pairwise similarity table for the current snapshot.
    pub fn build_matrix(&self) -> Result<SimilarityMatrix> {
        SimilarityMatrix::build(&self.entries)
    }

    /// Automatic grouping of the current snapshot at `threshold`
    /// (typically [`GROUPING_THRESHOLD`]).
    pub fn arrange(&self, matrix: &SimilarityMatrix, threshold: f64) -> Vec<Group> {
        cluster_by_similarity(&self.entries, matrix, threshold)
    }

    /// Near-identical copies in the current snapshot at `threshold`
    /// (typically [`DUPLICATE_THRESHOLD`]).
    pub fn duplicates(&self, matrix: &SimilarityMatrix, threshold: f64) -> Vec<Group> {
        find_duplicates(&self.entries, matrix, threshold)
    }

    /// Every other image whose similarity to `id` meets `threshold`
    /// (typically [`SIMILARITY_THRESHOLD`]), best first. Unknown ids
    /// return an empty list.
    pub fn similar_to(&self, id: i64, matrix: &SimilarityMatrix, threshold: f64) -> Vec<(i64, f64)> {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return Vec::new();
        };
        matrix
            .neighbors(index, threshold)
            .into_iter()
            .map(|(j, s)| (self.entries[j].id, s))
            .collect()
    }

    // ── manual clusters ──────────────────────────────────────────────

    pub fn create_cluster(&mut self, members: &[i64], representative: i64) -> Result<u64> {
        self.clusters.create(members, representative)
    }

    pub fn set_representative(&mut self, cluster_id: u64, image_id: i64) -> Result<()> {
        self.clusters.set_representative(cluster_id, image_id)
    }

    pub fn discard_cluster(&mut self, cluster_id: u64) {
        self.clusters.discard(cluster_id)
    }

    pub fn remove_member(&mut self, cluster_id: u64, image_id: i64) {
        self.clusters.remove_member(cluster_id, image_id)
    }

    pub fn clusters(&self) -> &ClusterSet {
        &self.clusters
    }
}
