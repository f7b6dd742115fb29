//! Threshold grouping over the similarity matrix, plus the durable
//! registry of manually-created clusters.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::domain::{Group, ImageEntry};
use crate::error::{Error, Result};
use crate::matrix::SimilarityMatrix;

/// Default threshold for automatic grouping ("same subject").
pub const GROUPING_THRESHOLD: f64 = 0.65;

/// Partition every image into groups by worklist flood-fill.
///
/// Seeds iterate in ascending image id, so the output is deterministic
/// and repeated calls over the same snapshot produce identical
/// partitions. Expansion is transitive by design: an image joins the
/// group when it clears the threshold against the *dequeued frontier
/// image*, not against the seed, so chains A~B~C group together even when
/// A and C alone would not. Groups are ordered by descending size, ties
/// by descending average similarity.
pub fn cluster_by_similarity(
    entries: &[ImageEntry],
    matrix: &SimilarityMatrix,
    grouping_threshold: f64,
) -> Vec<Group> {
    let mut seed_order: Vec<usize> = (0..entries.len()).collect();
    seed_order.sort_by_key(|&i| entries[i].id);

    let mut groups: Vec<Group> = flood_fill_partition(matrix, &seed_order, grouping_threshold)
        .into_iter()
        .map(|(positions, avg_similarity)| Group {
            members: positions.into_iter().map(|p| entries[p].id).collect(),
            avg_similarity,
        })
        .collect();

    sort_groups(&mut groups);
    groups
}

/// Flood-fill the matrix into disjoint position groups at `threshold`.
/// Returns each group's positions in discovery order together with the
/// mean of the admitting-edge similarities (1.0 for singletons).
/// An explicit queue avoids recursion-depth limits on large batches.
pub(crate) fn flood_fill_partition(
    matrix: &SimilarityMatrix,
    seed_order: &[usize],
    threshold: f64,
) -> Vec<(Vec<usize>, f64)> {
    let n = matrix.len();
    let mut processed = vec![false; n];
    let mut out = Vec::new();

    for &seed in seed_order {
        if processed[seed] {
            continue;
        }
        processed[seed] = true;

        let mut members = vec![seed];
        let mut frontier = VecDeque::from([seed]);
        let mut edge_similarities = Vec::new();

        while let Some(current) = frontier.pop_front() {
            for candidate in 0..n {
                if processed[candidate] {
                    continue;
                }
                let similarity = matrix.get(current, candidate);
                if similarity >= threshold {
                    processed[candidate] = true;
                    members.push(candidate);
                    frontier.push_back(candidate);
                    edge_similarities.push(similarity);
                }
            }
        }

        let avg = if edge_similarities.is_empty() {
            1.0
        } else {
            edge_similarities.iter().sum::<f64>() / edge_similarities.len() as f64
        };
        out.push((members, avg));
    }

    out
}

/// Descending size, ties by descending average similarity. The sort is
/// stable, so equal groups keep discovery order.
pub(crate) fn sort_groups(groups: &mut [Group]) {
    groups.sort_by(|a, b| {
        b.members
            .len()
            .cmp(&a.members.len())
            .then_with(|| {
                b.avg_similarity
                    .partial_cmp(&a.avg_similarity)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });
}

// ── Manual clusters ──────────────────────────────────────────────────

/// A user-created cluster: a non-empty member set shown as a single
/// representative image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub id: u64,
    /// Image ids in stored order; the first remaining member inherits the
    /// representative role when the current one is removed.
    pub members: Vec<i64>,
    /// Always one of `members`.
    pub representative: i64,
}

/// Registry of manual clusters, kept as side tables (`cluster id →
/// record`, `image id → cluster id`) rather than as flags on the images
/// themselves. Member sets partition the clustered images: an image
/// belongs to at most one cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSet {
    records: HashMap<u64, ClusterRecord>,
    membership: HashMap<i64, u64>,
    next_id: u64,
}

impl Default for ClusterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterSet {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            membership: HashMap::new(),
            next_id: 1,
        }
    }

    /// Create a cluster from `members` with the given representative.
    /// Rejects an empty member list or a representative outside it, with
    /// state unchanged. Members already held by another cluster are
    /// released from it first, so the partition property is preserved.
    pub fn create(&mut self, members: &[i64], representative: i64) -> Result<u64> {
        if members.is_empty() || !members.contains(&representative) {
            return Err(Error::InvalidRepresentative {
                image_id: representative,
            });
        }

        let mut seen = HashSet::new();
        let members: Vec<i64> = members
            .iter()
            .copied()
            .filter(|m| seen.insert(*m))
            .collect();

        for &member in &members {
            if let Some(&previous) = self.membership.get(&member) {
                self.remove_member(previous, member);
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        for &member in &members {
            self.membership.insert(member, id);
        }
        self.records.insert(
            id,
            ClusterRecord {
                id,
                members,
                representative,
            },
        );
        Ok(id)
    }

    /// Promote a different member to representative; the old one becomes
    /// hidden again. Unknown cluster ids and non-members are rejected
    /// with state unchanged.
    pub fn set_representative(&mut self, cluster_id: u64, image_id: i64) -> Result<()> {
        let record = self
            .records
            .get_mut(&cluster_id)
            .ok_or(Error::NotAMember {
                cluster_id,
                image_id,
            })?;
        if !record.members.contains(&image_id) {
            return Err(Error::NotAMember {
                cluster_id,
                image_id,
            });
        }
        record.representative = image_id;
        Ok(())
    }

    /// Release every member back to the unclustered pool. Idempotent:
    /// unknown ids are a silent no-op.
    pub fn discard(&mut self, cluster_id: u64) {
        if let Some(record) = self.records.remove(&cluster_id) {
            for member in record.members {
                self.membership.remove(&member);
            }
        }
    }

    /// Remove one member. Removing the representative promotes the first
    /// remaining member in stored order; removing the last member
    /// destroys the cluster. Unknown clusters and non-members are a
    /// silent no-op.
    pub fn remove_member(&mut self, cluster_id: u64, image_id: i64) {
        let Some(record) = self.records.get_mut(&cluster_id) else {
            return;
        };
        let Some(position) = record.members.iter().position(|&m| m == image_id) else {
            return;
        };

        record.members.remove(position);
        self.membership.remove(&image_id);

        if record.members.is_empty() {
            self.records.remove(&cluster_id);
            return;
        }
        if record.representative == image_id {
            record.representative = record.members[0];
        }
    }

    /// Drop members that are no longer part of the live image set,
    /// applying the usual representative/destruction semantics.
    pub(crate) fn retain_images(&mut self, alive: &HashSet<i64>) {
        let stale: Vec<(u64, i64)> = self
            .membership
            .iter()
            .filter(|(image_id, _)| !alive.contains(image_id))
            .map(|(&image_id, &cluster_id)| (cluster_id, image_id))
            .collect();
        for (cluster_id, image_id) in stale {
            self.remove_member(cluster_id, image_id);
        }
    }

    pub fn get(&self, cluster_id: u64) -> Option<&ClusterRecord> {
        self.records.get(&cluster_id)
    }

    /// The cluster an image currently belongs to, if any.
    pub fn cluster_of(&self, image_id: i64) -> Option<u64> {
        self.membership.get(&image_id).copied()
    }

    /// True when the image is a clustered non-representative: tracked,
    /// but not shown by the host.
    pub fn is_hidden(&self, image_id: i64) -> bool {
        self.membership
            .get(&image_id)
            .and_then(|cluster_id| self.records.get(cluster_id))
            .is_some_and(|record| record.representative != image_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClusterRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
