//! Density-based clustering over a precomputed distance matrix.
//!
//! Points are visited in index order and clusters grown breadth-first, so
//! the partition is deterministic for a fixed input order. Cluster ids
//! carry no meaning across runs; only the partition does.

use std::collections::VecDeque;

use tracing::debug;

use super::distance::DistanceMatrix;

/// Serialized value of the noise label in downstream reports.
pub const NOISE_LABEL: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterLabel {
    /// Not dense enough to belong to any cluster.
    Noise,
    Cluster(usize),
}

impl ClusterLabel {
    pub fn is_noise(self) -> bool {
        self == ClusterLabel::Noise
    }

    pub fn as_i64(self) -> i64 {
        match self {
            ClusterLabel::Noise => NOISE_LABEL,
            ClusterLabel::Cluster(id) => id as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterParams {
    /// Neighborhood radius; a distance of exactly `eps` still counts as a
    /// neighbor.
    pub eps: f64,
    /// Core-point threshold, the point itself included.
    pub min_samples: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            eps: 2.0,
            min_samples: 5,
        }
    }
}

/// DBSCAN over the precomputed matrix; one label per point.
pub fn dbscan(matrix: &DistanceMatrix, params: &ClusterParams) -> Vec<ClusterLabel> {
    let n = matrix.len();
    let mut labels: Vec<Option<ClusterLabel>> = vec![None; n];
    let mut next_cluster = 0usize;

    for point in 0..n {
        if labels[point].is_some() {
            continue;
        }
        let neighbors = region_query(matrix, point, params.eps);
        if neighbors.len() < params.min_samples {
            labels[point] = Some(ClusterLabel::Noise);
            continue;
        }

        let id = next_cluster;
        next_cluster += 1;
        labels[point] = Some(ClusterLabel::Cluster(id));

        let mut queue: VecDeque<usize> = neighbors.into();
        while let Some(candidate) = queue.pop_front() {
            match labels[candidate] {
                Some(ClusterLabel::Cluster(_)) => {}
                // A point first marked noise turns out reachable from a
                // core point: adopt it as a border point, no expansion.
                Some(ClusterLabel::Noise) => {
                    labels[candidate] = Some(ClusterLabel::Cluster(id));
                }
                None => {
                    labels[candidate] = Some(ClusterLabel::Cluster(id));
                    let reach = region_query(matrix, candidate, params.eps);
                    if reach.len() >= params.min_samples {
                        queue.extend(reach);
                    }
                }
            }
        }
    }

    debug!(points = n, clusters = next_cluster, "clustering finished");
    labels
        .into_iter()
        .map(|l| l.unwrap_or(ClusterLabel::Noise))
        .collect()
}

fn region_query(matrix: &DistanceMatrix, point: usize, eps: f64) -> Vec<usize> {
    (0..matrix.len())
        .filter(|&other| matrix.get(point, other) <= eps)
        .collect()
}
