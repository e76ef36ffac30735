use std::collections::HashMap;

use crate::config::ClusterConfig;
use crate::model::{ClusterId, Node};
use crate::vector::{distance, unit};

use super::{Force, log_degenerate};

/// Inverse-distance repulsion between nodes of different clusters
///
/// For each cross-cluster pair at distance `d > 0` both nodes are pushed
/// apart by `strength / max(d, distance_min)`. Pairs within a cluster get
/// nothing from this force, which is what lets clusters separate while their
/// members stay together.
#[derive(Debug, Clone)]
pub struct ClusterForce {
    /// Interned cluster of each node; `None` for the noise label
    groups: Vec<Option<u32>>,
    strength: f64,
    distance_min: f64,
}

impl ClusterForce {
    /// Intern the cluster labels of `nodes`
    ///
    /// The node array must keep its order and length for the force's
    /// lifetime.
    pub fn new(nodes: &[Node], config: &ClusterConfig) -> Self {
        let mut interned: HashMap<&ClusterId, u32> = HashMap::new();
        let groups = nodes
            .iter()
            .map(|node| {
                if config.noise_label.as_ref() == Some(&node.cluster) {
                    return None;
                }
                let next = interned.len() as u32;
                Some(*interned.entry(&node.cluster).or_insert(next))
            })
            .collect();

        Self {
            groups,
            strength: config.strength,
            distance_min: config.distance_min,
        }
    }

    /// Number of distinct (non-noise) clusters
    pub fn cluster_count(&self) -> usize {
        self.groups
            .iter()
            .flatten()
            .map(|&g| g as usize + 1)
            .max()
            .unwrap_or(0)
    }

    fn separates(&self, i: usize, j: usize) -> bool {
        match (self.groups[i], self.groups[j]) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }
}

impl Force for ClusterForce {
    fn name(&self) -> &'static str {
        "cluster"
    }

    fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
        debug_assert_eq!(nodes.len(), self.groups.len());
        let mut degenerate = 0;
        let n = nodes.len().min(self.groups.len());

        for i in 0..n {
            for j in (i + 1)..n {
                if !self.separates(i, j) {
                    continue;
                }

                let dx = nodes[j].x - nodes[i].x;
                let dy = nodes[j].y - nodes[i].y;
                let dist = distance(nodes[i].position(), nodes[j].position());

                let Some((ux, uy)) = unit(dx, dy, dist) else {
                    degenerate += 1;
                    continue;
                };

                let repulsion = self.strength / dist.max(self.distance_min) * alpha;
                let fx = ux * repulsion;
                let fy = uy * repulsion;

                nodes[i].vx -= fx;
                nodes[i].vy -= fy;
                nodes[j].vx += fx;
                nodes[j].vy += fy;
            }
        }

        log_degenerate(self.name(), degenerate);
    }
}
