use crate::config::ChargeConfig;
use crate::model::Node;
use crate::vector::unit;

use super::quadtree::QuadTree;
use super::{Force, log_degenerate};

/// Many-body force between all nodes, regardless of cluster
///
/// Follows Coulomb's law: the impulse is `strength / d²` along the line
/// between the pair, with `d` clamped to `distance_min` to avoid the
/// singularity. Negative strength repels.
///
/// With `theta` set, distant groups of nodes are approximated by their
/// center of mass (Barnes-Hut). The exact direct sum is the default since it
/// keeps every pairwise impulse exactly balanced.
#[derive(Debug, Clone)]
pub struct ChargeForce {
    strength: f64,
    distance_min2: f64,
    distance_max2: f64,
    theta: Option<f64>,
}

impl ChargeForce {
    pub fn new(config: &ChargeConfig) -> Self {
        Self {
            strength: config.strength,
            distance_min2: config.distance_min * config.distance_min,
            distance_max2: config.distance_max.map_or(f64::INFINITY, |d| d * d),
            theta: config.theta,
        }
    }

    /// Impulse on a body from a source `weight` bodies strong at offset `(dx, dy)`
    fn impulse(&self, dx: f64, dy: f64, weight: f64, alpha: f64) -> Option<(f64, f64)> {
        let d2 = dx * dx + dy * dy;
        if d2 >= self.distance_max2 {
            return Some((0.0, 0.0));
        }
        let (ux, uy) = unit(dx, dy, d2.sqrt())?;
        let w = self.strength * weight * alpha / d2.max(self.distance_min2);
        Some((ux * w, uy * w))
    }

    fn apply_exact(&self, nodes: &mut [Node], alpha: f64) -> usize {
        let mut degenerate = 0;
        let n = nodes.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let dx = nodes[j].x - nodes[i].x;
                let dy = nodes[j].y - nodes[i].y;

                let Some((fx, fy)) = self.impulse(dx, dy, 1.0, alpha) else {
                    degenerate += 1;
                    continue;
                };

                nodes[i].vx += fx;
                nodes[i].vy += fy;
                nodes[j].vx -= fx;
                nodes[j].vy -= fy;
            }
        }

        degenerate
    }

    fn apply_approximate(&self, nodes: &mut [Node], alpha: f64, theta: f64) -> usize {
        let tree = QuadTree::build(nodes.iter().map(|n| (n.x, n.y)).collect());
        let mut degenerate = 0;

        // Impulses are gathered first so every node sees the same tree
        let mut impulses = vec![(0.0, 0.0); nodes.len()];
        for (i, impulse) in impulses.iter_mut().enumerate() {
            let (x, y) = (nodes[i].x, nodes[i].y);
            tree.visit(i, theta, |source| {
                match self.impulse(source.x - x, source.y - y, source.weight, alpha) {
                    Some((fx, fy)) => {
                        impulse.0 += fx;
                        impulse.1 += fy;
                    }
                    None => degenerate += 1,
                }
            });
        }

        for (node, (fx, fy)) in nodes.iter_mut().zip(impulses) {
            node.vx += fx;
            node.vy += fy;
        }

        // Each coincident pair was seen from both sides
        degenerate / 2
    }
}

impl Force for ChargeForce {
    fn name(&self) -> &'static str {
        "charge"
    }

    fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
        let degenerate = match self.theta {
            Some(theta) => self.apply_approximate(nodes, alpha, theta),
            None => self.apply_exact(nodes, alpha),
        };
        log_degenerate(self.name(), degenerate);
    }
}
