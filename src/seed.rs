//! Initial placement for nodes the dataset leaves unpositioned
//!
//! Two nodes at exactly the same point have no direction between them, so
//! no pairwise force can ever separate them. Placement therefore never puts
//! two nodes together, and [`separate_coincident`] fixes up caller-supplied
//! positions that do.

use std::collections::HashSet;
use std::f64::consts::{PI, TAU};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Seeding;
use crate::model::Node;
use crate::vector::Point;

/// Golden angle in radians
const GOLDEN_ANGLE: f64 = PI * 0.763_932_022_500_210_3; // PI * (3 - sqrt(5))

/// Offset used to pull coincident nodes apart
const NUDGE: f64 = 1e-3;

/// Seeded position for each of `count` nodes around `center`
pub fn seed_positions(count: usize, seeding: &Seeding, center: Point) -> Vec<Point> {
    match *seeding {
        Seeding::Phyllotaxis { radius } => (0..count)
            .map(|i| {
                let r = radius * (0.5 + i as f64).sqrt();
                let angle = i as f64 * GOLDEN_ANGLE;
                Point::new(center.x + r * angle.cos(), center.y + r * angle.sin())
            })
            .collect(),
        Seeding::Circle { radius } => (0..count)
            .map(|i| {
                let angle = TAU * i as f64 / count as f64;
                Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
            })
            .collect(),
        Seeding::Jitter { seed, spread } => {
            let spread = spread.abs().max(f64::EPSILON);
            let mut rng = StdRng::seed_from_u64(seed);
            (0..count)
                .map(|_| {
                    Point::new(
                        center.x + rng.random_range(-spread..spread),
                        center.y + rng.random_range(-spread..spread),
                    )
                })
                .collect()
        }
    }
}

/// Nudge nodes sharing a position with an earlier node until all differ
///
/// Nodes keep their order; the first node at a position stays put. Returns
/// the number of nodes moved.
pub fn separate_coincident(nodes: &mut [Node]) -> usize {
    let mut occupied = HashSet::with_capacity(nodes.len());
    let mut moved = 0;

    for node in nodes.iter_mut() {
        let mut attempt = 0u32;
        while !occupied.insert(position_key(node)) {
            attempt += 1;
            let step = NUDGE.max(node.x.abs().max(node.y.abs()) * 1e-9);
            let angle = attempt as f64 * GOLDEN_ANGLE;
            node.x += step * angle.cos();
            node.y += step * angle.sin();
        }
        if attempt > 0 {
            moved += 1;
        }
    }

    if moved > 0 {
        tracing::debug!(moved, "separated coincident nodes");
    }
    moved
}

fn position_key(node: &Node) -> (u64, u64) {
    // Adding 0.0 folds -0.0 into 0.0
    ((node.x + 0.0).to_bits(), (node.y + 0.0).to_bits())
}
