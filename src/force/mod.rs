//! Force fields applied once per tick
//!
//! A force reads node positions and adds to node velocities, scaled by the
//! current alpha. Positions only change during integration, so every force
//! of a tick sees the same positions no matter the order they run in.
//!
//! # Forces
//!
//! - **Link Force**: springs pulling linked nodes toward a rest length
//! - **Charge Force**: inverse-square repulsion between all nodes
//! - **Center Force**: translates the centroid toward a target point
//! - **Cluster Force**: inverse-distance repulsion between nodes of
//!   different clusters
//!
//! Pairs at exactly zero distance have no direction, so every pairwise force
//! skips them and reports the count at debug level.

mod center;
mod charge;
mod cluster;
mod link;
mod quadtree;

pub use center::CenterForce;
pub use charge::ChargeForce;
pub use cluster::ClusterForce;
pub use link::LinkForce;

use crate::model::Node;

/// A unit of velocity mutation applied once per tick
pub trait Force {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Add this field's contribution to every node's velocity
    fn apply(&mut self, nodes: &mut [Node], alpha: f64);
}

fn log_degenerate(force: &'static str, pairs: usize) {
    if pairs > 0 {
        tracing::debug!(force, pairs, "skipped coincident pairs");
    }
}
