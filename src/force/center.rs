use crate::config::CenterConfig;
use crate::model::Node;
use crate::vector::{Point, centroid};

use super::Force;

/// Pulls the layout's centroid toward a target point
///
/// Every node receives the same nudge, so the layout translates as a whole
/// without being compressed. This is d3's `forceCenter`, not a per-node pull
/// toward the target.
#[derive(Debug, Clone)]
pub struct CenterForce {
    target: Point,
    strength: f64,
}

impl CenterForce {
    pub fn new(target: Point, strength: f64) -> Self {
        Self { target, strength }
    }

    /// Target from the config, falling back to `default_target` per axis
    pub fn from_config(config: &CenterConfig, default_target: Point) -> Self {
        let target = Point::new(
            config.x.unwrap_or(default_target.x),
            config.y.unwrap_or(default_target.y),
        );
        Self::new(target, config.strength)
    }

    pub fn target(&self) -> Point {
        self.target
    }
}

impl Force for CenterForce {
    fn name(&self) -> &'static str {
        "center"
    }

    fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
        let Some(c) = centroid(nodes.iter().map(Node::position)) else {
            return;
        };

        let sx = (self.target.x - c.x) * self.strength * alpha;
        let sy = (self.target.y - c.y) * self.strength * alpha;
        for node in nodes {
            node.vx += sx;
            node.vy += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::force::testing::impulses;

    #[test]
    fn nudges_every_node_by_the_same_amount() {
        let mut nodes = vec![
            Node::new("a", "x", 0.0, 0.0),
            Node::new("b", "x", 20.0, 0.0),
            Node::new("c", "y", 10.0, 30.0),
        ];
        let mut force = CenterForce::new(Point::new(110.0, 60.0), 0.1);
        let v = impulses(&mut force, &mut nodes, 0.5);

        // centroid (10, 10), offset (100, 50) * 0.1 * 0.5
        for impulse in v {
            assert!((impulse.0 - 5.0).abs() < 1e-12);
            assert!((impulse.1 - 2.5).abs() < 1e-12);
        }
    }

    #[test]
    fn centered_layout_gets_no_impulse() {
        let mut nodes = vec![
            Node::new("a", "x", -5.0, 0.0),
            Node::new("b", "x", 5.0, 0.0),
        ];
        let mut force = CenterForce::new(Point::new(0.0, 0.0), 0.1);
        let v = impulses(&mut force, &mut nodes, 1.0);

        assert_eq!(v, vec![(0.0, 0.0), (0.0, 0.0)]);
    }

    #[test]
    fn config_overrides_single_axis() {
        let config = CenterConfig {
            x: Some(7.0),
            ..CenterConfig::default()
        };
        let force = CenterForce::from_config(&config, Point::new(480.0, 300.0));
        assert_eq!(force.target(), Point::new(7.0, 300.0));
    }

    #[test]
    fn empty_node_set_is_a_no_op() {
        let mut force = CenterForce::new(Point::new(1.0, 1.0), 0.1);
        force.apply(&mut [], 1.0);
    }
}
