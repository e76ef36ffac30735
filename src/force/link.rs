use crate::config::LinkConfig;
use crate::model::{Link, Node};
use crate::vector::{distance, unit};

use super::{Force, log_degenerate};

#[derive(Debug, Clone, Copy)]
struct Spring {
    source: usize,
    target: usize,
    distance: f64,
    strength: f64,
}

/// Springs between linked nodes
///
/// Each link pulls (or pushes) its endpoints toward its rest length. The
/// correction is split evenly so the two impulses always cancel.
#[derive(Debug, Clone)]
pub struct LinkForce {
    springs: Vec<Spring>,
}

impl LinkForce {
    /// Build springs for `links` over a node array of `node_count` nodes
    ///
    /// Links without an explicit strength get `1 / min(degree)` of their
    /// endpoints, so hubs are not torn between many springs.
    pub fn new(links: &[Link], node_count: usize, config: &LinkConfig) -> Self {
        let mut degree = vec![0usize; node_count];
        for link in links {
            degree[link.source] += 1;
            degree[link.target] += 1;
        }

        let springs = links
            .iter()
            .map(|link| {
                let strength = link.strength.or(config.strength).unwrap_or_else(|| {
                    1.0 / degree[link.source].min(degree[link.target]) as f64
                });
                Spring {
                    source: link.source,
                    target: link.target,
                    distance: link.distance.unwrap_or(config.distance),
                    strength,
                }
            })
            .collect();

        Self { springs }
    }

    /// Effective (distance, strength) of each link, in link order
    pub fn parameters(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.springs.iter().map(|s| (s.distance, s.strength))
    }
}

impl Force for LinkForce {
    fn name(&self) -> &'static str {
        "link"
    }

    fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
        let mut degenerate = 0;

        for spring in &self.springs {
            let (source, target) = (&nodes[spring.source], &nodes[spring.target]);
            let dx = target.x - source.x;
            let dy = target.y - source.y;
            let dist = distance(source.position(), target.position());

            let Some((ux, uy)) = unit(dx, dy, dist) else {
                degenerate += 1;
                continue;
            };

            // Hooke's law, half of the correction to each endpoint
            let magnitude = (dist - spring.distance) * spring.strength * alpha * 0.5;
            let fx = ux * magnitude;
            let fy = uy * magnitude;

            nodes[spring.source].vx += fx;
            nodes[spring.source].vy += fy;
            nodes[spring.target].vx -= fx;
            nodes[spring.target].vy -= fy;
        }

        log_degenerate(self.name(), degenerate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::force::testing::impulses;

    fn pair(distance: f64) -> Vec<Node> {
        vec![
            Node::new("a", "x", 0.0, 0.0),
            Node::new("b", "y", distance, 0.0),
        ]
    }

    #[test]
    fn stretched_link_pulls_endpoints_together() {
        let mut nodes = pair(50.0);
        let mut force = LinkForce::new(&[Link::new(0, 1)], 2, &LinkConfig::default());
        let v = impulses(&mut force, &mut nodes, 1.0);

        // (50 - 30) * 1 * 1 * 0.5
        assert_eq!(v[0], (10.0, 0.0));
        assert_eq!(v[1], (-10.0, 0.0));
    }

    #[test]
    fn compressed_link_pushes_endpoints_apart() {
        let mut nodes = pair(10.0);
        let mut force = LinkForce::new(&[Link::new(0, 1)], 2, &LinkConfig::default());
        let v = impulses(&mut force, &mut nodes, 0.5);

        assert!(v[0].0 < 0.0);
        assert!(v[1].0 > 0.0);
    }

    #[test]
    fn impulses_are_symmetric() {
        let mut nodes = vec![
            Node::new("a", "x", 3.0, -7.0),
            Node::new("b", "x", 41.0, 12.5),
        ];
        let mut force = LinkForce::new(&[Link::new(0, 1)], 2, &LinkConfig::default());
        let v = impulses(&mut force, &mut nodes, 0.73);

        assert_eq!(v[0].0, -v[1].0);
        assert_eq!(v[0].1, -v[1].1);
    }

    #[test]
    fn default_strength_follows_degree() {
        // Star: hub 0 linked to 1, 2, 3; leaf 3 also linked to 4
        let links = [
            Link::new(0, 1),
            Link::new(0, 2),
            Link::new(0, 3),
            Link::new(3, 4),
        ];
        let force = LinkForce::new(&links, 5, &LinkConfig::default());
        let strengths: Vec<f64> = force.parameters().map(|(_, s)| s).collect();

        assert_eq!(strengths, vec![1.0, 1.0, 0.5, 1.0]);
    }

    #[test]
    fn per_link_overrides_win() {
        let link = Link {
            distance: Some(80.0),
            strength: Some(0.25),
            ..Link::new(0, 1)
        };
        let config = LinkConfig {
            distance: 10.0,
            strength: Some(0.9),
        };
        let force = LinkForce::new(&[link, Link::new(1, 0)], 2, &config);
        let params: Vec<_> = force.parameters().collect();

        assert_eq!(params, vec![(80.0, 0.25), (10.0, 0.9)]);
    }

    #[test]
    fn coincident_endpoints_contribute_nothing() {
        let mut nodes = pair(0.0);
        let mut force = LinkForce::new(&[Link::new(0, 1)], 2, &LinkConfig::default());
        let v = impulses(&mut force, &mut nodes, 1.0);

        assert_eq!(v, vec![(0.0, 0.0), (0.0, 0.0)]);
    }
}
