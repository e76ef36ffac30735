//! Dataset types and the resolved node/link arrays the engine owns
//!
//! The dataset is what a collaborator hands over (JSON or YAML). Resolution
//! turns its id-based links into index-based [`Link`]s and fails fast on any
//! reference that does not exist.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TopologyError;
use crate::vector::Point;

/// A node id or cluster label
///
/// Datasets may use either integers or strings, so both are accepted and
/// compared structurally (`1` and `"1"` are different labels).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Text(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(n) => write!(f, "{n}"),
            Label::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Text(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label::Text(s)
    }
}

impl From<i64> for Label {
    fn from(n: i64) -> Self {
        Label::Int(n)
    }
}

/// Node identity
pub type NodeId = Label;

/// Cluster label
pub type ClusterId = Label;

/// A node as supplied by the collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique identifier
    pub id: NodeId,

    /// Cluster the node belongs to
    pub cluster: ClusterId,

    /// Optional initial x; seeded by the session when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    /// Optional initial y; seeded by the session when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl NodeSpec {
    pub fn new(id: impl Into<NodeId>, cluster: impl Into<ClusterId>) -> Self {
        Self {
            id: id.into(),
            cluster: cluster.into(),
            x: None,
            y: None,
        }
    }

    /// Pin the initial position
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }
}

/// A link as supplied by the collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    /// Source node id
    pub source: NodeId,

    /// Target node id
    pub target: NodeId,

    /// Rest length override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    /// Spring strength override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}

impl LinkSpec {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            distance: None,
            strength: None,
        }
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }
}

/// Complete input dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// All nodes
    pub nodes: Vec<NodeSpec>,

    /// Links between nodes (may be empty)
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

impl Dataset {
    pub fn new(nodes: Vec<NodeSpec>, links: Vec<LinkSpec>) -> Self {
        Self { nodes, links }
    }

    /// Map every node id to its index, rejecting duplicates
    pub fn index(&self) -> Result<HashMap<&NodeId, usize>, TopologyError> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if index.insert(&node.id, i).is_some() {
                return Err(TopologyError::DuplicateNode {
                    id: node.id.clone(),
                });
            }
        }
        Ok(index)
    }

    /// Resolve every link's endpoints to node indices
    pub fn resolve_links(&self) -> Result<Vec<Link>, TopologyError> {
        let index = self.index()?;
        self.links
            .iter()
            .enumerate()
            .map(|(link, spec)| {
                let lookup = |id: &NodeId| {
                    index
                        .get(id)
                        .copied()
                        .ok_or_else(|| TopologyError::MissingNode {
                            link,
                            id: id.clone(),
                        })
                };
                Ok(Link {
                    source: lookup(&spec.source)?,
                    target: lookup(&spec.target)?,
                    distance: spec.distance,
                    strength: spec.strength,
                })
            })
            .collect()
    }
}

/// A node owned by the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub cluster: ClusterId,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, cluster: impl Into<ClusterId>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            cluster: cluster.into(),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Position and velocity are all finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.vx.is_finite() && self.vy.is_finite()
    }
}

/// A link between two node indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    /// Rest length; the link force default applies when `None`
    pub distance: Option<f64>,
    /// Spring strength; degree-derived when `None`
    pub strength: Option<f64>,
}

impl Link {
    pub fn new(source: usize, target: usize) -> Self {
        Self {
            source,
            target,
            distance: None,
            strength: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_accept_strings_and_integers() {
        let data: Dataset = serde_json::from_str(
            r#"{"nodes":[{"id":1,"cluster":"a"},{"id":"two","cluster":7,"x":1.5,"y":2.0}]}"#,
        )
        .unwrap();

        assert_eq!(data.nodes[0].id, Label::Int(1));
        assert_eq!(data.nodes[0].cluster, Label::from("a"));
        assert_eq!(data.nodes[1].id, Label::from("two"));
        assert_eq!(data.nodes[1].cluster, Label::Int(7));
        assert_eq!(data.nodes[1].x, Some(1.5));
        assert!(data.links.is_empty());
    }

    #[test]
    fn integer_and_string_labels_differ() {
        assert_ne!(Label::Int(1), Label::from("1"));
        assert_eq!(Label::Int(1).to_string(), "1");
    }

    #[test]
    fn resolves_links_to_indices() {
        let data = Dataset::new(
            vec![NodeSpec::new("a", "x"), NodeSpec::new("b", "y")],
            vec![LinkSpec::new("b", "a").with_distance(12.0)],
        );
        let links = data.resolve_links().unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].source, 1);
        assert_eq!(links[0].target, 0);
        assert_eq!(links[0].distance, Some(12.0));
        assert_eq!(links[0].strength, None);
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        let data = Dataset::new(
            vec![NodeSpec::new("a", "x")],
            vec![LinkSpec::new("a", "ghost")],
        );
        let err = data.resolve_links().unwrap_err();
        assert_eq!(
            err,
            TopologyError::MissingNode {
                link: 0,
                id: Label::from("ghost"),
            }
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let data = Dataset::new(
            vec![NodeSpec::new("a", "x"), NodeSpec::new("a", "y")],
            vec![],
        );
        assert!(matches!(
            data.index(),
            Err(TopologyError::DuplicateNode { .. })
        ));
    }
}
