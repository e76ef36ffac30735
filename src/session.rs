//! Layout sessions: binding a dataset to a simulation
//!
//! A session validates the dataset, seeds positions around the viewport
//! center, installs the four forces in their fixed order and hands tick
//! events to the rendering side, either through subscribers or by iterating
//! [`LayoutSession::ticks`].
//!
//! ```rust,no_run
//! use clusterforce::{Dataset, LayoutConfig, LayoutSession, TickEvent, Viewport};
//!
//! # fn main() -> clusterforce::Result<()> {
//! let dataset: Dataset = serde_json::from_str(r#"{"nodes": [], "links": []}"#).unwrap();
//! let mut session = LayoutSession::new(&dataset, &LayoutConfig::default(), Viewport::new(960.0, 600.0))?;
//!
//! session.start()?;
//! for event in session.ticks() {
//!     match event {
//!         TickEvent::Frame(frame) => println!("tick {} alpha {:.3}", frame.tick, frame.alpha),
//!         TickEvent::Fault(err) => eprintln!("{err}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{LabelLocation, LayoutConfig};
use crate::error::{LayoutError, Result};
use crate::force::{CenterForce, ChargeForce, ClusterForce, LinkForce};
use crate::model::{ClusterId, Dataset, Node, NodeId};
use crate::seed::{seed_positions, separate_coincident};
use crate::simulation::{Simulation, SimulationState, StopHandle};
use crate::vector::{Point, centroid, medoid};

/// Screen area the layout is centered in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(960.0, 600.0)
    }
}

/// Position of one node in a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

/// Resolved endpoints of one link in a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkSegment {
    pub source: Point,
    pub target: Point,
}

/// Snapshot of the layout after a completed tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Ticks completed so far (0 before the first tick)
    pub tick: u64,
    /// Alpha after the tick
    pub alpha: f64,
    pub nodes: Vec<NodePosition>,
    pub links: Vec<LinkSegment>,
}

/// Event delivered once per tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    /// A tick completed
    Frame(Frame),
    /// A tick failed; the session is halted and no further events follow
    Fault(LayoutError),
}

/// Label anchor of one cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterLocation {
    pub cluster: ClusterId,
    pub x: f64,
    pub y: f64,
    /// Number of member nodes
    pub size: usize,
}

/// Final (or current) layout with enough metadata to label clusters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub state: SimulationState,
    pub ticks: u64,
    pub alpha: f64,
    pub nodes: Vec<NodePosition>,
    pub clusters: Vec<ClusterLocation>,
}

/// Outcome of [`LayoutSession::run`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Ticks run by this call
    pub ticks: u64,
    pub state: SimulationState,
    pub alpha: f64,
}

type Subscriber = Box<dyn FnMut(&TickEvent)>;

/// A dataset bound to its own simulation
pub struct LayoutSession {
    simulation: Simulation,
    viewport: Viewport,
    center: Point,
    noise_label: Option<ClusterId>,
    label_location: LabelLocation,
    subscribers: Vec<Subscriber>,
}

impl LayoutSession {
    /// Validate `dataset` and build an idle session
    ///
    /// Fails with `InvalidTopology` on a dangling link or duplicate id, with
    /// `InvalidConfig` on out-of-range tunables and with
    /// `NumericalInstability` (tick 0) on a non-finite initial coordinate.
    pub fn new(dataset: &Dataset, config: &LayoutConfig, viewport: Viewport) -> Result<Self> {
        config.validate()?;
        if !(viewport.width.is_finite() && viewport.height.is_finite()) {
            return Err(LayoutError::InvalidConfig(
                "viewport dimensions must be finite".to_string(),
            ));
        }
        let links = dataset.resolve_links()?;

        let center_force = CenterForce::from_config(&config.center, viewport.center());
        let center = center_force.target();

        let seeded = seed_positions(dataset.nodes.len(), &config.seeding, center);
        let mut nodes: Vec<Node> = dataset
            .nodes
            .iter()
            .zip(seeded)
            .map(|(spec, p)| {
                Node::new(
                    spec.id.clone(),
                    spec.cluster.clone(),
                    spec.x.unwrap_or(p.x),
                    spec.y.unwrap_or(p.y),
                )
            })
            .collect();

        let non_finite: Vec<NodeId> = nodes
            .iter()
            .filter(|node| !node.is_finite())
            .map(|node| node.id.clone())
            .collect();
        if !non_finite.is_empty() {
            return Err(LayoutError::NumericalInstability {
                tick: 0,
                nodes: non_finite,
            });
        }
        separate_coincident(&mut nodes);

        let link_force = LinkForce::new(&links, nodes.len(), &config.link);
        let cluster_force = ClusterForce::new(&nodes, &config.cluster);
        info!(
            nodes = nodes.len(),
            links = links.len(),
            clusters = cluster_force.cluster_count(),
            "layout session ready"
        );

        let simulation = Simulation::new(nodes, links, &config.simulation)
            .with_force(link_force)
            .with_force(ChargeForce::new(&config.charge))
            .with_force(center_force)
            .with_force(cluster_force);

        Ok(Self {
            simulation,
            viewport,
            center,
            noise_label: config.cluster.noise_label.clone(),
            label_location: config.cluster.label_location,
            subscribers: Vec::new(),
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Point the centering force pulls toward
    pub fn center(&self) -> Point {
        self.center
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn state(&self) -> SimulationState {
        self.simulation.state()
    }

    pub fn alpha(&self) -> f64 {
        self.simulation.alpha()
    }

    pub fn start(&mut self) -> Result<()> {
        self.simulation.start()
    }

    pub fn stop(&mut self) {
        self.simulation.stop()
    }

    /// Shared flag for stopping from inside a subscriber or another thread
    pub fn stop_handle(&self) -> StopHandle {
        self.simulation.stop_handle()
    }

    /// Reset alpha (1.0 for a full restart) and resume ticking
    pub fn reheat(&mut self, alpha: f64) -> Result<()> {
        self.simulation.reheat(alpha)
    }

    /// Call `subscriber` with every tick event, in tick order
    pub fn subscribe(&mut self, subscriber: impl FnMut(&TickEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Lazily tick the simulation, one event per completed (or failed) tick
    ///
    /// The sequence ends when the simulation converges, is stopped, or after
    /// a fault event. It yields nothing until the session is started.
    pub fn ticks(&mut self) -> Ticks<'_> {
        Ticks { session: self }
    }

    /// Start if idle, then tick until the sequence ends or `max_ticks` is hit
    pub fn run(&mut self, max_ticks: Option<u64>) -> Result<RunSummary> {
        if self.state() == SimulationState::Idle {
            self.start()?;
        }

        let mut ran = 0;
        let mut ticks = self.ticks();
        while max_ticks.is_none_or(|max| ran < max) {
            match ticks.next() {
                Some(TickEvent::Frame(_)) => ran += 1,
                Some(TickEvent::Fault(err)) => return Err(err),
                None => break,
            }
        }

        Ok(RunSummary {
            ticks: ran,
            state: self.state(),
            alpha: self.alpha(),
        })
    }

    /// Snapshot of the current positions without ticking
    pub fn frame(&self) -> Frame {
        let nodes = self.simulation.nodes();
        Frame {
            tick: self.simulation.tick_count(),
            alpha: self.simulation.alpha(),
            nodes: nodes
                .iter()
                .map(|node| NodePosition {
                    id: node.id.clone(),
                    x: node.x,
                    y: node.y,
                })
                .collect(),
            links: self
                .simulation
                .links()
                .iter()
                .map(|link| LinkSegment {
                    source: nodes[link.source].position(),
                    target: nodes[link.target].position(),
                })
                .collect(),
        }
    }

    /// Label anchor of each cluster, in order of first appearance
    ///
    /// Members of the noise label are left out. The anchor is the member
    /// mean or the medoid, as configured by `cluster.label_location`.
    pub fn cluster_locations(&self) -> Vec<ClusterLocation> {
        let mut order: Vec<(&ClusterId, Vec<Point>)> = Vec::new();
        let mut index: HashMap<&ClusterId, usize> = HashMap::new();

        for node in self.simulation.nodes() {
            if self.noise_label.as_ref() == Some(&node.cluster) {
                continue;
            }
            let slot = *index.entry(&node.cluster).or_insert_with(|| {
                order.push((&node.cluster, Vec::new()));
                order.len() - 1
            });
            order[slot].1.push(node.position());
        }

        order
            .into_iter()
            .filter_map(|(cluster, members)| {
                let anchor = match self.label_location {
                    LabelLocation::Centroid => centroid(members.iter().copied()),
                    LabelLocation::Medoid => medoid(&members),
                }?;
                Some(ClusterLocation {
                    cluster: cluster.clone(),
                    x: anchor.x,
                    y: anchor.y,
                    size: members.len(),
                })
            })
            .collect()
    }

    /// Current layout with cluster label anchors
    pub fn layout(&self) -> Layout {
        Layout {
            state: self.state(),
            ticks: self.simulation.tick_count(),
            alpha: self.alpha(),
            nodes: self.frame().nodes,
            clusters: self.cluster_locations(),
        }
    }

    fn notify(&mut self, event: &TickEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(event);
        }
    }
}

/// Lazy sequence of tick events, see [`LayoutSession::ticks`]
pub struct Ticks<'a> {
    session: &'a mut LayoutSession,
}

impl Iterator for Ticks<'_> {
    type Item = TickEvent;

    fn next(&mut self) -> Option<TickEvent> {
        let event = match self.session.simulation.tick() {
            Ok(true) => TickEvent::Frame(self.session.frame()),
            Ok(false) => return None,
            Err(err) => TickEvent::Fault(err),
        };
        self.session.notify(&event);
        Some(event)
    }
}
