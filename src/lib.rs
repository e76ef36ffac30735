//! clusterforce - Force-directed graph layout with cluster separation.
//!
//! Nodes carry a cluster label. On top of the usual link, charge and centering
//! forces, a cluster-separation force pushes nodes of different clusters apart
//! so that groups settle into visually distinct regions.

pub mod config;
pub mod error;
pub mod force;
pub mod io;
pub mod model;
pub mod seed;
pub mod session;
pub mod simulation;
pub mod vector;

pub use config::{LabelLocation, LayoutConfig, Seeding};
pub use error::{LayoutError, Result, TopologyError};
pub use force::Force;
pub use model::{ClusterId, Dataset, Label, Link, LinkSpec, Node, NodeId, NodeSpec};
pub use session::{ClusterLocation, Frame, Layout, LayoutSession, RunSummary, TickEvent, Viewport};
pub use simulation::{Simulation, SimulationState, StopHandle};
pub use vector::Point;
