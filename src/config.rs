//! Construction-time tunables
//!
//! Every value has a documented default so an empty config file (or no file
//! at all) gives the standard layout. Sections mirror the force fields they
//! configure.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::model::ClusterId;

// =============================================================================
// Default Constants
// =============================================================================

/// Initial alpha (simulation temperature)
pub const DEFAULT_ALPHA: f64 = 1.0;

/// Alpha below which the simulation is considered converged
pub const DEFAULT_ALPHA_MIN: f64 = 0.001;

/// Per-tick alpha decay; reaches `DEFAULT_ALPHA_MIN` in about 300 ticks
pub const DEFAULT_ALPHA_DECAY: f64 = 0.0228;

/// Alpha the cooling schedule approaches
pub const DEFAULT_ALPHA_TARGET: f64 = 0.0;

/// Fraction of velocity lost to friction each tick
pub const DEFAULT_VELOCITY_DECAY: f64 = 0.4;

/// Link rest length
pub const DEFAULT_LINK_DISTANCE: f64 = 30.0;

/// Many-body strength (negative = repulsion)
pub const DEFAULT_CHARGE: f64 = -30.0;

/// Distance floor for the many-body force (avoids singularity)
pub const DEFAULT_CHARGE_DISTANCE_MIN: f64 = 1.0;

/// Barnes-Hut opening angle when the approximation is enabled
pub const DEFAULT_THETA: f64 = 0.9;

/// Centering strength
pub const DEFAULT_CENTER_STRENGTH: f64 = 0.1;

/// Cross-cluster repulsion strength
pub const DEFAULT_CLUSTER_STRENGTH: f64 = 1.0;

/// Distance floor for the cross-cluster repulsion
pub const DEFAULT_CLUSTER_DISTANCE_MIN: f64 = 1.0;

/// Initial radius of the phyllotaxis seeding spiral
pub const DEFAULT_SEED_RADIUS: f64 = 10.0;

/// Complete layout configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub simulation: SimulationConfig,
    pub link: LinkConfig,
    pub charge: ChargeConfig,
    pub center: CenterConfig,
    pub cluster: ClusterConfig,
    pub seeding: Seeding,
}

impl LayoutConfig {
    /// Reject tunables outside their valid range
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        check(
            sim.alpha_min > 0.0 && sim.alpha_min < 1.0,
            "simulation.alpha_min must be in (0, 1)",
        )?;
        check(
            sim.alpha > sim.alpha_min && sim.alpha <= 1.0,
            "simulation.alpha must be in (alpha_min, 1]",
        )?;
        check(
            sim.alpha_decay > 0.0 && sim.alpha_decay <= 1.0,
            "simulation.alpha_decay must be in (0, 1]",
        )?;
        // Alpha has to be able to fall below alpha_min
        check(
            sim.alpha_target >= 0.0 && sim.alpha_target < sim.alpha_min,
            "simulation.alpha_target must be in [0, alpha_min)",
        )?;
        check(
            (0.0..=1.0).contains(&sim.velocity_decay),
            "simulation.velocity_decay must be in [0, 1]",
        )?;
        check(
            self.link.distance.is_finite() && self.link.distance >= 0.0,
            "link.distance must be a non-negative number",
        )?;
        check(
            self.link.strength.is_none_or(f64::is_finite),
            "link.strength must be finite",
        )?;
        check(
            self.charge.strength.is_finite(),
            "charge.strength must be finite",
        )?;
        check(
            self.charge.distance_min.is_finite() && self.charge.distance_min >= 0.0,
            "charge.distance_min must be a non-negative number",
        )?;
        check(
            self.charge
                .distance_max
                .is_none_or(|max| max > self.charge.distance_min),
            "charge.distance_max must exceed charge.distance_min",
        )?;
        check(
            self.charge.theta.is_none_or(|t| t.is_finite() && t >= 0.0),
            "charge.theta must be a non-negative number",
        )?;
        check(
            self.center.strength.is_finite() && self.center.strength >= 0.0,
            "center.strength must be a non-negative number",
        )?;
        check(
            self.cluster.strength.is_finite(),
            "cluster.strength must be finite",
        )?;
        check(
            self.cluster.distance_min.is_finite() && self.cluster.distance_min >= 0.0,
            "cluster.distance_min must be a non-negative number",
        )?;
        self.seeding.validate()
    }
}

fn check(ok: bool, message: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfig(message.to_string()))
    }
}

/// Cooling schedule and integration tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Starting alpha
    pub alpha: f64,
    /// Convergence threshold
    pub alpha_min: f64,
    /// Per-tick decay toward `alpha_target`
    pub alpha_decay: f64,
    /// Alpha the schedule approaches
    pub alpha_target: f64,
    /// Fraction of velocity removed each tick (friction)
    pub velocity_decay: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            alpha_min: DEFAULT_ALPHA_MIN,
            alpha_decay: DEFAULT_ALPHA_DECAY,
            alpha_target: DEFAULT_ALPHA_TARGET,
            velocity_decay: DEFAULT_VELOCITY_DECAY,
        }
    }
}

/// Link (spring) force tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Rest length for links without their own distance
    pub distance: f64,
    /// Fixed strength; `None` derives `1 / min(degree)` per link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            distance: DEFAULT_LINK_DISTANCE,
            strength: None,
        }
    }
}

/// Many-body force tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChargeConfig {
    /// Negative repels, positive attracts
    pub strength: f64,
    /// Distances below this are clamped
    pub distance_min: f64,
    /// Pairs farther apart than this are ignored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_max: Option<f64>,
    /// Barnes-Hut opening angle; `None` sums every pair exactly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theta: Option<f64>,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            strength: DEFAULT_CHARGE,
            distance_min: DEFAULT_CHARGE_DISTANCE_MIN,
            distance_max: None,
            theta: None,
        }
    }
}

/// Centering force tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CenterConfig {
    pub strength: f64,
    /// Explicit target x; defaults to the viewport center
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Explicit target y; defaults to the viewport center
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl Default for CenterConfig {
    fn default() -> Self {
        Self {
            strength: DEFAULT_CENTER_STRENGTH,
            x: None,
            y: None,
        }
    }
}

/// Cross-cluster repulsion tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusterConfig {
    pub strength: f64,
    /// Distance floor; `0` reproduces the unclamped `1 / d` law
    pub distance_min: f64,
    /// Nodes with this cluster label are treated as unclustered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_label: Option<ClusterId>,
    /// Where each cluster's label anchor is reported
    pub label_location: LabelLocation,
}

/// How a cluster's label anchor is derived from its members
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelLocation {
    /// Mean member position
    #[default]
    Centroid,
    /// Member with the smallest total distance to the others
    Medoid,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            strength: DEFAULT_CLUSTER_STRENGTH,
            distance_min: DEFAULT_CLUSTER_DISTANCE_MIN,
            noise_label: None,
            label_location: LabelLocation::Centroid,
        }
    }
}

/// Placement strategy for nodes without an initial position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum Seeding {
    /// Golden-angle spiral around the center; never places two nodes together
    Phyllotaxis { radius: f64 },
    /// Evenly spaced on a circle around the center
    Circle { radius: f64 },
    /// Uniform jitter in a square of half-width `spread`, from a fixed seed
    Jitter { seed: u64, spread: f64 },
}

impl Default for Seeding {
    fn default() -> Self {
        Seeding::Phyllotaxis {
            radius: DEFAULT_SEED_RADIUS,
        }
    }
}

impl Seeding {
    fn validate(&self) -> Result<()> {
        let extent = match self {
            Seeding::Phyllotaxis { radius } | Seeding::Circle { radius } => *radius,
            Seeding::Jitter { spread, .. } => *spread,
        };
        check(
            extent.is_finite() && extent > 0.0,
            "seeding extent must be a positive number",
        )
    }
}
