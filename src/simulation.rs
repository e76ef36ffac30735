//! Force simulation engine
//!
//! Owns the node array, the ordered force fields and the cooling schedule.
//! Each tick applies every force, integrates velocities into positions and
//! decays alpha, the way d3-force does, until alpha drops below `alpha_min`.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::error::{LayoutError, Result};
use crate::force::Force;
use crate::model::{Link, Node, NodeId};

/// Lifecycle of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationState {
    /// Constructed, not started
    Idle,
    /// Ticking
    Running,
    /// Converged: alpha fell below `alpha_min`
    Stopped,
    /// Halted by `stop()`
    Cancelled,
    /// A tick produced non-finite state
    Failed,
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SimulationState::Idle => "idle",
            SimulationState::Running => "running",
            SimulationState::Stopped => "stopped",
            SimulationState::Cancelled => "cancelled",
            SimulationState::Failed => "failed",
        })
    }
}

/// Cooperative cancellation flag
///
/// Clones share the flag. Setting it never interrupts a tick; the simulation
/// checks it before the next one begins.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request that the simulation stop before its next tick
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Force simulation over an owned node array
pub struct Simulation {
    nodes: Vec<Node>,
    links: Vec<Link>,
    forces: Vec<Box<dyn Force>>,
    config: SimulationConfig,
    alpha: f64,
    state: SimulationState,
    ticks: u64,
    stop_flag: StopHandle,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("nodes", &self.nodes.len())
            .field("links", &self.links.len())
            .field(
                "forces",
                &self.forces.iter().map(|force| force.name()).collect::<Vec<_>>(),
            )
            .field("alpha", &self.alpha)
            .field("state", &self.state)
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl Simulation {
    /// Create an idle simulation with no forces
    pub fn new(nodes: Vec<Node>, links: Vec<Link>, config: &SimulationConfig) -> Self {
        Self {
            nodes,
            links,
            forces: Vec::new(),
            alpha: config.alpha,
            config: config.clone(),
            state: SimulationState::Idle,
            ticks: 0,
            stop_flag: StopHandle::default(),
        }
    }

    /// Append a force; forces run in the order they were added
    pub fn with_force(mut self, force: impl Force + 'static) -> Self {
        self.add_force(Box::new(force));
        self
    }

    pub fn add_force(&mut self, force: Box<dyn Force>) {
        self.forces.push(force);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Names of the active forces, in application order
    pub fn force_names(&self) -> Vec<&'static str> {
        self.forces.iter().map(|force| force.name()).collect()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Number of completed ticks since construction
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Check if the simulation will tick when asked
    pub fn is_running(&self) -> bool {
        self.state == SimulationState::Running
    }

    /// A handle that can request cancellation from outside a tick
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_flag.clone()
    }

    /// Move from `Idle` to `Running`
    ///
    /// Starting a running simulation is a no-op. Converged or cancelled runs
    /// resume through [`Simulation::reheat`] instead.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            SimulationState::Idle => {
                self.stop_flag.clear();
                self.state = SimulationState::Running;
                debug!(alpha = self.alpha, "simulation started");
                Ok(())
            }
            SimulationState::Running => Ok(()),
            state => Err(LayoutError::InvalidState {
                action: "start",
                state,
            }),
        }
    }

    /// Cancel a running simulation
    ///
    /// Holding `&mut self` means no tick is in flight, so the transition is
    /// immediate. Stopping in any other state has no effect.
    pub fn stop(&mut self) {
        if self.state == SimulationState::Running {
            self.state = SimulationState::Cancelled;
            info!(ticks = self.ticks, alpha = self.alpha, "simulation cancelled");
        }
    }

    /// Reset alpha and resume ticking
    ///
    /// `alpha` must lie in `(alpha_min, 1]`. An idle simulation keeps waiting
    /// for `start()`; a failed one cannot be reheated.
    pub fn reheat(&mut self, alpha: f64) -> Result<()> {
        if !(alpha > self.config.alpha_min && alpha <= 1.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "reheat alpha must be in ({}, 1], got {alpha}",
                self.config.alpha_min
            )));
        }
        match self.state {
            SimulationState::Failed => Err(LayoutError::InvalidState {
                action: "reheat",
                state: self.state,
            }),
            SimulationState::Idle => {
                self.alpha = alpha;
                Ok(())
            }
            _ => {
                self.alpha = alpha;
                self.stop_flag.clear();
                self.state = SimulationState::Running;
                debug!(alpha, "simulation reheated");
                Ok(())
            }
        }
    }

    /// Run one tick
    ///
    /// Returns `Ok(true)` when a tick completed and `Ok(false)` when the
    /// simulation is not running (including when a pending stop request was
    /// just honored). A tick that leaves any node non-finite moves the
    /// simulation to `Failed` and returns `NumericalInstability`.
    pub fn tick(&mut self) -> Result<bool> {
        if self.state != SimulationState::Running {
            return Ok(false);
        }
        if self.stop_flag.take() {
            self.stop();
            return Ok(false);
        }

        for force in &mut self.forces {
            force.apply(&mut self.nodes, self.alpha);
        }

        // Integrate with friction
        let retain = 1.0 - self.config.velocity_decay;
        for node in &mut self.nodes {
            node.vx *= retain;
            node.vy *= retain;
            node.x += node.vx;
            node.y += node.vy;
        }

        // Cool
        self.alpha += (self.config.alpha_target - self.alpha) * self.config.alpha_decay;
        self.ticks += 1;

        let unstable: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|node| !node.is_finite())
            .map(|node| node.id.clone())
            .collect();
        if !unstable.is_empty() {
            self.state = SimulationState::Failed;
            warn!(tick = self.ticks, nodes = unstable.len(), "non-finite node state");
            return Err(LayoutError::NumericalInstability {
                tick: self.ticks,
                nodes: unstable,
            });
        }

        if self.alpha < self.config.alpha_min {
            self.state = SimulationState::Stopped;
            info!(ticks = self.ticks, alpha = self.alpha, "simulation converged");
        }

        Ok(true)
    }

    /// Run simulation to convergence (or max ticks)
    ///
    /// Starts an idle simulation first. Returns the number of ticks run.
    pub fn run_to_convergence(&mut self, max_ticks: usize) -> Result<usize> {
        if self.state == SimulationState::Idle {
            self.start()?;
        }
        let mut ran = 0;
        while ran < max_ticks && self.tick()? {
            ran += 1;
        }
        Ok(ran)
    }
}
