//! Error types for layout sessions

use thiserror::Error;

use crate::model::NodeId;
use crate::simulation::SimulationState;

/// The dataset's topology cannot be simulated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    /// A link names a node id that is not in the node set
    #[error("link {link} references unknown node '{id}'")]
    MissingNode { link: usize, id: NodeId },

    /// Two nodes share the same id
    #[error("duplicate node id '{id}'")]
    DuplicateNode { id: NodeId },
}

/// Errors raised while building or running a layout
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// The dataset failed validation; no tick has run
    #[error("invalid topology: {0}")]
    InvalidTopology(#[from] TopologyError),

    /// A tick produced a non-finite position or velocity
    #[error("numerical instability at tick {tick}: non-finite state for {}", join_ids(.nodes))]
    NumericalInstability { tick: u64, nodes: Vec<NodeId> },

    /// A tunable is outside its valid range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A control was used in a lifecycle state that forbids it
    #[error("cannot {action} a simulation that is {state}")]
    InvalidState {
        action: &'static str,
        state: SimulationState,
    },
}

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(|id| format!("'{id}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Label;

    #[test]
    fn topology_messages() {
        let err = LayoutError::from(TopologyError::MissingNode {
            link: 3,
            id: Label::from("n9"),
        });
        insta::assert_snapshot!(err.to_string(), @"invalid topology: link 3 references unknown node 'n9'");
    }

    #[test]
    fn instability_lists_offending_nodes() {
        let err = LayoutError::NumericalInstability {
            tick: 12,
            nodes: vec![Label::from("a"), Label::Int(4)],
        };
        insta::assert_snapshot!(err.to_string(), @"numerical instability at tick 12: non-finite state for 'a', '4'");
    }

    #[test]
    fn invalid_state_message() {
        let err = LayoutError::InvalidState {
            action: "start",
            state: SimulationState::Failed,
        };
        insta::assert_snapshot!(err.to_string(), @"cannot start a simulation that is failed");
    }
}
