//! Identifiers and network connectivity.
//!
//! [`point`] defines the strong id types; [`branch_topology`] merges branch
//! endpoints into the shared network nodes.

pub mod branch_topology;
pub mod point;

pub use branch_topology::{BranchEnds, BranchTopology, NetworkNode};
pub use point::{FaceId, MeshNodeId, NetworkNodeId};
