//! Network topology: collapse coincident branch endpoints into shared nodes.
//!
//! [`BranchTopology`] owns the running node table. Branches are registered one
//! at a time; each registration looks up the branch's first and then its last
//! coordinate, reusing an existing [`NetworkNode`] when the coordinate matches
//! exactly and appending a new node otherwise. Node ids are 1-based and follow
//! creation order, so the result depends on registration order;
//! [`BranchTopology::from_branches`] fixes that order to ascending branch
//! length.

use geo::Coord;
use hashbrown::HashMap;
use serde::Serialize;

use crate::data::branch::{Branch, length_order};
use crate::mesh_error::ReachMeshError;
use crate::topology::point::NetworkNodeId;

/// A branch endpoint shared by all branches that start or end there.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NetworkNode {
    pub id: NetworkNodeId,
    pub coord: Coord<f64>,
}

/// The network nodes at both ends of one branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BranchEnds {
    pub from: NetworkNodeId,
    pub to: NetworkNodeId,
    /// `true` if `from` existed before this branch was registered.
    pub from_reused: bool,
    /// `true` if `to` existed before this branch was registered.
    pub to_reused: bool,
}

/// Exact-equality key for a coordinate; `-0.0` and `0.0` map to the same key.
#[inline]
fn coord_key(c: Coord<f64>) -> (u64, u64) {
    ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
}

/// Builder owning the deduplicated network node table.
#[derive(Clone, Debug, Default)]
pub struct BranchTopology {
    nodes: Vec<NetworkNode>,
    lookup: HashMap<(u64, u64), NetworkNodeId>,
}

impl BranchTopology {
    /// Empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every branch in ascending length order.
    ///
    /// Returns the topology and, per input branch (indexed like `branches`),
    /// its [`BranchEnds`].
    pub fn from_branches(branches: &[Branch]) -> Result<(Self, Vec<BranchEnds>), ReachMeshError> {
        let mut topo = Self::new();
        let mut ends = vec![None; branches.len()];
        for i in length_order(branches) {
            ends[i] = Some(topo.register(&branches[i])?);
        }
        // every slot was filled by the loop above
        Ok((topo, ends.into_iter().flatten().collect()))
    }

    /// Register one branch, returning the node ids at both of its ends.
    pub fn register(&mut self, branch: &Branch) -> Result<BranchEnds, ReachMeshError> {
        let (from, from_reused) = self.intern(branch.start());
        let (to, to_reused) = self.intern(branch.end());
        if from == to {
            return Err(ReachMeshError::RingGeometry {
                branch: branch.id().to_owned(),
            });
        }
        log::debug!(
            "branch `{}`: network nodes {from} -> {to} (reused: {from_reused}, {to_reused})",
            branch.id()
        );
        Ok(BranchEnds {
            from,
            to,
            from_reused,
            to_reused,
        })
    }

    fn intern(&mut self, coord: Coord<f64>) -> (NetworkNodeId, bool) {
        let key = coord_key(coord);
        if let Some(&id) = self.lookup.get(&key) {
            return (id, true);
        }
        let id = NetworkNodeId::from_index(self.nodes.len());
        self.nodes.push(NetworkNode { id, coord });
        self.lookup.insert(key, id);
        (id, false)
    }

    /// All network nodes in creation order.
    #[inline]
    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    /// Node registered at exactly `coord`, if any.
    pub fn node_at(&self, coord: Coord<f64>) -> Option<NetworkNodeId> {
        self.lookup.get(&coord_key(coord)).copied()
    }

    /// Consume the builder, keeping the node table.
    pub fn into_nodes(self) -> Vec<NetworkNode> {
        self.nodes
    }
}
