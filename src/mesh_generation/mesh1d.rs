//! The 1D computational mesh and its builder.
//!
//! [`Mesh1DBuilder::build`] runs the full pipeline: per-branch offsets (with
//! structure separation), network topology, global node numbering, edge
//! connectivity and node coordinates. The resulting [`Mesh1D`] is immutable;
//! regenerating means building a new one.
//!
//! # Node numbering
//! Branches are walked in ascending length order. A branch end that is a
//! network node already visited by an earlier branch reuses that node's mesh
//! id and contributes no new node; every other offset gets the next id. A
//! branch whose two ends were both visited before and which has no interior
//! offsets still receives a single node at half its length, so that every
//! branch owns at least one computational node.

use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};

use crate::data::branch::{Branch, length_order};
use crate::data::structures::StructureChainage;
use crate::debug_invariants::DebugInvariants;
use crate::geometry::polyline::{Polyline, distance};
use crate::geometry::spatial_index::{Nearest, SpatialIndex};
use crate::mesh_error::ReachMeshError;
use crate::mesh_generation::offsets::generate_offsets;
use crate::topology::branch_topology::{BranchEnds, BranchTopology, NetworkNode};
use crate::topology::point::MeshNodeId;

/// Configuration of 1D mesh generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mesh1DOptions {
    /// Desired distance between computational nodes.
    pub target_spacing: f64,
    /// Half-width of the window around a structure that must contain a grid
    /// point on either side. Capped at a quarter of `target_spacing`.
    pub structure_margin: f64,
    /// Maximum anchor insertions per branch; `None` uses twice the number of
    /// distinct structure chainages plus one.
    pub max_refinement_iterations: Option<usize>,
}

impl Default for Mesh1DOptions {
    fn default() -> Self {
        Self {
            target_spacing: 40.0,
            structure_margin: 10.0,
            max_refinement_iterations: None,
        }
    }
}

impl Mesh1DOptions {
    /// Reject spacings and margins that cannot produce a grid.
    pub fn validate(&self) -> Result<(), ReachMeshError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.target_spacing) {
            return Err(ReachMeshError::InvalidSpacingInput(format!(
                "target spacing must be finite and > 0, got {}",
                self.target_spacing
            )));
        }
        if !positive(self.structure_margin) {
            return Err(ReachMeshError::InvalidSpacingInput(format!(
                "structure margin must be finite and > 0, got {}",
                self.structure_margin
            )));
        }
        Ok(())
    }
}

/// A 1D computational node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MeshNode {
    pub id: MeshNodeId,
    /// Branch that created the node.
    pub branch_id: String,
    /// Chainage along that branch.
    pub chainage: f64,
    pub coord: Coord<f64>,
}

/// A 1D edge between two consecutive nodes of a branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MeshEdge {
    pub from: MeshNodeId,
    pub to: MeshNodeId,
}

/// Per-branch view of the mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshBranch {
    pub id: String,
    pub geometry: Polyline,
    /// Full offset sequence, always starting at 0 and ending at the length.
    pub offsets: Vec<f64>,
    pub ends: BranchEnds,
    /// Node ids from the start to the end of the branch, shared ends included.
    pub chain: Vec<MeshNodeId>,
    /// Chainage along this branch of every entry in `chain`.
    pub chain_chainages: Vec<f64>,
}

/// Result of snapping a point onto the mesh.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnappedPoint {
    pub branch_id: String,
    pub chainage: f64,
    pub coord: Coord<f64>,
}

/// An immutable 1D computational mesh.
#[derive(Clone, Debug, Default)]
pub struct Mesh1D {
    branches: Vec<MeshBranch>,
    network_nodes: Vec<NetworkNode>,
    nodes: Vec<MeshNode>,
    edges: Vec<MeshEdge>,
    neighbours: Vec<Vec<MeshNodeId>>,
    degree: Vec<usize>,
    index: SpatialIndex,
}

/// Builds a [`Mesh1D`] from branches and structure locations.
#[derive(Clone, Debug, Default)]
pub struct Mesh1DBuilder {
    options: Mesh1DOptions,
}

/// Build a mesh with default options and the given spacing.
pub fn build(
    branches: &[Branch],
    structures: &[StructureChainage],
    target_spacing: f64,
) -> Result<Mesh1D, ReachMeshError> {
    Mesh1DBuilder::new(Mesh1DOptions {
        target_spacing,
        ..Default::default()
    })
    .build(branches, structures)
}

impl Mesh1DBuilder {
    pub fn new(options: Mesh1DOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Mesh1DOptions {
        &self.options
    }

    /// Generate offsets (refined around `structures`) and assemble the mesh.
    pub fn build(
        &self,
        branches: &[Branch],
        structures: &[StructureChainage],
    ) -> Result<Mesh1D, ReachMeshError> {
        self.options.validate()?;
        check_branches(branches)?;
        let offsets = generate_offsets(branches, structures, &self.options)?;
        self.build_with_offsets(branches, offsets)
    }

    /// Assemble the mesh from precomputed offsets (indexed like `branches`).
    ///
    /// Every offset list must be strictly increasing, start at 0 and end at the
    /// branch length.
    pub fn build_with_offsets(
        &self,
        branches: &[Branch],
        offsets: Vec<Vec<f64>>,
    ) -> Result<Mesh1D, ReachMeshError> {
        check_branches(branches)?;
        if offsets.len() != branches.len() {
            return Err(ReachMeshError::InvalidSpacingInput(format!(
                "{} offset lists for {} branches",
                offsets.len(),
                branches.len()
            )));
        }
        for (b, offs) in branches.iter().zip(&offsets) {
            check_offsets(b, offs)?;
        }

        let (topology, ends) = BranchTopology::from_branches(branches)?;
        let mut offsets: Vec<Option<Vec<f64>>> = offsets.into_iter().map(Some).collect();
        let mut net_to_mesh: Vec<Option<MeshNodeId>> = vec![None; topology.nodes().len()];
        let mut nodes: Vec<MeshNode> = Vec::new();
        let mut edges: Vec<MeshEdge> = Vec::new();
        let mut mesh_branches = Vec::with_capacity(branches.len());

        for i in length_order(branches) {
            let branch = &branches[i];
            let branch_ends = ends[i];
            let full = offsets[i].take().unwrap_or_default();
            let from_existing = net_to_mesh[branch_ends.from.index()];
            let to_existing = net_to_mesh[branch_ends.to.index()];

            let lo = usize::from(from_existing.is_some());
            let hi = full.len() - usize::from(to_existing.is_some());
            let own: Vec<f64> = if lo < hi {
                full[lo..hi].to_vec()
            } else {
                vec![0.5 * branch.length()]
            };

            let mut chain = Vec::with_capacity(own.len() + 2);
            let mut chain_chainages = Vec::with_capacity(own.len() + 2);
            if let Some(id) = from_existing {
                chain.push(id);
                chain_chainages.push(0.0);
            }
            for &chainage in &own {
                let id = MeshNodeId::from_index(nodes.len());
                nodes.push(MeshNode {
                    id,
                    branch_id: branch.id().to_owned(),
                    chainage,
                    coord: branch.geometry().interpolate(chainage),
                });
                chain.push(id);
                chain_chainages.push(chainage);
            }
            if let Some(id) = to_existing {
                chain.push(id);
                chain_chainages.push(branch.length());
            }

            // own[0] sits at chainage 0 and own[last] at the length whenever
            // the corresponding end was not visited before
            if from_existing.is_none() {
                net_to_mesh[branch_ends.from.index()] = chain.first().copied();
            }
            if to_existing.is_none() {
                net_to_mesh[branch_ends.to.index()] = chain.last().copied();
            }

            edges.extend(chain.windows(2).map(|w| MeshEdge {
                from: w[0],
                to: w[1],
            }));
            log::debug!(
                "branch `{}`: {} new nodes, {} edges",
                branch.id(),
                own.len(),
                chain.len() - 1
            );

            mesh_branches.push(MeshBranch {
                id: branch.id().to_owned(),
                geometry: branch.geometry().clone(),
                offsets: full,
                ends: branch_ends,
                chain,
                chain_chainages,
            });
        }

        let mut neighbours = vec![Vec::new(); nodes.len()];
        let mut degree = vec![0usize; nodes.len()];
        for e in &edges {
            degree[e.from.index()] += 1;
            degree[e.to.index()] += 1;
            neighbours[e.from.index()].push(e.to);
            neighbours[e.to.index()].push(e.from);
        }
        for n in &mut neighbours {
            n.sort_unstable();
            n.dedup();
        }

        let coords: Vec<Coord<f64>> = nodes.iter().map(|n| n.coord).collect();
        let mesh = Mesh1D {
            branches: mesh_branches,
            network_nodes: topology.into_nodes(),
            nodes,
            edges,
            neighbours,
            degree,
            index: SpatialIndex::new(&coords),
        };
        mesh.debug_assert_invariants();
        log::info!(
            "Generated 1d mesh: {} branches, {} network nodes, {} mesh nodes, {} edges.",
            mesh.branches.len(),
            mesh.network_nodes.len(),
            mesh.nodes.len(),
            mesh.edges.len()
        );
        Ok(mesh)
    }
}

fn check_branches(branches: &[Branch]) -> Result<(), ReachMeshError> {
    if branches.is_empty() {
        return Err(ReachMeshError::EmptyNetwork);
    }
    let mut seen = hashbrown::HashSet::with_capacity(branches.len());
    for b in branches {
        if !seen.insert(b.id()) {
            return Err(ReachMeshError::DuplicateBranch(b.id().to_owned()));
        }
    }
    Ok(())
}

fn check_offsets(branch: &Branch, offsets: &[f64]) -> Result<(), ReachMeshError> {
    let bad = |why: &str| {
        ReachMeshError::InvalidSpacingInput(format!("offsets of branch `{}` {why}", branch.id()))
    };
    match (offsets.first(), offsets.last()) {
        (Some(&first), Some(&last)) if offsets.len() >= 2 => {
            if first != 0.0 {
                return Err(bad("must start at 0"));
            }
            if (last - branch.length()).abs() > 1e-9 * branch.length().max(1.0) {
                return Err(bad("must end at the branch length"));
            }
        }
        _ => return Err(bad("need at least 2 values")),
    }
    if offsets.windows(2).any(|w| w[1] <= w[0]) {
        return Err(bad("must be strictly increasing"));
    }
    Ok(())
}

impl Mesh1D {
    /// All nodes, ordered by id.
    #[inline]
    pub fn nodes(&self) -> &[MeshNode] {
        &self.nodes
    }

    #[inline]
    pub fn edges(&self) -> &[MeshEdge] {
        &self.edges
    }

    #[inline]
    pub fn network_nodes(&self) -> &[NetworkNode] {
        &self.network_nodes
    }

    /// Branches in the order they were numbered (ascending length).
    #[inline]
    pub fn branches(&self) -> &[MeshBranch] {
        &self.branches
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: MeshNodeId) -> Option<&MeshNode> {
        self.nodes.get(id.index())
    }

    pub fn branch(&self, id: &str) -> Option<&MeshBranch> {
        self.branches.iter().find(|b| b.id == id)
    }

    /// Full offset sequence of a branch.
    pub fn offsets(&self, branch_id: &str) -> Option<&[f64]> {
        self.branch(branch_id).map(|b| b.offsets.as_slice())
    }

    /// Number of edges incident to `id`.
    pub fn degree(&self, id: MeshNodeId) -> usize {
        self.degree.get(id.index()).copied().unwrap_or(0)
    }

    /// Nodes one edge away from `id`, sorted by id.
    pub fn neighbours(&self, id: MeshNodeId) -> &[MeshNodeId] {
        self.neighbours
            .get(id.index())
            .map_or(&[][..], |n| n.as_slice())
    }

    /// Node coordinates ordered by id.
    pub fn node_coords(&self) -> Vec<Coord<f64>> {
        self.nodes.iter().map(|n| n.coord).collect()
    }

    /// Read-only nearest-neighbour index over the nodes.
    #[inline]
    pub fn node_index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Nearest node to `point` and its distance.
    pub fn nearest_node(&self, point: Coord<f64>) -> Option<(MeshNodeId, f64)> {
        self.index
            .nearest(point)
            .map(|Nearest { index, distance }| (MeshNodeId::from_index(index), distance))
    }

    /// Piecewise-linear centerline of every branch through its node chain.
    pub fn schematised(&self) -> Vec<(String, LineString<f64>)> {
        self.branches
            .iter()
            .map(|b| {
                let line: LineString<f64> = b
                    .chain
                    .iter()
                    .map(|&id| self.nodes[id.index()].coord)
                    .collect();
                (b.id.clone(), line)
            })
            .collect()
    }

    /// Up to `n` nodes of `branch_id` closest (by chainage) to the projection
    /// of `point` onto the branch, nearest first.
    pub fn nearest_nodes_on_branch(
        &self,
        branch_id: &str,
        point: Coord<f64>,
        n: usize,
    ) -> Result<Vec<(MeshNodeId, f64)>, ReachMeshError> {
        let branch = self
            .branch(branch_id)
            .ok_or_else(|| ReachMeshError::UnknownBranch(branch_id.to_owned()))?;
        let along = branch.geometry.project(point).chainage;
        let mut hits: Vec<(MeshNodeId, f64)> = branch
            .chain
            .iter()
            .copied()
            .zip(branch.chain_chainages.iter().copied())
            .collect();
        hits.sort_by(|a, b| (a.1 - along).abs().total_cmp(&(b.1 - along).abs()));
        hits.truncate(n);
        Ok(hits)
    }

    /// Snap `point` to the nearest branch, then to the nearest grid offset on
    /// it. `None` for an empty mesh.
    pub fn snap(&self, point: Coord<f64>) -> Option<SnappedPoint> {
        let (branch, projection) = self
            .branches
            .iter()
            .map(|b| (b, b.geometry.project(point)))
            .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))?;
        let chainage = branch
            .offsets
            .iter()
            .copied()
            .min_by(|a, b| {
                (a - projection.chainage)
                    .abs()
                    .total_cmp(&(b - projection.chainage).abs())
            })?;
        Some(SnappedPoint {
            branch_id: branch.id.clone(),
            chainage,
            coord: branch.geometry.interpolate(chainage),
        })
    }

    /// Length of the shortest edge, useful to pick link search radii.
    pub fn min_edge_length(&self) -> Option<f64> {
        self.edges
            .iter()
            .map(|e| {
                distance(
                    self.nodes[e.from.index()].coord,
                    self.nodes[e.to.index()].coord,
                )
            })
            .min_by(f64::total_cmp)
    }
}

impl DebugInvariants for Mesh1D {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Mesh1D");
    }

    fn validate_invariants(&self) -> Result<(), ReachMeshError> {
        let violated = |msg: String| Err(ReachMeshError::InvariantViolation(msg));
        for (i, n) in self.nodes.iter().enumerate() {
            if n.id.index() != i {
                return violated(format!("node at position {i} has id {}", n.id));
            }
        }
        let n = self.nodes.len();
        for e in &self.edges {
            if e.from == e.to || e.from.index() >= n || e.to.index() >= n {
                return violated(format!("edge {} -> {} is invalid", e.from, e.to));
            }
        }
        for b in &self.branches {
            let length = b.geometry.length();
            let ok_ends = b.offsets.first() == Some(&0.0)
                && b.offsets
                    .last()
                    .is_some_and(|&l| (l - length).abs() <= 1e-9 * length.max(1.0));
            if !ok_ends || b.offsets.windows(2).any(|w| w[1] <= w[0]) {
                return violated(format!("offsets of branch `{}` are not a valid grid", b.id));
            }
            if b.chain.len() < 2 || b.chain.len() != b.chain_chainages.len() {
                return violated(format!("branch `{}` has a broken node chain", b.id));
            }
        }
        if self.index.len() != self.nodes.len() {
            return violated("node index is out of sync with the nodes".into());
        }
        Ok(())
    }
}
