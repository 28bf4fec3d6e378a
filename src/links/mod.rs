//! 1D–2D links: generation, boundary conflict resolution and removal.
//!
//! A [`Links1D2D`] set only ever loses entries after it is generated; every
//! removal operation keeps the relative order of the remaining links.

pub mod conflicts;
pub mod generate;
pub mod removal;

use geo::Line;
use hashbrown::HashSet;
use serde::Serialize;

use crate::data::mesh2d::Mesh2D;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::ReachMeshError;
use crate::mesh_generation::mesh1d::Mesh1D;
use crate::topology::point::{FaceId, MeshNodeId};

pub use conflicts::resolve;
pub use generate::{LinkMode, LinkOptions, generate};
pub use removal::{DefectRecord, MeshSide};

/// A connection between a 1D node and a 2D face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Link1D2D {
    pub node: MeshNodeId,
    pub face: FaceId,
}

impl Link1D2D {
    #[inline]
    pub fn new(node: MeshNodeId, face: FaceId) -> Self {
        Self { node, face }
    }
}

/// Ordered, duplicate-free list of links.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Links1D2D {
    links: Vec<Link1D2D>,
}

impl Links1D2D {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect links, keeping the first occurrence of each.
    pub fn from_links(links: impl IntoIterator<Item = Link1D2D>) -> Self {
        let mut seen = HashSet::new();
        Self {
            links: links.into_iter().filter(|l| seen.insert(*l)).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Link1D2D] {
        &self.links
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link1D2D> {
        self.links.iter()
    }

    pub fn contains(&self, link: &Link1D2D) -> bool {
        self.links.contains(link)
    }

    /// Remove every link attached to `node`; returns how many were removed.
    pub fn remove_node(&mut self, node: MeshNodeId) -> usize {
        self.remove_where(|l| l.node == node)
    }

    /// Remove every link attached to `face`; returns how many were removed.
    pub fn remove_face(&mut self, face: FaceId) -> usize {
        self.remove_where(|l| l.face == face)
    }

    pub(crate) fn remove_where(&mut self, mut pred: impl FnMut(&Link1D2D) -> bool) -> usize {
        let before = self.links.len();
        self.links.retain(|l| !pred(l));
        before - self.links.len()
    }

    /// Node-to-centroid segment of every link, for export. Links referring to
    /// ids outside the given meshes are skipped.
    pub fn segments(&self, mesh1d: &Mesh1D, mesh2d: &Mesh2D) -> Vec<Line<f64>> {
        self.links
            .iter()
            .filter_map(|l| {
                let node = mesh1d.node(l.node)?;
                let face = mesh2d.face(l.face)?;
                Some(Line::new(node.coord, face.centroid()))
            })
            .collect()
    }
}

impl DebugInvariants for Links1D2D {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Links1D2D");
    }

    fn validate_invariants(&self) -> Result<(), ReachMeshError> {
        let mut seen = HashSet::with_capacity(self.links.len());
        match self.links.iter().find(|l| !seen.insert(**l)) {
            Some(l) => Err(ReachMeshError::InvariantViolation(format!(
                "duplicate link {} -> {}",
                l.node, l.face
            ))),
            None => Ok(()),
        }
    }
}

impl<'a> IntoIterator for &'a Links1D2D {
    type Item = &'a Link1D2D;
    type IntoIter = std::slice::Iter<'a, Link1D2D>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

impl FromIterator<Link1D2D> for Links1D2D {
    fn from_iter<T: IntoIterator<Item = Link1D2D>>(iter: T) -> Self {
        Self::from_links(iter)
    }
}
