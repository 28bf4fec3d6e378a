//! 1D–2D link generation.
//!
//! Three strategies are supported, see [`LinkMode`]. All of them use the same
//! distance rule: a link is kept only when its length is strictly below
//! `max_distance`. `f64::INFINITY` disables the limit.
//!
//! ```rust
//! use geo::Coord;
//! use reach_mesh::data::{branch::Branch, mesh2d::Mesh2D};
//! use reach_mesh::links::{LinkMode, generate};
//! use reach_mesh::mesh_generation::build;
//!
//! let branches = vec![Branch::from_xy("b", &[(5.0, 5.0), (25.0, 5.0)])?];
//! let mesh1d = build(&branches, &[], 10.0)?;
//! let mesh2d = Mesh2D::rectilinear(Coord { x: 0.0, y: 0.0 }, 10.0, 3, 1)?;
//! let links = generate(LinkMode::OneToTwo, &mesh1d, &mesh2d, f64::INFINITY)?;
//! assert_eq!(links.len(), mesh1d.nodes().len());
//! # Ok::<(), reach_mesh::mesh_error::ReachMeshError>(())
//! ```

use geo::{BoundingRect, Coord, Intersects, Line};
use serde::{Deserialize, Serialize};

use crate::data::mesh2d::Mesh2D;
use crate::debug_invariants::DebugInvariants;
use crate::geometry::spatial_index::{EnvelopeIndex, SpatialIndex};
use crate::links::{Link1D2D, Links1D2D};
use crate::mesh_error::ReachMeshError;
use crate::mesh_generation::mesh1d::Mesh1D;
use crate::topology::point::{FaceId, MeshNodeId};

/// Link generation strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// Every 1D node links to the face with the nearest centroid.
    #[default]
    OneToTwo,
    /// Every face crossed by a branch links to its nearest 1D node.
    TwoToOneIntersecting,
    /// Every face links to its nearest 1D node, unless the link crosses
    /// another face on the way.
    TwoToOneNearest,
}

impl LinkMode {
    fn describe(self) -> &'static str {
        match self {
            LinkMode::OneToTwo => "from 1d to 2d based on distance",
            LinkMode::TwoToOneIntersecting => "from 2d to 1d based on intersection",
            LinkMode::TwoToOneNearest => "from 2d to 1d based on distance",
        }
    }
}

/// Link generation settings. A missing `max_distance` means unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkOptions {
    pub mode: LinkMode,
    pub max_distance: Option<f64>,
}

impl LinkOptions {
    /// Effective distance limit.
    #[inline]
    pub fn max_distance(&self) -> f64 {
        self.max_distance.unwrap_or(f64::INFINITY)
    }

    pub fn generate(&self, mesh1d: &Mesh1D, mesh2d: &Mesh2D) -> Result<Links1D2D, ReachMeshError> {
        generate(self.mode, mesh1d, mesh2d, self.max_distance())
    }
}

/// Generate links between `mesh1d` and `mesh2d`.
///
/// Links come out in node order for [`LinkMode::OneToTwo`] and in face order
/// for the 2D-driven modes. Either mesh being empty gives an empty set.
pub fn generate(
    mode: LinkMode,
    mesh1d: &Mesh1D,
    mesh2d: &Mesh2D,
    max_distance: f64,
) -> Result<Links1D2D, ReachMeshError> {
    if !(max_distance > 0.0) {
        return Err(ReachMeshError::InvalidDistance(max_distance));
    }
    log::info!("Generating links {}.", mode.describe());
    if mesh1d.is_empty() || mesh2d.is_empty() {
        return Ok(Links1D2D::new());
    }
    let links = match mode {
        LinkMode::OneToTwo => one_to_two(mesh1d, mesh2d, max_distance),
        LinkMode::TwoToOneIntersecting => two_to_one(mesh1d, mesh2d, max_distance, true),
        LinkMode::TwoToOneNearest => two_to_one(mesh1d, mesh2d, max_distance, false),
    };
    links.debug_assert_invariants();
    log::debug!("{} links generated", links.len());
    Ok(links)
}

fn one_to_two(mesh1d: &Mesh1D, mesh2d: &Mesh2D, max_distance: f64) -> Links1D2D {
    let faces = SpatialIndex::new(&mesh2d.centroids());
    let (nearest, distances) = faces.nearest_many(&mesh1d.node_coords());
    nearest
        .into_iter()
        .zip(distances)
        .enumerate()
        .filter(|&(_, (_, d))| d < max_distance)
        .map(|(node, (face, _))| {
            Link1D2D::new(MeshNodeId::from_index(node), FaceId::from_index(face))
        })
        .collect()
}

fn two_to_one(
    mesh1d: &Mesh1D,
    mesh2d: &Mesh2D,
    max_distance: f64,
    intersecting: bool,
) -> Links1D2D {
    let nodes = mesh1d.node_index();
    let centroids = mesh2d.centroids();

    // faces whose centroid is too far from every node can never be linked
    let mut candidates: Vec<usize> = (0..mesh2d.len()).collect();
    if max_distance.is_finite() {
        let (_, distances) = nodes.nearest_many(&centroids);
        candidates.retain(|&f| distances[f] < max_distance);
    }
    log::info!("Considering {} 2D cells.", candidates.len());

    if intersecting {
        let lines: Vec<_> = mesh1d
            .branches()
            .iter()
            .map(|b| b.geometry.line_string())
            .collect();
        let envelopes = EnvelopeIndex::new(lines.iter().filter_map(|l| l.bounding_rect()));
        candidates.retain(|&f| {
            let Some(face) = mesh2d.face(FaceId::from_index(f)) else {
                return false;
            };
            envelopes
                .candidates(face.envelope())
                .into_iter()
                .any(|b| face.polygon().intersects(lines[b]))
        });
    }

    let mut links: Vec<Link1D2D> = candidates
        .iter()
        .filter_map(|&f| {
            let hit = nodes.nearest(centroids[f])?;
            (hit.distance < max_distance)
                .then(|| Link1D2D::new(MeshNodeId::from_index(hit.index), FaceId::from_index(f)))
        })
        .collect();

    if !intersecting {
        log::info!("Remove links that cross another 2D cell.");
        let crossing = crossing_filter(&links, &candidates, mesh1d, mesh2d);
        let mut keep = crossing.into_iter();
        links.retain(|_| !keep.next().unwrap_or(false));
    }
    Links1D2D::from_links(links)
}

/// For every link, whether its node-to-centroid segment intersects more than
/// one of the `faces` polygons.
fn crossing_filter(
    links: &[Link1D2D],
    faces: &[usize],
    mesh1d: &Mesh1D,
    mesh2d: &Mesh2D,
) -> Vec<bool> {
    let envelopes = EnvelopeIndex::new(faces.iter().filter_map(|&f| {
        mesh2d.face(FaceId::from_index(f)).map(|face| face.envelope())
    }));
    let segment = |l: &Link1D2D| -> Option<Line<f64>> {
        let from: Coord<f64> = mesh1d.node(l.node)?.coord;
        let to = mesh2d.face(l.face)?.centroid();
        Some(Line::new(from, to))
    };
    let crosses = |l: &Link1D2D| -> bool {
        let Some(seg) = segment(l) else {
            return false;
        };
        let hits = envelopes
            .candidates(seg.bounding_rect())
            .into_iter()
            .filter_map(|k| mesh2d.face(FaceId::from_index(faces[k])))
            .filter(|face| face.polygon().intersects(&seg))
            .take(2)
            .count();
        hits > 1
    };

    #[cfg(feature = "rayon")]
    let flags: Vec<bool> = {
        use rayon::prelude::*;
        links.par_iter().map(crosses).collect()
    };
    #[cfg(not(feature = "rayon"))]
    let flags: Vec<bool> = links.iter().map(crosses).collect();
    flags
}
