//! Targeted link removal: by proximity to a location, or driven by a report
//! of locations where the solver repeatedly limited its time step.

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::data::mesh2d::Mesh2D;
use crate::geometry::polyline::segment_distance;
use crate::geometry::spatial_index::SpatialIndex;
use crate::links::Links1D2D;
use crate::mesh_generation::mesh1d::Mesh1D;
use crate::topology::point::FaceId;

/// Search radius used when acting on a defect report.
pub const DEFECT_SEARCH_RADIUS: f64 = 2.0;

/// Which end of the links a location refers to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshSide {
    OneD,
    #[default]
    TwoD,
}

/// One entry of a defect report: a location and how often it was flagged.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefectRecord {
    pub x: f64,
    pub y: f64,
    pub count: u64,
}

impl Links1D2D {
    /// Remove all links on the 1D node (or 2D face) nearest to `point`, if it
    /// lies within `max_distance`. Returns how many links were removed.
    pub fn remove_near(
        &mut self,
        point: Coord<f64>,
        side: MeshSide,
        max_distance: f64,
        mesh1d: &Mesh1D,
        mesh2d: &Mesh2D,
    ) -> usize {
        match side {
            MeshSide::OneD => self.remove_near_node(point, max_distance, mesh1d),
            MeshSide::TwoD => {
                let faces = SpatialIndex::new(&mesh2d.centroids());
                self.remove_near_face(point, max_distance, &faces)
            }
        }
    }

    fn remove_near_node(
        &mut self,
        point: Coord<f64>,
        max_distance: f64,
        mesh1d: &Mesh1D,
    ) -> usize {
        match mesh1d.nearest_node(point) {
            Some((node, d)) if d <= max_distance => self.remove_node(node),
            _ => 0,
        }
    }

    fn remove_near_face(
        &mut self,
        point: Coord<f64>,
        max_distance: f64,
        faces: &SpatialIndex,
    ) -> usize {
        match faces.nearest(point) {
            Some(hit) if hit.distance <= max_distance => {
                self.remove_face(FaceId::from_index(hit.index))
            }
            _ => 0,
        }
    }

    /// Remove links at every record flagged at least `threshold` times.
    ///
    /// On the 2D side the record location is used directly. On the 1D side it
    /// is first moved to the node end of the nearest link, as measured against
    /// the links present when the call starts.
    pub fn remove_from_defect_report(
        &mut self,
        records: &[DefectRecord],
        threshold: u64,
        side: MeshSide,
        mesh1d: &Mesh1D,
        mesh2d: &Mesh2D,
    ) -> usize {
        let mut flagged = records.iter().filter(|r| r.count >= threshold).peekable();
        if flagged.peek().is_none() {
            return 0;
        }
        let (segments, faces) = match side {
            MeshSide::OneD => (self.segments(mesh1d, mesh2d), SpatialIndex::default()),
            MeshSide::TwoD => (Vec::new(), SpatialIndex::new(&mesh2d.centroids())),
        };

        let mut removed = 0;
        for r in flagged {
            let at = Coord { x: r.x, y: r.y };
            let n = match side {
                MeshSide::TwoD => self.remove_near_face(at, DEFECT_SEARCH_RADIUS, &faces),
                MeshSide::OneD => {
                    let Some(seg) = segments.iter().min_by(|a, b| {
                        segment_distance(at, a).total_cmp(&segment_distance(at, b))
                    }) else {
                        continue;
                    };
                    self.remove_near_node(seg.start, DEFECT_SEARCH_RADIUS, mesh1d)
                }
            };
            if n > 0 {
                log::info!(
                    "Removed {n} link(s) near ({:.2}, {:.2}) flagged {} times.",
                    r.x,
                    r.y,
                    r.count
                );
            }
            removed += n;
        }
        removed
    }
}
