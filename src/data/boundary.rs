//! Boundary-condition locations used by link conflict resolution.

use geo::{Coord, Line};
use serde::{Deserialize, Serialize};

use crate::data::branch::Branch;
use crate::geometry::probe::{ProbeOptions, end_probe};
use crate::mesh_error::ReachMeshError;

/// Where a boundary condition acts, marked by a short probe segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryLocation {
    /// Branch the boundary was placed on, if known.
    pub branch_id: Option<String>,
    pub probe: Line<f64>,
}

impl BoundaryLocation {
    pub fn new(probe: Line<f64>) -> Self {
        Self {
            branch_id: None,
            probe,
        }
    }

    /// Boundary at a single point (a zero-length probe).
    pub fn at_point(point: Coord<f64>) -> Self {
        Self::new(Line::new(point, point))
    }

    /// Boundary just beyond the end of `branch` nearest to `near`.
    pub fn at_branch_end(
        branch: &Branch,
        near: Coord<f64>,
        options: &ProbeOptions,
    ) -> Result<Self, ReachMeshError> {
        Ok(Self {
            branch_id: Some(branch.id().to_owned()),
            probe: end_probe(branch.geometry(), near, options)?,
        })
    }

    /// Midpoint of the probe; the point conflict resolution searches from.
    #[inline]
    pub fn centroid(&self) -> Coord<f64> {
        Coord {
            x: 0.5 * (self.probe.start.x + self.probe.end.x),
            y: 0.5 * (self.probe.start.y + self.probe.end.y),
        }
    }
}
