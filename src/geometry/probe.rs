//! Short transverse probe segments marking boundary-condition locations.
//!
//! A boundary condition sits just beyond a branch end. The probe is built by
//! extending the branch along its end segment and placing a short segment
//! across that extension, so that its centroid lies outside the branch but
//! close enough for a nearest-node query to find the branch end.

use geo::{Coord, Line};
use serde::{Deserialize, Serialize};

use crate::geometry::polyline::{Polyline, distance};
use crate::mesh_error::ReachMeshError;

/// Probe construction parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeOptions {
    /// How far the branch end is extended along its end segment.
    pub extension: f64,
    /// Distance back from the extended end at which the probe is placed.
    pub offset: f64,
    /// Total width of the probe.
    pub width: f64,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            extension: 1.0,
            offset: 0.1,
            width: 0.1,
        }
    }
}

impl ProbeOptions {
    fn validate(&self) -> Result<(), ReachMeshError> {
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        if ok(self.extension) && ok(self.offset) && ok(self.width) && self.width > 0.0 {
            Ok(())
        } else {
            Err(ReachMeshError::InvalidGeometry(format!(
                "probe options must be finite and non-negative with a positive width, got {self:?}"
            )))
        }
    }
}

/// Probe across the extension of `geometry` at the end nearest `near`.
pub fn end_probe(
    geometry: &Polyline,
    near: Coord<f64>,
    options: &ProbeOptions,
) -> Result<Line<f64>, ReachMeshError> {
    options.validate()?;
    let seg = geometry.end_segment_towards(near);
    let len = distance(seg.start, seg.end);
    if len <= 0.0 {
        return Err(ReachMeshError::InvalidGeometry(
            "branch end segment has zero length".into(),
        ));
    }
    // unit direction pointing out of the branch, and its left normal
    let (ux, uy) = ((seg.end.x - seg.start.x) / len, (seg.end.y - seg.start.y) / len);
    let (nx, ny) = (-uy, ux);
    let along = options.extension - options.offset;
    let centre = Coord {
        x: seg.end.x + along * ux,
        y: seg.end.y + along * uy,
    };
    let half = 0.5 * options.width;
    Ok(Line::new(
        Coord {
            x: centre.x - half * nx,
            y: centre.y - half * ny,
        },
        Coord {
            x: centre.x + half * nx,
            y: centre.y + half * ny,
        },
    ))
}
