//! Branches: the channel reaches a 1D network is built from.

use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};

use crate::geometry::polyline::Polyline;
use crate::mesh_error::ReachMeshError;

/// Roughness description attached to a branch. Carried through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Roughness {
    /// Roughness formulation, e.g. `"manning"` or `"stricklerks"`.
    pub kind: String,
    /// Roughness value in the units of `kind`.
    pub value: f64,
}

/// A single channel reach with a stable identifier and polyline geometry.
///
/// Construction validates the geometry: at least two finite coordinates and
/// distinct start and end points (ring geometries are rejected).
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    id: String,
    geometry: Polyline,
    roughness: Option<Roughness>,
}

impl Branch {
    /// Create a branch from a line string.
    pub fn new(id: impl Into<String>, line: LineString<f64>) -> Result<Self, ReachMeshError> {
        let id = id.into();
        let geometry = Polyline::try_new(line)?;
        if geometry.start() == geometry.end() {
            return Err(ReachMeshError::RingGeometry { branch: id });
        }
        Ok(Self {
            id,
            geometry,
            roughness: None,
        })
    }

    /// Create a branch from `(x, y)` pairs.
    pub fn from_xy(id: impl Into<String>, points: &[(f64, f64)]) -> Result<Self, ReachMeshError> {
        Self::new(id, points.iter().copied().collect())
    }

    /// Attach roughness metadata.
    pub fn with_roughness(mut self, roughness: Roughness) -> Self {
        self.roughness = Some(roughness);
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn geometry(&self) -> &Polyline {
        &self.geometry
    }

    #[inline]
    pub fn roughness(&self) -> Option<&Roughness> {
        self.roughness.as_ref()
    }

    /// Cached polyline length.
    #[inline]
    pub fn length(&self) -> f64 {
        self.geometry.length()
    }

    #[inline]
    pub fn start(&self) -> Coord<f64> {
        self.geometry.start()
    }

    #[inline]
    pub fn end(&self) -> Coord<f64> {
        self.geometry.end()
    }
}

/// Indices of `branches` sorted by ascending length; ties keep input order.
pub(crate) fn length_order(branches: &[Branch]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..branches.len()).collect();
    order.sort_by(|&a, &b| branches[a].length().total_cmp(&branches[b].length()));
    order
}
