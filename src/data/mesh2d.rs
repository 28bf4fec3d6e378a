//! The externally supplied 2D mesh: an ordered list of polygonal faces.
//!
//! Face ids are 1-based positions in the list. Each face carries a centroid,
//! either given by the caller (e.g. a circumcentre from the grid generator) or
//! computed from the polygon.

use geo::{BoundingRect, Centroid, Coord, Polygon, Rect};
use serde::Serialize;

use crate::mesh_error::ReachMeshError;
use crate::topology::point::FaceId;

/// One 2D cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Face2D {
    polygon: Polygon<f64>,
    centroid: Coord<f64>,
    #[serde(skip)]
    envelope: Rect<f64>,
}

impl Face2D {
    /// Face with the area-weighted centroid of `polygon`.
    pub fn new(polygon: Polygon<f64>) -> Result<Self, ReachMeshError> {
        let centroid = polygon.centroid().ok_or_else(|| {
            ReachMeshError::InvalidGeometry("face polygon has no centroid".into())
        })?;
        Self::with_centroid(polygon, centroid.into())
    }

    /// Face with an explicit centroid.
    pub fn with_centroid(
        polygon: Polygon<f64>,
        centroid: Coord<f64>,
    ) -> Result<Self, ReachMeshError> {
        if !(centroid.x.is_finite() && centroid.y.is_finite()) {
            return Err(ReachMeshError::InvalidGeometry(format!(
                "non-finite face centroid ({}, {})",
                centroid.x, centroid.y
            )));
        }
        let envelope = polygon
            .bounding_rect()
            .ok_or_else(|| ReachMeshError::InvalidGeometry("empty face polygon".into()))?;
        Ok(Self {
            polygon,
            centroid,
            envelope,
        })
    }

    #[inline]
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    #[inline]
    pub fn centroid(&self) -> Coord<f64> {
        self.centroid
    }

    /// Axis-aligned bounding box of the polygon.
    #[inline]
    pub fn envelope(&self) -> Rect<f64> {
        self.envelope
    }
}

/// Ordered collection of faces.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Mesh2D {
    faces: Vec<Face2D>,
}

impl Mesh2D {
    pub fn new(faces: Vec<Face2D>) -> Self {
        Self { faces }
    }

    /// Build from polygons, deriving every centroid.
    pub fn from_polygons(
        polygons: impl IntoIterator<Item = Polygon<f64>>,
    ) -> Result<Self, ReachMeshError> {
        polygons
            .into_iter()
            .map(Face2D::new)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// A regular grid of `nx` by `ny` square cells of size `dx`, with its
    /// lower-left corner at `origin`. Faces are numbered row by row.
    pub fn rectilinear(
        origin: Coord<f64>,
        dx: f64,
        nx: usize,
        ny: usize,
    ) -> Result<Self, ReachMeshError> {
        if !(dx.is_finite() && dx > 0.0) {
            return Err(ReachMeshError::InvalidGeometry(format!(
                "cell size must be finite and > 0, got {dx}"
            )));
        }
        let cells = (0..ny).flat_map(|j| (0..nx).map(move |i| (i, j)));
        Self::from_polygons(cells.map(|(i, j)| {
            let x0 = origin.x + i as f64 * dx;
            let y0 = origin.y + j as f64 * dx;
            Rect::new(Coord { x: x0, y: y0 }, Coord { x: x0 + dx, y: y0 + dx }).to_polygon()
        }))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn face(&self, id: FaceId) -> Option<&Face2D> {
        self.faces.get(id.index())
    }

    /// Faces with their ids, in order.
    pub fn iter(&self) -> impl Iterator<Item = (FaceId, &Face2D)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, f)| (FaceId::from_index(i), f))
    }

    /// Centroids ordered by face id.
    pub fn centroids(&self) -> Vec<Coord<f64>> {
        self.faces.iter().map(Face2D::centroid).collect()
    }
}
