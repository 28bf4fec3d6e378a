//! Piecewise-linear arc-length parametrisation of branch centerlines.
//!
//! A [`Polyline`] caches the cumulative length at every vertex so that
//! chainage → coordinate interpolation is a binary search plus one lerp, and
//! point → chainage projection is a single pass over the segments.

use geo::{Closest, ClosestPoint, Coord, Line, LineString, Point};

use crate::mesh_error::ReachMeshError;

/// Result of projecting a point onto a polyline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Chainage of the closest point along the polyline.
    pub chainage: f64,
    /// Closest point on the polyline.
    pub coord: Coord<f64>,
    /// Euclidean distance from the query point to `coord`.
    pub distance: f64,
}

/// A validated line string with cached cumulative vertex chainages.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    line: LineString<f64>,
    cumulative: Vec<f64>,
}

impl Polyline {
    /// Wrap a line string, validating it has at least two finite vertices.
    pub fn try_new(line: LineString<f64>) -> Result<Self, ReachMeshError> {
        if line.0.len() < 2 {
            return Err(ReachMeshError::InvalidGeometry(format!(
                "polyline needs at least 2 coordinates, got {}",
                line.0.len()
            )));
        }
        if let Some(bad) = line.0.iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(ReachMeshError::InvalidGeometry(format!(
                "non-finite coordinate ({}, {})",
                bad.x, bad.y
            )));
        }
        let mut cumulative = Vec::with_capacity(line.0.len());
        let mut total = 0.0;
        cumulative.push(total);
        for seg in line.lines() {
            total += segment_length(&seg);
            cumulative.push(total);
        }
        Ok(Self { line, cumulative })
    }

    /// Build from plain `(x, y)` pairs.
    pub fn from_xy(points: &[(f64, f64)]) -> Result<Self, ReachMeshError> {
        Self::try_new(points.iter().copied().collect())
    }

    /// Total length.
    #[inline]
    pub fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// First vertex.
    #[inline]
    pub fn start(&self) -> Coord<f64> {
        self.line.0[0]
    }

    /// Last vertex.
    #[inline]
    pub fn end(&self) -> Coord<f64> {
        self.line.0[self.line.0.len() - 1]
    }

    /// Underlying line string.
    #[inline]
    pub fn line_string(&self) -> &LineString<f64> {
        &self.line
    }

    /// Vertex coordinates.
    #[inline]
    pub fn coords(&self) -> &[Coord<f64>] {
        &self.line.0
    }

    /// Coordinate at `chainage`, clamped to `[0, length]`.
    pub fn interpolate(&self, chainage: f64) -> Coord<f64> {
        let s = chainage.clamp(0.0, self.length());
        // index of the first vertex with cumulative chainage >= s
        let upper = self.cumulative.partition_point(|&c| c < s);
        if upper == 0 {
            return self.start();
        }
        if upper >= self.cumulative.len() {
            return self.end();
        }
        let (c0, c1) = (self.cumulative[upper - 1], self.cumulative[upper]);
        let (p0, p1) = (self.line.0[upper - 1], self.line.0[upper]);
        let span = c1 - c0;
        if span <= 0.0 {
            return p1;
        }
        let t = (s - c0) / span;
        Coord {
            x: p0.x + t * (p1.x - p0.x),
            y: p0.y + t * (p1.y - p0.y),
        }
    }

    /// Closest point on the polyline to `point`, with its chainage.
    pub fn project(&self, point: Coord<f64>) -> Projection {
        let query = Point::from(point);
        let mut best = Projection {
            chainage: 0.0,
            coord: self.start(),
            distance: distance(point, self.start()),
        };
        for (i, seg) in self.line.lines().enumerate() {
            let closest = match seg.closest_point(&query) {
                Closest::Intersection(p) | Closest::SinglePoint(p) => p,
                Closest::Indeterminate => Point::from(seg.start),
            };
            let closest: Coord<f64> = closest.into();
            let d = distance(point, closest);
            if d < best.distance {
                best = Projection {
                    chainage: self.cumulative[i] + distance(seg.start, closest),
                    coord: closest,
                    distance: d,
                };
            }
        }
        best
    }

    /// The segment containing the endpoint nearest to `near`, oriented so that
    /// its `end` is that endpoint.
    pub fn end_segment_towards(&self, near: Coord<f64>) -> Line<f64> {
        let coords = self.coords();
        let n = coords.len();
        let d_start = distance(self.start(), near);
        let d_end = distance(self.end(), near);
        if d_start < d_end {
            Line::new(coords[1], coords[0])
        } else {
            Line::new(coords[n - 2], coords[n - 1])
        }
    }
}

/// Euclidean distance between two coordinates.
#[inline]
pub fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Distance from `point` to the closest point of `seg`.
pub fn segment_distance(point: Coord<f64>, seg: &Line<f64>) -> f64 {
    match seg.closest_point(&Point::from(point)) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => distance(point, p.into()),
        Closest::Indeterminate => distance(point, seg.start),
    }
}

#[inline]
fn segment_length(seg: &Line<f64>) -> f64 {
    distance(seg.start, seg.end)
}
