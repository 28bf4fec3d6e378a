//! Nearest-neighbour index over a fixed set of 2D points.
//!
//! The index is bulk-loaded once into an R*-tree and is read-only afterwards;
//! rebuilding is the only way to reflect a changed point set. Query results
//! report the 0-based position of the matching point in the input slice.
//!
//! # Example
//! ```rust
//! use geo::Coord;
//! use reach_mesh::geometry::spatial_index::SpatialIndex;
//!
//! let index = SpatialIndex::new(&[Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 0.0 }]);
//! let hit = index.nearest(Coord { x: 8.0, y: 0.0 }).unwrap();
//! assert_eq!(hit.index, 1);
//! assert_eq!(hit.distance, 2.0);
//! ```

use geo::{Coord, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, PointDistance, RTree};

type IndexedPoint = GeomWithData<[f64; 2], usize>;
type IndexedBox = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// One nearest-neighbour hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearest {
    /// Position of the point in the slice the index was built from.
    pub index: usize,
    /// Euclidean distance from the query to that point.
    pub distance: f64,
}

/// Read-only nearest-neighbour index over 2D points.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self { tree: RTree::new() }
    }
}

impl SpatialIndex {
    /// Bulk-load an index over `points`.
    pub fn new(points: &[Coord<f64>]) -> Self {
        let entries: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(i, c)| GeomWithData::new([c.x, c.y], i))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed points.
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Nearest indexed point to `query`, or `None` for an empty index.
    pub fn nearest(&self, query: Coord<f64>) -> Option<Nearest> {
        let q = [query.x, query.y];
        self.tree.nearest_neighbor(&q).map(|hit| Nearest {
            index: hit.data,
            distance: hit.geom().distance_2(&q).sqrt(),
        })
    }

    /// Nearest point for every query, as parallel `(indices, distances)`
    /// arrays. Empty when the index is empty.
    pub fn nearest_many(&self, queries: &[Coord<f64>]) -> (Vec<usize>, Vec<f64>) {
        if self.is_empty() {
            return (Vec::new(), Vec::new());
        }
        queries
            .iter()
            .filter_map(|&q| self.nearest(q))
            .map(|hit| (hit.index, hit.distance))
            .unzip()
    }
}

/// Read-only index of axis-aligned boxes, used as a bounding-box pre-filter
/// before exact geometric predicates.
#[derive(Debug, Clone)]
pub struct EnvelopeIndex {
    tree: RTree<IndexedBox>,
}

impl EnvelopeIndex {
    /// Bulk-load an index over `boxes`; positions are reported by query.
    pub fn new(boxes: impl IntoIterator<Item = Rect<f64>>) -> Self {
        let entries: Vec<IndexedBox> = boxes
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                let (lo, hi) = (r.min(), r.max());
                GeomWithData::new(Rectangle::from_corners([lo.x, lo.y], [hi.x, hi.y]), i)
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Positions of all boxes intersecting `query`, in ascending order.
    pub fn candidates(&self, query: Rect<f64>) -> Vec<usize> {
        let (lo, hi) = (query.min(), query.max());
        let env = AABB::from_corners([lo.x, lo.y], [hi.x, hi.y]);
        let mut out: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&env)
            .map(|entry| entry.data)
            .collect();
        out.sort_unstable();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<Coord<f64>> {
        let mut pts = Vec::new();
        for j in 0..5 {
            for i in 0..5 {
                pts.push(Coord {
                    x: i as f64 * 10.0,
                    y: j as f64 * 10.0,
                });
            }
        }
        pts
    }

    #[test]
    fn empty_index_returns_none() {
        let index = SpatialIndex::new(&[]);
        assert!(index.is_empty());
        assert_eq!(index.nearest(Coord { x: 0.0, y: 0.0 }), None);
        let (idx, dist) = index.nearest_many(&[Coord { x: 1.0, y: 1.0 }]);
        assert!(idx.is_empty() && dist.is_empty());
    }

    #[test]
    fn nearest_matches_brute_force() {
        let pts = grid();
        let index = SpatialIndex::new(&pts);
        assert_eq!(index.len(), 25);
        let queries = [
            Coord { x: 3.0, y: 4.0 },
            Coord { x: 41.0, y: 38.0 },
            Coord { x: -7.0, y: 22.0 },
        ];
        let (idx, dist) = index.nearest_many(&queries);
        for (k, q) in queries.iter().enumerate() {
            let (bi, bd) = pts
                .iter()
                .enumerate()
                .map(|(i, p)| (i, (p.x - q.x).hypot(p.y - q.y)))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .unwrap();
            assert_eq!(idx[k], bi);
            assert!((dist[k] - bd).abs() < 1e-12);
        }
    }

    #[test]
    fn envelope_candidates_are_sorted() {
        let boxes = vec![
            Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }),
            Rect::new(Coord { x: 5.0, y: 5.0 }, Coord { x: 6.0, y: 6.0 }),
            Rect::new(Coord { x: 0.5, y: 0.5 }, Coord { x: 2.0, y: 2.0 }),
        ];
        let index = EnvelopeIndex::new(boxes);
        let hits = index.candidates(Rect::new(Coord { x: 0.8, y: 0.8 }, Coord { x: 0.9, y: 0.9 }));
        assert_eq!(hits, vec![0, 2]);
    }
}
