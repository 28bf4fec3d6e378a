//! Planar geometry helpers: branch polylines, nearest-neighbour indexing and
//! boundary probes.

pub mod polyline;
pub mod probe;
pub mod spatial_index;
