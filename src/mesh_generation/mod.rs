//! 1D mesh generation: grid spacing, structure-aware offsets and the mesh
//! builder.

pub mod mesh1d;
pub mod offsets;
pub mod spacing;

pub use mesh1d::{Mesh1D, Mesh1DBuilder, Mesh1DOptions, build};
