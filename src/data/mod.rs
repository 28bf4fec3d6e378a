//! Inputs supplied by the caller: branches, structures, the 2D mesh and
//! boundary-condition locations.

pub mod boundary;
pub mod branch;
pub mod mesh2d;
pub mod structures;
