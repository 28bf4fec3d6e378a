#![cfg_attr(docsrs, feature(doc_cfg))]
//! # reach-mesh
//!
//! reach-mesh builds the 1D computational mesh of a channel network and links
//! it to a 2D surface mesh, as needed by coupled 1D–2D hydrodynamic models.
//!
//! ## Pipeline
//! 1. [`data::branch::Branch`] polylines and [`data::structures::StructureChainage`]
//!    records go into [`mesh_generation::Mesh1DBuilder`], which spaces grid
//!    points along every branch, keeps structures strictly between two grid
//!    points, merges coincident branch ends into network nodes and numbers the
//!    computational nodes.
//! 2. [`links::generate`] connects the resulting [`mesh_generation::Mesh1D`]
//!    to a [`data::mesh2d::Mesh2D`] in one of three [`links::LinkMode`]s.
//! 3. [`links::resolve`] removes links that would compete with a boundary
//!    condition at a branch end; [`links::Links1D2D::remove_near`] and
//!    [`links::Links1D2D::remove_from_defect_report`] remove links on demand.
//!
//! ## Features
//! - `rayon`: run the link crossing filter in parallel. Output is identical to
//!   the serial path.
//! - `check-invariants` / `strict-invariants`: validate built meshes and link
//!   sets in release builds too (always on with `debug_assertions`).
//!
//! ## Logging
//! Diagnostics go through the [`log`] facade. The crate never installs a
//! logger; warnings cover unassigned structures and boundaries that are not at
//! a branch end, info messages cover inserted grid points and removed links.
//!
//! ## Example
//! ```rust
//! use geo::Coord;
//! use reach_mesh::prelude::*;
//!
//! let branches = vec![
//!     Branch::from_xy("upstream", &[(0.0, 0.0), (100.0, 0.0)])?,
//!     Branch::from_xy("tributary", &[(100.0, 0.0), (100.0, 60.0)])?,
//! ];
//! let structures = vec![StructureChainage::new("weir-1", "upstream", 50.0)];
//! let mesh1d = Mesh1DBuilder::new(Mesh1DOptions::default()).build(&branches, &structures)?;
//! assert_eq!(mesh1d.network_nodes().len(), 3);
//!
//! let mesh2d = Mesh2D::rectilinear(Coord { x: -10.0, y: -30.0 }, 20.0, 7, 6)?;
//! let links = generate(LinkMode::OneToTwo, &mesh1d, &mesh2d, 15.0)?;
//! let boundary = BoundaryLocation::at_branch_end(
//!     &branches[0],
//!     Coord { x: -5.0, y: 0.0 },
//!     &ProbeOptions::default(),
//! )?;
//! let links = resolve(&links, &[boundary], &mesh1d);
//! assert!(links.len() < mesh1d.nodes().len());
//! # Ok::<(), reach_mesh::mesh_error::ReachMeshError>(())
//! ```

pub mod data;
pub mod debug_invariants;
pub mod geometry;
pub mod links;
pub mod mesh_error;
pub mod mesh_generation;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::data::boundary::BoundaryLocation;
    pub use crate::data::branch::{Branch, Roughness};
    pub use crate::data::mesh2d::{Face2D, Mesh2D};
    pub use crate::data::structures::{Structure, StructureChainage, StructureLocation};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::probe::ProbeOptions;
    pub use crate::geometry::spatial_index::SpatialIndex;
    pub use crate::links::{
        DefectRecord, Link1D2D, LinkMode, LinkOptions, Links1D2D, MeshSide, generate, resolve,
    };
    pub use crate::mesh_error::ReachMeshError;
    pub use crate::mesh_generation::spacing::spacing;
    pub use crate::mesh_generation::{Mesh1D, Mesh1DBuilder, Mesh1DOptions};
    pub use crate::topology::branch_topology::{BranchTopology, NetworkNode};
    pub use crate::topology::point::{FaceId, MeshNodeId, NetworkNodeId};
}
