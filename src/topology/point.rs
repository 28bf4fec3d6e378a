//! Strong, zero-cost handles for network nodes, mesh nodes and 2D faces.
//!
//! Every entity the mesh builder and link generator hand out is addressed by a
//! 1-based integer, matching the numbering the solver input expects. Each
//! handle wraps a `NonZeroU64` so that 0 stays reserved as an invalid or
//! sentinel value, and so that `Option<Id>` costs nothing extra.
//!
//! The three handle types are distinct so a face id can never be passed where
//! a mesh node id is expected.

use std::{fmt, num::NonZeroU64};

use crate::mesh_error::ReachMeshError;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
        )]
        #[repr(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// Creates a handle from a raw 1-based value.
            ///
            /// Returns [`ReachMeshError::InvalidId`] if `raw == 0`.
            #[inline]
            pub fn new(raw: u64) -> Result<Self, ReachMeshError> {
                NonZeroU64::new(raw).map($name).ok_or(ReachMeshError::InvalidId)
            }

            /// Creates the handle for the 0-based position `index`.
            #[inline]
            pub fn from_index(index: usize) -> Self {
                $name(NonZeroU64::MIN.saturating_add(index as u64))
            }

            /// Returns the raw 1-based value.
            #[inline]
            pub const fn get(self) -> u64 {
                self.0.get()
            }

            /// Returns the 0-based position this handle refers to.
            #[inline]
            pub const fn index(self) -> usize {
                (self.0.get() - 1) as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.get()).finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.get())
            }
        }
    };
}

define_id!(
    /// Handle of a network node: a branch endpoint shared by every branch that
    /// starts or ends at the same coordinate.
    NetworkNodeId
);

define_id!(
    /// Handle of a 1D computational (mesh) node.
    MeshNodeId
);

define_id!(
    /// Handle of an externally supplied 2D face; equal to its position in the
    /// 2D mesh plus one.
    FaceId
);
