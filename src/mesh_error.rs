//! ReachMeshError: Unified error type for reach-mesh public APIs
//!
//! Every fallible operation in the crate returns this error. All variants
//! describe invalid input data; none of them are transient, so callers should
//! fix the input rather than retry.

use thiserror::Error;

/// Unified error type for reach-mesh operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReachMeshError {
    /// Attempted to construct an id with a zero value (ids are 1-based).
    #[error("Ids must be non-zero (0 is reserved as invalid/sentinel)")]
    InvalidId,
    /// No branches were supplied to the mesh builder.
    #[error("Network error: no branches supplied")]
    EmptyNetwork,
    /// A branch starts and ends at the same coordinate.
    #[error("Ring geometry: start and end node of branch `{branch}` are the same")]
    RingGeometry { branch: String },
    /// Two consecutive spacing anchors do not enclose a positive length.
    #[error("Degenerate segment: anchor gap {index} has length {length} (must be > 0)")]
    DegenerateSegment { index: usize, length: f64 },
    /// Anchor list or target spacing is unusable.
    #[error("Invalid spacing input: {0}")]
    InvalidSpacingInput(String),
    /// A maximum link distance that is zero, negative or NaN.
    #[error("Invalid distance: max distance must be > 0, got {0}")]
    InvalidDistance(f64),
    /// A structure cannot be tied to exactly one branch or controller.
    #[error("Ambiguous structure assignment for `{structure}`: {reason}")]
    AmbiguousStructureAssignment { structure: String, reason: String },
    /// Structure refinement did not cover every window within the iteration guard.
    #[error("Spacing on branch `{branch}` did not converge after {iterations} anchor insertions")]
    SpacingDidNotConverge { branch: String, iterations: usize },
    /// A reference to a branch id that is not part of the network.
    #[error("Unknown branch `{0}`")]
    UnknownBranch(String),
    /// Two branches share the same identifier.
    #[error("Duplicate branch id `{0}`")]
    DuplicateBranch(String),
    /// An internal consistency check on a built mesh or link set failed.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
    /// Geometry that cannot be meshed (too few or non-finite coordinates).
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}
