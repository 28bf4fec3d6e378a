//! Grid-point spacing along a single branch.
//!
//! [`spacing`] turns a strictly increasing list of anchor chainages into grid
//! offsets. Every anchor becomes a grid point; each anchor gap is filled with
//! evenly spaced points whose count follows from the gap length and the target
//! spacing, so the resulting spacing is uniform per gap rather than globally.

use crate::mesh_error::ReachMeshError;

/// Upper bound on the grid points generated for a single anchor gap.
pub const MAX_NODES_PER_GAP: usize = 10_000_000;

/// Number of grid points (both ends included) for a gap of `length`.
///
/// Fails with [`ReachMeshError::InvalidSpacingInput`] when the gap would need
/// more than [`MAX_NODES_PER_GAP`] points.
pub fn nodes_for_gap(length: f64, target_spacing: f64) -> Result<usize, ReachMeshError> {
    let segments = (length / target_spacing).round();
    if !segments.is_finite() || segments >= MAX_NODES_PER_GAP as f64 {
        return Err(ReachMeshError::InvalidSpacingInput(format!(
            "gap of {length} at spacing {target_spacing} exceeds {MAX_NODES_PER_GAP} grid points"
        )));
    }
    Ok((segments as usize).saturating_add(1).max(2))
}

/// Generate grid offsets through `anchors` with roughly `target_spacing`.
///
/// Fails with [`ReachMeshError::InvalidSpacingInput`] for fewer than two
/// anchors, non-finite anchors, or a non-positive spacing, and with
/// [`ReachMeshError::DegenerateSegment`] when an anchor gap is not positive.
///
/// ```rust
/// use reach_mesh::mesh_generation::spacing::spacing;
///
/// let offsets = spacing(&[0.0, 100.0], 40.0)?;
/// assert_eq!(offsets.len(), 4);
/// assert!((offsets[1] - 100.0 / 3.0).abs() < 1e-12);
/// # Ok::<(), reach_mesh::mesh_error::ReachMeshError>(())
/// ```
pub fn spacing(anchors: &[f64], target_spacing: f64) -> Result<Vec<f64>, ReachMeshError> {
    if anchors.len() < 2 {
        return Err(ReachMeshError::InvalidSpacingInput(format!(
            "need at least 2 anchors, got {}",
            anchors.len()
        )));
    }
    if !(target_spacing.is_finite() && target_spacing > 0.0) {
        return Err(ReachMeshError::InvalidSpacingInput(format!(
            "target spacing must be finite and > 0, got {target_spacing}"
        )));
    }
    if anchors.iter().any(|a| !a.is_finite()) {
        return Err(ReachMeshError::InvalidSpacingInput(
            "anchors must be finite".into(),
        ));
    }

    let mut offsets = Vec::new();
    for (index, pair) in anchors.windows(2).enumerate() {
        let (start, end) = (pair[0], pair[1]);
        let length = end - start;
        if length <= 0.0 {
            return Err(ReachMeshError::DegenerateSegment { index, length });
        }
        let steps = nodes_for_gap(length, target_spacing)? - 1;
        let step = length / steps as f64;
        offsets.extend((0..steps).map(|k| start + step * k as f64));
    }
    offsets.push(anchors[anchors.len() - 1]);
    Ok(offsets)
}
