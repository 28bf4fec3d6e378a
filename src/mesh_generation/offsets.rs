//! Per-branch grid offsets with structure separation.
//!
//! Every branch starts from an even grid between its two ends. Branches that
//! carry structures are then refined until each structure sits strictly
//! between two grid points: around every distinct structure chainage `c` a
//! left window `[lo, c)` and a right window `(c, hi]` must each hold a grid
//! point, and no grid point may coincide with `c`. The window half-width is
//! the configured margin (capped at a quarter of the target spacing); where two
//! structures are closer than that, the windows stop at their midpoint. A
//! violated window gets an anchor at its midpoint and the branch is re-spaced.
//!
//! Each insertion places a permanent grid point inside its window, so at most
//! two insertions per structure are needed; the loop is guarded by
//! [`Mesh1DOptions::max_refinement_iterations`] regardless.

use hashbrown::HashMap;
use itertools::Itertools;

use crate::data::branch::Branch;
use crate::data::structures::StructureChainage;
use crate::mesh_error::ReachMeshError;
use crate::mesh_generation::mesh1d::Mesh1DOptions;
use crate::mesh_generation::spacing::spacing;

/// Distance below which a grid point counts as sitting on a structure.
pub const CHAINAGE_EPS: f64 = 1e-9;

/// Structures closer than this to a branch end or to each other cannot be
/// separated by grid points further than [`CHAINAGE_EPS`] from them.
pub const MIN_STRUCTURE_SEPARATION: f64 = 8.0 * CHAINAGE_EPS;

/// The pair of windows around one structure chainage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StructureWindow {
    pub chainage: f64,
    /// Lower bound of the left window `[lower, chainage)`.
    pub lower: f64,
    /// Upper bound of the right window `(chainage, upper]`.
    pub upper: f64,
}

impl StructureWindow {
    #[inline]
    fn left_midpoint(&self) -> f64 {
        0.5 * (self.lower + self.chainage)
    }

    #[inline]
    fn right_midpoint(&self) -> f64 {
        0.5 * (self.chainage + self.upper)
    }

    fn left_covered(&self, offsets: &[f64]) -> bool {
        offsets.iter().any(|&o| o >= self.lower && o < self.chainage)
    }

    fn right_covered(&self, offsets: &[f64]) -> bool {
        offsets.iter().any(|&o| o > self.chainage && o <= self.upper)
    }

    fn on_grid_point(&self, offsets: &[f64]) -> bool {
        offsets
            .iter()
            .any(|&o| (o - self.chainage).abs() <= CHAINAGE_EPS)
    }
}

/// Build the windows for sorted, distinct chainages inside `(0, length)`.
pub fn structure_windows(chainages: &[f64], length: f64, margin: f64) -> Vec<StructureWindow> {
    chainages
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let prev = if i == 0 {
                0.0
            } else {
                0.5 * (chainages[i - 1] + c)
            };
            let next = chainages
                .get(i + 1)
                .map_or(length, |&n| 0.5 * (c + n));
            StructureWindow {
                chainage: c,
                lower: (c - margin).max(prev),
                upper: (c + margin).min(next),
            }
        })
        .collect()
}

enum Coverage {
    Complete,
    Insert(f64),
    Stuck(f64),
}

fn check_coverage(windows: &[StructureWindow], offsets: &[f64], anchors: &[f64]) -> Coverage {
    for w in windows {
        if !w.left_covered(offsets) {
            return Coverage::Insert(w.left_midpoint());
        }
        if !w.right_covered(offsets) {
            return Coverage::Insert(w.right_midpoint());
        }
        if w.on_grid_point(offsets) {
            let (left, right) = (w.left_midpoint(), w.right_midpoint());
            if !anchors.contains(&left) {
                return Coverage::Insert(left);
            }
            if !anchors.contains(&right) {
                return Coverage::Insert(right);
            }
            return Coverage::Stuck(w.chainage);
        }
    }
    Coverage::Complete
}

/// Offsets for one branch, refined around `chainages`.
///
/// Chainages outside `(0, length)` cannot be separated by grid points and are
/// skipped with a warning; repeated chainages are collapsed with a warning.
pub fn refine_offsets(
    branch_id: &str,
    length: f64,
    chainages: &[f64],
    options: &Mesh1DOptions,
) -> Result<Vec<f64>, ReachMeshError> {
    options.validate()?;
    let target = options.target_spacing;
    let mut anchors = vec![0.0, length];
    let mut offsets = spacing(&anchors, target)?;

    let (inside, outside): (Vec<f64>, Vec<f64>) =
        chainages.iter().copied().partition(|&c| {
            c > MIN_STRUCTURE_SEPARATION && c < length - MIN_STRUCTURE_SEPARATION
        });
    if !outside.is_empty() {
        log::warn!(
            "Structures on branch `{branch_id}` at chainage(s) {outside:?} lie at a branch end \
             or outside (0, {length}) and are ignored for spacing."
        );
    }
    let mut limits: Vec<f64> = inside
        .into_iter()
        .sorted_by(|a, b| a.total_cmp(b))
        .collect();
    let before = limits.len();
    limits.dedup_by(|later, kept| *later - *kept <= MIN_STRUCTURE_SEPARATION);
    if limits.len() < before {
        log::warn!(
            "Structures on branch `{branch_id}` share a chainage; \
             {} duplicate location(s) collapsed.",
            before - limits.len()
        );
    }
    if limits.is_empty() {
        return Ok(offsets);
    }

    let margin = options.structure_margin.min(0.25 * target);
    let windows = structure_windows(&limits, length, margin);
    let guard = options
        .max_refinement_iterations
        .unwrap_or(2 * limits.len() + 1);

    let mut inserted = 0usize;
    loop {
        match check_coverage(&windows, &offsets, &anchors) {
            Coverage::Complete => break,
            Coverage::Stuck(chainage) => {
                log::debug!("branch `{branch_id}`: grid point remains on structure at {chainage}");
                return Err(ReachMeshError::SpacingDidNotConverge {
                    branch: branch_id.to_owned(),
                    iterations: inserted,
                });
            }
            Coverage::Insert(anchor) => {
                if inserted >= guard {
                    return Err(ReachMeshError::SpacingDidNotConverge {
                        branch: branch_id.to_owned(),
                        iterations: inserted,
                    });
                }
                anchors.push(anchor);
                anchors.sort_by(|a, b| a.total_cmp(b));
                offsets = spacing(&anchors, target)?;
                inserted += 1;
            }
        }
    }

    if inserted > 0 {
        log::info!(
            "Added 1d mesh nodes on branch {branch_id} at: {:?}, \
             due to the structures at {limits:?}.",
            &anchors[1..anchors.len() - 1]
        );
    }
    Ok(offsets)
}

/// Offsets for every branch (indexed like `branches`).
///
/// Structures with an empty branch id are logged and left out; a structure
/// referring to a branch that is not in `branches` is an error.
pub fn generate_offsets(
    branches: &[Branch],
    structures: &[StructureChainage],
    options: &Mesh1DOptions,
) -> Result<Vec<Vec<f64>>, ReachMeshError> {
    let position: HashMap<&str, usize> = branches
        .iter()
        .enumerate()
        .map(|(i, b)| (b.id(), i))
        .collect();

    let unassigned: Vec<&str> = structures
        .iter()
        .filter(|s| !s.is_assigned())
        .map(|s| s.structure_id.as_str())
        .collect();
    if !unassigned.is_empty() {
        log::warn!(
            "Some structures are not linked to a branch: {}",
            unassigned.join(", ")
        );
    }

    let mut per_branch: Vec<Vec<f64>> = vec![Vec::new(); branches.len()];
    for s in structures.iter().filter(|s| s.is_assigned()) {
        let &i = position
            .get(s.branch_id.as_str())
            .ok_or_else(|| ReachMeshError::UnknownBranch(s.branch_id.clone()))?;
        per_branch[i].push(s.chainage);
    }

    branches
        .iter()
        .zip(per_branch)
        .map(|(b, chainages)| refine_offsets(b.id(), b.length(), &chainages, options))
        .collect()
}
