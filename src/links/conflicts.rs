//! Removal of links that would compete with a boundary condition.
//!
//! A boundary condition is only honoured by the solver at a branch end, and a
//! 1D–2D link on the end node or the node next to it would short-circuit it.
//! For every boundary the mesh node nearest to the probe centroid is found and
//! all links on that node and its edge neighbours are removed. Resolution only
//! removes links, so applying it twice changes nothing the second time.

use crate::data::boundary::BoundaryLocation;
use crate::links::Links1D2D;
use crate::mesh_generation::mesh1d::Mesh1D;

/// Resolve conflicts on a copy of `links`.
pub fn resolve(links: &Links1D2D, boundaries: &[BoundaryLocation], mesh1d: &Mesh1D) -> Links1D2D {
    let mut out = links.clone();
    out.resolve_boundary_conflicts(boundaries, mesh1d);
    out
}

impl Links1D2D {
    /// Remove links too close to any of `boundaries`; returns how many were
    /// removed.
    pub fn resolve_boundary_conflicts(
        &mut self,
        boundaries: &[BoundaryLocation],
        mesh1d: &Mesh1D,
    ) -> usize {
        let mut removed = 0;
        for bc in boundaries {
            if self.is_empty() {
                break;
            }
            let at = bc.centroid();
            let Some((nearest, _)) = mesh1d.nearest_node(at) else {
                break;
            };
            if mesh1d.degree(nearest) > 1 {
                if let Some(node) = mesh1d.node(nearest) {
                    log::warn!(
                        "The boundary condition at ({:.2}, {:.2}) is not a branch end. \
                         Check if it is picked up by the solver.",
                        node.coord.x,
                        node.coord.y
                    );
                }
            }

            let mut targets = vec![nearest];
            targets.extend_from_slice(mesh1d.neighbours(nearest));
            targets.sort_unstable();
            targets.dedup();
            for id in targets {
                let n = self.remove_node(id);
                if n == 0 {
                    continue;
                }
                removed += n;
                if let Some(node) = mesh1d.node(id) {
                    log::info!(
                        "Removed link(s) from 1d node: ({:.2}, {:.2}) because it is too close \
                         to boundary condition at ({:.2}, {:.2}).",
                        node.coord.x,
                        node.coord.y,
                        at.x,
                        at.y
                    );
                }
            }
        }
        removed
    }
}
