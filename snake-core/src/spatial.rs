//! Uniform grid over the unit square for nearest-target queries.
//!
//! The grid is rebuilt from scratch every tick (every node moves every
//! tick) and answers one question: which accepted node is closest to
//! node `i`. Queries walk square rings of cells outward from the node's
//! own cell and stop as soon as no unvisited cell can hold anything
//! closer than the best candidate found so far.

use crate::types::NodeId;
use glam::Vec2;

/// Bucketed node ids over a `cells_per_axis` x `cells_per_axis` grid
/// covering `[0, 1]²`.
///
/// Positions outside the unit square are clamped into the border cells;
/// this keeps every node findable without weakening the ring bound, since
/// a clamped node is never closer to a query than its cell suggests.
#[derive(Clone, Debug)]
pub struct UniformGrid {
    cells_per_axis: usize,
    cell_size: f32,
    buckets: Vec<Vec<NodeId>>,
}

impl UniformGrid {
    /// Creates an empty grid with the given resolution (at least one cell).
    pub fn with_cells(cells_per_axis: usize) -> Self {
        let cells_per_axis = cells_per_axis.max(1);
        Self {
            cells_per_axis,
            cell_size: 1.0 / cells_per_axis as f32,
            buckets: vec![Vec::new(); cells_per_axis * cells_per_axis],
        }
    }

    #[inline]
    pub fn cells_per_axis(&self) -> usize {
        self.cells_per_axis
    }

    /// Cell coordinates holding `p`, clamped into the grid.
    #[inline]
    pub fn cell_of(&self, p: Vec2) -> (usize, usize) {
        let n = self.cells_per_axis;
        let scale = n as f32;
        // `as usize` saturates negatives and NaN to 0.
        let cx = ((p.x * scale) as usize).min(n - 1);
        let cy = ((p.y * scale) as usize).min(n - 1);
        (cx, cy)
    }

    /// Re-buckets every node. Bucket allocations are reused between ticks.
    pub fn rebuild(&mut self, positions: &[Vec2]) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        for (id, &p) in positions.iter().enumerate() {
            let (cx, cy) = self.cell_of(p);
            self.buckets[cy * self.cells_per_axis + cx].push(id);
        }
    }

    /// Total number of bucketed nodes.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Finds the node closest to node `i` among those `accept` allows.
    ///
    /// `positions` must be the slice the grid was last rebuilt from. Node
    /// `i` itself is never returned. Exactly equal distances resolve to
    /// the lower id, so results do not depend on bucket order.
    ///
    /// ### Returns
    /// `Some((id, d2))` with the squared distance to the winner, or `None`
    /// if no node anywhere in the grid is accepted.
    pub fn nearest(
        &self,
        i: NodeId,
        positions: &[Vec2],
        mut accept: impl FnMut(NodeId) -> bool,
    ) -> Option<(NodeId, f32)> {
        let origin = positions[i];
        let (cx, cy) = self.cell_of(origin);
        let n = self.cells_per_axis;

        // Furthest ring that still contains a cell of the grid.
        let max_ring = cx.max(n - 1 - cx).max(cy).max(n - 1 - cy);

        let mut best: Option<(NodeId, f32)> = None;

        for ring in 0..=max_ring {
            // Everything outside rings 0..ring is at least (ring - 1) cells
            // away along some axis. Ties must keep searching.
            if let Some((_, best_d2)) = best
                && ring > 0
            {
                let reach = (ring - 1) as f32 * self.cell_size;
                if best_d2 < reach * reach {
                    break;
                }
            }

            self.visit_ring(cx, cy, ring, |bucket| {
                for &j in bucket {
                    if j == i || !accept(j) {
                        continue;
                    }
                    let d2 = (positions[j] - origin).length_squared();
                    if d2.is_nan() {
                        continue;
                    }
                    let closer = match best {
                        None => true,
                        Some((b, b_d2)) => d2 < b_d2 || (d2 == b_d2 && j < b),
                    };
                    if closer {
                        best = Some((j, d2));
                    }
                }
            });
        }

        best
    }

    /// Calls `f` with every bucket whose Chebyshev cell distance from
    /// `(cx, cy)` is exactly `ring`, clipped to the grid.
    fn visit_ring(&self, cx: usize, cy: usize, ring: usize, mut f: impl FnMut(&[NodeId])) {
        let n = self.cells_per_axis;
        let x0 = cx.saturating_sub(ring);
        let x1 = (cx + ring).min(n - 1);
        let y0 = cy.saturating_sub(ring);
        let y1 = (cy + ring).min(n - 1);

        for gy in y0..=y1 {
            let row = gy * n;
            if gy.abs_diff(cy) == ring {
                for gx in x0..=x1 {
                    f(&self.buckets[row + gx]);
                }
            } else {
                if cx >= ring {
                    f(&self.buckets[row + cx - ring]);
                }
                if ring > 0 && cx + ring < n {
                    f(&self.buckets[row + cx + ring]);
                }
            }
        }
    }
}
