//! Final passes over the lower bound sequence.
//!
//! [`settle`] hands unused surplus back to the cells it was borrowed from.
//! [`diffuse`] then walks the curve once and subdivides a unit whenever the
//! accumulated value crosses the midpoint between its own length and the
//! length of its children, carrying the rounding error along the way.

use log::{debug, warn};

use crate::{
    cell::CellId,
    config::FillConfig,
    constraint::{has_leaf, is_unit_constrained, unit_containing},
    sequence::Sequence,
    subdivide::{self, MAX_ITERATIONS, Mode},
    tree::Tree,
};

/// Tally of the decisions taken by [`diffuse`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffusionCounts {
    /// Two-cell units blocked by a coarser neighbor.
    pub pair_constrained: usize,
    /// Units blocked by a coarser neighbor.
    pub constrained: usize,
    /// Units free to be subdivided.
    pub unconstrained: usize,
    /// Units that were subdivided.
    pub subdivided: usize,
    /// Cells whose value entered the carry.
    pub carried: usize,
}

/// Return surplus value of single cells to their lenders until nothing
/// moves any more. Returns whether anything moved.
pub fn settle(tree: &mut Tree, seq: &Sequence) -> bool {
    let mut changed = false;
    for sweep in 0.. {
        if sweep == MAX_ITERATIONS {
            warn!("settling stopped after {MAX_ITERATIONS} sweeps");
            break;
        }
        let mut moved = false;
        for level in seq.by_depth(tree) {
            for id in level {
                moved |= subdivide::redistribute_leftover_errors(tree, seq, &[id], Mode::Settle);
            }
        }
        if !moved {
            debug!("settled after {sweep} sweeps");
            break;
        }
        changed = true;
    }
    changed
}

/// Walk the curve once and subdivide the units whose value, plus the carried
/// rounding error, reaches the midpoint between staying and subdividing.
///
/// Two units overlap when a cell entering through its long edge follows
/// another one. The shared cell, or the last child it was replaced by, has
/// already entered the carry with the earlier unit and is left out of the
/// later one.
pub fn diffuse(tree: &mut Tree, seq: &mut Sequence, config: &FillConfig) -> DiffusionCounts {
    let mut counts = DiffusionCounts::default();
    let mut carry = 0.0;
    let mut counted: Option<CellId> = None;
    let mut cursor = Some(seq.first());
    while let Some(id) = cursor {
        cursor = seq.next(id);
        let unit = unit_containing(tree, seq, id);
        if unit.last() != Some(&id) {
            continue;
        }

        let constrained = is_unit_constrained(tree, seq, &unit);
        if constrained {
            counts.constrained += 1;
            if unit.len() > 1 {
                counts.pair_constrained += 1;
            }
        } else {
            counts.unconstrained += 1;
        }

        let fresh = match unit.split_first() {
            Some((&first, rest)) if Some(first) == counted => rest,
            _ => &unit[..],
        };
        counts.carried += fresh.len();
        let mut boundary = 0.0;
        let mut value = 0.0;
        let mut realized = 0.0;
        let mut child_realized = 0.0;
        for &m in fresh {
            let cell = &tree[m];
            boundary += (cell.realized_length + cell.total_child_realized_length) / 2.0;
            value += if config.use_errors_in_dithering() {
                cell.errored_value()
            } else {
                cell.requested_length
            };
            realized += cell.realized_length;
            child_realized += cell.total_child_realized_length;
        }

        if value - boundary + carry >= 0.0 && !constrained && !has_leaf(tree, &unit) {
            let children = subdivide::subdivide(tree, seq, &unit, false);
            counted = children.last().copied();
            counts.subdivided += 1;
            if config.dithering() {
                carry += value - child_realized;
            }
        } else {
            counted = Some(id);
            if config.dithering() {
                carry += value - realized;
            }
        }
    }
    debug!(
        "diffusion: {} unconstrained, {} constrained ({} pairs), {} subdivided, {} cells carried, carry {carry:.3}",
        counts.unconstrained, counts.constrained, counts.pair_constrained, counts.subdivided, counts.carried
    );
    counts
}
