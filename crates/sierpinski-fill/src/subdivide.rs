//! Constrained subdivision and the error ledger.
//!
//! Every cell keeps two ledger entries, one per sequence neighbor. A positive
//! entry is value obtained from that neighbor, a negative one value lent to
//! it. Across every boundary of the sequence the two entries cancel, so value
//! is only ever moved between cells, never created.
//!
//! The refinement loop subdivides every unit whose errored value pays for
//! its children, hands the outer ledger entries down to the new cells and
//! then spreads any deficit among the children so that none of them ends up
//! below its own realized length.

use log::{debug, warn};
use smallvec::SmallVec;

use crate::{
    bubble,
    cell::CellId,
    constraint::{has_leaf, is_unit_constrained, unit_containing},
    sequence::Sequence,
    tree::Tree,
};

/// Slack allowed on ledger balances, in units of length.
pub const TOLERANCE: f64 = 0.01;

/// Upper bound on subdivision rounds of the refinement loop.
pub const MAX_ITERATIONS: usize = 999;

/// Below this the non-negative children cannot carry any compensation.
const BALANCE_EPSILON: f64 = 1e-4;

/// New cells created by subdividing a unit, in curve order.
pub type Children = SmallVec<[CellId; 4]>;

/// What counts as surplus when handing value back to the neighbors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Surplus over the children's realized length; the unit is about to be
    /// subdivided.
    Subdivision,
    /// Surplus over the cell's own realized length.
    Settle,
}

/// Refine the sequence until no unit can be subdivided without a deficit.
///
/// Alternates [`subdivide_all`] with moving errors off constrained cells
/// (when `constraint_error_diffusion` is set). Returns the number of rounds.
pub fn create_lower_bound_sequence(
    tree: &mut Tree,
    seq: &mut Sequence,
    constraint_error_diffusion: bool,
) -> usize {
    let mut iterations = 0;
    loop {
        if iterations == MAX_ITERATIONS {
            warn!("refinement stopped after {MAX_ITERATIONS} rounds without settling");
            break;
        }
        iterations += 1;
        let mut changed = subdivide_all(tree, seq);
        if constraint_error_diffusion {
            changed |= bubble::bubble_up_constraint_errors(tree, seq);
        }
        if !changed {
            break;
        }
    }
    debug!(
        "lower bound sequence of {} cells after {iterations} rounds",
        seq.len()
    );
    iterations
}

/// One pass over the sequence, shallowest cells first, subdividing every
/// unconstrained unit whose subdivision error is non-negative.
///
/// Returns whether anything was subdivided.
pub fn subdivide_all(tree: &mut Tree, seq: &mut Sequence) -> bool {
    let mut changed = false;
    for level in seq.by_depth(tree) {
        for id in level {
            if !seq.contains(id) {
                continue;
            }
            let unit = unit_containing(tree, seq, id);
            // Units are handled once, at their last member.
            if unit.last() != Some(&id)
                || has_leaf(tree, &unit)
                || is_unit_constrained(tree, seq, &unit)
            {
                continue;
            }
            let error: f64 = unit.iter().map(|&m| tree[m].subdivision_error()).sum();
            if error >= 0.0 {
                subdivide(tree, seq, &unit, true);
                changed = true;
            }
        }
    }
    changed
}

/// Replace `unit` by the children of its members.
///
/// The first child of every member inherits the member's left ledger entry
/// and the last child its right one. With `redistribute` set, surplus is
/// first handed back to the neighbors and the children are balanced
/// afterwards. Returns the children.
///
/// Callers check [`has_leaf`] first; a unit holding a leaf is a fault and
/// is left in place.
pub fn subdivide(tree: &mut Tree, seq: &mut Sequence, unit: &[CellId], redistribute: bool) -> Children {
    let leaf = unit.iter().find(|&&id| tree[id].is_leaf());
    if let Some(leaf) = leaf {
        warn!("asked to subdivide {unit:?} holding the leaf {leaf:?}");
    }
    debug_assert!(leaf.is_none(), "subdividing a unit with a leaf");
    if leaf.is_some() {
        return Children::new();
    }
    let children: Children = unit.iter().flat_map(|&id| tree[id].children).flatten().collect();

    if redistribute {
        redistribute_leftover_errors(tree, seq, unit, Mode::Subdivision);
    }
    for (&parent, pair) in unit.iter().zip(children.chunks(2)) {
        let (left, right) = (tree[parent].error_left, tree[parent].error_right);
        tree[pair[0]].error_left += left;
        tree[pair[1]].error_right += right;
    }
    seq.replace(unit, &children);
    if redistribute {
        balance_errors(tree, &children);
    }
    children
}

/// Hand surplus value of `unit` back to the neighbors it was obtained from.
///
/// Inner boundaries of the unit are balanced first. The surplus is returned
/// to each side in proportion to what that side lent, up to the total lent.
/// Returns whether any value moved.
pub fn redistribute_leftover_errors(tree: &mut Tree, seq: &Sequence, unit: &[CellId], mode: Mode) -> bool {
    let (Some(&first), Some(&last)) = (unit.first(), unit.last()) else {
        return false;
    };
    for pair in unit.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        let imbalance = tree[left].error_right + tree[right].error_left;
        if imbalance.abs() > TOLERANCE {
            warn!("unbalanced ledger between {left:?} and {right:?}: {imbalance}");
        }
        debug_assert!(imbalance.abs() <= TOLERANCE, "unbalanced ledger inside a unit");
        tree[right].error_left = -tree[left].error_right;
    }

    let superfluous: f64 = unit
        .iter()
        .map(|&id| match mode {
            Mode::Subdivision => tree[id].subdivision_error(),
            Mode::Settle => tree[id].value_error(),
        })
        .sum();
    let deficit = mode == Mode::Subdivision && superfluous < -TOLERANCE;
    if deficit {
        warn!("subdividing {unit:?} with a deficit of {}", -superfluous);
    }
    debug_assert!(!deficit, "subdividing a unit with a deficit");
    if superfluous < TOLERANCE {
        return false;
    }

    let prev = seq.prev(first);
    let next = seq.next(last);
    let left_influx = if prev.is_some() {
        tree[first].error_left.max(0.0)
    } else {
        0.0
    };
    let right_influx = if next.is_some() {
        tree[last].error_right.max(0.0)
    } else {
        0.0
    };
    let influx = left_influx + right_influx;
    if influx < TOLERANCE {
        return false;
    }

    let moved = superfluous.min(influx);
    let to_left = moved * left_influx / influx;
    let to_right = moved * right_influx / influx;
    if let Some(prev) = prev {
        tree[first].error_left -= to_left;
        tree[prev].error_right += to_left;
    }
    if let Some(next) = next {
        tree[last].error_right -= to_right;
        tree[next].error_left += to_right;
    }
    true
}

/// Move value between consecutive `cells` so that none is left below its
/// realized length, taking from the others in proportion to their surplus.
///
/// The outer ledger entries of the run are left untouched.
pub fn balance_errors(tree: &mut Tree, cells: &[CellId]) {
    let mut order: SmallVec<[usize; 4]> = (0..cells.len()).collect();
    order.sort_by(|&i, &j| {
        tree[cells[i]]
            .value_error()
            .total_cmp(&tree[cells[j]].value_error())
    });

    let mut compensation: SmallVec<[f64; 4]> = SmallVec::from_elem(0.0, cells.len());
    let mut added = 0.0;
    let mut remaining = 0.0;
    for &i in &order {
        let error = tree[cells[i]].value_error();
        if error < 0.0 {
            compensation[i] = -error;
            added -= error;
        } else {
            remaining += error;
        }
    }
    let short = remaining < added - TOLERANCE;
    if short {
        warn!("children of {cells:?} lack {} to cover their own length", added - remaining);
    }
    debug_assert!(!short, "children cannot cover their own realized length");
    if remaining.abs() < BALANCE_EPSILON {
        return;
    }
    for &i in &order {
        let error = tree[cells[i]].value_error();
        if error >= 0.0 {
            compensation[i] = -added * error / remaining;
        }
    }

    // Pass the running total through the inner boundaries.
    let mut energy = 0.0;
    for (&id, &amount) in cells.iter().zip(&compensation) {
        tree[id].error_left -= energy;
        energy += amount;
        tree[id].error_right += energy;
    }
}
