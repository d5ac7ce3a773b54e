//! Verification of the error ledger.

use thiserror::Error;

use crate::{cell::CellId, sequence::Sequence, subdivide::TOLERANCE, tree::Tree};

/// A broken ledger invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerFault {
    /// The first cell claims value from before the start of the curve.
    #[error("first cell {cell:?} has a left error of {error}")]
    OpenStart {
        /// The first cell of the sequence.
        cell: CellId,
        /// Its left ledger entry.
        error: f64,
    },
    /// The last cell claims value from past the end of the curve.
    #[error("last cell {cell:?} has a right error of {error}")]
    OpenEnd {
        /// The last cell of the sequence.
        cell: CellId,
        /// Its right ledger entry.
        error: f64,
    },
    /// Two neighbors disagree about the value moved between them.
    #[error("ledger between {left:?} and {right:?} is off by {imbalance}")]
    Unbalanced {
        /// The earlier cell.
        left: CellId,
        /// The later cell.
        right: CellId,
        /// Sum of the two facing entries.
        imbalance: f64,
    },
    /// A cell is left with less value than its own realized length.
    #[error("cell {cell:?} is short by {}", -value_error)]
    Overdrawn {
        /// The offending cell.
        cell: CellId,
        /// Its (negative) value error.
        value_error: f64,
    },
}

/// Check that no value leaks at either end of the sequence and that every
/// boundary balances.
///
/// With `realizable` set, additionally require every non-root cell to cover
/// its own realized length. The roots are exempt: they exist regardless of
/// how little density was requested.
pub fn check(tree: &Tree, seq: &Sequence, realizable: bool) -> Result<(), LedgerFault> {
    let first = seq.first();
    let error = tree[first].error_left;
    if error.abs() > TOLERANCE {
        return Err(LedgerFault::OpenStart { cell: first, error });
    }
    let last = seq.last();
    let error = tree[last].error_right;
    if error.abs() > TOLERANCE {
        return Err(LedgerFault::OpenEnd { cell: last, error });
    }

    let mut prev: Option<CellId> = None;
    for id in seq {
        if let Some(left) = prev {
            let imbalance = tree[left].error_right + tree[id].error_left;
            if imbalance.abs() > TOLERANCE {
                return Err(LedgerFault::Unbalanced {
                    left,
                    right: id,
                    imbalance,
                });
            }
        }
        let cell = &tree[id];
        if realizable && cell.depth > 0 && cell.value_error() < -TOLERANCE {
            return Err(LedgerFault::Overdrawn {
                cell: id,
                value_error: cell.value_error(),
            });
        }
        prev = Some(id);
    }
    Ok(())
}
