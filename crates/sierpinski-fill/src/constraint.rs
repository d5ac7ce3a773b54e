//! Pairing constraints between neighboring cells.
//!
//! A cell that crosses its long edge `AB` shares that edge with a neighbor.
//! When the neighbor is coarser, subdividing the cell alone would leave the
//! curve disconnected, so the cell is constrained until the neighbor is
//! refined. Two cells that share their long edge at the same depth have to
//! be subdivided together as one [`Unit`].

use smallvec::smallvec;

use crate::{
    cell::{CellId, Unit},
    sequence::Sequence,
    tree::Tree,
};

/// Whether `id` cannot be subdivided before its successor is.
pub fn is_constrained_forward(tree: &Tree, seq: &Sequence, id: CellId) -> bool {
    let cell = &tree[id];
    cell.direction.needs_successor()
        && seq
            .next(id)
            .is_some_and(|next| tree[next].depth < cell.depth)
}

/// Whether `id` cannot be subdivided before its predecessor is.
pub fn is_constrained_backward(tree: &Tree, seq: &Sequence, id: CellId) -> bool {
    let cell = &tree[id];
    cell.direction.needs_predecessor()
        && seq
            .prev(id)
            .is_some_and(|prev| tree[prev].depth < cell.depth)
}

/// The cells that have to be subdivided together with `id`, in curve order.
pub fn unit_containing(tree: &Tree, seq: &Sequence, id: CellId) -> Unit {
    if tree[id].direction.needs_predecessor()
        && let Some(prev) = seq.prev(id)
    {
        return smallvec![prev, id];
    }
    match seq.next(id) {
        Some(next) if tree[next].direction.needs_predecessor() => smallvec![id, next],
        _ => smallvec![id],
    }
}

/// Whether the unit is blocked by a coarser neighbor on either side.
///
/// Constraints between the members of the unit do not count.
pub fn is_unit_constrained(tree: &Tree, seq: &Sequence, unit: &[CellId]) -> bool {
    match (unit.first(), unit.last()) {
        (Some(&first), Some(&last)) => {
            is_constrained_backward(tree, seq, first) || is_constrained_forward(tree, seq, last)
        }
        _ => false,
    }
}

/// Whether any member of the unit is at the maximum depth.
pub fn has_leaf(tree: &Tree, unit: &[CellId]) -> bool {
    unit.iter().any(|&id| tree[id].is_leaf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cell::Direction,
        config::FillConfig,
        density::UniformDensity,
        error,
        geom::{Aabb, Point},
    };

    fn setup(depth: u32) -> error::Result<(Tree, Sequence)> {
        let config = FillConfig::new(
            Aabb::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0)),
            depth,
            0.1,
        )?;
        let tree = Tree::build(&config, &UniformDensity::new(0.5)?)?;
        let seq = Sequence::new(&tree);
        Ok((tree, seq))
    }

    fn children(tree: &Tree, id: CellId) -> [CellId; 2] {
        tree[id].children.unwrap()
    }

    #[test]
    fn roots_form_one_unit() -> error::Result<()> {
        let (tree, seq) = setup(3)?;
        let [a, b] = tree.roots();
        assert_eq!(tree[b].direction, Direction::AbToBc);
        assert_eq!(unit_containing(&tree, &seq, a).as_slice(), &[a, b]);
        assert_eq!(unit_containing(&tree, &seq, b).as_slice(), &[a, b]);
        assert!(!is_unit_constrained(&tree, &seq, &[a, b]));
        assert!(!has_leaf(&tree, &[a, b]));
        Ok(())
    }

    #[test]
    fn coarser_neighbor_constrains() -> error::Result<()> {
        let (tree, mut seq) = setup(3)?;
        let [a, b] = tree.roots();
        let [a1, a2] = children(&tree, a);
        seq.replace(&[a], &[a1, a2]);

        assert_eq!(tree[a2].direction, Direction::AcToBc);
        // The first child enters through its long edge but has no predecessor.
        assert_eq!(tree[a1].direction, Direction::AbToBc);
        assert!(!is_constrained_backward(&tree, &seq, a1));
        assert_eq!(unit_containing(&tree, &seq, a1).as_slice(), &[a1]);

        // The coarser root is no longer constrained by anything finer.
        assert!(!is_constrained_backward(&tree, &seq, b));
        assert_eq!(unit_containing(&tree, &seq, b).as_slice(), &[a2, b]);

        let [b1, b2] = children(&tree, b);
        let mut split = seq.clone();
        split.replace(&[b], &[b1, b2]);
        assert_eq!(tree[b2].direction, Direction::AcToAb);
        assert!(!is_constrained_forward(&tree, &split, b2));
        Ok(())
    }

    #[test]
    fn deeper_cell_waits_for_coarser_neighbor() -> error::Result<()> {
        let (tree, mut seq) = setup(3)?;
        let [a, b] = tree.roots();
        let [a1, a2] = children(&tree, a);
        seq.replace(&[a], &[a1, a2]);
        let [a21, a22] = children(&tree, a2);
        seq.replace(&[a2], &[a21, a22]);

        // a22 leaves through its long edge, which the coarser root b enters by.
        assert_eq!(tree[a22].direction, Direction::AcToAb);
        assert!(is_constrained_forward(&tree, &seq, a22));
        assert!(is_unit_constrained(&tree, &seq, &[a22]));
        // Paired with b the constraint is internal to the unit.
        let unit = unit_containing(&tree, &seq, a22);
        assert_eq!(unit.as_slice(), &[a22, b]);
        assert!(!is_unit_constrained(&tree, &seq, &unit));

        assert_eq!(tree[a21].direction, Direction::AbToBc);
        assert!(!is_constrained_backward(&tree, &seq, a21));
        assert_eq!(unit_containing(&tree, &seq, a21).as_slice(), &[a1, a21]);
        Ok(())
    }

    #[test]
    fn leaves_are_detected() -> error::Result<()> {
        let (tree, _) = setup(1)?;
        let [a, _] = tree.roots();
        let [a1, a2] = children(&tree, a);
        assert!(has_leaf(&tree, &[a1, a2]));
        assert!(!has_leaf(&tree, &[a]));
        Ok(())
    }
}
