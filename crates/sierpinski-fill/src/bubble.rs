//! Moving surplus off cells that are waiting for a coarser neighbor.
//!
//! A constrained cell cannot spend its surplus on subdivision. Handing the
//! surplus to the neighbor that blocks it raises that neighbor's chance of
//! being subdivided in the next round, which in turn frees the cell.

use crate::{
    constraint::{is_constrained_backward, is_constrained_forward},
    sequence::Sequence,
    subdivide::TOLERANCE,
    tree::Tree,
};

/// One pass over the sequence, deepest cells first.
///
/// Every constrained cell with a value error above [`TOLERANCE`] hands it to
/// the constraining neighbor, half to each side when constrained both ways.
/// Returns whether any value moved.
pub fn bubble_up_constraint_errors(tree: &mut Tree, seq: &Sequence) -> bool {
    let mut moved = false;
    for level in seq.by_depth(tree).into_iter().rev() {
        for id in level {
            let error = tree[id].value_error();
            if error <= TOLERANCE {
                continue;
            }
            let forward = is_constrained_forward(tree, seq, id);
            let backward = is_constrained_backward(tree, seq, id);
            let share = match (forward, backward) {
                (false, false) => continue,
                (true, true) => error / 2.0,
                _ => error,
            };
            if forward && let Some(next) = seq.next(id) {
                tree[id].error_right -= share;
                tree[next].error_left += share;
            }
            if backward && let Some(prev) = seq.prev(id) {
                tree[id].error_left -= share;
                tree[prev].error_right += share;
            }
            moved = true;
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::FillConfig,
        density::UniformDensity,
        error,
        geom::{Aabb, Point},
        subdivide::subdivide,
    };

    fn setup() -> error::Result<(Tree, Sequence)> {
        let config = FillConfig::new(
            Aabb::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0)),
            4,
            0.01,
        )?;
        let tree = Tree::build(&config, &UniformDensity::new(0.5)?)?;
        let seq = Sequence::new(&tree);
        Ok((tree, seq))
    }

    #[test]
    fn surplus_moves_to_the_coarser_neighbor() -> error::Result<()> {
        let (mut tree, mut seq) = setup()?;
        let [a, b] = tree.roots();
        let a2 = subdivide(&mut tree, &mut seq, &[a], false)[1];
        let a22 = subdivide(&mut tree, &mut seq, &[a2], false)[1];
        let surplus = tree[a22].value_error();
        assert!(surplus > TOLERANCE);
        let before = tree[b].value_error();

        assert!(bubble_up_constraint_errors(&mut tree, &seq));
        assert!(tree[a22].value_error().abs() < 1e-9);
        assert!((tree[b].value_error() - before - surplus).abs() < 1e-9);
        assert!((tree[a22].error_right + tree[b].error_left).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn unconstrained_cells_keep_their_surplus() -> error::Result<()> {
        let (mut tree, seq) = setup()?;
        let [a, b] = tree.roots();
        let before = (tree[a].value_error(), tree[b].value_error());
        assert!(!bubble_up_constraint_errors(&mut tree, &seq));
        assert_eq!((tree[a].value_error(), tree[b].value_error()), before);
        Ok(())
    }
}
