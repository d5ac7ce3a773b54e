//! The arena holding every possible triangle of the subdivision.
//!
//! The tree is built once, to the configured maximum depth, before any
//! refinement happens. Cells are addressed by [`CellId`]; a parent is always
//! stored before its children, so a reverse scan over the arena visits
//! children before parents.

use std::ops::{Index, IndexMut};

use log::debug;

use crate::{
    cell::{Cell, CellId, Direction},
    config::FillConfig,
    density::{self, DensityProvider},
    error,
    geom::Point,
};

/// Arena of all triangles up to the maximum depth.
#[derive(Clone, Debug)]
pub struct Tree {
    /// All cells, parents before children.
    cells: Vec<Cell>,
    /// The two triangles covering the region, in curve order.
    roots: [CellId; 2],
    /// Deepest level present in the tree.
    max_depth: u32,
}

impl Tree {
    /// Build the full tree for `config` and fill in the requested lengths from
    /// `provider`.
    pub fn build(config: &FillConfig, provider: &impl DensityProvider) -> error::Result<Self> {
        let region = config.region();
        let lower_right = Point::new(region.max.x, region.min.y);
        let upper_left = Point::new(region.min.x, region.max.y);

        let mut tree = Self {
            cells: Vec::with_capacity(Self::capacity(config.max_depth())),
            roots: [CellId(0), CellId(1)],
            max_depth: config.max_depth(),
        };
        // Enter through the bottom edge, cross the diagonal, leave through the left edge.
        tree.push(Cell::new(lower_right, region.min, region.max, Direction::AcToAb, 0));
        tree.push(Cell::new(upper_left, region.max, region.min, Direction::AbToBc, 0));

        let mut stack = vec![tree.roots[1], tree.roots[0]];
        while let Some(id) = stack.pop() {
            if tree[id].depth >= tree.max_depth {
                continue;
            }
            let [first, second] = tree[id].split();
            let first = tree.push(first);
            let second = tree.push(second);
            tree[id].children = Some([first, second]);
            stack.push(second);
            stack.push(first);
        }

        tree.compute_requested_lengths(config.line_width(), provider)?;
        debug!(
            "built tree of {} cells to depth {}, requested length {:.3}",
            tree.len(),
            tree.max_depth,
            tree.requested_length()
        );
        Ok(tree)
    }

    /// Number of cells in a full tree of the given depth.
    fn capacity(max_depth: u32) -> usize {
        2 * ((1usize << (max_depth + 1)) - 1)
    }

    /// Append a cell and return its id.
    fn push(&mut self, cell: Cell) -> CellId {
        let id = CellId(self.cells.len() as u32);
        self.cells.push(cell);
        id
    }

    /// Query densities at the leaves and bubble requested and child realized
    /// lengths up towards the roots.
    fn compute_requested_lengths(
        &mut self,
        line_width: f64,
        provider: &impl DensityProvider,
    ) -> error::Result<()> {
        for idx in (0..self.cells.len()).rev() {
            match self.cells[idx].children {
                None => {
                    let cell = &self.cells[idx];
                    let density = density::checked(provider, &cell.bounds())?;
                    let requested = density * cell.area / line_width;
                    self.cells[idx].requested_length = requested;
                }
                Some([first, second]) => {
                    let requested = self[first].requested_length + self[second].requested_length;
                    let realized = self[first].realized_length + self[second].realized_length;
                    let cell = &mut self.cells[idx];
                    cell.requested_length = requested;
                    cell.total_child_realized_length = realized;
                }
            }
        }
        Ok(())
    }

    /// The two root triangles in curve order.
    pub fn roots(&self) -> [CellId; 2] {
        self.roots
    }

    /// Deepest level of the tree.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the tree holds no cells. Never true for a built tree.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Requested length over the whole region.
    pub fn requested_length(&self) -> f64 {
        self.roots.iter().map(|&id| self[id].requested_length).sum()
    }

    /// Iterate over all cells with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (CellId(idx as u32), cell))
    }
}

impl Index<CellId> for Tree {
    type Output = Cell;
    fn index(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }
}

impl IndexMut<CellId> for Tree {
    fn index_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        density::UniformDensity,
        geom::{Aabb, Point},
    };

    fn unit_square(depth: u32, density: f64) -> error::Result<Tree> {
        let config = FillConfig::new(
            Aabb::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0)),
            depth,
            0.01,
        )?;
        Tree::build(&config, &UniformDensity::new(density)?)
    }

    #[test]
    fn size() -> error::Result<()> {
        assert_eq!(unit_square(0, 0.5)?.len(), 2);
        assert_eq!(unit_square(1, 0.5)?.len(), 6);
        assert_eq!(unit_square(4, 0.5)?.len(), Tree::capacity(4));
        Ok(())
    }

    #[test]
    fn children_follow_parents() -> error::Result<()> {
        let tree = unit_square(5, 0.5)?;
        for (id, cell) in tree.iter() {
            match cell.children {
                Some([first, second]) => {
                    assert!(first > id && second > id);
                    assert_eq!(tree[first].depth, cell.depth + 1);
                    assert_eq!(tree[second].depth, cell.depth + 1);
                }
                None => assert_eq!(cell.depth, 5),
            }
        }
        Ok(())
    }

    #[test]
    fn requested_lengths_bubble_up() -> error::Result<()> {
        let tree = unit_square(6, 0.5)?;
        // Uniform density over the unit square: 0.5 * 1.0 / 0.01.
        assert!((tree.requested_length() - 50.0).abs() < 1e-9);
        for (_, cell) in tree.iter() {
            assert!((cell.requested_length - 0.5 * cell.area / 0.01).abs() < 1e-9);
            if let Some([first, second]) = cell.children {
                let realized = tree[first].realized_length + tree[second].realized_length;
                assert!((cell.total_child_realized_length - realized).abs() < 1e-12);
            } else {
                assert_eq!(cell.total_child_realized_length, 0.0);
            }
        }
        Ok(())
    }

    #[test]
    fn roots_meet_on_the_diagonal() -> error::Result<()> {
        let tree = unit_square(0, 0.5)?;
        let [first, second] = tree.roots();
        assert_eq!(tree[first].to_edge().midpoint(), tree[second].from_edge().midpoint());
        assert_eq!(tree[first].from_edge().midpoint(), Point::new(0.5, 0.0));
        assert_eq!(tree[second].to_edge().midpoint(), Point::new(0.0, 0.5));
        Ok(())
    }

    #[test]
    fn invalid_density_is_rejected() -> error::Result<()> {
        let config = FillConfig::new(
            Aabb::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0)),
            2,
            0.01,
        )?;
        let err = Tree::build(&config, &|_: &Aabb| 1.5).unwrap_err();
        assert!(matches!(err, error::Error::Density { .. }));
        Ok(())
    }
}
