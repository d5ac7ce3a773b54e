//! The complete fill pipeline.

use log::{debug, warn};

use crate::{
    cell::Cell,
    config::FillConfig,
    density::DensityProvider,
    diffuse::{self, DiffusionCounts},
    emit,
    error,
    geom::Point,
    ledger::{self, LedgerFault},
    sequence::Sequence,
    subdivide,
    tree::Tree,
};

/// Summary of a sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillStats {
    /// Number of cells the curve passes through.
    pub cells: usize,
    /// Depth of the shallowest cell.
    pub min_depth: u32,
    /// Depth of the deepest cell.
    pub max_depth: u32,
    /// Curve length asked for by the density.
    pub requested_length: f64,
    /// Curve length of the cells as they are.
    pub realized_length: f64,
    /// Length of the cross fractal polyline. Differs from
    /// [`FillStats::realized_length`] wherever the depth changes along the
    /// curve.
    pub path_length: f64,
}

/// A fill of one region: the tree of all triangles and the sequence of
/// cells the curve currently passes through.
///
/// [`SierpinskiFill::new`] runs every phase. The phases can also be run one
/// by one, starting from [`SierpinskiFill::lower_bound`], to inspect the
/// intermediate sequences.
#[derive(Clone, Debug)]
pub struct SierpinskiFill {
    /// Parameters of the fill.
    config: FillConfig,
    /// All triangles up to the maximum depth.
    tree: Tree,
    /// The current frontier of the tree.
    seq: Sequence,
}

impl SierpinskiFill {
    /// Build the tree, refine it to the lower bound, settle the ledger and
    /// run the diffusion pass.
    pub fn new(config: FillConfig, provider: &impl DensityProvider) -> error::Result<Self> {
        let mut fill = Self::lower_bound(config, provider)?;
        fill.settle();
        fill.diffuse();
        Ok(fill)
    }

    /// Build the tree and refine it until no unit can be subdivided without
    /// running a deficit.
    pub fn lower_bound(config: FillConfig, provider: &impl DensityProvider) -> error::Result<Self> {
        let mut tree = Tree::build(&config, provider)?;
        let mut seq = Sequence::new(&tree);
        subdivide::create_lower_bound_sequence(&mut tree, &mut seq, config.constraint_error_diffusion());
        let fill = Self { config, tree, seq };
        fill.debug_check("lower bound", true);
        Ok(fill)
    }

    /// Hand unused surplus back to the lenders. Returns whether anything moved.
    pub fn settle(&mut self) -> bool {
        let changed = diffuse::settle(&mut self.tree, &self.seq);
        self.debug_check("settle", true);
        changed
    }

    /// Run the diffusion pass once.
    pub fn diffuse(&mut self) -> DiffusionCounts {
        let counts = diffuse::diffuse(&mut self.tree, &mut self.seq, &self.config);
        self.debug_check("diffusion", false);
        let stats = self.stats();
        debug!(
            "realized {:.3} of {:.3} requested over {} cells, path {:.3}",
            stats.realized_length, stats.requested_length, stats.cells, stats.path_length
        );
        counts
    }

    /// Log a ledger fault after `phase` when debug checks are enabled.
    fn debug_check(&self, phase: &str, realizable: bool) {
        if self.config.debug_checks()
            && let Err(fault) = self.check_ledger(realizable)
        {
            warn!("ledger fault after {phase}: {fault}");
        }
    }

    /// Verify the ledger invariants of the current sequence.
    pub fn check_ledger(&self, realizable: bool) -> Result<(), LedgerFault> {
        ledger::check(&self.tree, &self.seq, realizable)
    }

    /// The configuration this fill was built with.
    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    /// The arena of all triangles.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The current sequence.
    pub fn sequence(&self) -> &Sequence {
        &self.seq
    }

    /// The cells of the current sequence, in curve order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.seq.iter().map(|id| &self.tree[id])
    }

    /// The cross fractal through the current sequence.
    pub fn cross_points(&self) -> Vec<Point> {
        emit::cross_points(&self.tree, &self.seq)
    }

    /// The Sierpinski curve through the current sequence.
    pub fn sierpinski_points(&self) -> Vec<Point> {
        emit::sierpinski_points(&self.tree, &self.seq)
    }

    /// Summary of the current sequence.
    pub fn stats(&self) -> FillStats {
        let mut stats = FillStats {
            cells: 0,
            min_depth: u32::MAX,
            max_depth: 0,
            requested_length: self.tree.requested_length(),
            realized_length: 0.0,
            path_length: emit::path_length(&self.cross_points()),
        };
        for cell in self.cells() {
            stats.cells += 1;
            stats.min_depth = stats.min_depth.min(cell.depth);
            stats.max_depth = stats.max_depth.max(cell.depth);
            stats.realized_length += cell.realized_length;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{density::UniformDensity, geom::Aabb};

    fn config(depth: u32) -> error::Result<FillConfig> {
        Ok(FillConfig::new(
            Aabb::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0)),
            depth,
            0.4,
        )?
        .with_debug_checks(true))
    }

    #[test]
    fn phases_keep_the_ledger() -> error::Result<()> {
        let provider = UniformDensity::new(0.2)?;
        let mut fill = SierpinskiFill::lower_bound(config(8)?, &provider)?;
        assert_eq!(fill.check_ledger(true), Ok(()));
        fill.settle();
        assert_eq!(fill.check_ledger(true), Ok(()));
        assert!(!fill.settle());
        fill.diffuse();
        assert_eq!(fill.check_ledger(false), Ok(()));
        Ok(())
    }

    #[test]
    fn stats_follow_the_sequence() -> error::Result<()> {
        let fill = SierpinskiFill::new(config(6)?, &UniformDensity::new(0.3)?)?;
        let stats = fill.stats();
        assert_eq!(stats.cells, fill.sequence().len());
        assert_eq!(stats.cells, fill.cross_points().len());
        assert_eq!(stats.cells, fill.sierpinski_points().len());
        assert!(stats.min_depth <= stats.max_depth && stats.max_depth <= 6);
        // 0.3 * 100 / 0.4
        assert!((stats.requested_length - 75.0).abs() < 1e-9);
        let realized: f64 = fill.cells().map(|c| c.realized_length).sum();
        assert_eq!(stats.realized_length, realized);
        assert!((stats.path_length - stats.realized_length).abs() < 0.05 * stats.realized_length);
        Ok(())
    }

    #[test]
    fn errors_surface_from_the_provider() -> error::Result<()> {
        let err = SierpinskiFill::new(config(3)?, &|_: &Aabb| -0.5).unwrap_err();
        assert!(matches!(err, error::Error::Density { value, .. } if value == -0.5));
        Ok(())
    }
}
