//! Density-matched Sierpinski cross-fractal fill paths.
//!
//! A rectangular region is split along its diagonal into two right
//! triangles, which are recursively halved into a tree of ever smaller
//! triangles. A single open curve passes through a frontier of that tree;
//! where the requested density is high the frontier lies deep in the tree
//! and the curve is dense, where it is low the curve stays coarse.
//!
//! The frontier is found in three phases:
//!
//! - refinement to a lower bound, which only subdivides where the requested
//!   length pays for the children, moving unmet demand between neighbors
//!   through an error ledger
//! - settling, which hands unused surplus back to where it came from
//! - diffusion, a single dithering walk along the curve that rounds every
//!   remaining decision to the nearer of staying and subdividing
//!
//! ```
//! use sierpinski_fill::{FillConfig, SierpinskiFill, UniformDensity, geom::{Aabb, Point}};
//!
//! # fn main() -> sierpinski_fill::error::Result<()> {
//! let region = Aabb::new(Point::new(0.0, 0.0), Point::new(20.0, 20.0));
//! let config = FillConfig::new(region, 8, 0.4)?;
//! let fill = SierpinskiFill::new(config, &UniformDensity::new(0.2)?)?;
//! let path = fill.cross_points();
//! assert_eq!(path.len(), fill.stats().cells);
//! # Ok(())
//! # }
//! ```

/// Moving surplus off cells blocked by a coarser neighbor.
pub mod bubble;
/// Triangles and their statistics.
pub mod cell;
/// Fill configuration.
pub mod config;
/// Pairing constraints and subdivision units.
pub mod constraint;
/// Target densities.
pub mod density;
/// Settling and the dithering walk.
pub mod diffuse;
/// Polylines through a sequence.
pub mod emit;
/// Error types used across the crate.
pub mod error;
/// The fill pipeline.
mod fill;
/// Points, boxes and edges.
pub mod geom;
/// Ledger verification.
pub mod ledger;
/// The ordered frontier of the tree.
pub mod sequence;
/// Constrained subdivision and error redistribution.
pub mod subdivide;
/// The arena of triangles.
pub mod tree;

pub use crate::{
    config::FillConfig,
    density::{DensityProvider, UniformDensity},
    fill::{FillStats, SierpinskiFill},
};

/// Run the whole pipeline and return the cross-fractal path.
pub fn generate(config: FillConfig, provider: &impl DensityProvider) -> error::Result<Vec<geom::Point>> {
    Ok(SierpinskiFill::new(config, provider)?.cross_points())
}
