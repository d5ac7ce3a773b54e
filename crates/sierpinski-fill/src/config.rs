//! Validated fill configuration.

use crate::{
    error::{self, Error},
    geom::{Aabb, Point},
};

/// Largest supported recursion depth. A full tree holds `2^(depth + 2) - 2`
/// cells, so deeper trees quickly exhaust memory.
pub const MAX_DEPTH: u32 = 24;

/// Parameters of a fill.
///
/// The region is split along its diagonal into two root triangles; a square
/// region gives the regular cross fractal.
#[derive(Clone, Debug, PartialEq)]
pub struct FillConfig {
    /// The rectangle to fill.
    region: Aabb,
    /// Maximum recursion depth of the triangle tree.
    max_depth: u32,
    /// Width of the extruded line; converts densities into lengths.
    line_width: f64,
    /// Carry the rounding error along the sequence while dithering.
    dithering: bool,
    /// Move errors away from cells that are blocked by a coarser neighbor.
    constraint_error_diffusion: bool,
    /// Include the ledger in the dithering decision.
    use_errors_in_dithering: bool,
    /// Verify the ledger after every phase and log any fault.
    debug_checks: bool,
}

impl FillConfig {
    /// Create a configuration with dithering and error diffusion enabled.
    pub fn new(region: Aabb, max_depth: u32, line_width: f64) -> error::Result<Self> {
        if !(region.min.is_finite() && region.max.is_finite()) {
            return Err(Error::Region(format!("{region} is not finite")));
        }
        if region.width() <= 0.0 || region.height() <= 0.0 {
            return Err(Error::Region(format!("{region} has no area")));
        }
        if max_depth > MAX_DEPTH {
            return Err(Error::Depth(format!(
                "maximum depth {max_depth} exceeds the limit of {MAX_DEPTH}"
            )));
        }
        if !(line_width.is_finite() && line_width > 0.0) {
            return Err(Error::LineWidth(format!(
                "line width must be positive, got {line_width}"
            )));
        }
        Ok(Self {
            region,
            max_depth,
            line_width,
            dithering: true,
            constraint_error_diffusion: true,
            use_errors_in_dithering: true,
            debug_checks: false,
        })
    }

    /// Derive a square region and depth that cover `bounds` with lines no
    /// closer together than `min_line_distance`.
    ///
    /// The square is centered on `bounds`. Starting from a square of side
    /// `min_line_distance`, every two levels of subdivision double the side;
    /// a final odd level shrinks it by `sqrt(2)` when that still covers the
    /// bounds.
    pub fn fit(bounds: Aabb, min_line_distance: f64, line_width: f64) -> error::Result<Self> {
        if !(min_line_distance.is_finite() && min_line_distance > 0.0) {
            return Err(Error::LineWidth(format!(
                "line distance must be positive, got {min_line_distance}"
            )));
        }
        let max_side = bounds.width().max(bounds.height());
        if !(max_side.is_finite() && max_side > 0.0) {
            return Err(Error::Region(format!("{bounds} has no extent")));
        }

        // Depth counted with the whole square as level zero.
        let mut depth = 0u32;
        let mut side = min_line_distance;
        while side < max_side {
            side *= 2.0;
            depth += 2;
            if depth > MAX_DEPTH + 1 {
                return Err(Error::Depth(format!(
                    "covering {max_side} with lines {min_line_distance} apart needs more than {MAX_DEPTH} levels"
                )));
            }
        }
        let half_sqrt2 = 0.5 * 2f64.sqrt();
        if depth > 0 && side * half_sqrt2 >= max_side {
            side *= half_sqrt2;
            depth -= 1;
        }

        let radius = Point::new(side / 2.0, side / 2.0);
        let middle = bounds.middle();
        // The two root triangles sit one level below the square.
        Self::new(
            Aabb::new(middle - radius, middle + radius),
            depth.saturating_sub(1),
            line_width,
        )
    }

    /// Enable or disable carrying the rounding error while dithering.
    pub fn with_dithering(mut self, dithering: bool) -> Self {
        self.dithering = dithering;
        self
    }

    /// Enable or disable moving errors away from constrained cells.
    pub fn with_constraint_error_diffusion(mut self, enabled: bool) -> Self {
        self.constraint_error_diffusion = enabled;
        self
    }

    /// Enable or disable using the ledger in the dithering decision.
    pub fn with_errors_in_dithering(mut self, enabled: bool) -> Self {
        self.use_errors_in_dithering = enabled;
        self
    }

    /// Enable or disable ledger verification after every phase.
    pub fn with_debug_checks(mut self, enabled: bool) -> Self {
        self.debug_checks = enabled;
        self
    }

    /// The rectangle to fill.
    pub fn region(&self) -> Aabb {
        self.region
    }

    /// Maximum recursion depth.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Width of the extruded line.
    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    /// Whether the rounding error is carried while dithering.
    pub fn dithering(&self) -> bool {
        self.dithering
    }

    /// Whether errors are moved away from constrained cells.
    pub fn constraint_error_diffusion(&self) -> bool {
        self.constraint_error_diffusion
    }

    /// Whether the ledger takes part in the dithering decision.
    pub fn use_errors_in_dithering(&self) -> bool {
        self.use_errors_in_dithering
    }

    /// Whether the ledger is verified after every phase.
    pub fn debug_checks(&self) -> bool {
        self.debug_checks
    }
}
