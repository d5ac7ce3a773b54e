//! Target fill densities.
//!
//! The fill only ever asks a [`DensityProvider`] for the requested density
//! over the bounding box of a leaf triangle. Providers must be pure: asking
//! twice for the same box has to give the same answer.

use crate::{
    error::{self, Error},
    geom::Aabb,
};

/// Source of the requested fill fraction over a region.
pub trait DensityProvider {
    /// Requested fill fraction in `[0, 1]` over `region`.
    fn density(&self, region: &Aabb) -> f64;
}

impl<F> DensityProvider for F
where
    F: Fn(&Aabb) -> f64,
{
    fn density(&self, region: &Aabb) -> f64 {
        self(region)
    }
}

/// The same density everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformDensity {
    /// The fill fraction returned for every region.
    density: f64,
}

impl UniformDensity {
    /// A provider returning `density` everywhere.
    pub fn new(density: f64) -> error::Result<Self> {
        check_range(density).map_err(|value| Error::Density {
            value,
            region: Aabb::new(Default::default(), Default::default()),
        })?;
        Ok(Self { density })
    }

    /// The density at which lines of `line_width` are spaced `line_distance`
    /// apart, capped at full density.
    pub fn from_line_distance(line_width: f64, line_distance: f64) -> error::Result<Self> {
        if !(line_distance.is_finite() && line_distance > 0.0) {
            return Err(Error::LineWidth(format!(
                "line distance must be positive, got {line_distance}"
            )));
        }
        Self::new((line_width / line_distance).min(1.0))
    }
}

impl DensityProvider for UniformDensity {
    fn density(&self, _region: &Aabb) -> f64 {
        self.density
    }
}

/// Validate a raw density value, returning it back on failure.
fn check_range(value: f64) -> Result<f64, f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(value)
    }
}

/// Query `provider` and reject values outside `[0, 1]`.
pub fn checked(provider: &impl DensityProvider, region: &Aabb) -> error::Result<f64> {
    check_range(provider.density(region)).map_err(|value| Error::Density {
        value,
        region: *region,
    })
}
