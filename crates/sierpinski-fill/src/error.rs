//! Error types for fill construction.

use std::result;

use thiserror::Error;

use crate::geom::Aabb;

/// Errors raised while validating a fill configuration or building the tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The target region is empty, inverted or not finite.
    #[error("invalid region: {0}")]
    Region(String),
    /// The maximum recursion depth is out of range.
    #[error("invalid depth: {0}")]
    Depth(String),
    /// The line width is not a positive finite length.
    #[error("invalid line width: {0}")]
    LineWidth(String),
    /// The density provider returned a value outside `[0, 1]`.
    #[error("density {value} outside [0, 1] for region {region}")]
    Density {
        /// The offending density value.
        value: f64,
        /// The region the provider was queried with.
        region: Aabb,
    },
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = result::Result<T, Error>;
