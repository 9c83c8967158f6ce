use thiserror::Error;

use crate::flower::shape::ShapeError;

/// Failures while setting up the garden.
#[derive(Debug, Error)]
pub enum GardenError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    /// Every generated flower design was rejected.
    #[error("no flower in the garden could be built")]
    EmptyGarden,
}
