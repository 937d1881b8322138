//! Domain error types.

use thiserror::Error;

/// Coordinates outside latitude [-90, 90] or longitude [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Invalid location: latitude {latitude}, longitude {longitude} out of range")]
pub struct InvalidLocation {
    pub latitude: f64,
    pub longitude: f64,
}
