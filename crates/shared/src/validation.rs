//! Common validation utilities.

use validator::ValidationError;

/// Validates that a latitude value is within valid range (-90 to 90).
///
/// Non-finite values are rejected.
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
///
/// Non-finite values are rejected.
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates a team member display color.
///
/// Accepts an empty string (no color chosen) or six hex digits without a
/// leading `#`, e.g. `FF0000`.
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    if color.is_empty() || (color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit())) {
        Ok(())
    } else {
        let mut err = ValidationError::new("color_format");
        err.message = Some("Color must be six hex digits, e.g. FF0000".into());
        Err(err)
    }
}
