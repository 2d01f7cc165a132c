use crate::error::{AnalysisError, Result};
use crate::utils::constants::EARTH_RADIUS_KM;

/// Cosine of the angle subtended at the centre of a unit sphere by the arc
/// between two points given in degrees.
///
/// Uses the vector dot product (spherical law of cosines) so no inverse
/// trigonometric functions are needed.
///
/// # Examples
/// ```
/// use anomaly_gridder::utils::coordinates::angle_cosine;
///
/// let cosd = angle_cosine(51.5, -0.13, 51.5, -0.13);
/// assert!((cosd - 1.0).abs() < 1e-12);
/// ```
pub fn angle_cosine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let lon1 = lon1.to_radians();
    let lon2 = lon2.to_radians();

    lat1.sin() * lat2.sin()
        + lat1.cos() * lat2.cos() * (lon1.cos() * lon2.cos() + lon1.sin() * lon2.sin())
}

/// Chord length on a unit sphere between two points whose subtended angle
/// has cosine *cosd*.
pub fn chord_length(cosd: f64) -> f64 {
    (2.0 * (1.0 - cosd)).sqrt()
}

/// Convert a combining radius in kilometres to an angle of arc in radians.
pub fn radius_to_arc(radius_km: f64) -> f64 {
    radius_km / EARTH_RADIUS_KM
}

/// Great-circle angular distance in radians between two points in degrees.
pub fn angular_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    angle_cosine(lat1, lon1, lat2, lon2).clamp(-1.0, 1.0).acos()
}

/// Validate that a point lies within geographic bounds.
pub fn validate_point(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(AnalysisError::InvalidCoordinate(format!(
            "Latitude {} is outside [-90, 90]",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(AnalysisError::InvalidCoordinate(format!(
            "Longitude {} is outside [-180, 180]",
            longitude
        )));
    }

    Ok(())
}
