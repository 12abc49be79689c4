//! Operator input parsing and placement defaults.

use cgmath::{Quaternion, Vector3};

use crate::error::ValidationError;

/// Placeholder spawn positions for a freshly added drone batch, in meters.
/// Drones sit in a line outside the flight volume until the capture feed
/// takes over their pose.
pub const DRONE_SPAWN_POSITIONS: [[f64; 3]; 4] = [
    [0.0, -1.5, 0.1],
    [0.5, -1.5, 0.1],
    [1.0, -1.5, 0.1],
    [1.5, -1.5, 0.1],
];

/// Number of drones added per "add drones" invocation.
pub const DRONE_BATCH_SIZE: usize = DRONE_SPAWN_POSITIONS.len();

fn parse_reals<const N: usize>(text: &str, what: &str) -> Result<[f64; N], ValidationError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != N {
        return Err(ValidationError(format!(
            "{} needs {} numbers, got {} (\"{}\")",
            what,
            N,
            fields.len(),
            text.trim()
        )));
    }
    let mut values = [0.0; N];
    for (slot, field) in values.iter_mut().zip(&fields) {
        *slot = field
            .parse()
            .map_err(|_| ValidationError(format!("{}: \"{}\" is not a number", what, field)))?;
    }
    Ok(values)
}

/// Parse "x y z" into a position vector.
pub fn parse_position(text: &str) -> Result<Vector3<f64>, ValidationError> {
    let [x, y, z] = parse_reals(text, "position")?;
    Ok(Vector3::new(x, y, z))
}

/// Parse "w x y z" into an orientation quaternion. Blank input defaults to
/// the identity rotation.
pub fn parse_orientation(text: &str) -> Result<Quaternion<f64>, ValidationError> {
    if text.trim().is_empty() {
        return Ok(Quaternion::new(1.0, 0.0, 0.0, 0.0));
    }
    let [w, x, y, z] = parse_reals(text, "orientation")?;
    Ok(Quaternion::new(w, x, y, z))
}
