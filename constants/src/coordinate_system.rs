/// US survey feet to metres.
pub const FEET_TO_METERS: f64 = 1200.0 / 3937.0;

/// InternRail tiles recorded in feet carry this file stem prefix.
pub const FEET_TILE_PREFIX: &str = "CSX";

/// Scale xyz from US survey feet to metres.
pub fn feet_to_meters(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    (x * FEET_TO_METERS, y * FEET_TO_METERS, z * FEET_TO_METERS)
}
