//! Angle conventions for magnetization directions.
//!
//! Geophysical angles are given as a dip (positive down) and an azimuth
//! measured clockwise from north. Cartesian output uses x east, y north and
//! z along the dip sign:
//!
//! - `a = (450 - azimuth) mod 360` (counter-clockwise from +x)
//! - `v = (cos d cos a, cos d sin a, sin d)`

use nalgebra::Vector3;

/// Unit vector for a dip/azimuth pair in degrees.
pub fn dip_azimuth_to_xyz(dip: f64, azimuth: f64) -> Vector3<f64> {
    let a = (450.0 - azimuth).rem_euclid(360.0).to_radians();
    let d = dip.to_radians();
    Vector3::new(d.cos() * a.cos(), d.cos() * a.sin(), d.sin())
}
