//! Module containing the conversions between spherical coordinates `(theta, phi)` and
//! 3D unit vectors.
//!
//! Conventions: `theta` is the colatitude in `[0, pi]` (`0` at the north pole), `phi` the
//! longitude, any finite value being accepted in input and reduced into `[0, 2pi[`.

pub mod coo3d;

use std::f64::consts::PI;

use self::coo3d::{UnitVec3, UnitVect3, Vec3};
use crate::{HealpixError, TWICE_PI};

/// Returns the unit vector pointing to the given direction.
///
/// # Input
/// - `theta`: colatitude in radians, in `[0, pi]`
/// - `phi`: longitude in radians (any finite value)
///
/// # Output
/// - `(sin(theta)cos(phi), sin(theta)sin(phi), cos(theta))`
///
/// # Errors
/// `InvalidAngle` if `theta` is not in `[0, pi]` or if one of the inputs is not finite.
///
/// # Example
/// ```rust
/// use hpxsht::{ang_to_vec, Vec3};
/// use std::f64::consts::PI;
///
/// let v = ang_to_vec(0.5 * PI, 0.0).unwrap();
/// assert!((v.x() - 1.0).abs() < 1e-15);
/// assert!(v.y().abs() < 1e-15);
/// assert!(v.z().abs() < 1e-15);
/// assert!(ang_to_vec(-0.1, 0.0).is_err());
/// ```
pub fn ang_to_vec(theta: f64, phi: f64) -> Result<UnitVect3, HealpixError> {
  check_ang(theta, phi)?;
  let (sth, z) = theta.sin_cos();
  Ok(UnitVect3::from_z_sth_phi(z, sth, phi))
}

/// Returns the colatitude, in `[0, pi]`, and the longitude, in `[0, 2pi[`, of the given vector
/// (normalized first).
///
/// # Errors
/// `DegenerateVector` if the vector norm is null or not finite.
///
/// # Example
/// ```rust
/// use hpxsht::{vec_to_ang};
/// use std::f64::consts::PI;
///
/// let (theta, phi) = vec_to_ang(&[0.0, 2.0, 0.0]).unwrap();
/// assert!((theta - 0.5 * PI).abs() < 1e-15);
/// assert!((phi - 0.5 * PI).abs() < 1e-15);
/// assert!(vec_to_ang(&[0.0, 0.0, 0.0]).is_err());
/// ```
pub fn vec_to_ang<V: Vec3>(v: &V) -> Result<(f64, f64), HealpixError> {
  let u = v.normalized()?;
  Ok(u.theta_phi())
}

/// Checks that `theta` is in `[0, pi]` and that `phi` is finite.
#[inline]
pub(crate) fn check_ang(theta: f64, phi: f64) -> Result<(), HealpixError> {
  if (0.0..=PI).contains(&theta) && phi.is_finite() {
    Ok(())
  } else {
    Err(HealpixError::InvalidAngle { theta, phi })
  }
}

/// Reduces the given finite longitude into `[0, 2pi[`.
#[inline]
pub(crate) fn phi_in_0_2pi(phi: f64) -> f64 {
  let mut phi = phi % TWICE_PI;
  if phi < 0.0 {
    phi += TWICE_PI;
  }
  if phi >= TWICE_PI {
    0.0
  } else {
    phi
  }
}
