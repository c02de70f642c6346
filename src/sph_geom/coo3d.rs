use serde::{Deserialize, Serialize};

use crate::{Customf64, HealpixError, TWICE_PI};

// Euclidean coordinates

pub trait Vec3 {
  fn x(&self) -> f64;
  fn y(&self) -> f64;
  fn z(&self) -> f64;

  fn norm(&self) -> f64 {
    self.squared_norm().sqrt()
  }

  fn squared_norm(&self) -> f64 {
    squared_norm_of(self.x(), self.y(), self.z())
  }

  fn dot_product<V: Vec3>(&self, other: &V) -> f64 {
    self.x() * other.x() + self.y() * other.y() + self.z() * other.z()
  }

  /// Returns the unit vector having the same direction as this vector.
  ///
  /// # Errors
  /// `DegenerateVector` if the norm of this vector is null or not finite.
  fn normalized(&self) -> Result<UnitVect3, HealpixError> {
    let norm = self.norm();
    if norm > 0.0 && norm.is_finite() {
      Ok(UnitVect3::new_unsafe(
        self.x() / norm,
        self.y() / norm,
        self.z() / norm,
      ))
    } else {
      Err(HealpixError::DegenerateVector {
        x: self.x(),
        y: self.y(),
        z: self.z(),
      })
    }
  }
}

impl Vec3 for [f64; 3] {
  #[inline]
  fn x(&self) -> f64 {
    self[0]
  }
  #[inline]
  fn y(&self) -> f64 {
    self[1]
  }
  #[inline]
  fn z(&self) -> f64 {
    self[2]
  }
}

impl Vec3 for (f64, f64, f64) {
  #[inline]
  fn x(&self) -> f64 {
    self.0
  }
  #[inline]
  fn y(&self) -> f64 {
    self.1
  }
  #[inline]
  fn z(&self) -> f64 {
    self.2
  }
}

pub trait UnitVec3: Vec3 {
  fn cross_prod_norm<T: UnitVec3>(&self, other: &T) -> f64 {
    let nx = self.y() * other.z() - self.z() * other.y();
    let ny = self.z() * other.x() - self.x() * other.z();
    let nz = self.x() * other.y() - self.y() * other.x();
    (nx.pow2() + ny.pow2() + nz.pow2()).sqrt()
  }

  /// Compute the angular distance between this vector and the other given vector
  fn ang_dist<T: UnitVec3>(&self, other: &T) -> f64 {
    let cos = self.dot_product(other);
    let sin = self.cross_prod_norm(other);
    // Unlike 2 * asin(eucl_dist / 2), stable for angles near PI
    sin.atan2(cos)
  }

  /// Returns the colatitude, in `[0, pi]`, and the longitude, in `[0, 2pi[`, of this vector.
  fn theta_phi(&self) -> (f64, f64) {
    theta_phi_of(self.x(), self.y(), self.z())
  }
}

#[inline]
pub fn squared_norm_of(x: f64, y: f64, z: f64) -> f64 {
  x.pow2() + y.pow2() + z.pow2()
}

/// Colatitude and longitude of the given (not necessarily normalized) vector.
/// The colatitude is computed from `atan2(rho, z)`, accurate also near the poles.
#[inline]
pub fn theta_phi_of(x: f64, y: f64, z: f64) -> (f64, f64) {
  let rho = (x.pow2() + y.pow2()).sqrt();
  let theta = rho.atan2(z);
  let mut phi = if rho == 0.0 { 0.0 } else { y.atan2(x) };
  if phi < 0.0 {
    phi += TWICE_PI;
    // -tiny + 2pi == 2pi in floating point
    if phi >= TWICE_PI {
      phi = 0.0;
    }
  }
  (theta, phi)
}

/// A direction on the unit sphere, i.e. a vector of norm 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitVect3 {
  x: f64,
  y: f64,
  z: f64,
}

impl UnitVect3 {
  /// Builds a unit vector without checking its norm.
  #[inline]
  pub const fn new_unsafe(x: f64, y: f64, z: f64) -> UnitVect3 {
    UnitVect3 { x, y, z }
  }

  /// Builds the unit vector from the given colatitude sine/cosine and longitude.
  #[inline]
  pub(crate) fn from_z_sth_phi(z: f64, sth: f64, phi: f64) -> UnitVect3 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    UnitVect3::new_unsafe(sth * cos_phi, sth * sin_phi, z)
  }

  /// Returns the `[x, y, z]` components.
  #[inline]
  pub fn to_array(&self) -> [f64; 3] {
    [self.x, self.y, self.z]
  }
}

impl Vec3 for UnitVect3 {
  #[inline]
  fn x(&self) -> f64 {
    self.x
  }

  #[inline]
  fn y(&self) -> f64 {
    self.y
  }

  #[inline]
  fn z(&self) -> f64 {
    self.z
  }

  #[inline]
  fn norm(&self) -> f64 {
    1.0
  }

  #[inline]
  fn normalized(&self) -> Result<UnitVect3, HealpixError> {
    Ok(*self)
  }
}

impl UnitVec3 for UnitVect3 {}

#[cfg(test)]
mod tests {
  use super::*;
  use std::f64::consts::PI;

  #[test]
  fn testok_normalized() {
    let v = [3.0, 0.0, 4.0].normalized().unwrap();
    assert!((v.x() - 0.6).abs() < 1e-15);
    assert!((v.z() - 0.8).abs() < 1e-15);
    assert!((v.squared_norm() - 1.0).abs() < 1e-15);
  }

  #[test]
  fn testerr_normalized() {
    assert_eq!(
      [0.0, 0.0, 0.0].normalized(),
      Err(HealpixError::DegenerateVector {
        x: 0.0,
        y: 0.0,
        z: 0.0
      })
    );
    assert!((f64::NAN, 1.0, 0.0).normalized().is_err());
    assert!([f64::INFINITY, 1.0, 0.0].normalized().is_err());
  }

  #[test]
  fn testok_ang_dist() {
    let a = UnitVect3::new_unsafe(1.0, 0.0, 0.0);
    let b = UnitVect3::new_unsafe(0.0, 1.0, 0.0);
    let c = UnitVect3::new_unsafe(-1.0, 0.0, 0.0);
    assert!((a.ang_dist(&b) - 0.5 * PI).abs() < 1e-15);
    assert!((a.ang_dist(&c) - PI).abs() < 1e-15);
    assert_eq!(a.ang_dist(&a), 0.0);
  }

  #[test]
  fn testok_theta_phi() {
    assert_eq!(theta_phi_of(0.0, 0.0, 1.0), (0.0, 0.0));
    assert_eq!(theta_phi_of(0.0, 0.0, -2.0), (PI, 0.0));
    let (theta, phi) = theta_phi_of(0.0, -1.0, 0.0);
    assert!((theta - 0.5 * PI).abs() < 1e-15);
    assert!((phi - 1.5 * PI).abs() < 1e-15);
    let (_, phi) = theta_phi_of(1.0, -1e-300, 0.0);
    assert!((0.0..TWICE_PI).contains(&phi));
    let u = [0.0, -2.0, 0.0].normalized().unwrap();
    assert_eq!(u.theta_phi(), (theta, 1.5 * PI));
  }
}
