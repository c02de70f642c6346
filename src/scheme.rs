use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::sph_geom::coo3d::{UnitVect3, Vec3};
use crate::{check_nside_ring, nested, ring, HealpixError};

/// Pixel indexing scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scheme {
  /// Pixels ordered along the iso-latitude rings, from north to south.
  Ring,
  /// Hierarchical (quad-tree) ordering of the 12 base cells, `nside` must be a power of 2.
  Nested,
}

impl Display for Scheme {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Scheme::Ring => f.write_str("RING"),
      Scheme::Nested => f.write_str("NESTED"),
    }
  }
}

impl Scheme {
  /// Checks that `nside` is valid for this scheme.
  ///
  /// # Example
  /// ```rust
  /// use hpxsht::Scheme;
  ///
  /// assert!(Scheme::Ring.check_nside(3).is_ok());
  /// assert!(Scheme::Nested.check_nside(3).is_err());
  /// ```
  pub fn check_nside(&self, nside: u32) -> Result<(), HealpixError> {
    match self {
      Scheme::Ring => check_nside_ring(nside),
      Scheme::Nested => crate::depth(nside).map(|_| ()),
    }
  }

  /// See [ang_to_pix_ring](crate::ang_to_pix_ring) and [ang_to_pix_nest](crate::ang_to_pix_nest).
  pub fn ang_to_pix(&self, nside: u32, theta: f64, phi: f64) -> Result<u64, HealpixError> {
    match self {
      Scheme::Ring => ring::ang_to_pix_ring(nside, theta, phi),
      Scheme::Nested => nested::ang_to_pix_nest(nside, theta, phi),
    }
  }

  /// See [vec_to_pix_ring](crate::vec_to_pix_ring) and [vec_to_pix_nest](crate::vec_to_pix_nest).
  pub fn vec_to_pix<V: Vec3>(&self, nside: u32, v: &V) -> Result<u64, HealpixError> {
    match self {
      Scheme::Ring => ring::vec_to_pix_ring(nside, v),
      Scheme::Nested => nested::vec_to_pix_nest(nside, v),
    }
  }

  /// See [pix_to_ang_ring](crate::pix_to_ang_ring) and [pix_to_ang_nest](crate::pix_to_ang_nest).
  pub fn pix_to_ang(&self, nside: u32, ipix: u64) -> Result<(f64, f64), HealpixError> {
    match self {
      Scheme::Ring => ring::pix_to_ang_ring(nside, ipix),
      Scheme::Nested => nested::pix_to_ang_nest(nside, ipix),
    }
  }

  /// See [pix_to_vec_ring](crate::pix_to_vec_ring) and [pix_to_vec_nest](crate::pix_to_vec_nest).
  pub fn pix_to_vec(&self, nside: u32, ipix: u64) -> Result<UnitVect3, HealpixError> {
    match self {
      Scheme::Ring => ring::pix_to_vec_ring(nside, ipix),
      Scheme::Nested => nested::pix_to_vec_nest(nside, ipix),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn testok_dispatch() {
    let nside = 8;
    for ipix in [0, 17, 300, 767] {
      let (theta, phi) = Scheme::Nested.pix_to_ang(nside, ipix).unwrap();
      assert_eq!(Scheme::Nested.ang_to_pix(nside, theta, phi), Ok(ipix));
      let ring = nested::nest_to_ring(nside, ipix).unwrap();
      assert_eq!(Scheme::Ring.ang_to_pix(nside, theta, phi), Ok(ring));
      let v = Scheme::Ring.pix_to_vec(nside, ring).unwrap();
      assert_eq!(Scheme::Nested.vec_to_pix(nside, &v), Ok(ipix));
    }
  }

  #[test]
  fn testok_display() {
    assert_eq!(Scheme::Ring.to_string(), "RING");
    assert_eq!(format!("{}", Scheme::Nested), "NESTED");
  }

  #[test]
  fn testerr_nside() {
    assert_eq!(
      Scheme::Nested.check_nside(12),
      Err(HealpixError::InvalidResolution { nside: 12 })
    );
    assert!(Scheme::Ring.check_nside(12).is_ok());
    assert!(Scheme::Ring.check_nside(0).is_err());
    assert!(Scheme::Nested.pix_to_ang(12, 0).is_err());
  }
}
