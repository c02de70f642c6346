//! RING scheme: pixels are numbered along the `4 nside - 1` iso-latitude rings, from the
//! north pole to the south pole, and from `phi = 0` eastward inside a ring.
//!
//! Contrary to the NESTED scheme, `nside` here is not necessarily a power of 2.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::sph_geom::coo3d::{UnitVect3, Vec3};
use crate::sph_geom::{check_ang, phi_in_0_2pi};
use crate::{
  check_ipix, check_nside_ring, isqrt, n_pix_unsafe, HealpixError, TRANSITION_Z, TWICE_PI,
  TWO_OVER_PI, Z_NEAR_POLE,
};

pub mod disc;
pub mod interpol;

pub use disc::{max_pixrad, query_disc};
pub use interpol::bilinear_interpolation;

/// Returns the number of isolatitude in the whole sphere at the given `nside`,
/// i.e. the number of small circles parallel to the equator containing HEALPix cell centers.
///
/// # Input
/// - `nside`: the sub-division of a base cell along both the South-East and the South-West axis
///
/// # Output
/// -  $4 * nside - 1$: $2 * nside - 1$ ring for the NPC cell, $2 * nside - 1$ for the SPC cell
///    $+1$ for the equator.
///
/// # Example
/// ```rust
/// use hpxsht::ring::{n_isolatitude_rings};
///
/// assert_eq!(n_isolatitude_rings(1),  3);
/// assert_eq!(n_isolatitude_rings(2),  7);
/// assert_eq!(n_isolatitude_rings(3), 11);
/// assert_eq!(n_isolatitude_rings(4), 15);
/// ```
pub const fn n_isolatitude_rings(nside: u32) -> u32 {
  (nside << 2) - 1
}

/// Index of the first cell on the North polar cap / Equatorial Region transition latitude,
/// i.e. number of cells in the 4 polar cap triangles of side = nside - 1:
/// ```math
/// 4 * \sum_{i=1}^{nside - 1} i = 2 nside (nside - 1)
/// ```
///
/// # Example
/// ```rust
/// use hpxsht::ring::first_hash_on_npc_eqr_transition;
///
/// assert_eq!(first_hash_on_npc_eqr_transition(1),  0);
/// assert_eq!(first_hash_on_npc_eqr_transition(2),  4);
/// assert_eq!(first_hash_on_npc_eqr_transition(3), 12);
/// assert_eq!(first_hash_on_npc_eqr_transition(4), 24);
/// ```
#[inline]
pub const fn first_hash_on_npc_eqr_transition(nside: u32) -> u64 {
  triangular_number_x4((nside - 1) as u64)
}

/// Four time the [triangular number](https://en.wikipedia.org/wiki/Triangular_number), i.e.
/// ```math
/// 4 * \sum_{i=1}^{n} i = 4 * \frac{n (n + 1)}{2} = 2 n (n + 1)
/// ```
#[inline]
pub(crate) const fn triangular_number_x4(n: u64) -> u64 {
  (n * (n + 1)) << 1
}

/// Geometry of an iso-latitude ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingInfo {
  /// Ring number, in `[1, 4 nside - 1]`, from north to south.
  pub ring: u32,
  /// RING index of the first pixel of the ring.
  pub first_pix: u64,
  /// Number of pixels in the ring.
  pub n_pix: u64,
  /// Cosine of the colatitude of the ring.
  pub z: f64,
  /// Sine of the colatitude of the ring.
  pub sin_theta: f64,
  /// Colatitude of the ring, in radians.
  pub theta: f64,
  /// Longitude of the center of the first pixel (`pi / n_pix` if shifted, else `0`).
  pub phi0: f64,
  /// `true` if the first pixel center is not on the `phi = 0` meridian.
  pub shifted: bool,
}

impl RingInfo {
  /// Longitude of the center of the `k`-th pixel of the ring.
  #[inline]
  pub fn phi(&self, k: u64) -> f64 {
    self.phi0 + TWICE_PI * (k as f64) / (self.n_pix as f64)
  }

  /// Iterator on the RING indices of the ring pixels.
  #[inline]
  pub fn pixels(&self) -> std::ops::Range<u64> {
    self.first_pix..self.first_pix + self.n_pix
  }
}

/// Returns the geometry of the given ring.
///
/// # Input
/// - `nside`: the resolution, in `[1, 2^29]`
/// - `ring`: the 1-based ring number, in `[1, 4 nside - 1]`, from north to south
///
/// # Errors
/// `InvalidResolution` for an invalid `nside`, `RingIndexOutOfRange` for an invalid `ring`.
///
/// # Example
/// ```rust
/// use hpxsht::ring::ring_info;
/// use std::f64::consts::PI;
///
/// let info = ring_info(4, 1).unwrap();
/// assert_eq!(info.first_pix, 0);
/// assert_eq!(info.n_pix, 4);
/// assert!(info.shifted);
/// assert!((info.phi0 - PI / 4.0).abs() < 1e-15);
/// // Equatorial ring
/// let info = ring_info(4, 8).unwrap();
/// assert_eq!(info.first_pix, 88);
/// assert_eq!(info.n_pix, 16);
/// assert_eq!(info.z, 0.0);
/// ```
pub fn ring_info(nside: u32, ring: u32) -> Result<RingInfo, HealpixError> {
  check_nside_ring(nside)?;
  let nring = n_isolatitude_rings(nside);
  if ring == 0 || ring > nring {
    Err(HealpixError::RingIndexOutOfRange { ring, nring })
  } else {
    Ok(ring_info_unsafe(nside, ring))
  }
}

/// Same as [ring_info] without checking the inputs.
pub(crate) fn ring_info_unsafe(nside: u32, ring: u32) -> RingInfo {
  let ns = nside as u64;
  let r = ring as u64;
  let npix = n_pix_unsafe(nside);
  let (first_pix, n_pix, z, sin_theta, shifted) = if r < ns {
    let (z, sth) = cap_z_sth(r, npix);
    (triangular_number_x4(r - 1), r << 2, z, sth, true)
  } else if r <= 3 * ns {
    let z = belt_z(ns, r);
    (
      first_hash_on_npc_eqr_transition(nside) + ((r - ns) * (ns << 2)),
      ns << 2,
      z,
      ((1.0 - z) * (1.0 + z)).sqrt(),
      (r - ns) & 1 == 0,
    )
  } else {
    let rr = (ns << 2) - r;
    let (z, sth) = cap_z_sth(rr, npix);
    (npix - triangular_number_x4(rr), rr << 2, -z, sth, true)
  };
  RingInfo {
    ring,
    first_pix,
    n_pix,
    z,
    sin_theta,
    theta: sin_theta.atan2(z),
    phi0: if shifted { PI / (n_pix as f64) } else { 0.0 },
    shifted,
  }
}

/// Returns the number of the ring just above (north of) the given `z`, in `[0, 4 nside - 1]`:
/// `0` if `z` is north of the first ring, `4 nside - 1` if it is south of the last one.
pub(crate) fn ring_above(nside: u32, z: f64) -> u32 {
  let nsf = nside as f64;
  let az = z.abs();
  if az <= TRANSITION_Z {
    (nsf * (2.0 - 1.5 * z)) as u32
  } else {
    let ir = (nsf * (3.0 * (1.0 - az)).sqrt()) as u32;
    if z > 0.0 {
      ir
    } else {
      (nside << 2) - ir - 1
    }
  }
}

/// `z` and `sin(theta)` of the polar cap ring at distance `ir` from the closest pole
/// (positive `z`, i.e. north polar cap values).
#[inline]
fn cap_z_sth(ir: u64, npix: u64) -> (f64, f64) {
  let t = ((ir * ir) << 2) as f64 / (npix as f64);
  (1.0 - t, (t * (2.0 - t)).sqrt())
}

/// `z` of the equatorial region ring `ir` (1-based).
#[inline]
fn belt_z(ns: u64, ir: u64) -> f64 {
  ((ns << 1) as f64 - ir as f64) * 2.0 / (3 * ns) as f64
}

/// A position on the sphere, decomposed the way the pixel index computation needs it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Loc {
  /// cos(theta)
  pub(crate) z: f64,
  /// sin(theta), only when close to a pole (the accurate value is then needed)
  pub(crate) sth: Option<f64>,
  /// `phi * 2 / pi`, in `[0, 4[`
  pub(crate) tt: f64,
}

impl Loc {
  pub(crate) fn from_ang(theta: f64, phi: f64) -> Result<Self, HealpixError> {
    check_ang(theta, phi)?;
    let sth = if !(0.01..=PI - 0.01).contains(&theta) {
      Some(theta.sin())
    } else {
      None
    };
    Ok(Loc {
      z: theta.cos(),
      sth,
      tt: tt_of(phi),
    })
  }

  pub(crate) fn from_vec<V: Vec3>(v: &V) -> Result<Self, HealpixError> {
    let u = v.normalized()?;
    let rho = (u.x() * u.x() + u.y() * u.y()).sqrt();
    let phi = if rho == 0.0 { 0.0 } else { u.y().atan2(u.x()) };
    Ok(Loc {
      z: u.z(),
      sth: if u.z().abs() > Z_NEAR_POLE {
        Some(rho)
      } else {
        None
      },
      tt: tt_of(phi),
    })
  }

  /// `nside * sqrt(3 (1 - |z|))`
  #[inline]
  pub(crate) fn polar_tmp(&self, nside: f64) -> f64 {
    match self.sth {
      Some(sth) => nside * sth / ((1.0 + self.z.abs()) / 3.0).sqrt(),
      None => nside * (3.0 * (1.0 - self.z.abs())).sqrt(),
    }
  }
}

#[inline]
fn tt_of(phi: f64) -> f64 {
  let tt = phi_in_0_2pi(phi) * TWO_OVER_PI;
  if tt >= 4.0 {
    0.0
  } else {
    tt
  }
}

/// RING index of the pixel containing the given location, `nside` not checked.
pub(crate) fn hash_loc(nside: u32, loc: &Loc) -> u64 {
  let ns = nside as i64;
  let nsf = nside as f64;
  if loc.z.abs() <= TRANSITION_Z {
    // Equatorial region
    let temp1 = nsf * (0.5 + loc.tt);
    let temp2 = nsf * loc.z * 0.75;
    let jp = (temp1 - temp2) as i64; // index of ascending edge line
    let jm = (temp1 + temp2) as i64; // index of descending edge line
    let ir = ns + 1 + jp - jm; // in [1, 2 nside + 1]
    let kshift = 1 - (ir & 1);
    let nl4 = ns << 2;
    let ip = ((jp + jm - ns + kshift + 1 + (nl4 << 1)) >> 1) % nl4;
    first_hash_on_npc_eqr_transition(nside) + ((ir - 1) * nl4 + ip) as u64
  } else {
    // Polar caps
    let tp = loc.tt - loc.tt.floor();
    let tmp = loc.polar_tmp(nsf);
    let jp = (tp * tmp) as i64;
    let jm = ((1.0 - tp) * tmp) as i64;
    let ir = jp + jm + 1; // ring number counted from the closest pole
    let ip = ((loc.tt * ir as f64) as i64) % (ir << 2);
    if loc.z > 0.0 {
      triangular_number_x4((ir - 1) as u64) + ip as u64
    } else {
      n_pix_unsafe(nside) - triangular_number_x4(ir as u64) + ip as u64
    }
  }
}

/// Returns `(z, sin(theta), phi)` of the center of the given RING pixel, inputs not checked.
pub(crate) fn center(nside: u32, ipix: u64) -> (f64, f64, f64) {
  let ns = nside as u64;
  let npix = n_pix_unsafe(nside);
  let ncap = first_hash_on_npc_eqr_transition(nside);
  if ipix < ncap {
    // North polar cap
    let ir = (1 + isqrt(1 + (ipix << 1))) >> 1;
    let iphi = ipix + 1 - triangular_number_x4(ir - 1);
    let (z, sth) = cap_z_sth(ir, npix);
    (z, sth, (iphi as f64 - 0.5) * FRAC_PI_2 / ir as f64)
  } else if ipix < npix - ncap {
    // Equatorial region
    let ip = ipix - ncap;
    let tmp = ip / (ns << 2);
    let ir = tmp + ns;
    let iphi = ip - tmp * (ns << 2) + 1;
    let fodd = if (ir + ns) & 1 == 1 { 1.0 } else { 0.5 };
    let z = belt_z(ns, ir);
    (
      z,
      ((1.0 - z) * (1.0 + z)).sqrt(),
      (iphi as f64 - fodd) * FRAC_PI_2 / ns as f64,
    )
  } else {
    // South polar cap
    let ip = npix - ipix;
    let ir = (1 + isqrt((ip << 1) - 1)) >> 1;
    let iphi = (ir << 2) + 1 - (ip - triangular_number_x4(ir - 1));
    let (z, sth) = cap_z_sth(ir, npix);
    (-z, sth, (iphi as f64 - 0.5) * FRAC_PI_2 / ir as f64)
  }
}

/// Returns the RING index of the pixel containing the given position.
///
/// # Input
/// - `nside`: the resolution, in `[1, 2^29]`
/// - `theta`: colatitude, in radians, in `[0, pi]`
/// - `phi`: longitude, in radians (any finite value)
///
/// # Errors
/// `InvalidResolution` for an invalid `nside`, `InvalidAngle` for an invalid position.
///
/// # Example
/// ```rust
/// use hpxsht::{ang_to_pix_ring};
/// use std::f64::consts::FRAC_PI_2;
///
/// assert_eq!(ang_to_pix_ring(256, 0.0, 0.0).unwrap(), 0);
/// assert_eq!(ang_to_pix_ring(256, FRAC_PI_2, FRAC_PI_2).unwrap(), 392960);
/// ```
pub fn ang_to_pix_ring(nside: u32, theta: f64, phi: f64) -> Result<u64, HealpixError> {
  check_nside_ring(nside)?;
  Loc::from_ang(theta, phi).map(|loc| hash_loc(nside, &loc))
}

/// Returns the RING index of the pixel containing the given direction (normalized first).
///
/// # Errors
/// `InvalidResolution` for an invalid `nside`, `DegenerateVector` for a null or
/// not finite vector.
///
/// # Example
/// ```rust
/// use hpxsht::{vec_to_pix_ring};
///
/// assert_eq!(vec_to_pix_ring(256, &[1.0, 0.0, 0.0]).unwrap(), 392704);
/// ```
pub fn vec_to_pix_ring<V: Vec3>(nside: u32, v: &V) -> Result<u64, HealpixError> {
  check_nside_ring(nside)?;
  Loc::from_vec(v).map(|loc| hash_loc(nside, &loc))
}

/// Returns the colatitude and the longitude, in radians, of the center of the given
/// RING pixel.
///
/// # Errors
/// `InvalidResolution` for an invalid `nside`, `PixelIndexOutOfRange` if `ipix >= 12 nside^2`.
///
/// # Example
/// ```rust
/// use hpxsht::{pix_to_ang_ring};
/// use std::f64::consts::FRAC_PI_4;
///
/// let (theta, phi) = pix_to_ang_ring(256, 0).unwrap();
/// assert!((theta - 0.0031894411211228764).abs() < 1e-13);
/// assert!((phi - FRAC_PI_4).abs() < 1e-15);
/// assert!(pix_to_ang_ring(256, 786432).is_err());
/// ```
pub fn pix_to_ang_ring(nside: u32, ipix: u64) -> Result<(f64, f64), HealpixError> {
  check_nside_ring(nside)?;
  check_ipix(n_pix_unsafe(nside), ipix)?;
  let (z, sth, phi) = center(nside, ipix);
  Ok((sth.atan2(z), phi))
}

/// Returns the unit vector pointing to the center of the given RING pixel.
///
/// # Errors
/// `InvalidResolution` for an invalid `nside`, `PixelIndexOutOfRange` if `ipix >= 12 nside^2`.
pub fn pix_to_vec_ring(nside: u32, ipix: u64) -> Result<UnitVect3, HealpixError> {
  check_nside_ring(nside)?;
  check_ipix(n_pix_unsafe(nside), ipix)?;
  let (z, sth, phi) = center(nside, ipix);
  Ok(UnitVect3::from_z_sth_phi(z, sth, phi))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sph_geom::ang_to_vec;
  use std::f64::consts::FRAC_PI_4;

  const NSIDES: [u32; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 12, 16, 33];

  #[test]
  fn testok_literals_nside256() {
    assert_eq!(ang_to_pix_ring(256, 0.0, 0.0), Ok(0));
    assert_eq!(ang_to_pix_ring(256, FRAC_PI_2, FRAC_PI_2), Ok(392960));
    assert_eq!(vec_to_pix_ring(256, &[1.0, 0.0, 0.0]), Ok(392704));
    let (theta, phi) = pix_to_ang_ring(256, 0).unwrap();
    assert!((theta - 0.0031894411211228764).abs() < 1e-13);
    assert!((phi - FRAC_PI_4).abs() < 1e-15);
    let (_, phi) = pix_to_ang_ring(256, 1).unwrap();
    assert!((phi - 2.356194490192345).abs() < 1e-15);
  }

  #[test]
  fn testok_ang_round_trip() {
    for nside in NSIDES {
      for ipix in 0..n_pix_unsafe(nside) {
        let (theta, phi) = pix_to_ang_ring(nside, ipix).unwrap();
        assert_eq!(ang_to_pix_ring(nside, theta, phi), Ok(ipix), "nside: {}", nside);
        let v = pix_to_vec_ring(nside, ipix).unwrap();
        assert_eq!(vec_to_pix_ring(nside, &v), Ok(ipix), "nside: {}", nside);
      }
    }
  }

  #[test]
  fn testok_ring_info() {
    for nside in NSIDES {
      let mut next_first = 0;
      for ring in 1..=n_isolatitude_rings(nside) {
        let info = ring_info(nside, ring).unwrap();
        assert_eq!(info.first_pix, next_first);
        next_first += info.n_pix;
        for k in [0, info.n_pix - 1] {
          let (z, sth, phi) = center(nside, info.first_pix + k);
          assert!((z - info.z).abs() < 1e-15);
          assert!((sth - info.sin_theta).abs() < 1e-15);
          assert!((phi - info.phi(k)).abs() < 1e-13);
        }
      }
      assert_eq!(next_first, n_pix_unsafe(nside));
    }
  }

  #[test]
  fn testok_ring_above() {
    for nside in NSIDES {
      assert_eq!(ring_above(nside, 1.0), 0);
      assert_eq!(ring_above(nside, -1.0), n_isolatitude_rings(nside));
      for ring in 1..n_isolatitude_rings(nside) {
        let z1 = ring_info_unsafe(nside, ring).z;
        let z2 = ring_info_unsafe(nside, ring + 1).z;
        assert_eq!(ring_above(nside, 0.5 * (z1 + z2)), ring);
      }
    }
  }

  #[test]
  fn testok_poles_and_wrap() {
    let nside = 8;
    let npix = n_pix_unsafe(nside);
    assert!(ang_to_pix_ring(nside, 0.0, 1.0).unwrap() < 4);
    assert!(ang_to_pix_ring(nside, PI, 1.0).unwrap() >= npix - 4);
    assert_eq!(
      ang_to_pix_ring(nside, 1.0, -0.1),
      ang_to_pix_ring(nside, 1.0, TWICE_PI - 0.1)
    );
    assert_eq!(
      vec_to_pix_ring(nside, &ang_to_vec(0.001, 3.0).unwrap()),
      ang_to_pix_ring(nside, 0.001, 3.0)
    );
  }

  #[test]
  fn testerr_inputs() {
    assert_eq!(
      pix_to_ang_ring(256, 786432),
      Err(HealpixError::PixelIndexOutOfRange {
        ipix: 786432,
        npix: 786432
      })
    );
    assert_eq!(
      ang_to_pix_ring(0, 0.0, 0.0),
      Err(HealpixError::InvalidResolution { nside: 0 })
    );
    assert!(ang_to_pix_ring(4, 4.0, 0.0).is_err());
    assert!(vec_to_pix_ring(4, &[0.0, 0.0, 0.0]).is_err());
    assert_eq!(
      ring_info(4, 16),
      Err(HealpixError::RingIndexOutOfRange { ring: 16, nring: 15 })
    );
    assert!(ring_info(4, 0).is_err());
  }
}
