//! Pixels inside a disc (cone) on the sphere.

use std::f64::consts::{FRAC_PI_4, PI};

use super::{n_isolatitude_rings, ring_info_unsafe};
use crate::sph_geom::coo3d::{UnitVec3, UnitVect3};
use crate::sph_geom::{check_ang, phi_in_0_2pi};
use crate::{check_nside_ring, n_pix_unsafe, nested, HealpixError, TRANSITION_Z, TWICE_PI};

/// Largest angular distance between a pixel center and one of its corners, at the given
/// `nside` (reached for the pixels of the first polar cap ring bordering the equatorial
/// region).
///
/// # Example
/// ```rust
/// use hpxsht::ring::max_pixrad;
///
/// assert!((max_pixrad(1) - 0.8410686705679302).abs() < 1e-14);
/// assert!((max_pixrad(256) - 0.004172560737300081).abs() < 1e-15);
/// ```
pub fn max_pixrad(nside: u32) -> f64 {
  let z_to_vec = |z: f64, phi: f64| UnitVect3::from_z_sth_phi(z, ((1.0 - z) * (1.0 + z)).sqrt(), phi);
  let va = z_to_vec(TRANSITION_Z, FRAC_PI_4 / nside as f64);
  let t1 = 1.0 - 1.0 / nside as f64;
  let vb = z_to_vec(1.0 - t1 * t1 / 3.0, 0.0);
  va.ang_dist(&vb)
}

/// Returns the sorted RING indices of the pixels in the disc of given center and radius.
///
/// # Input
/// - `theta`, `phi`: the disc center colatitude and longitude, in radians
/// - `radius`: the disc radius, in radians
/// - `inclusive`: if `false`, returns the pixels whose center is in the disc; if `true`,
///   returns (at least) all pixels overlapping the disc, the disc radius being enlarged by
///   [max_pixrad]
///
/// # Errors
/// `InvalidResolution` for an invalid `nside`, `InvalidAngle` for an invalid center or a
/// negative (or not finite) radius.
///
/// # Example
/// ```rust
/// use hpxsht::ring::query_disc;
///
/// assert_eq!(query_disc(4, 0.0, 0.0, 0.3, false).unwrap(), vec![0, 1, 2, 3]);
/// assert_eq!(query_disc(4, 0.0, 0.0, 4.0, false).unwrap().len(), 192);
/// ```
pub fn query_disc(
  nside: u32,
  theta: f64,
  phi: f64,
  radius: f64,
  inclusive: bool,
) -> Result<Vec<u64>, HealpixError> {
  check_nside_ring(nside)?;
  check_ang(theta, phi)?;
  if !(radius >= 0.0 && radius.is_finite()) {
    return Err(HealpixError::InvalidAngle {
      theta: radius,
      phi,
    });
  }
  let phi = phi_in_0_2pi(phi);
  let radius = if inclusive {
    radius + max_pixrad(nside)
  } else {
    radius
  };
  if radius >= PI {
    return Ok((0..n_pix_unsafe(nside)).collect());
  }
  let cos_r = radius.cos();
  let (sth0, z0) = theta.sin_cos();
  let theta_min = theta - radius;
  let theta_max = theta + radius;
  let mut pixels = Vec::new();
  for ring in 1..=n_isolatitude_rings(nside) {
    let info = ring_info_unsafe(nside, ring);
    if info.theta < theta_min || info.theta > theta_max {
      continue;
    }
    let den = info.sin_theta * sth0;
    if den <= 0.0 {
      // Disc centered on a pole
      if info.z * z0 >= cos_r {
        pixels.extend(info.pixels());
      }
      continue;
    }
    let c = (cos_r - info.z * z0) / den;
    if c <= -1.0 {
      pixels.extend(info.pixels());
    } else if c < 1.0 {
      let dphi = c.acos();
      let n = info.n_pix as i64;
      let nf = info.n_pix as f64;
      let shift = if info.shifted { 0.5 } else { 0.0 };
      // Pixel k center at phi0 + 2 pi k / n = (k + shift) 2 pi / n
      let lo = (nf * (phi - dphi) / TWICE_PI - shift).floor() as i64 + 1;
      let hi = (nf * (phi + dphi) / TWICE_PI - shift).floor() as i64;
      if hi - lo + 1 >= n {
        pixels.extend(info.pixels());
      } else {
        pixels.extend((lo..=hi).map(|k| info.first_pix + k.rem_euclid(n) as u64));
      }
    }
  }
  pixels.sort_unstable();
  Ok(pixels)
}

/// NESTED version of [query_disc], the returned indices being sorted.
///
/// # Errors
/// `InvalidResolution` if `nside` is not a power of 2, else see [query_disc].
pub fn query_disc_nest(
  nside: u32,
  theta: f64,
  phi: f64,
  radius: f64,
  inclusive: bool,
) -> Result<Vec<u64>, HealpixError> {
  let layer = nested::layer(nside)?;
  let mut pixels: Vec<u64> = query_disc(nside, theta, phi, radius, inclusive)?
    .into_iter()
    .map(|ipix| layer.from_ring(ipix))
    .collect();
  pixels.sort_unstable();
  Ok(pixels)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ring::pix_to_vec_ring;
  use crate::sph_geom::ang_to_vec;

  fn brute_force(nside: u32, theta: f64, phi: f64, radius: f64) -> Vec<u64> {
    let center = ang_to_vec(theta, phi).unwrap();
    (0..n_pix_unsafe(nside))
      .filter(|ipix| pix_to_vec_ring(nside, *ipix).unwrap().ang_dist(&center) <= radius)
      .collect()
  }

  #[test]
  fn testok_against_brute_force() {
    for nside in [1, 2, 5, 8] {
      for k in 0..60 {
        let theta = (k as f64 * 0.618033988749895).fract() * PI;
        let phi = (k as f64 * 0.754877666246693).fract() * TWICE_PI;
        let radius = 0.05 + (k as f64 * 0.414213562373095).fract() * 1.5;
        let got = query_disc(nside, theta, phi, radius, false).unwrap();
        let expected = brute_force(nside, theta, phi, radius);
        assert_eq!(got, expected, "nside: {}; k: {}", nside, k);
        let inclusive = query_disc(nside, theta, phi, radius, true).unwrap();
        assert!(got.iter().all(|p| inclusive.binary_search(p).is_ok()));
      }
    }
  }

  #[test]
  fn testok_poles() {
    assert_eq!(query_disc(4, 0.0, 0.0, 0.3, false), Ok(vec![0, 1, 2, 3]));
    assert_eq!(query_disc(4, PI, 0.0, 0.3, false), Ok(vec![188, 189, 190, 191]));
    assert_eq!(query_disc(4, 0.0, 0.0, 0.01, false), Ok(vec![]));
    assert_eq!(query_disc(4, 0.0, 0.0, 0.01, true), Ok(vec![0, 1, 2, 3]));
  }

  #[test]
  fn testok_nest() {
    let nest = query_disc_nest(8, 1.2, 5.0, 0.3, true).unwrap();
    let ring = query_disc(8, 1.2, 5.0, 0.3, true).unwrap();
    assert_eq!(nest.len(), ring.len());
    assert!(nest.windows(2).all(|w| w[0] < w[1]));
    for n in nest {
      assert!(ring.binary_search(&nested::nest_to_ring(8, n).unwrap()).is_ok());
    }
  }

  #[test]
  fn testerr_inputs() {
    assert!(query_disc(4, 0.0, 0.0, -0.1, false).is_err());
    assert!(query_disc(4, 0.0, 0.0, f64::NAN, false).is_err());
    assert!(query_disc(4, -1.0, 0.0, 0.1, false).is_err());
    assert!(query_disc(0, 0.0, 0.0, 0.1, false).is_err());
    assert!(query_disc_nest(6, 0.0, 0.0, 0.1, false).is_err());
  }
}
