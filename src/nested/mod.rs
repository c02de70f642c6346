//! NESTED scheme: the 12 base cells are recursively divided into 4 sub-cells, the index of a
//! pixel being `(base_cell << 2 depth) | morton(i, j)`, with `(i, j)` the pixel coordinates
//! inside its base cell.
//!
//! Here `nside = 2^depth` must be a power of 2.

use std::ops::Shr;

use self::zordercurve::{XorShiftZoc, ZOrderCurve};
use crate::ring::{self, triangular_number_x4, Loc};
use crate::sph_geom::coo3d::{UnitVect3, Vec3};
use crate::{check_ipix, n_hash_unsafe, nside_unsafe, HealpixError, TRANSITION_Z, Z_NEAR_POLE};

pub mod zordercurve;

/// Array storing pre-computed values for each of the 30 possible depth (from 0 to 29)
const LAYERS: [Layer; 30] = [
  Layer::new(0),
  Layer::new(1),
  Layer::new(2),
  Layer::new(3),
  Layer::new(4),
  Layer::new(5),
  Layer::new(6),
  Layer::new(7),
  Layer::new(8),
  Layer::new(9),
  Layer::new(10),
  Layer::new(11),
  Layer::new(12),
  Layer::new(13),
  Layer::new(14),
  Layer::new(15),
  Layer::new(16),
  Layer::new(17),
  Layer::new(18),
  Layer::new(19),
  Layer::new(20),
  Layer::new(21),
  Layer::new(22),
  Layer::new(23),
  Layer::new(24),
  Layer::new(25),
  Layer::new(26),
  Layer::new(27),
  Layer::new(28),
  Layer::new(29),
];

/// Returns the [Layer] of the given depth.
///
/// # Panics
/// If `depth` is not in `[0, 29]`.
pub fn get(depth: u8) -> &'static Layer {
  &LAYERS[depth as usize]
}

/// Returns the [Layer] of the given `nside`.
///
/// # Errors
/// `InvalidResolution` if `nside` is not a power of 2 in `[1, 2^29]`.
pub fn layer(nside: u32) -> Result<&'static Layer, HealpixError> {
  crate::depth(nside).map(get)
}

/// Values pre-computed for a given depth, and methods working at that depth.
/// The `Layer` methods do not check their inputs: the free functions of this module do.
pub struct Layer {
  depth: u8,
  nside: u32,
  nside_minus_1: u32,
  n_hash: u64,
  twice_depth: u8,
  xy_mask: u64,
  z_order_curve: XorShiftZoc,
}

impl Layer {
  const fn new(depth: u8) -> Layer {
    let twice_depth: u8 = depth << 1u8;
    let nside: u32 = nside_unsafe(depth);
    Layer {
      depth,
      nside,
      nside_minus_1: nside - 1,
      n_hash: n_hash_unsafe(depth),
      twice_depth,
      xy_mask: xy_mask(depth),
      z_order_curve: XorShiftZoc,
    }
  }

  /// Returns the depth of the Layer (i.e. the HEALPix *order*)
  #[inline]
  pub fn depth(&self) -> u8 {
    self.depth
  }

  /// Returns the number of subdivision of a base cell side
  #[inline]
  pub fn nside(&self) -> u32 {
    self.nside
  }

  /// Returns the number of pixels at this layer depth
  #[inline]
  pub fn n_hash(&self) -> u64 {
    self.n_hash
  }

  /// Transforms the given NESTED hash value into its RING counterpart.
  ///
  /// # Example
  /// ```rust
  /// use hpxsht::nested::get;
  ///
  /// let n1 = get(1);
  /// assert_eq!(n1.to_ring(0), 13);
  /// assert_eq!(n1.to_ring(3), 0);
  /// assert_eq!(n1.to_ring(47), 35);
  /// let n2 = get(2);
  /// assert_eq!(n2.to_ring(47),  2);  // NPC
  /// assert_eq!(n2.to_ring(88),  107); // EQR
  /// assert_eq!(n2.to_ring(144), 189); // SPC
  /// ```
  pub fn to_ring(&self, hash: u64) -> u64 {
    // Index of ring at the NPC / EQR interface: i = nside - 1
    // Index of ring at the EQR / SPC interface: i = 3 * nside - 1
    // With h = x + y (<=> rotation 45 and scale sqrt(2)):
    // North polar cap   base cells:   i = 2 * nside - 2 - (x + y)
    // Equatorial region base cells:   i = 3 * nside - 2 - (x + y)
    // South polar cap   base cells:   i = 4 * nside - 2 - (x + y)
    let HashParts { d0h, i, j } = self.decode_hash(hash);
    let h: u64 = i as u64 + j as u64;
    let l: i64 = i as i64 - j as i64;
    let i_d0h = div4_remainder(d0h) as u64;
    let j_d0h = div4_quotient(d0h) as u64;
    debug_assert!(j_d0h <= 2);
    let i_ring: u64 = self.nside_time(j_d0h + 2) - (h + 2);
    // NPC: j = l / 2 + (i + 1) / 2 + (i+1)*(ipix%4)
    // SPC: j = l / 2 + (h + 1) / 2 + (h+1)*(ipix%4)
    // EQR: j = l / 2 + nside/2 (if not equatorial cell) + nside*(ipix%4) (special case if l<0 && baseCell=4)
    let first_isolat_index;
    let mut i_in_ring = div2_quotient(l); // Quotient such that: 1/2 = 0; -1/2 = -1
    if i_ring < self.nside as u64 {
      let ip1 = i_ring + 1;
      first_isolat_index = triangular_number_x4(i_ring);
      i_in_ring += (div2_quotient(ip1) + ip1 * i_d0h) as i64;
    } else if i_ring >= self.nside_time(3) - 1 {
      let ip1 = h + 1;
      first_isolat_index = self.n_hash - triangular_number_x4(ip1);
      i_in_ring += (div2_quotient(ip1) + ip1 * i_d0h) as i64;
    } else {
      first_isolat_index = self.first_hash_in_eqr() + self.minus_nside_x_4nside(i_ring);
      i_in_ring += div2_quotient(self.nside_time(div2_remainder(j_d0h + 1))) as i64;
      i_in_ring += self.nside_time(if d0h == 4 && l < 0 { 4 } else { i_d0h }) as i64;
    }
    i_in_ring as u64 + first_isolat_index
  }

  /// Transforms the given RING hash value into the NESTED hash value.
  ///
  /// # Example
  /// ```rust
  /// use hpxsht::nested::get;
  ///
  /// let n1 = get(1);
  /// assert_eq!(n1.from_ring(0), 3);
  /// assert_eq!(n1.from_ring(13), 0);
  /// assert_eq!(n1.from_ring(47), 44);
  /// ```
  pub fn from_ring(&self, hash: u64) -> u64 {
    let first_hash_in_eqr = self.first_hash_in_eqr();
    let first_hash_on_eqr_spc_transition = self.n_hash - first_hash_in_eqr;
    if hash < first_hash_in_eqr {
      // North polar cap
      // Solve 2n(n+1) = x => n = [sqrt(1+2x) - 1] / 2, n being the ring index
      let i_ring: u64 = (crate::isqrt(1 + (hash << 1)) - 1) >> 1;
      let n_in_ring: u64 = i_ring + 1;
      let i_in_ring = hash - triangular_number_x4(i_ring);
      let d0h = i_in_ring / n_in_ring;
      let h = (((self.nside as u64) << 1) - 2) as i64 - i_ring as i64;
      let l = ((i_in_ring - n_in_ring * d0h) << 1) as i64 - i_ring as i64;
      self.build_hash_from_parts(d0h as u8, ((h + l) >> 1) as u32, ((h - l) >> 1) as u32)
    } else if hash >= first_hash_on_eqr_spc_transition {
      // South polar cap, counting in reverse order
      let hash = self.n_hash - 1 - hash;
      let i_ring = (crate::isqrt(1 + (hash << 1)) - 1) >> 1;
      let n_in_ring = i_ring + 1;
      let i_in_ring = ((n_in_ring << 2) - 1) - (hash - triangular_number_x4(i_ring));
      let d0h = i_in_ring / n_in_ring;
      let h = i_ring as i64;
      let l = ((i_in_ring - n_in_ring * d0h) << 1) as i64 - i_ring as i64;
      self.build_hash_from_parts(
        d0h as u8 + 8,
        ((h + l) >> 1) as u32,
        ((h - l) >> 1) as u32,
      )
    } else {
      // Equatorial region, origin at the north corner of base cell 4
      let mut i_ring = hash - first_hash_in_eqr;
      let mut i_in_ring = i_ring;
      // <=> /= 4*nside
      i_ring >>= self.depth + 2;
      i_in_ring -= i_ring << (self.depth + 2);
      let l = (i_in_ring << 1) + div2_remainder(i_ring);
      // Origin of the h axis at the south corner of base cell 4
      let h = (((self.nside as u64) << 1) - 2) - i_ring;
      // Rotation of -45
      let i_in_d0c = (h + l) >> 1;
      let j_in_d0c = (h as i64 - l as i64) >> 1;
      // Offset of 4*nside in j
      let j_in_d0c = (j_in_d0c + ((self.nside as i64) << 2)) as u64;
      let i_d0c = self.div_by_nside_floor_u8(i_in_d0c);
      let j_d0c = self.div_by_nside_floor_u8(j_in_d0c);
      self.build_hash_from_parts(
        depth0_hash_unsafe(i_d0c, j_d0c),
        self.modulo_nside_u32(i_in_d0c as u32),
        self.modulo_nside_u32(j_in_d0c as u32),
      )
    }
  }

  /// Returns the NESTED index of the pixel containing the position of given `z = cos(theta)`
  /// and longitude `phi`.
  /// Inputs are not checked: `z` must be in `[-1, 1]` and `phi` finite.
  ///
  /// # Example
  /// ```rust
  /// use hpxsht::nested::get;
  ///
  /// assert_eq!(get(8).hash(1.0, 0.0), 65535);
  /// assert_eq!(get(8).hash(0.0, std::f64::consts::FRAC_PI_2), 354986);
  /// ```
  pub fn hash(&self, z: f64, phi: f64) -> u64 {
    let sth = if z.abs() > Z_NEAR_POLE {
      Some(((1.0 - z) * (1.0 + z)).sqrt())
    } else {
      None
    };
    let tt = crate::sph_geom::phi_in_0_2pi(phi) * crate::TWO_OVER_PI;
    self.hash_loc(&Loc {
      z,
      sth,
      tt: if tt >= 4.0 { 0.0 } else { tt },
    })
  }

  pub(crate) fn hash_loc(&self, loc: &Loc) -> u64 {
    let nsf = self.nside as f64;
    let (d0h, i, j) = if loc.z.abs() <= TRANSITION_Z {
      // Equatorial region
      let temp1 = nsf * (0.5 + loc.tt);
      let temp2 = nsf * loc.z * 0.75;
      let jp = (temp1 - temp2) as u64; // index of ascending edge line
      let jm = (temp1 + temp2) as u64; // index of descending edge line
      let ifp = (jp >> self.depth) as u8; // in [0, 4]
      let ifm = (jm >> self.depth) as u8;
      let d0h = match ifp.cmp(&ifm) {
        std::cmp::Ordering::Equal => ifp | 4,
        std::cmp::Ordering::Less => ifp,
        std::cmp::Ordering::Greater => ifm + 8,
      };
      let i = self.modulo_nside_u32(jm as u32);
      let j = self.nside_minus_1 - self.modulo_nside_u32(jp as u32);
      (d0h, i, j)
    } else {
      // Polar caps
      let ntt = (loc.tt as u8).min(3);
      let tp = loc.tt - ntt as f64;
      let tmp = loc.polar_tmp(nsf);
      let jp = ((tp * tmp) as u32).min(self.nside_minus_1);
      let jm = (((1.0 - tp) * tmp) as u32).min(self.nside_minus_1);
      if loc.z >= 0.0 {
        (ntt, self.nside_minus_1 - jm, self.nside_minus_1 - jp)
      } else {
        (ntt + 8, jp, jm)
      }
    };
    self.build_hash_from_parts(d0h, i, j)
  }

  /// Returns `(z, phi)`, i.e. the cosine of the colatitude and the longitude, of the center
  /// of the given cell. The `hash` value is not checked.
  pub fn center(&self, hash: u64) -> (f64, f64) {
    let (z, _, phi) = ring::center(self.nside, self.to_ring(hash));
    (z, phi)
  }

  /// arg * nside
  #[inline]
  fn nside_time(&self, i: u64) -> u64 {
    i << self.depth
  }

  /// 2 * nside * (nside + 1)
  #[inline]
  fn first_hash_in_eqr(&self) -> u64 {
    ((1_u64 << self.twice_depth) + self.nside as u64) << 1
  }

  /// (i_ring - nside) * 4 * nside
  #[inline]
  fn minus_nside_x_4nside(&self, i_ring: u64) -> u64 {
    (i_ring - self.nside as u64) << (self.depth + 2)
  }

  #[inline]
  fn div_by_nside_floor_u8(&self, val: u64) -> u8 {
    (val >> self.depth) as u8
  }

  #[inline]
  fn modulo_nside_u32(&self, val: u32) -> u32 {
    val & self.nside_minus_1
  }

  #[inline]
  fn build_hash_from_parts(&self, d0h: u8, i: u32, j: u32) -> u64 {
    debug_assert!(
      i < self.nside && j < self.nside,
      "nside: {}; i: {}, j: {}",
      self.nside,
      i,
      j
    );
    ((d0h as u64) << self.twice_depth) | self.z_order_curve.ij2h(i, j)
  }

  #[inline]
  fn decode_hash(&self, hash: u64) -> HashParts {
    let ij: u64 = self.z_order_curve.h2ij(hash & self.xy_mask);
    HashParts {
      d0h: (hash >> self.twice_depth) as u8,
      i: self.z_order_curve.ij2i(ij),
      j: self.z_order_curve.ij2j(ij),
    }
  }
}

/// Converts a NESTED index into the RING index of the same pixel.
///
/// # Errors
/// `InvalidResolution` if `nside` is not a power of 2 in `[1, 2^29]`, `PixelIndexOutOfRange`
/// if `ipix >= 12 nside^2`.
///
/// # Example
/// ```rust
/// use hpxsht::{nest_to_ring};
///
/// assert_eq!(nest_to_ring(256, 0).unwrap(), 391808);
/// assert_eq!(nest_to_ring(256, 1).unwrap(), 390784);
/// assert!(nest_to_ring(3, 0).is_err());
/// ```
pub fn nest_to_ring(nside: u32, ipix: u64) -> Result<u64, HealpixError> {
  let layer = layer(nside)?;
  check_ipix(layer.n_hash, ipix)?;
  Ok(layer.to_ring(ipix))
}

/// Converts a RING index into the NESTED index of the same pixel.
///
/// # Errors
/// `InvalidResolution` if `nside` is not a power of 2 in `[1, 2^29]`, `PixelIndexOutOfRange`
/// if `ipix >= 12 nside^2`.
///
/// # Example
/// ```rust
/// use hpxsht::{ring_to_nest};
///
/// assert_eq!(ring_to_nest(256, 0).unwrap(), 65535);
/// assert_eq!(ring_to_nest(256, 1).unwrap(), 131071);
/// ```
pub fn ring_to_nest(nside: u32, ipix: u64) -> Result<u64, HealpixError> {
  let layer = layer(nside)?;
  check_ipix(layer.n_hash, ipix)?;
  Ok(layer.from_ring(ipix))
}

/// Returns the NESTED index of the pixel containing the given position.
///
/// # Input
/// - `nside`: a power of 2 in `[1, 2^29]`
/// - `theta`: colatitude, in radians, in `[0, pi]`
/// - `phi`: longitude, in radians (any finite value)
///
/// # Errors
/// `InvalidResolution` for an invalid `nside`, `InvalidAngle` for an invalid position.
///
/// # Example
/// ```rust
/// use hpxsht::{ang_to_pix_nest};
/// use std::f64::consts::FRAC_PI_2;
///
/// assert_eq!(ang_to_pix_nest(256, 0.0, 0.0).unwrap(), 65535);
/// assert_eq!(ang_to_pix_nest(256, FRAC_PI_2, FRAC_PI_2).unwrap(), 354986);
/// ```
pub fn ang_to_pix_nest(nside: u32, theta: f64, phi: f64) -> Result<u64, HealpixError> {
  let layer = layer(nside)?;
  Loc::from_ang(theta, phi).map(|loc| layer.hash_loc(&loc))
}

/// Returns the NESTED index of the pixel containing the given direction (normalized first).
///
/// # Errors
/// `InvalidResolution` for an invalid `nside`, `DegenerateVector` for a null or not finite
/// vector.
///
/// # Example
/// ```rust
/// use hpxsht::{vec_to_pix_nest};
///
/// assert_eq!(vec_to_pix_nest(256, &[1.0, 0.0, 0.0]).unwrap(), 289450);
/// assert_eq!(vec_to_pix_nest(256, &[0.0, 1.0, 0.0]).unwrap(), 354986);
/// ```
pub fn vec_to_pix_nest<V: Vec3>(nside: u32, v: &V) -> Result<u64, HealpixError> {
  let layer = layer(nside)?;
  Loc::from_vec(v).map(|loc| layer.hash_loc(&loc))
}

/// Returns the colatitude and the longitude, in radians, of the center of the given
/// NESTED pixel.
///
/// # Errors
/// `InvalidResolution` for an invalid `nside`, `PixelIndexOutOfRange` if `ipix >= 12 nside^2`.
///
/// # Example
/// ```rust
/// use hpxsht::{pix_to_ang_nest};
///
/// let (theta, phi) = pix_to_ang_nest(256, 0).unwrap();
/// assert!((theta - 1.5681921571847817).abs() < 1e-14);
/// assert!((phi - 0.7853981633974483).abs() < 1e-15);
/// ```
pub fn pix_to_ang_nest(nside: u32, ipix: u64) -> Result<(f64, f64), HealpixError> {
  ring::pix_to_ang_ring(nside, nest_to_ring(nside, ipix)?)
}

/// Returns the unit vector pointing to the center of the given NESTED pixel.
///
/// # Errors
/// `InvalidResolution` for an invalid `nside`, `PixelIndexOutOfRange` if `ipix >= 12 nside^2`.
pub fn pix_to_vec_nest(nside: u32, ipix: u64) -> Result<UnitVect3, HealpixError> {
  ring::pix_to_vec_ring(nside, nest_to_ring(nside, ipix)?)
}

/// Returns the hash value of the base cell (the depth 0 cell hash value) given its '(i, j)'
/// coordinates in the projected, rotated, scaled plane.
/// Here we suppose that we get `(i, j)` from the center of a cell, so that we do not have to take
/// care of border effects.
#[inline]
fn depth0_hash_unsafe(i: u8, j: u8) -> u8 {
  let k = 5_i8 - (i + j) as i8;
  ((k << 2) + (((i as i8) + ((k - 1) >> 7)) & 3_i8)) as u8
}

struct HashParts {
  d0h: u8, // base cell number (depth 0 hash value)
  i: u32,  // in the base cell, z-order curve coordinate along the x-axis
  j: u32,  // in the base cell, z-order curve coordinate along the y-axis
}

/// x / 2
#[inline]
fn div2_quotient<T: Shr<u8, Output = T>>(x: T) -> T {
  x.shr(1)
}

/// x modulo 2
#[inline]
const fn div2_remainder(x: u64) -> u64 {
  x & 1
}

/// x / 4
#[inline]
const fn div4_quotient(x: u8) -> u8 {
  x >> 2
}

/// x modulo 4
#[inline]
const fn div4_remainder(x: u8) -> u8 {
  x & 3
}

/// mask ...111111
/// ```rust
/// use hpxsht::nested::{xy_mask};
/// assert_eq!(xy_mask(3), 0b00111111);
/// ```
#[inline]
pub const fn xy_mask(depth: u8) -> u64 {
  (1_u64 << (depth << 1)) - 1_u64
}
