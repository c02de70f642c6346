//! 2D Morton code (z-order curve) used to interleave the `(i, j)` coordinates of a pixel
//! inside its base cell: `i` bits go on even positions, `j` bits on odd positions.
//! The [XorShiftZoc] implementation, used by the [Layer](super::Layer)s, is the classical
//! "magic bits" xor-shift interleaving.

/// Interleaving of two `u32` coordinates into a `u64` hash (and back).
pub trait ZOrderCurve: Sync + Send {
  /// Returns the Morton code of the given coordinates.
  fn ij2h(&self, i: u32, j: u32) -> u64;
  /// Returns the Morton code of `(i, 0)`.
  fn i02h(&self, i: u32) -> u64;
  /// Returns the `(i, j)` coordinates packed in a single `u64`: `i` in the 32 LSB, `j` in the
  /// 32 MSB.
  fn h2ij(&self, h: u64) -> u64;
  /// Returns the coordinate `i` of `h`, ignoring the `j` bits.
  fn h2i0(&self, h: u64) -> u64;

  /// Returns the Morton code of `(0, j)`.
  #[inline]
  fn oj2h(&self, j: u32) -> u64 {
    self.i02h(j) << 1
  }
  /// Extracts `i` from the packed value returned by [h2ij](ZOrderCurve::h2ij).
  #[inline]
  fn ij2i(&self, ij: u64) -> u32 {
    ij as u32
  }
  /// Extracts `j` from the packed value returned by [h2ij](ZOrderCurve::h2ij).
  #[inline]
  fn ij2j(&self, ij: u64) -> u32 {
    (ij >> 32) as u32
  }
}

/// Xor-shift interleaving, valid for coordinates up to 32 bits.
pub struct XorShiftZoc;

impl ZOrderCurve for XorShiftZoc {
  #[inline]
  fn ij2h(&self, i: u32, j: u32) -> u64 {
    // Same as i02h(i) | oj2h(j), in a single pass
    let mut h = ((j as u64) << 32) | (i as u64);
    let mut t = (h ^ (h >> 16)) & 0x00000000FFFF0000_u64;
    h = h ^ t ^ (t << 16);
    t = (h ^ (h >> 8)) & 0x0000FF000000FF00_u64;
    h = h ^ t ^ (t << 8);
    t = (h ^ (h >> 4)) & 0x00F000F000F000F0_u64;
    h = h ^ t ^ (t << 4);
    t = (h ^ (h >> 2)) & 0x0C0C0C0C0C0C0C0C_u64;
    h = h ^ t ^ (t << 2);
    t = (h ^ (h >> 1)) & 0x2222222222222222_u64;
    h ^ t ^ (t << 1)
  }

  #[inline]
  fn i02h(&self, i: u32) -> u64 {
    spread_bits(i)
  }

  #[inline]
  fn h2ij(&self, h: u64) -> u64 {
    let mut h = h;
    let mut t = (h ^ (h >> 1)) & 0x2222222222222222_u64;
    h = h ^ t ^ (t << 1);
    t = (h ^ (h >> 2)) & 0x0C0C0C0C0C0C0C0C_u64;
    h = h ^ t ^ (t << 2);
    t = (h ^ (h >> 4)) & 0x00F000F000F000F0_u64;
    h = h ^ t ^ (t << 4);
    t = (h ^ (h >> 8)) & 0x0000FF000000FF00_u64;
    h = h ^ t ^ (t << 8);
    t = (h ^ (h >> 16)) & 0x00000000FFFF0000_u64;
    h ^ t ^ (t << 16)
  }

  #[inline]
  fn h2i0(&self, h: u64) -> u64 {
    compact_bits(h & 0x5555555555555555_u64)
  }
}

/// `b31...b0` => `0b31...0b0`
#[inline]
const fn spread_bits(i: u32) -> u64 {
  let mut i = i as u64;
  i = ((i << 16) | i) & 0x0000FFFF0000FFFF_u64;
  i = ((i << 8) | i) & 0x00FF00FF00FF00FF_u64;
  i = ((i << 4) | i) & 0x0F0F0F0F0F0F0F0F_u64;
  i = ((i << 2) | i) & 0x3333333333333333_u64;
  ((i << 1) | i) & 0x5555555555555555_u64
}

/// Inverse of [spread_bits], the odd bits of `h` must be 0.
#[inline]
const fn compact_bits(h: u64) -> u64 {
  let mut h = h;
  h = ((h >> 1) | h) & 0x3333333333333333_u64;
  h = ((h >> 2) | h) & 0x0F0F0F0F0F0F0F0F_u64;
  h = ((h >> 4) | h) & 0x00FF00FF00FF00FF_u64;
  h = ((h >> 8) | h) & 0x0000FFFF0000FFFF_u64;
  ((h >> 16) | h) & 0x00000000FFFFFFFF_u64
}

/// The curve used by every layer.
pub static XOR_SHIFT_ZOC: XorShiftZoc = XorShiftZoc;
