use std::{
  error::Error,
  io::{stdout, Write},
};

use clap::Args;

use hpxsht::{nside_to_pixel_count, nside_to_ring_count, pixel_count_to_nside};

/// Number of pixels, 12 nside^2, of a map of given nside
#[derive(Debug, Args)]
pub struct Npix {
  /// Resolution parameter, in [1, 2^29]
  nside: u32,
}
impl Npix {
  pub fn exec(self) -> Result<(), Box<dyn Error>> {
    let npix = nside_to_pixel_count(self.nside)?;
    writeln!(stdout(), "{}", npix).map_err(|e| e.into())
  }
}

/// Resolution parameter of a map of given number of pixels
#[derive(Debug, Args)]
pub struct Nside {
  /// Number of pixels, of the form 12 nside^2
  npix: u64,
}
impl Nside {
  pub fn exec(self) -> Result<(), Box<dyn Error>> {
    let nside = pixel_count_to_nside(self.npix)?;
    writeln!(stdout(), "{}", nside).map_err(|e| e.into())
  }
}

/// Number of iso-latitude rings, 4 nside - 1, of a map of given nside
#[derive(Debug, Args)]
pub struct Nring {
  /// Resolution parameter, in [1, 2^29]
  nside: u32,
}
impl Nring {
  pub fn exec(self) -> Result<(), Box<dyn Error>> {
    let nring = nside_to_ring_count(self.nside)?;
    writeln!(stdout(), "{}", nring).map_err(|e| e.into())
  }
}
