use std::error::Error;

use clap::Parser;

use hpxsht_cli::{
  disc::Disc,
  pixel::{Ang2Pix, Nest2Ring, Pix2Ang, Pix2Vec, Ring2Nest, Vec2Pix},
  resolution::{Npix, Nring, Nside},
  sht::ShtCheck,
};

// Avoid musl's default allocator due to lackluster performance
// https://nickb.dev/blog/default-musl-allocator-considered-harmful-to-performance
#[cfg(all(target_env = "musl", target_arch = "x86_64"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// HEALPix indices, geometry and spherical harmonic transforms on the command line.
/// Pixel indices are 0-based, angles are in radians.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
enum Args {
  #[clap(name = "npix")]
  Npix(Npix),
  #[clap(name = "nside")]
  Nside(Nside),
  #[clap(name = "nring")]
  Nring(Nring),
  #[clap(name = "nest2ring")]
  Nest2Ring(Nest2Ring),
  #[clap(name = "ring2nest")]
  Ring2Nest(Ring2Nest),
  #[clap(name = "ang2pix")]
  Ang2Pix(Ang2Pix),
  #[clap(name = "pix2ang")]
  Pix2Ang(Pix2Ang),
  #[clap(name = "vec2pix")]
  Vec2Pix(Vec2Pix),
  #[clap(name = "pix2vec")]
  Pix2Vec(Pix2Vec),
  Disc(Disc),
  #[clap(name = "sht-check")]
  ShtCheck(ShtCheck),
}

impl Args {
  fn exec(self) -> Result<(), Box<dyn Error>> {
    match self {
      Self::Npix(e) => e.exec(),
      Self::Nside(e) => e.exec(),
      Self::Nring(e) => e.exec(),
      Self::Nest2Ring(e) => e.exec(),
      Self::Ring2Nest(e) => e.exec(),
      Self::Ang2Pix(e) => e.exec(),
      Self::Pix2Ang(e) => e.exec(),
      Self::Vec2Pix(e) => e.exec(),
      Self::Pix2Vec(e) => e.exec(),
      Self::Disc(e) => e.exec(),
      Self::ShtCheck(e) => e.exec(),
    }
  }
}

fn main() -> Result<(), Box<dyn Error>> {
  env_logger::init();
  let args = Args::parse();
  args.exec()
}
