//! Galactic dust extinction from the Schlegel, Finkbeiner & Davis (1998)
//! all-sky maps.
//!
//! The sky is covered by two 4096 x 4096 Lambert equal-area rasters, one
//! per Galactic hemisphere. A query transforms the input coordinates to
//! Galactic, projects them onto the matching raster through its FITS-WCS
//! calibration, and resamples E(B-V) at the resulting pixel positions.
//! Reddening in a specific bandpass is E(B-V) scaled by the published
//! coefficient for that survey and filter.
//!
//! ```no_run
//! use sfd_dust::{DustData, SkyCoord};
//!
//! # fn main() -> sfd_dust::DustResult<()> {
//! let dust = DustData::from_env()?;
//! let coord = SkyCoord::icrs(10.68, 41.27)?;
//! let ebv = dust.ebv_at(coord)?;
//! let red = dust.reddening(&[coord], "PS1", "gri")?;
//! println!("E(B-V) = {:.4}, A_g = {:.4}", ebv, red.get(0, 0).unwrap());
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod coords;
pub mod error;
pub mod fits;
pub mod interp;
pub mod map;
pub mod query;
pub mod reddening;
pub mod wcs;

pub use coords::{Frame, GalacticCoord, SkyCoord};
pub use error::{DustError, DustResult};
pub use interp::Interpolation;
pub use map::{DustMap, Hemisphere};
pub use query::{DustData, DATA_DIR_ENV};
pub use reddening::{ConversionTable, FilterArg, ReddeningMatrix};
pub use wcs::Wcs;
