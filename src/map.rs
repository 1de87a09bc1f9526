//! The two hemisphere rasters and their on-disk layout.

use std::path::Path;

use crate::coords::GalacticCoord;
use crate::error::DustResult;
use crate::fits;
use crate::interp::Grid;
use crate::wcs::Wcs;

/// The all-sky coverage splits at the Galactic equator, with the equator
/// itself belonging to the northern cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    #[inline]
    pub fn of_latitude(b_deg: f64) -> Self {
        if b_deg >= 0.0 {
            Self::North
        } else {
            Self::South
        }
    }

    /// Standard file name of the raster covering this hemisphere.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::North => "SFD_dust_4096_ngp.fits",
            Self::South => "SFD_dust_4096_sgp.fits",
        }
    }
}

/// One hemisphere raster together with its astrometric calibration.
#[derive(Debug)]
pub struct DustMap {
    values: Vec<f32>,
    width: usize,
    height: usize,
    wcs: Wcs,
}

impl DustMap {
    /// Loads a raster from a FITS file.
    pub fn open(path: &Path) -> DustResult<Self> {
        let (header, values, width, height) = fits::open_image(path)?;
        let wcs = Wcs::from_header(&header)?;
        Ok(Self {
            values,
            width,
            height,
            wcs,
        })
    }

    /// Projects a Galactic coordinate to zero-based pixel position on this
    /// raster.
    pub fn project(&self, coord: &GalacticCoord) -> DustResult<(f64, f64)> {
        let (px, py) = self.wcs.world_to_pixel(coord.l(), coord.b())?;
        Ok((px - 1.0, py - 1.0))
    }

    pub fn grid(&self) -> DustResult<Grid<'_>> {
        Grid::new(&self.values, self.width, self.height)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn wcs(&self) -> &Wcs {
        &self.wcs
    }
}
