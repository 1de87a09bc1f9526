//! High-level extinction queries over the packaged hemisphere rasters.
//!
//! A [`DustData`] instance resolves the map directory once and loads each
//! hemisphere lazily on first use; a batch that stays in one hemisphere
//! never touches the other file.

use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

use crate::coords::SkyCoord;
use crate::error::{DustError, DustResult};
use crate::interp::{self, Interpolation};
use crate::map::{DustMap, Hemisphere};
use crate::reddening::{ConversionTable, FilterArg, ReddeningMatrix};

/// Environment variable naming the directory holding the two map files.
pub const DATA_DIR_ENV: &str = "SFD_DATA_DIR";

#[derive(Debug)]
pub struct DustData {
    data_dir: PathBuf,
    north: OnceCell<DustMap>,
    south: OnceCell<DustMap>,
    table: OnceCell<ConversionTable>,
}

impl DustData {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            north: OnceCell::new(),
            south: OnceCell::new(),
            table: OnceCell::new(),
        }
    }

    /// Resolves the map directory from [`DATA_DIR_ENV`].
    pub fn from_env() -> DustResult<Self> {
        match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) => Ok(Self::new(PathBuf::from(dir))),
            None => Err(DustError::data_unavailable(format!(
                "{} is not set; point it at the directory holding the dust maps",
                DATA_DIR_ENV
            ))),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn hemisphere_map(&self, hemisphere: Hemisphere) -> DustResult<&DustMap> {
        let cell = match hemisphere {
            Hemisphere::North => &self.north,
            Hemisphere::South => &self.south,
        };
        cell.get_or_try_init(|| {
            let path = self.data_dir.join(hemisphere.file_name());
            DustMap::open(&path).map_err(|err| match err {
                DustError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                    DustError::data_unavailable(format!(
                        "missing map file {}",
                        path.display()
                    ))
                }
                other => other,
            })
        })
    }

    fn conversion_table(&self) -> DustResult<&ConversionTable> {
        self.table.get_or_try_init(ConversionTable::packaged)
    }

    /// E(B-V) at each coordinate, bilinear interpolation.
    pub fn ebv(&self, coords: &[SkyCoord]) -> DustResult<Vec<f64>> {
        self.ebv_with_interpolation(coords, Interpolation::default())
    }

    /// E(B-V) at a single coordinate.
    pub fn ebv_at(&self, coord: SkyCoord) -> DustResult<f64> {
        let values = self.ebv(std::slice::from_ref(&coord))?;
        Ok(values[0])
    }

    /// E(B-V) with an explicit resampling order (0 to 3).
    pub fn ebv_with_order(&self, coords: &[SkyCoord], order: u8) -> DustResult<Vec<f64>> {
        self.ebv_with_interpolation(coords, Interpolation::from_order(order)?)
    }

    pub fn ebv_with_interpolation(
        &self,
        coords: &[SkyCoord],
        interp: Interpolation,
    ) -> DustResult<Vec<f64>> {
        let galactic: Vec<_> = coords.iter().map(SkyCoord::to_galactic).collect();

        // Split the batch by hemisphere, keeping the original index of
        // each coordinate so results come back in input order.
        let mut north_idx = Vec::new();
        let mut south_idx = Vec::new();
        for (i, g) in galactic.iter().enumerate() {
            match Hemisphere::of_latitude(g.b()) {
                Hemisphere::North => north_idx.push(i),
                Hemisphere::South => south_idx.push(i),
            }
        }

        let mut out = vec![0.0; coords.len()];
        for (hemisphere, indices) in [
            (Hemisphere::North, north_idx),
            (Hemisphere::South, south_idx),
        ] {
            if indices.is_empty() {
                continue;
            }
            let map = self.hemisphere_map(hemisphere)?;
            let mut positions = Vec::with_capacity(indices.len());
            for &i in &indices {
                positions.push(map.project(&galactic[i])?);
            }
            let sampled = interp::sample(&map.grid()?, &positions, interp);
            for (&i, value) in indices.iter().zip(sampled) {
                out[i] = value;
            }
        }
        Ok(out)
    }

    /// Per-filter reddening for each coordinate, bilinear interpolation.
    pub fn reddening(
        &self,
        coords: &[SkyCoord],
        survey: &str,
        filters: impl FilterArg,
    ) -> DustResult<ReddeningMatrix> {
        self.reddening_with_interpolation(coords, survey, filters, Interpolation::default())
    }

    pub fn reddening_with_order(
        &self,
        coords: &[SkyCoord],
        survey: &str,
        filters: impl FilterArg,
        order: u8,
    ) -> DustResult<ReddeningMatrix> {
        self.reddening_with_interpolation(coords, survey, filters, Interpolation::from_order(order)?)
    }

    pub fn reddening_with_interpolation(
        &self,
        coords: &[SkyCoord],
        survey: &str,
        filters: impl FilterArg,
        interp: Interpolation,
    ) -> DustResult<ReddeningMatrix> {
        let names = filters.filter_names();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        // Resolve the coefficients before touching the maps so an unknown
        // filter fails without any file I/O.
        let coefficients = self.conversion_table()?.coefficients(survey, &refs)?;
        let ebv = self.ebv_with_interpolation(coords, interp)?;
        Ok(ReddeningMatrix::from_ebv(&ebv, names, &coefficients))
    }
}
