//! Astrometric calibration of a hemisphere map, assembled from its FITS
//! header: linear CRPIX/CD stage, spherical rotation, and projection.

mod linear;
mod spherical;

pub use linear::LinearTransform;
pub use spherical::{Projection, SphericalRotation};

use crate::constants::{DEG_TO_RAD, RAD_TO_DEG};
use crate::coords::wrap_longitude;
use crate::error::{DustError, DustResult};
use crate::fits::Header;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wcs {
    linear: LinearTransform,
    rotation: SphericalRotation,
    projection: Projection,
    crval: (f64, f64),
}

impl Wcs {
    pub fn new(
        linear: LinearTransform,
        rotation: SphericalRotation,
        projection: Projection,
        crval: (f64, f64),
    ) -> Self {
        Self {
            linear,
            rotation,
            projection,
            crval,
        }
    }

    /// Builds the calibration from a map header. Malformed or missing
    /// keywords are fatal here, once, at load time.
    pub fn from_header(header: &Header) -> DustResult<Self> {
        let ctype1 = header.require_string("CTYPE1")?;
        let ctype2 = header.require_string("CTYPE2")?;
        let (prefix1, code1) = parse_ctype(ctype1)?;
        let (_, code2) = parse_ctype(ctype2)?;

        if code1 != code2 {
            return Err(DustError::invalid_keyword(
                "CTYPE1/CTYPE2",
                format!("mismatched projection codes '{}' vs '{}'", code1, code2),
            ));
        }
        if !is_longitude_prefix(prefix1) {
            return Err(DustError::invalid_keyword(
                "CTYPE1",
                format!("expected a longitude axis, got '{}'", ctype1),
            ));
        }
        let projection = Projection::from_code(code1)?;

        let crpix = [
            header.require_float("CRPIX1")?,
            header.require_float("CRPIX2")?,
        ];
        let crval = (
            header.require_float("CRVAL1")?,
            header.require_float("CRVAL2")?,
        );

        let linear = if header.get_float("CD1_1").is_some() {
            let cd = [
                [
                    header.get_float("CD1_1").unwrap_or(0.0),
                    header.get_float("CD1_2").unwrap_or(0.0),
                ],
                [
                    header.get_float("CD2_1").unwrap_or(0.0),
                    header.get_float("CD2_2").unwrap_or(0.0),
                ],
            ];
            LinearTransform::from_cd(crpix, cd)?
        } else if let (Some(c1), Some(c2)) =
            (header.get_float("CDELT1"), header.get_float("CDELT2"))
        {
            LinearTransform::from_cdelt(crpix, [c1, c2])?
        } else {
            return Err(DustError::missing_keyword(
                "CD1_1 or CDELT1 (no transformation matrix found)",
            ));
        };

        let rotation = SphericalRotation::from_crval(
            crval.0,
            crval.1,
            projection.native_reference_lat_deg(),
            header.get_float("LONPOLE"),
            header.get_float("LATPOLE"),
        )?;

        Ok(Self::new(linear, rotation, projection, crval))
    }

    /// World (lon, lat) in degrees to FITS pixel coordinates (1-based).
    pub fn world_to_pixel(&self, lon_deg: f64, lat_deg: f64) -> DustResult<(f64, f64)> {
        let (phi, theta) = self
            .rotation
            .celestial_to_native(lon_deg * DEG_TO_RAD, lat_deg * DEG_TO_RAD);
        let (x, y) = self.projection.project(phi, theta)?;
        Ok(self.linear.plane_to_pixel(x, y))
    }

    /// FITS pixel coordinates (1-based) to world (lon, lat) in degrees,
    /// longitude wrapped to (-180°, 180°].
    pub fn pixel_to_world(&self, px: f64, py: f64) -> DustResult<(f64, f64)> {
        let (x, y) = self.linear.pixel_to_plane(px, py);
        let (phi, theta) = self.projection.deproject(x, y)?;
        let (lon, lat) = self.rotation.native_to_celestial(phi, theta);
        Ok((wrap_longitude(lon * RAD_TO_DEG), lat * RAD_TO_DEG))
    }

    #[inline]
    pub fn projection(&self) -> Projection {
        self.projection
    }

    #[inline]
    pub fn crval(&self) -> (f64, f64) {
        self.crval
    }

    #[inline]
    pub fn crpix(&self) -> [f64; 2] {
        self.linear.crpix()
    }
}

fn parse_ctype(ctype: &str) -> DustResult<(&str, &str)> {
    let trimmed = ctype.trim();
    let dash = trimmed.rfind('-').ok_or_else(|| {
        DustError::invalid_keyword("CTYPE", format!("no projection code in '{}'", ctype))
    })?;
    if dash == 0 || dash + 1 == trimmed.len() {
        return Err(DustError::invalid_keyword(
            "CTYPE",
            format!("malformed axis type '{}'", ctype),
        ));
    }
    let prefix = trimmed[..dash].trim_end_matches('-');
    Ok((prefix, &trimmed[dash + 1..]))
}

fn is_longitude_prefix(prefix: &str) -> bool {
    prefix == "RA" || prefix.ends_with("LON")
}
