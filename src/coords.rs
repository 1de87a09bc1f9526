//! Frame-tagged sky coordinates and their conversion to the Galactic frame.
//!
//! The Galactic frame is fixed (IAU 1958 definition, refined by Hipparcos),
//! so every conversion here is a constant rotation with no epoch dependence.

use std::str::FromStr;

use crate::constants::{ICRS_TO_GALACTIC, OBLIQUITY_J2000};
use crate::error::{DustError, DustResult};

/// Celestial reference frames accepted on input.
///
/// FK5 (J2000) is treated as coincident with ICRS; the frame bias is below
/// 25 mas, three orders of magnitude under the extinction map resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Icrs,
    Fk5,
    Ecliptic,
    Galactic,
}

impl FromStr for Frame {
    type Err = DustError;

    fn from_str(name: &str) -> DustResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "icrs" | "equatorial" => Ok(Self::Icrs),
            "fk5" | "fk5j2000" => Ok(Self::Fk5),
            "ecliptic" | "geocentricmeanecliptic" => Ok(Self::Ecliptic),
            "galactic" => Ok(Self::Galactic),
            _ => Err(DustError::unsupported_frame(name)),
        }
    }
}

/// A single sky position tagged with its reference frame.
///
/// Longitude and latitude are stored in degrees. Construction validates
/// latitude against [-90°, 90°]; longitude wraps freely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyCoord {
    frame: Frame,
    lon_deg: f64,
    lat_deg: f64,
}

impl SkyCoord {
    pub fn new(frame: Frame, lon_deg: f64, lat_deg: f64) -> DustResult<Self> {
        if !(-90.0..=90.0).contains(&lat_deg) {
            return Err(DustError::invalid_coordinate(format!(
                "latitude {} out of range [-90, 90]",
                lat_deg
            )));
        }
        if !lon_deg.is_finite() || !lat_deg.is_finite() {
            return Err(DustError::invalid_coordinate(
                "non-finite coordinate component",
            ));
        }
        Ok(Self {
            frame,
            lon_deg,
            lat_deg,
        })
    }

    pub fn icrs(ra_deg: f64, dec_deg: f64) -> DustResult<Self> {
        Self::new(Frame::Icrs, ra_deg, dec_deg)
    }

    pub fn galactic(l_deg: f64, b_deg: f64) -> DustResult<Self> {
        Self::new(Frame::Galactic, l_deg, b_deg)
    }

    pub fn ecliptic(lambda_deg: f64, beta_deg: f64) -> DustResult<Self> {
        Self::new(Frame::Ecliptic, lambda_deg, beta_deg)
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn lon(&self) -> f64 {
        self.lon_deg
    }

    pub fn lat(&self) -> f64 {
        self.lat_deg
    }

    /// Converts this position to Galactic longitude/latitude.
    pub fn to_galactic(&self) -> GalacticCoord {
        match self.frame {
            Frame::Galactic => GalacticCoord::new(self.lon_deg, self.lat_deg),
            Frame::Icrs | Frame::Fk5 => {
                let (l, b) = rotate_to_galactic(unit_vector(self.lon_deg, self.lat_deg));
                GalacticCoord::new(l, b)
            }
            Frame::Ecliptic => {
                let ecl = unit_vector(self.lon_deg, self.lat_deg);
                let (sin_eps, cos_eps) = libm::sincos(OBLIQUITY_J2000);
                let equ = [
                    ecl[0],
                    ecl[1] * cos_eps - ecl[2] * sin_eps,
                    ecl[1] * sin_eps + ecl[2] * cos_eps,
                ];
                let (l, b) = rotate_to_galactic(equ);
                GalacticCoord::new(l, b)
            }
        }
    }
}

/// Galactic longitude/latitude in degrees, longitude wrapped to (-180°, 180°].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalacticCoord {
    l_deg: f64,
    b_deg: f64,
}

impl GalacticCoord {
    pub fn new(l_deg: f64, b_deg: f64) -> Self {
        Self {
            l_deg: wrap_longitude(l_deg),
            b_deg,
        }
    }

    pub fn l(&self) -> f64 {
        self.l_deg
    }

    pub fn b(&self) -> f64 {
        self.b_deg
    }
}

/// Wraps a longitude in degrees to the range (-180°, 180°].
pub fn wrap_longitude(lon_deg: f64) -> f64 {
    let mut lon = lon_deg % 360.0;
    if lon <= -180.0 {
        lon += 360.0;
    } else if lon > 180.0 {
        lon -= 360.0;
    }
    lon
}

fn unit_vector(lon_deg: f64, lat_deg: f64) -> [f64; 3] {
    let (sin_lat, cos_lat) = libm::sincos(lat_deg.to_radians());
    let (sin_lon, cos_lon) = libm::sincos(lon_deg.to_radians());
    [cos_lat * cos_lon, cos_lat * sin_lon, sin_lat]
}

fn rotate_to_galactic(equ: [f64; 3]) -> (f64, f64) {
    let m = &ICRS_TO_GALACTIC;
    let gal = [
        m[0][0] * equ[0] + m[0][1] * equ[1] + m[0][2] * equ[2],
        m[1][0] * equ[0] + m[1][1] * equ[1] + m[1][2] * equ[2],
        m[2][0] * equ[0] + m[2][1] * equ[1] + m[2][2] * equ[2],
    ];

    let d2 = gal[0] * gal[0] + gal[1] * gal[1];
    let l = if d2 != 0.0 {
        libm::atan2(gal[1], gal[0])
    } else {
        0.0
    };
    let b = if d2 != 0.0 || gal[2] != 0.0 {
        libm::atan2(gal[2], libm::sqrt(d2))
    } else {
        0.0
    };

    (l.to_degrees(), b.to_degrees())
}
