//! Spherical stage of the WCS chain: the rotation between native and
//! celestial coordinates, and the zenithal projections the SFD maps use.
//!
//! All angles here are radians except where a name says otherwise; plane
//! coordinates are degrees per the FITS convention.

use crate::constants::{DEG_TO_RAD, HALF_PI, RAD_TO_DEG};
use crate::error::{DustError, DustResult};

/// Projections recognized in an extinction map header. The production SFD
/// rasters are Lambert zenithal equal-area (ZEA); TAN covers cutout testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Zea,
    Tan,
}

impl Projection {
    pub fn from_code(code: &str) -> DustResult<Self> {
        match code {
            "ZEA" => Ok(Self::Zea),
            "TAN" => Ok(Self::Tan),
            other => Err(DustError::unsupported_projection(other)),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Zea => "ZEA",
            Self::Tan => "TAN",
        }
    }

    /// Native latitude of the reference point; 90° for every zenithal
    /// projection.
    pub fn native_reference_lat_deg(&self) -> f64 {
        90.0
    }

    /// Native (phi, theta) to plane (x, y) degrees.
    pub fn project(&self, phi: f64, theta: f64) -> DustResult<(f64, f64)> {
        match self {
            Self::Zea => {
                let r = libm::sqrt(2.0 * (1.0 - theta.sin()));
                Ok(radial_to_plane(r, phi))
            }
            Self::Tan => {
                if theta == HALF_PI {
                    return Ok((0.0, 0.0));
                }
                if theta <= 0.0 {
                    return Err(DustError::out_of_bounds(
                        "TAN projection undefined at theta <= 0",
                    ));
                }
                let (sin_t, cos_t) = theta.sin_cos();
                Ok(radial_to_plane(cos_t / sin_t, phi))
            }
        }
    }

    /// Plane (x, y) degrees back to native (phi, theta).
    pub fn deproject(&self, x_deg: f64, y_deg: f64) -> DustResult<(f64, f64)> {
        let x = x_deg * DEG_TO_RAD;
        let y = y_deg * DEG_TO_RAD;
        let r = libm::sqrt(x * x + y * y);
        if r == 0.0 {
            return Ok((0.0, HALF_PI));
        }
        let phi = libm::atan2(x, -y);

        let theta = match self {
            Self::Zea => {
                let rho = r / 2.0;
                if rho > 1.0 {
                    return Err(DustError::out_of_bounds(
                        "point outside ZEA projection boundary",
                    ));
                }
                HALF_PI - 2.0 * rho.asin()
            }
            Self::Tan => libm::atan2(1.0, r),
        };
        Ok((phi, theta))
    }
}

fn radial_to_plane(r: f64, phi: f64) -> (f64, f64) {
    let (sin_p, cos_p) = phi.sin_cos();
    (r * sin_p * RAD_TO_DEG, -r * cos_p * RAD_TO_DEG)
}

/// Rotation between native projection coordinates and celestial coordinates,
/// fixed by CRVAL and the (defaulted) LONPOLE/LATPOLE keywords.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalRotation {
    alpha_p: f64,
    delta_p: f64,
    phi_p: f64,
    sin_delta_p: f64,
    cos_delta_p: f64,
}

impl SphericalRotation {
    pub fn from_crval(
        alpha_0_deg: f64,
        delta_0_deg: f64,
        theta_0_deg: f64,
        lonpole_deg: Option<f64>,
        latpole_deg: Option<f64>,
    ) -> DustResult<Self> {
        // WCS Paper II default: LONPOLE is 0 when the reference latitude is
        // at or above the native reference, 180 otherwise.
        let phi_p_deg = lonpole_deg.unwrap_or(if delta_0_deg >= theta_0_deg {
            0.0
        } else {
            180.0
        });

        let delta_0 = delta_0_deg * DEG_TO_RAD;
        let theta_0 = theta_0_deg * DEG_TO_RAD;
        let phi_p = phi_p_deg * DEG_TO_RAD;
        let latpole = latpole_deg.map(|d| d * DEG_TO_RAD).unwrap_or(HALF_PI);

        let (sin_delta_0, cos_delta_0) = delta_0.sin_cos();
        let (sin_theta_0, cos_theta_0) = theta_0.sin_cos();
        let (sin_phi_p, cos_phi_p) = phi_p.sin_cos();

        let delta_p = compute_delta_p(
            sin_delta_0,
            sin_theta_0,
            cos_theta_0,
            sin_phi_p,
            cos_phi_p,
            latpole,
        )?;

        // With CRVAL at a celestial pole every longitude passes through it;
        // the generic arg() picks up round-off there, so pin alpha_p to CRVAL1.
        let alpha_p = if (delta_0_deg.abs() - 90.0).abs() < 1e-12 {
            alpha_0_deg * DEG_TO_RAD
        } else {
            let x = -cos_theta_0 * sin_phi_p;
            let y = sin_theta_0 * cos_delta_0 - cos_theta_0 * sin_delta_0 * cos_phi_p;
            alpha_0_deg * DEG_TO_RAD + libm::atan2(x, y)
        };

        let (sin_delta_p, cos_delta_p) = delta_p.sin_cos();
        Ok(Self {
            alpha_p,
            delta_p,
            phi_p,
            sin_delta_p,
            cos_delta_p,
        })
    }

    /// Celestial (lon, lat) radians to native (phi, theta) radians.
    pub fn celestial_to_native(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (sin_lat, cos_lat) = lat.sin_cos();
        let d_lon = lon - self.alpha_p;
        let (sin_d, cos_d) = d_lon.sin_cos();

        let sin_theta = sin_lat * self.sin_delta_p + cos_lat * self.cos_delta_p * cos_d;
        let theta = asin_safe(sin_theta);

        let x = -cos_lat * sin_d;
        let y = sin_lat * self.cos_delta_p - cos_lat * self.sin_delta_p * cos_d;
        let phi = self.phi_p + libm::atan2(x, y);

        (phi, theta)
    }

    /// Native (phi, theta) radians to celestial (lon, lat) radians.
    pub fn native_to_celestial(&self, phi: f64, theta: f64) -> (f64, f64) {
        let (sin_theta, cos_theta) = theta.sin_cos();
        let d_phi = phi - self.phi_p;
        let (sin_d, cos_d) = d_phi.sin_cos();

        let sin_lat = sin_theta * self.sin_delta_p + cos_theta * self.cos_delta_p * cos_d;
        let lat = asin_safe(sin_lat);

        let x = -cos_theta * sin_d;
        let y = sin_theta * self.cos_delta_p - cos_theta * self.sin_delta_p * cos_d;
        let lon = self.alpha_p + libm::atan2(x, y);

        (lon, lat)
    }

    #[inline]
    pub fn pole_lat_deg(&self) -> f64 {
        self.delta_p * RAD_TO_DEG
    }
}

#[inline]
fn asin_safe(v: f64) -> f64 {
    v.clamp(-1.0, 1.0).asin()
}

fn compute_delta_p(
    sin_delta_0: f64,
    sin_theta_0: f64,
    cos_theta_0: f64,
    sin_phi_p: f64,
    cos_phi_p: f64,
    latpole: f64,
) -> DustResult<f64> {
    let cs = cos_theta_0 * sin_phi_p;
    let denom_sq = 1.0 - cs * cs;

    if denom_sq.abs() < 1e-15 {
        if sin_delta_0.abs() < 1e-15 {
            return Ok(latpole);
        }
        return Err(DustError::invalid_parameter(
            "no solution for the native pole latitude (degenerate CRVAL/LONPOLE)",
        ));
    }

    let arg = sin_delta_0 / denom_sq.sqrt();
    if arg.abs() > 1.0 + 1e-15 {
        return Err(DustError::invalid_parameter(
            "no solution for the native pole latitude (acos argument out of range)",
        ));
    }

    let acos_term = arg.clamp(-1.0, 1.0).acos();
    let base = libm::atan2(sin_theta_0, cos_theta_0 * cos_phi_p);
    let candidates = [base + acos_term, base - acos_term];

    const BOUNDARY_TOL: f64 = 1e-14;
    let mut best: Option<f64> = None;
    for &c in &candidates {
        if !(-HALF_PI - BOUNDARY_TOL..=HALF_PI + BOUNDARY_TOL).contains(&c) {
            continue;
        }
        let c = c.clamp(-HALF_PI, HALF_PI);
        best = match best {
            Some(prev) if (prev - latpole).abs() <= (c - latpole).abs() => Some(prev),
            _ => Some(c),
        };
    }

    best.ok_or_else(|| {
        DustError::invalid_parameter("no native pole latitude solution in [-90, 90]")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_codes() {
        assert_eq!(Projection::from_code("ZEA").unwrap(), Projection::Zea);
        assert!(matches!(
            Projection::from_code("AIT"),
            Err(DustError::UnsupportedProjection { .. })
        ));
    }

    #[test]
    fn test_zea_pole_maps_to_origin() {
        let (x, y) = Projection::Zea.project(0.3, HALF_PI).unwrap();
        assert_eq!((x, y), (0.0, 0.0));
    }

    #[test]
    fn test_zea_roundtrip() {
        let phi = 0.7;
        let theta = 0.4;
        let (x, y) = Projection::Zea.project(phi, theta).unwrap();
        let (phi2, theta2) = Projection::Zea.deproject(x, y).unwrap();
        assert!((phi - phi2).abs() < 1e-12);
        assert!((theta - theta2).abs() < 1e-12);
    }

    #[test]
    fn test_zea_equator_radius() {
        // theta = 0 lands at radius sqrt(2) radians from the pole.
        let (x, y) = Projection::Zea.project(0.0, 0.0).unwrap();
        let r = libm::sqrt(x * x + y * y);
        assert!((r - libm::sqrt(2.0) * RAD_TO_DEG).abs() < 1e-9);
    }

    #[test]
    fn test_zea_deproject_outside_boundary() {
        // radius > 2 radians is outside the full-sphere ZEA disc
        let result = Projection::Zea.deproject(0.0, 2.5 * RAD_TO_DEG);
        assert!(matches!(result, Err(DustError::OutOfBounds { .. })));
    }

    #[test]
    fn test_tan_rejects_far_hemisphere() {
        assert!(Projection::Tan.project(0.0, -0.1).is_err());
    }

    #[test]
    fn test_north_polar_rotation_is_identity_like() {
        // CRVAL = (0, 90) with the zenithal default LONPOLE = 0
        let rot = SphericalRotation::from_crval(0.0, 90.0, 90.0, None, None).unwrap();
        assert!((rot.pole_lat_deg() - 90.0).abs() < 1e-9);

        let (_, theta) = rot.celestial_to_native(0.0, 0.2);
        assert!((theta - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_south_polar_rotation() {
        // CRVAL = (0, -90): default LONPOLE flips to 180 and theta = -lat
        let rot = SphericalRotation::from_crval(0.0, -90.0, 90.0, None, None).unwrap();
        assert!((rot.pole_lat_deg() + 90.0).abs() < 1e-9);

        let (_, theta) = rot.celestial_to_native(0.5, -0.3);
        assert!((theta - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_roundtrip() {
        let rot = SphericalRotation::from_crval(120.0, 35.0, 90.0, Some(180.0), None).unwrap();
        let lon = 2.1;
        let lat = 0.6;
        let (phi, theta) = rot.celestial_to_native(lon, lat);
        let (lon2, lat2) = rot.native_to_celestial(phi, theta);
        let d_lon = (lon - lon2).rem_euclid(std::f64::consts::TAU);
        assert!(d_lon < 1e-9 || (std::f64::consts::TAU - d_lon) < 1e-9);
        assert!((lat - lat2).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_lonpole_changes_result() {
        let a = SphericalRotation::from_crval(10.0, 45.0, 90.0, Some(180.0), None).unwrap();
        let b = SphericalRotation::from_crval(10.0, 45.0, 90.0, Some(90.0), None).unwrap();
        let pa = a.celestial_to_native(0.5, 0.5);
        let pb = b.celestial_to_native(0.5, 0.5);
        assert!((pa.0 - pb.0).abs() > 1e-6);
    }
}
