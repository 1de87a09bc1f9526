use crate::error::{DustError, DustResult};

const DETERMINANT_THRESHOLD: f64 = 1e-15;

/// Linear stage of the WCS chain: CRPIX offset plus CD matrix, with the
/// inverse precomputed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTransform {
    crpix: [f64; 2],
    cd: [[f64; 2]; 2],
    inverse: [[f64; 2]; 2],
}

impl LinearTransform {
    pub fn from_cd(crpix: [f64; 2], cd: [[f64; 2]; 2]) -> DustResult<Self> {
        let det = cd[0][0] * cd[1][1] - cd[0][1] * cd[1][0];
        if det.abs() < DETERMINANT_THRESHOLD {
            return Err(DustError::non_invertible_matrix(det));
        }
        let inverse = [
            [cd[1][1] / det, -cd[0][1] / det],
            [-cd[1][0] / det, cd[0][0] / det],
        ];
        Ok(Self { crpix, cd, inverse })
    }

    pub fn from_cdelt(crpix: [f64; 2], cdelt: [f64; 2]) -> DustResult<Self> {
        Self::from_cd(crpix, [[cdelt[0], 0.0], [0.0, cdelt[1]]])
    }

    /// FITS pixel coordinates (1-based) to intermediate world coordinates
    /// in degrees.
    pub fn pixel_to_plane(&self, px: f64, py: f64) -> (f64, f64) {
        let d0 = px - self.crpix[0];
        let d1 = py - self.crpix[1];
        (
            self.cd[0][0] * d0 + self.cd[0][1] * d1,
            self.cd[1][0] * d0 + self.cd[1][1] * d1,
        )
    }

    /// Intermediate world coordinates in degrees back to 1-based pixels.
    pub fn plane_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.inverse[0][0] * x + self.inverse[0][1] * y + self.crpix[0],
            self.inverse[1][0] * x + self.inverse[1][1] * y + self.crpix[1],
        )
    }

    #[inline]
    pub fn crpix(&self) -> [f64; 2] {
        self.crpix
    }

    #[inline]
    pub fn pixel_scale(&self) -> f64 {
        let det = self.cd[0][0] * self.cd[1][1] - self.cd[0][1] * self.cd[1][0];
        libm::sqrt(det.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let t = LinearTransform::from_cd([2048.5, 2048.5], [[-0.04, 0.0], [0.0, 0.04]]).unwrap();
        let (x, y) = t.pixel_to_plane(1000.25, 3000.75);
        let (px, py) = t.plane_to_pixel(x, y);
        assert!((px - 1000.25).abs() < 1e-9);
        assert!((py - 3000.75).abs() < 1e-9);
    }

    #[test]
    fn test_reference_pixel_maps_to_origin() {
        let t = LinearTransform::from_cd([32.5, 32.5], [[-2.5, 0.0], [0.0, 2.5]]).unwrap();
        let (x, y) = t.pixel_to_plane(32.5, 32.5);
        assert_eq!((x, y), (0.0, 0.0));
    }

    #[test]
    fn test_known_offsets() {
        let t = LinearTransform::from_cdelt([10.0, 10.0], [0.5, 0.5]).unwrap();
        let (x, y) = t.pixel_to_plane(12.0, 8.0);
        assert_eq!(x, 1.0);
        assert_eq!(y, -1.0);
    }

    #[test]
    fn test_singular_matrix_rejected() {
        let result = LinearTransform::from_cd([0.0, 0.0], [[1.0, 2.0], [2.0, 4.0]]);
        assert!(matches!(
            result,
            Err(DustError::NonInvertibleMatrix { determinant }) if determinant == 0.0
        ));
    }

    #[test]
    fn test_pixel_scale() {
        let t = LinearTransform::from_cd([0.0, 0.0], [[-0.04, 0.0], [0.0, 0.04]]).unwrap();
        assert!((t.pixel_scale() - 0.04).abs() < 1e-15);
    }
}
