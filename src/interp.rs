//! Raster resampling at fractional pixel positions.
//!
//! Orders 0 and 1 read the grid directly. Orders 2 and 3 are B-spline
//! interpolants and require a recursive prefilter pass over the whole
//! raster so that the spline reproduces the original samples at the
//! nodes (Unser, Aldroubi & Eden 1993). Positions outside the raster
//! are clamped to the nearest edge pixel.

use crate::error::{DustError, DustResult};

/// Borrowed view of a row-major raster.
#[derive(Debug, Clone, Copy)]
pub struct Grid<'a> {
    data: &'a [f32],
    width: usize,
    height: usize,
}

impl<'a> Grid<'a> {
    pub fn new(data: &'a [f32], width: usize, height: usize) -> DustResult<Self> {
        if data.len() != width * height {
            return Err(DustError::invalid_format(format!(
                "raster length {} does not match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample at integer indices, clamping out-of-range indices to the
    /// nearest edge pixel.
    #[inline]
    fn get_clamped(&self, ix: i64, iy: i64) -> f64 {
        let x = ix.clamp(0, self.width as i64 - 1) as usize;
        let y = iy.clamp(0, self.height as i64 - 1) as usize;
        self.data[y * self.width + x] as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
    Quadratic,
    Cubic,
}

impl Interpolation {
    pub fn from_order(order: u8) -> DustResult<Self> {
        match order {
            0 => Ok(Self::Nearest),
            1 => Ok(Self::Bilinear),
            2 => Ok(Self::Quadratic),
            3 => Ok(Self::Cubic),
            other => Err(DustError::invalid_parameter(format!(
                "interpolation order {} not supported (expected 0..=3)",
                other
            ))),
        }
    }

    pub fn order(&self) -> u8 {
        match self {
            Self::Nearest => 0,
            Self::Bilinear => 1,
            Self::Quadratic => 2,
            Self::Cubic => 3,
        }
    }
}

/// Samples the grid at each zero-based (x, y) position.
pub fn sample(grid: &Grid<'_>, positions: &[(f64, f64)], interp: Interpolation) -> Vec<f64> {
    match interp {
        Interpolation::Nearest => positions
            .iter()
            .map(|&(x, y)| {
                grid.get_clamped(libm::floor(x + 0.5) as i64, libm::floor(y + 0.5) as i64)
            })
            .collect(),
        Interpolation::Bilinear => positions
            .iter()
            .map(|&(x, y)| bilinear(grid, x, y))
            .collect(),
        Interpolation::Quadratic | Interpolation::Cubic => {
            let coeffs = spline_coefficients(grid, interp);
            positions
                .iter()
                .map(|&(x, y)| spline_sample(&coeffs, grid.width, grid.height, x, y, interp))
                .collect()
        }
    }
}

fn bilinear(grid: &Grid<'_>, x: f64, y: f64) -> f64 {
    let x0 = libm::floor(x) as i64;
    let y0 = libm::floor(y) as i64;
    let tx = x - x0 as f64;
    let ty = y - y0 as f64;

    let v00 = grid.get_clamped(x0, y0);
    let v10 = grid.get_clamped(x0 + 1, y0);
    let v01 = grid.get_clamped(x0, y0 + 1);
    let v11 = grid.get_clamped(x0 + 1, y0 + 1);

    let top = v00 * (1.0 - tx) + v10 * tx;
    let bottom = v01 * (1.0 - tx) + v11 * tx;
    top * (1.0 - ty) + bottom * ty
}

fn spline_pole(interp: Interpolation) -> f64 {
    match interp {
        // Roots of the quadratic / cubic B-spline z-transforms.
        Interpolation::Quadratic => 2.0 * std::f64::consts::SQRT_2 - 3.0,
        Interpolation::Cubic => libm::sqrt(3.0) - 2.0,
        _ => 0.0,
    }
}

/// Converts raster samples to B-spline coefficients, filtering rows then
/// columns with the causal/anticausal recursion and mirror boundaries.
fn spline_coefficients(grid: &Grid<'_>, interp: Interpolation) -> Vec<f64> {
    let pole = spline_pole(interp);
    let mut coeffs: Vec<f64> = grid.data.iter().map(|&v| v as f64).collect();
    let (w, h) = (grid.width, grid.height);

    let mut line = vec![0.0; w.max(h)];
    for row in 0..h {
        line[..w].copy_from_slice(&coeffs[row * w..(row + 1) * w]);
        filter_line(&mut line[..w], pole);
        coeffs[row * w..(row + 1) * w].copy_from_slice(&line[..w]);
    }
    for col in 0..w {
        for (i, value) in line[..h].iter_mut().enumerate() {
            *value = coeffs[i * w + col];
        }
        filter_line(&mut line[..h], pole);
        for (i, &value) in line[..h].iter().enumerate() {
            coeffs[i * w + col] = value;
        }
    }
    coeffs
}

fn filter_line(c: &mut [f64], pole: f64) {
    let n = c.len();
    if n < 2 {
        return;
    }
    let gain = (1.0 - pole) * (1.0 - 1.0 / pole);
    for value in c.iter_mut() {
        *value *= gain;
    }

    // Causal initialization from the mirrored extension, truncated at the
    // precision horizon.
    let horizon = (libm::log(1e-15) / libm::log(pole.abs())).ceil() as usize;
    let mut sum = c[0];
    if horizon < n {
        let mut zn = pole;
        for &value in c.iter().take(horizon).skip(1) {
            sum += zn * value;
            zn *= pole;
        }
    } else {
        // Short lines: exact sum over the full mirrored period.
        let mut zn = pole;
        let iz = 1.0 / pole;
        let mut z2n = libm::pow(pole, (2 * n - 3) as f64);
        sum += libm::pow(pole, (n - 1) as f64) * c[n - 1];
        for &value in c.iter().take(n - 1).skip(1) {
            sum += (zn + z2n) * value;
            zn *= pole;
            z2n *= iz;
        }
        sum /= 1.0 - zn * zn;
    }
    c[0] = sum;
    for i in 1..n {
        c[i] += pole * c[i - 1];
    }

    // Anticausal initialization and backward sweep.
    c[n - 1] = (pole / (pole * pole - 1.0)) * (pole * c[n - 2] + c[n - 1]);
    for i in (0..n - 1).rev() {
        c[i] = pole * (c[i + 1] - c[i]);
    }
}

fn spline_sample(
    coeffs: &[f64],
    width: usize,
    height: usize,
    x: f64,
    y: f64,
    interp: Interpolation,
) -> f64 {
    // Positions are clamped to the raster, so an edge overshoot lands on
    // the edge node. Coefficient lookups mirror to stay consistent with
    // the mirror boundary used by the prefilter.
    let x = x.clamp(0.0, (width - 1) as f64);
    let y = y.clamp(0.0, (height - 1) as f64);
    let at = |ix: i64, iy: i64| -> f64 {
        let cx = mirror_index(ix, width);
        let cy = mirror_index(iy, height);
        coeffs[cy * width + cx]
    };
    match interp {
        Interpolation::Quadratic => {
            let (bx, wx) = quadratic_weights(x);
            let (by, wy) = quadratic_weights(y);
            let mut acc = 0.0;
            for (j, &wyj) in wy.iter().enumerate() {
                let mut row = 0.0;
                for (i, &wxi) in wx.iter().enumerate() {
                    row += wxi * at(bx + i as i64, by + j as i64);
                }
                acc += wyj * row;
            }
            acc
        }
        Interpolation::Cubic => {
            let (bx, wx) = cubic_weights(x);
            let (by, wy) = cubic_weights(y);
            let mut acc = 0.0;
            for (j, &wyj) in wy.iter().enumerate() {
                let mut row = 0.0;
                for (i, &wxi) in wx.iter().enumerate() {
                    row += wxi * at(bx + i as i64, by + j as i64);
                }
                acc += wyj * row;
            }
            acc
        }
        _ => 0.0,
    }
}

#[inline]
fn mirror_index(i: i64, n: usize) -> usize {
    let last = n as i64 - 1;
    let mut i = i;
    if i < 0 {
        i = -i;
    }
    if i > last {
        i = 2 * last - i;
    }
    i.clamp(0, last) as usize
}

/// Quadratic B-spline support: three nodes centred on round(x).
fn quadratic_weights(x: f64) -> (i64, [f64; 3]) {
    let base = libm::floor(x + 0.5);
    let t = x - base;
    let w0 = 0.5 * (0.5 - t) * (0.5 - t);
    let w1 = 0.75 - t * t;
    let w2 = 0.5 * (0.5 + t) * (0.5 + t);
    (base as i64 - 1, [w0, w1, w2])
}

/// Cubic B-spline support: four nodes starting at floor(x) - 1.
fn cubic_weights(x: f64) -> (i64, [f64; 4]) {
    let base = libm::floor(x);
    let t = x - base;
    let t2 = t * t;
    let t3 = t2 * t;
    let w0 = (1.0 - 3.0 * t + 3.0 * t2 - t3) / 6.0;
    let w1 = (3.0 * t3 - 6.0 * t2 + 4.0) / 6.0;
    let w2 = (-3.0 * t3 + 3.0 * t2 + 3.0 * t + 1.0) / 6.0;
    let w3 = t3 / 6.0;
    (base as i64 - 1, [w0, w1, w2, w3])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_grid() -> Vec<f32> {
        // 8x8 linear ramp v = x + 10 y.
        let mut data = Vec::with_capacity(64);
        for y in 0..8 {
            for x in 0..8 {
                data.push((x as f32) + 10.0 * (y as f32));
            }
        }
        data
    }

    #[test]
    fn test_from_order() {
        assert_eq!(Interpolation::from_order(0).unwrap(), Interpolation::Nearest);
        assert_eq!(Interpolation::from_order(1).unwrap(), Interpolation::Bilinear);
        assert_eq!(Interpolation::from_order(3).unwrap(), Interpolation::Cubic);
        assert!(Interpolation::from_order(4).is_err());
        assert_eq!(Interpolation::default(), Interpolation::Bilinear);
    }

    #[test]
    fn test_grid_shape_mismatch() {
        let data = vec![0.0f32; 10];
        assert!(Grid::new(&data, 4, 4).is_err());
    }

    #[test]
    fn test_nearest_rounds_to_pixel() {
        let data = ramp_grid();
        let grid = Grid::new(&data, 8, 8).unwrap();
        let out = sample(&grid, &[(2.4, 3.4), (2.6, 3.6)], Interpolation::Nearest);
        assert_eq!(out[0], 32.0);
        assert_eq!(out[1], 43.0);
    }

    #[test]
    fn test_bilinear_exact_on_ramp() {
        let data = ramp_grid();
        let grid = Grid::new(&data, 8, 8).unwrap();
        let out = sample(
            &grid,
            &[(2.5, 3.25), (0.0, 0.0), (6.9, 1.1)],
            Interpolation::Bilinear,
        );
        assert!((out[0] - (2.5 + 32.5)).abs() < 1e-12);
        assert!((out[1] - 0.0).abs() < 1e-12);
        assert!((out[2] - (6.9 + 11.0)).abs() < 1e-10);
    }

    #[test]
    fn test_out_of_range_clamps_to_edge() {
        let data = ramp_grid();
        let grid = Grid::new(&data, 8, 8).unwrap();
        let out = sample(
            &grid,
            &[(-3.0, -3.0), (100.0, 100.0)],
            Interpolation::Bilinear,
        );
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 77.0);
    }

    #[test]
    fn test_cubic_reproduces_samples_at_nodes() {
        let mut data = vec![0.0f32; 64];
        for (i, v) in data.iter_mut().enumerate() {
            *v = libm::sinf(i as f32 * 0.37) * 5.0 + 3.0;
        }
        let grid = Grid::new(&data, 8, 8).unwrap();
        let positions: Vec<(f64, f64)> = (0..8)
            .flat_map(|y| (0..8).map(move |x| (x as f64, y as f64)))
            .collect();
        let out = sample(&grid, &positions, Interpolation::Cubic);
        for (i, &v) in out.iter().enumerate() {
            assert!(
                (v - data[i] as f64).abs() < 1e-5,
                "node {} mismatch: {} vs {}",
                i,
                v,
                data[i]
            );
        }
    }

    #[test]
    fn test_quadratic_reproduces_samples_at_nodes() {
        let mut data = vec![0.0f32; 64];
        for (i, v) in data.iter_mut().enumerate() {
            *v = ((i * 7) % 13) as f32 * 0.5;
        }
        let grid = Grid::new(&data, 8, 8).unwrap();
        let positions: Vec<(f64, f64)> = (0..8)
            .flat_map(|y| (0..8).map(move |x| (x as f64, y as f64)))
            .collect();
        let out = sample(&grid, &positions, Interpolation::Quadratic);
        for (i, &v) in out.iter().enumerate() {
            assert!(
                (v - data[i] as f64).abs() < 1e-5,
                "node {} mismatch: {} vs {}",
                i,
                v,
                data[i]
            );
        }
    }

    #[test]
    fn test_cubic_on_constant_grid_is_constant() {
        let data = vec![2.5f32; 64];
        let grid = Grid::new(&data, 8, 8).unwrap();
        let out = sample(&grid, &[(3.3, 4.7), (0.1, 0.1)], Interpolation::Cubic);
        for v in out {
            assert!((v - 2.5).abs() < 1e-9);
        }
    }
}
