#![allow(clippy::excessive_precision)]

pub const PI: f64 = 3.141592653589793238462643;

pub const HALF_PI: f64 = 1.5707963267948966192313216;

pub const DEG_TO_RAD: f64 = 1.745329251994329576923691e-2;

pub const RAD_TO_DEG: f64 = 57.29577951308232087679815;

/// Mean obliquity of the ecliptic at J2000.0 (IAU 1980), radians.
pub const OBLIQUITY_J2000: f64 = 84381.448 * 4.848136811095359935899141e-6;

/// Fixed rotation taking ICRS cartesian coordinates to Galactic cartesian
/// coordinates (IAU 1958 definition, refined by Hipparcos). Orthonormal, so
/// the transpose is the inverse.
pub const ICRS_TO_GALACTIC: [[f64; 3]; 3] = [
    [
        -0.054875560416215368492398900454,
        -0.873437090234885048760383168409,
        -0.483835015548713226831774175116,
    ],
    [
        0.494109427875583673525222371358,
        -0.444829629960011178146614061616,
        0.746982244497218890527388004556,
    ],
    [
        -0.867666149019004701181616534570,
        -0.198076373431201528180486091412,
        0.455983776175066922272100478348,
    ],
];
