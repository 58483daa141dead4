//! Angle utilities shared by the transform, aggregation and overlay stages.
//!
//! The accelerator reports line orientation as integer degrees of the line
//! normal in `[0, 180)`. Everything downstream works from the unit normal
//! `(cos θ, sin θ)` of the normal form `x·cosθ + y·sinθ = rho`.

/// Magnitude below which a trigonometric component is treated as zero.
pub const NEGLIGIBLE_COMPONENT: f32 = 0.01;

/// Converts integer degrees to radians.
#[inline]
pub fn deg_to_rad(theta_deg: u8) -> f32 {
    (theta_deg as f32).to_radians()
}

/// Unit normal `(cos θ, sin θ)` for an orientation given in degrees.
#[inline]
pub fn unit_normal(theta_deg: u8) -> [f32; 2] {
    let (sin, cos) = deg_to_rad(theta_deg).sin_cos();
    [cos, sin]
}

/// True if `component` is too small to divide by.
#[inline]
pub fn is_negligible(component: f32) -> bool {
    component.abs() < NEGLIGIBLE_COMPONENT
}

/// Plain absolute difference between two integer orientations.
///
/// No wrap-around is applied: 2° and 178° are 176° apart.
#[inline]
pub fn theta_difference_deg(a: u8, b: u8) -> u8 {
    a.abs_diff(b)
}

/// Quantized orientation reported for Hough bin `index` out of `bins`
/// across `[0, 180)`. Matches the accelerator's truncating quantization
/// (16 bins → 0, 11, 22, 33, 45, ...).
#[inline]
pub fn bin_theta_deg(index: usize, bins: usize) -> u8 {
    debug_assert!(bins > 0 && index < bins);
    ((index * 180) / bins) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn unit_normal_axes() {
        let n0 = unit_normal(0);
        assert!(approx_eq(n0[0], 1.0) && approx_eq(n0[1], 0.0));
        let n90 = unit_normal(90);
        assert!(approx_eq(n90[1], 1.0));
        assert!(is_negligible(n90[0]));
    }

    #[test]
    fn theta_difference_is_symmetric_and_unwrapped() {
        assert_eq!(theta_difference_deg(10, 18), 8);
        assert_eq!(theta_difference_deg(18, 10), 8);
        assert_eq!(theta_difference_deg(2, 178), 176);
    }

    #[test]
    fn bin_theta_matches_sixteen_bin_core() {
        let thetas: Vec<u8> = (0..16).map(|i| bin_theta_deg(i, 16)).collect();
        assert_eq!(
            thetas,
            vec![0, 11, 22, 33, 45, 56, 67, 78, 90, 101, 112, 123, 135, 146, 157, 168]
        );
    }
}
