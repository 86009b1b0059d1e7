//! Scattered (x, y) -> z interpolation onto arbitrary query arrays.
//!
//! The three methods follow the classic `griddata` contract: `linear` and
//! `cubic` work inside the convex hull of the samples and return the fill
//! value outside it, `nearest` is defined everywhere.

mod cubic;
mod linear;
mod nearest;
mod triangulation;

use std::fmt;
use std::str::FromStr;
use ndarray::{Array, ArrayView, Dimension, Zip};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::GriddingError;
pub use cubic::CloughTocherInterpolator;
pub use linear::LinearInterpolator;
pub use nearest::NearestInterpolator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Linear,
    Nearest,
    Cubic,
}

impl FromStr for Method {
    type Err = GriddingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Method::Linear),
            "nearest" => Ok(Method::Nearest),
            "cubic" => Ok(Method::Cubic),
            other => Err(GriddingError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Linear => "linear",
            Method::Nearest => "nearest",
            Method::Cubic => "cubic",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error)]
pub enum InterpolationError {
    /// Too few (or collinear) samples for the method. Callers skip the input.
    #[error("Degenerate input for {method} interpolation ({samples} usable samples)")]
    Degenerate { samples: usize, method: Method },

    #[error("Malformed interpolation input: {0}")]
    Malformed(String),
}

impl InterpolationError {
    pub fn is_degenerate(&self) -> bool {
        matches!(self, InterpolationError::Degenerate { .. })
    }
}

/// Sample set with non-finite samples removed.
pub struct Samples {
    pub(crate) points: Vec<[f64; 2]>,
    pub(crate) values: Vec<f64>,
}

impl Samples {
    pub fn new(xc: &[f64], yc: &[f64], zc: &[f64]) -> Result<Self, InterpolationError> {
        if xc.len() != yc.len() || xc.len() != zc.len() {
            return Err(InterpolationError::Malformed(format!(
                "sample arrays differ in length: {} {} {}",
                xc.len(),
                yc.len(),
                zc.len()
            )));
        }
        let mut points = Vec::with_capacity(xc.len());
        let mut values = Vec::with_capacity(xc.len());
        for ((x, y), z) in xc.iter().zip(yc).zip(zc) {
            if x.is_finite() && y.is_finite() && z.is_finite() {
                points.push([*x, *y]);
                values.push(*z);
            }
        }
        Ok(Samples { points, values })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub trait ScatteredInterpolator {
    /// `None` when (x, y) lies outside the region the method covers.
    fn evaluate(&self, x: f64, y: f64) -> Option<f64>;
}

pub fn build_interpolator(samples: Samples, method: Method) -> Result<Box<dyn ScatteredInterpolator>, InterpolationError> {
    Ok(match method {
        Method::Linear => Box::new(LinearInterpolator::new(samples)?),
        Method::Nearest => Box::new(NearestInterpolator::new(samples)?),
        Method::Cubic => Box::new(CloughTocherInterpolator::new(samples)?),
    })
}

/// Interpolates the samples (xc, yc, zc) at every (xi, yi) query point.
/// The result has the shape of `xi`.
pub fn griddata<D: Dimension>(
    xc: &[f64],
    yc: &[f64],
    zc: &[f64],
    xi: ArrayView<f64, D>,
    yi: ArrayView<f64, D>,
    method: Method,
    fill_value: f64,
) -> Result<Array<f64, D>, InterpolationError> {
    if xi.shape() != yi.shape() {
        return Err(InterpolationError::Malformed(format!(
            "query arrays differ in shape: {:?} {:?}",
            xi.shape(),
            yi.shape()
        )));
    }
    let samples = Samples::new(xc, yc, zc)?;
    let interpolator = build_interpolator(samples, method)?;
    Ok(Zip::from(&xi)
        .and(&yi)
        .map_collect(|&x, &y| interpolator.evaluate(x, y).unwrap_or(fill_value)))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::{array, Array1, Array2};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use super::*;

    fn plane(x: f64, y: f64) -> f64 {
        3.0 + 0.5 * x - 2.0 * y
    }

    fn random_samples(n: usize, f: fn(f64, f64) -> f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut xc = vec![0.0, 10.0, 0.0, 10.0];
        let mut yc = vec![0.0, 0.0, 10.0, 10.0];
        for _ in 0..n {
            xc.push(rng.gen_range(0.0..10.0));
            yc.push(rng.gen_range(0.0..10.0));
        }
        let zc = xc.iter().zip(&yc).map(|(x, y)| f(*x, *y)).collect();
        (xc, yc, zc)
    }

    fn query() -> (Array2<f64>, Array2<f64>) {
        let xi = Array2::from_shape_fn((6, 5), |(i, _)| 1.0 + i as f64 * 1.5);
        let yi = Array2::from_shape_fn((6, 5), |(_, j)| 0.5 + j as f64 * 2.0);
        (xi, yi)
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("linear".parse::<Method>().unwrap(), Method::Linear);
        assert_eq!("cubic".parse::<Method>().unwrap(), Method::Cubic);
        let err = "spline".parse::<Method>().unwrap_err();
        assert!(matches!(err, GriddingError::UnsupportedMethod(ref m) if m == "spline"));
    }

    #[test]
    fn test_linear_reproduces_plane() {
        let (xc, yc, zc) = random_samples(40, plane);
        let (xi, yi) = query();
        let zi = griddata(&xc, &yc, &zc, xi.view(), yi.view(), Method::Linear, f64::NAN).unwrap();
        for ((z, x), y) in zi.iter().zip(xi.iter()).zip(yi.iter()) {
            assert_relative_eq!(*z, plane(*x, *y), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_cubic_reproduces_plane() {
        let (xc, yc, zc) = random_samples(40, plane);
        let (xi, yi) = query();
        let zi = griddata(&xc, &yc, &zc, xi.view(), yi.view(), Method::Cubic, f64::NAN).unwrap();
        for ((z, x), y) in zi.iter().zip(xi.iter()).zip(yi.iter()) {
            assert_relative_eq!(*z, plane(*x, *y), epsilon = 1e-8);
        }
    }

    #[test]
    fn test_cubic_is_close_on_smooth_field() {
        fn bowl(x: f64, y: f64) -> f64 {
            0.05 * (x - 5.0).powi(2) + 0.05 * (y - 5.0).powi(2)
        }
        let (xc, yc, zc) = random_samples(400, bowl);
        let xi = Array2::from_shape_fn((5, 5), |(i, _)| 2.0 + i as f64 * 1.5);
        let yi = Array2::from_shape_fn((5, 5), |(_, j)| 2.0 + j as f64 * 1.5);
        let zi = griddata(&xc, &yc, &zc, xi.view(), yi.view(), Method::Cubic, f64::NAN).unwrap();
        for ((z, x), y) in zi.iter().zip(xi.iter()).zip(yi.iter()) {
            assert!((z - bowl(*x, *y)).abs() < 0.05, "cubic {} vs {}", z, bowl(*x, *y));
        }
    }

    #[test]
    fn test_sheared_grid_reproduces_samples() {
        // Collinear runs along the hull
        let mut xc = vec![];
        let mut yc = vec![];
        for i in 0..5 {
            for j in 0..5 {
                xc.push(i as f64 + 0.01 * j as f64);
                yc.push(j as f64 + 0.013 * i as f64);
            }
        }
        let zc: Vec<f64> = xc.iter().zip(&yc).map(|(x, y)| x * x + 3.0 * y * y).collect();
        let xi = Array1::from(xc.clone());
        let yi = Array1::from(yc.clone());
        for method in [Method::Linear, Method::Cubic] {
            let zi = griddata(&xc, &yc, &zc, xi.view(), yi.view(), method, f64::NAN).unwrap();
            for (z, expected) in zi.iter().zip(&zc) {
                assert_relative_eq!(*z, *expected, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_outside_hull_gets_fill_value() {
        let xc = [0.0, 1.0, 0.0, 1.0];
        let yc = [0.0, 0.0, 1.0, 1.0];
        let zc = [1.0, 2.0, 3.0, 4.0];
        let xi = array![[0.5, 5.0]];
        let yi = array![[0.5, 5.0]];
        for method in [Method::Linear, Method::Cubic] {
            let zi = griddata(&xc, &yc, &zc, xi.view(), yi.view(), method, -1.0).unwrap();
            assert_relative_eq!(zi[[0, 0]], 2.5, epsilon = 1e-12);
            assert_eq!(zi[[0, 1]], -1.0);
        }
        let zi = griddata(&xc, &yc, &zc, xi.view(), yi.view(), Method::Nearest, -1.0).unwrap();
        assert_eq!(zi[[0, 1]], 4.0);
    }

    #[test]
    fn test_nearest_returns_sample_values() {
        let xc = [0.0, 10.0, 0.0, 10.0];
        let yc = [0.0, 0.0, 10.0, 10.0];
        let zc = [1.0, 2.0, 3.0, 4.0];
        let xi = array![1.0, 9.0, 2.0, 8.5];
        let yi = array![1.0, 1.0, 9.0, 9.5];
        let zi = griddata(&xc, &yc, &zc, xi.view(), yi.view(), Method::Nearest, f64::NAN).unwrap();
        assert_eq!(zi, array![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_collinear_samples_are_degenerate() {
        let xc = [0.0, 1.0, 2.0, 3.0];
        let yc = [0.0, 1.0, 2.0, 3.0];
        let zc = [1.0, 2.0, 3.0, 4.0];
        let xi = array![0.5];
        let yi = array![0.5];
        for method in [Method::Linear, Method::Cubic] {
            let err = griddata(&xc, &yc, &zc, xi.view(), yi.view(), method, 0.0).unwrap_err();
            assert!(err.is_degenerate());
        }
        // nearest only needs one sample
        assert!(griddata(&xc, &yc, &zc, xi.view(), yi.view(), Method::Nearest, 0.0).is_ok());
    }

    #[test]
    fn test_non_finite_samples_are_dropped() {
        let xc = [0.0, 1.0, 0.0, f64::NAN];
        let yc = [0.0, 0.0, 1.0, 0.5];
        let zc = [1.0, 1.0, 1.0, 100.0];
        let xi = array![0.2];
        let yi = array![0.2];
        let zi = griddata(&xc, &yc, &zc, xi.view(), yi.view(), Method::Linear, 0.0).unwrap();
        assert_relative_eq!(zi[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_malformed_input() {
        let xi = array![0.2];
        let yi = array![0.2, 0.3];
        let err = griddata(&[0.0], &[0.0], &[1.0], xi.view(), yi.view(), Method::Nearest, 0.0).unwrap_err();
        assert!(!err.is_degenerate());
        let xi = array![0.2];
        let err = griddata(&[0.0, 1.0], &[0.0], &[1.0], xi.view(), xi.view(), Method::Nearest, 0.0).unwrap_err();
        assert!(matches!(err, InterpolationError::Malformed(_)));
    }
}
