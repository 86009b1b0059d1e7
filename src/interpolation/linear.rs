use crate::interpolation::triangulation::Triangulation;
use crate::interpolation::{InterpolationError, Method, Samples, ScatteredInterpolator};

/// Piecewise linear interpolation over the Delaunay triangulation.
pub struct LinearInterpolator {
    triangulation: Triangulation,
    values: Vec<f64>,
}

impl LinearInterpolator {
    pub fn new(samples: Samples) -> Result<Self, InterpolationError> {
        let triangulation = Triangulation::new(&samples.points).ok_or(InterpolationError::Degenerate {
            samples: samples.len(),
            method: Method::Linear,
        })?;
        Ok(LinearInterpolator { triangulation, values: samples.values })
    }
}

impl ScatteredInterpolator for LinearInterpolator {
    fn evaluate(&self, x: f64, y: f64) -> Option<f64> {
        let (t, b) = self.triangulation.locate(x, y)?;
        let vertices = self.triangulation.triangles[t];
        Some(
            b.iter()
                .zip(vertices.iter())
                .map(|(weight, v)| weight * self.values[*v])
                .sum(),
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use super::*;

    #[test]
    fn test_interpolates_inside_triangle() {
        let samples = Samples::new(&[0.0, 2.0, 0.0], &[0.0, 0.0, 2.0], &[0.0, 2.0, 4.0]).unwrap();
        let linear = LinearInterpolator::new(samples).unwrap();
        assert_relative_eq!(linear.evaluate(0.5, 0.5).unwrap(), 1.5, epsilon = 1e-12);
        assert_relative_eq!(linear.evaluate(2.0, 0.0).unwrap(), 2.0, epsilon = 1e-12);
        assert_eq!(linear.evaluate(2.0, 2.0), None);
    }
}
