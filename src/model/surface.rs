use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::constants::UNDEF_LIMIT;
use crate::error::{GriddingError, Result};
use crate::masked::Masked2;

/// Regular map lattice. Rotation is in degrees, counter-clockwise around the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    pub ncol: usize,
    pub nrow: usize,
    pub xori: f64,
    pub yori: f64,
    pub xinc: f64,
    pub yinc: f64,
    #[serde(default)]
    pub rotation: f64,
}

/// A map with values of shape (ncol, nrow).
#[derive(Debug, Clone)]
pub struct RegularSurface {
    geometry: SurfaceGeometry,
    values: Masked2,
}

impl RegularSurface {
    /// New surface with every node set to zero.
    pub fn new(geometry: SurfaceGeometry) -> Result<Self> {
        if geometry.ncol == 0 || geometry.nrow == 0 {
            return Err(GriddingError::shape_mismatch(&[1, 1], &[geometry.ncol, geometry.nrow]));
        }
        let values = Masked2::new(Array2::zeros((geometry.ncol, geometry.nrow)));
        Ok(Self { geometry, values })
    }

    pub fn geometry(&self) -> &SurfaceGeometry {
        &self.geometry
    }

    pub fn ncol(&self) -> usize {
        self.geometry.ncol
    }

    pub fn nrow(&self) -> usize {
        self.geometry.nrow
    }

    pub fn values(&self) -> &Masked2 {
        &self.values
    }

    /// Node coordinates, each of shape (ncol, nrow).
    pub fn get_xy_values(&self) -> (Array2<f64>, Array2<f64>) {
        let g = &self.geometry;
        let (sin, cos) = g.rotation.to_radians().sin_cos();
        let x = Array2::from_shape_fn((g.ncol, g.nrow), |(i, j)| {
            g.xori + i as f64 * g.xinc * cos - j as f64 * g.yinc * sin
        });
        let y = Array2::from_shape_fn((g.ncol, g.nrow), |(i, j)| {
            g.yori + i as f64 * g.xinc * sin + j as f64 * g.yinc * cos
        });
        (x, y)
    }

    /// Replaces the values. Non-finite and undefined values become missing.
    pub fn set_values(&mut self, values: Masked2) -> Result<()> {
        let expected = [self.ncol(), self.nrow()];
        if values.shape() != &expected[..] {
            return Err(GriddingError::shape_mismatch(&expected, values.shape()));
        }
        let undefined = values.data.mapv(|v| !v.is_finite() || v >= UNDEF_LIMIT);
        self.values = values.mask_also(&undefined);
        Ok(())
    }

    pub fn set_array(&mut self, values: Array2<f64>) -> Result<()> {
        self.set_values(Masked2::new(values))
    }

    /// Marks every node as missing.
    pub fn clear(&mut self) {
        self.values.mask.fill(true);
    }
}
