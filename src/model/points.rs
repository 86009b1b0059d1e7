use crate::error::{GriddingError, Result};

/// Scattered points with equal-length coordinate columns.
#[derive(Debug, Clone, Default)]
pub struct Points {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Points {
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(GriddingError::shape_mismatch(&[x.len(); 3], &[x.len(), y.len(), z.len()]));
        }
        Ok(Self { x, y, z })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Every `stride`-th point, starting with the first.
    pub fn coarsened(&self, stride: usize) -> Result<Self> {
        if stride == 0 {
            return Err(GriddingError::InvalidStride(stride));
        }
        let take = |column: &[f64]| column.iter().step_by(stride).copied().collect::<Vec<f64>>();
        Ok(Self { x: take(&self.x), y: take(&self.y), z: take(&self.z) })
    }
}
