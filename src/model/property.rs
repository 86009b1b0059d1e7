use std::collections::BTreeMap;
use ndarray::Array3;

use crate::constants::{UNDEF, UNDEF_LIMIT};
use crate::error::{GriddingError, Result};
use crate::masked::Masked3;

/// A scalar field over a (nx, ny, nz) grid. Discrete properties hold integer
/// codes (stored as f64) with an optional code -> label table.
#[derive(Debug, Clone)]
pub struct GridProperty {
    name: String,
    values: Masked3,
    discrete: bool,
    codes: BTreeMap<i32, String>,
}

impl GridProperty {
    /// Continuous property; values at or above the undefined limit are masked.
    pub fn new(name: &str, values: Array3<f64>) -> Self {
        Self {
            name: name.to_string(),
            values: Masked3::masked_where(values, |v| v.is_nan() || v >= UNDEF_LIMIT),
            discrete: false,
            codes: BTreeMap::new(),
        }
    }

    pub fn discrete(name: &str, codes: Array3<i32>) -> Self {
        Self {
            name: name.to_string(),
            values: Masked3::new(codes.mapv(f64::from)),
            discrete: true,
            codes: BTreeMap::new(),
        }
    }

    pub fn with_codes(mut self, codes: BTreeMap<i32, String>) -> Self {
        self.codes = codes;
        self
    }

    /// Masks every cell flagged in `inactive` in addition to what is already masked.
    pub fn with_inactive(mut self, inactive: &Array3<bool>) -> Result<Self> {
        if inactive.shape() != self.values.shape() {
            return Err(GriddingError::shape_mismatch(self.values.shape(), inactive.shape()));
        }
        self.values = self.values.mask_also(inactive);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> (usize, usize, usize) {
        self.values.data.dim()
    }

    pub fn values(&self) -> &Masked3 {
        &self.values
    }

    pub fn is_discrete(&self) -> bool {
        self.discrete
    }

    pub fn codes(&self) -> &BTreeMap<i32, String> {
        &self.codes
    }

    /// Values with the undefined marker in masked cells (zero for discrete properties).
    pub fn undef_filled(&self) -> Array3<f64> {
        if self.discrete {
            self.values.filled(0.0)
        } else {
            self.values.filled(UNDEF)
        }
    }

    pub(crate) fn check_dimensions(&self, dimensions: (usize, usize, usize)) -> Result<()> {
        if self.dimensions() != dimensions {
            let (nx, ny, nz) = dimensions;
            return Err(GriddingError::shape_mismatch(&[nx, ny, nz], self.values.shape()));
        }
        Ok(())
    }
}
