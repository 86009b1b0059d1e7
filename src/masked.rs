use ndarray::{Array, Dimension, Ix2, Ix3, Zip};

use crate::error::{GriddingError, Result};

/// Values paired with a missing-value mask (`true` marks a missing cell).
#[derive(Clone, Debug, PartialEq)]
pub struct Masked<D: Dimension> {
    pub data: Array<f64, D>,
    pub mask: Array<bool, D>,
}

pub type Masked2 = Masked<Ix2>;
pub type Masked3 = Masked<Ix3>;

impl<D: Dimension> Masked<D> {
    /// Wraps `data` with nothing masked.
    pub fn new(data: Array<f64, D>) -> Self {
        let mask = Array::from_elem(data.raw_dim(), false);
        Masked { data, mask }
    }

    pub fn with_mask(data: Array<f64, D>, mask: Array<bool, D>) -> Result<Self> {
        if data.shape() != mask.shape() {
            return Err(GriddingError::shape_mismatch(data.shape(), mask.shape()));
        }
        Ok(Masked { data, mask })
    }

    pub fn masked_where<F>(data: Array<f64, D>, condition: F) -> Self
    where
        F: Fn(f64) -> bool,
    {
        let mask = data.mapv(|v| condition(v));
        Masked { data, mask }
    }

    /// NaN and infinite values become missing.
    pub fn masked_invalid(data: Array<f64, D>) -> Self {
        Self::masked_where(data, |v| !v.is_finite())
    }

    pub fn masked_less(mut self, threshold: f64) -> Self {
        Zip::from(&mut self.mask).and(&self.data).for_each(|m, &v| {
            if v < threshold {
                *m = true;
            }
        });
        self
    }

    /// Adds `extra` to the existing mask.
    pub fn mask_also(mut self, extra: &Array<bool, D>) -> Self {
        Zip::from(&mut self.mask).and(extra).for_each(|m, &e| *m = *m || e);
        self
    }

    pub fn filled(&self, fill_value: f64) -> Array<f64, D> {
        Zip::from(&self.data)
            .and(&self.mask)
            .map_collect(|&v, &m| if m { fill_value } else { v })
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn count(&self) -> usize {
        self.mask.iter().filter(|m| !**m).count()
    }

    pub fn is_all_masked(&self) -> bool {
        self.count() == 0
    }

    pub fn sum(&self) -> f64 {
        self.data
            .iter()
            .zip(self.mask.iter())
            .filter(|(_, m)| !**m)
            .map(|(v, _)| *v)
            .sum()
    }

    /// Mean over unmasked cells, `None` when everything is masked.
    pub fn mean(&self) -> Option<f64> {
        let count = self.count();
        if count == 0 {
            return None;
        }
        Some(self.sum() / count as f64)
    }
}
