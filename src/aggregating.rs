use ndarray::{Array2, Axis};

use crate::masked::{Masked2, Masked3};

#[derive(Debug, Clone, Copy)]
pub enum Aggregator {
    Sum,
    Average,
}

impl Aggregator {
    /// Collapses the layer axis, ignoring masked cells. A column with no
    /// unmasked cell is masked in the result.
    pub fn aggregate_layers(&self, values: &Masked3) -> Masked2 {
        let (ncol, nrow, _) = values.data.dim();
        let mut data = Array2::<f64>::zeros((ncol, nrow));
        let mut mask = Array2::<bool>::from_elem((ncol, nrow), false);

        let columns = values.data.lanes(Axis(2)).into_iter().zip(values.mask.lanes(Axis(2)));
        for (((column, column_mask), out), out_mask) in columns.zip(data.iter_mut()).zip(mask.iter_mut()) {
            let mut total = 0.0;
            let mut count = 0;
            for (value, masked) in column.iter().zip(column_mask.iter()) {
                if !masked {
                    total += value;
                    count += 1;
                }
            }
            if count == 0 {
                *out_mask = true;
                continue;
            }
            *out = match self {
                Aggregator::Sum => total,
                Aggregator::Average => total / count as f64,
            };
        }
        Masked2 { data, mask }
    }
}
