use ndarray::Array3;

use crate::constants::UNDEF;
use crate::error::{GriddingError, Result};
use crate::model::property::GridProperty;

/// Coordinates of one corner of every cell, each of shape (nx, ny, nz).
#[derive(Debug, Clone)]
pub struct CellCorner {
    pub x: Array3<f64>,
    pub y: Array3<f64>,
    pub z: Array3<f64>,
}

/// Eight corners per cell: the top face SW, SE, NW, NE, then the base face
/// in the same order.
pub type CornerSet = Vec<CellCorner>;

/// What a structured grid has to offer for corner extraction.
pub trait CornerGrid {
    fn dimensions(&self) -> (usize, usize, usize);

    fn xyz_corners(&self) -> CornerSet;

    /// 1 for active cells, 0 for inactive.
    fn actnum(&self) -> Array3<i32>;
}

/// Axis-aligned grid with constant increments. K counts downwards from the top.
#[derive(Debug, Clone)]
pub struct RegularBoxGrid {
    dimensions: (usize, usize, usize),
    origin: [f64; 3],
    increments: [f64; 3],
    actnum: Array3<i32>,
}

impl RegularBoxGrid {
    pub fn new(dimensions: (usize, usize, usize), origin: [f64; 3], increments: [f64; 3]) -> Self {
        Self { dimensions, origin, increments, actnum: Array3::ones(dimensions) }
    }

    pub fn with_actnum(mut self, actnum: Array3<i32>) -> Result<Self> {
        if actnum.dim() != self.dimensions {
            let (nx, ny, nz) = self.dimensions;
            return Err(GriddingError::shape_mismatch(&[nx, ny, nz], actnum.shape()));
        }
        self.actnum = actnum;
        Ok(self)
    }

    fn corner(&self, di: usize, dj: usize, dk: usize) -> CellCorner {
        let [x0, y0, z0] = self.origin;
        let [dx, dy, dz] = self.increments;
        CellCorner {
            x: Array3::from_shape_fn(self.dimensions, |(i, _, _)| x0 + (i + di) as f64 * dx),
            y: Array3::from_shape_fn(self.dimensions, |(_, j, _)| y0 + (j + dj) as f64 * dy),
            z: Array3::from_shape_fn(self.dimensions, |(_, _, k)| z0 + (k + dk) as f64 * dz),
        }
    }

    /// Cell centre coordinates as properties; inactive cells are undefined.
    pub fn cell_centers(&self) -> (GridProperty, GridProperty, GridProperty) {
        let [x0, y0, z0] = self.origin;
        let [dx, dy, dz] = self.increments;
        let center = |name: &str, f: &dyn Fn((usize, usize, usize)) -> f64| {
            let values = Array3::from_shape_fn(self.dimensions, |ijk| {
                if self.actnum[ijk] == 0 { UNDEF } else { f(ijk) }
            });
            GridProperty::new(name, values)
        };
        (
            center("X_UTME", &|(i, _, _)| x0 + (i as f64 + 0.5) * dx),
            center("Y_UTMN", &|(_, j, _)| y0 + (j as f64 + 0.5) * dy),
            center("Z_TVDSS", &|(_, _, k)| z0 + (k as f64 + 0.5) * dz),
        )
    }
}

impl CornerGrid for RegularBoxGrid {
    fn dimensions(&self) -> (usize, usize, usize) {
        self.dimensions
    }

    fn xyz_corners(&self) -> CornerSet {
        let mut corners = Vec::with_capacity(8);
        for dk in 0..2 {
            for (di, dj) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                corners.push(self.corner(di, dj, dk));
            }
        }
        corners
    }

    fn actnum(&self) -> Array3<i32> {
        self.actnum.clone()
    }
}
