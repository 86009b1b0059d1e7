use std::ops::RangeInclusive;
use serde::Deserialize;

use crate::constants::OPEN_RANGE_MAX;
use crate::error::{GriddingError, Result};

/// Inclusive 1-based K-layer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "(i64, i64)")]
pub struct LayerRange {
    pub min: i64,
    pub max: i64,
}

impl LayerRange {
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(GriddingError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Every layer.
    pub fn all() -> Self {
        Self { min: 1, max: OPEN_RANGE_MAX }
    }

    /// Bounded to `[1, nlay]`. May come out empty if the range lies above `nlay`.
    pub fn clamp(&self, nlay: usize) -> Self {
        Self { min: self.min.max(1), max: self.max.min(nlay as i64) }
    }

    pub fn contains(&self, layer: i64) -> bool {
        layer >= self.min && layer <= self.max
    }

    pub fn layers(&self) -> RangeInclusive<i64> {
        self.min..=self.max
    }
}

impl Default for LayerRange {
    fn default() -> Self {
        Self::all()
    }
}

impl TryFrom<(i64, i64)> for LayerRange {
    type Error = GriddingError;

    fn try_from((min, max): (i64, i64)) -> Result<Self> {
        Self::new(min, max)
    }
}

/// Inclusive range of zone ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "(i64, i64)")]
pub struct ZoneRange {
    pub min: i64,
    pub max: i64,
}

impl ZoneRange {
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(GriddingError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn all() -> Self {
        Self { min: 1, max: OPEN_RANGE_MAX }
    }

    pub fn contains(&self, zone: i64) -> bool {
        zone >= self.min && zone <= self.max
    }

    pub fn zones(&self) -> RangeInclusive<i64> {
        self.min..=self.max
    }
}

impl Default for ZoneRange {
    fn default() -> Self {
        Self::all()
    }
}

impl TryFrom<(i64, i64)> for ZoneRange {
    type Error = GriddingError;

    fn try_from((min, max): (i64, i64)) -> Result<Self> {
        Self::new(min, max)
    }
}
