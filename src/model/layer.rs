use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::model::surface::RegularSurface;
use crate::stream::Stream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OutsideLayerRange,
    OutsideZoneRange,
    /// Summed layer signal is negligible.
    NoSignal,
    /// Too few usable samples to interpolate.
    Degenerate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::OutsideLayerRange => "outside layer range",
            SkipReason::OutsideZoneRange => "not active zone",
            SkipReason::NoSignal => "too little signal",
            SkipReason::Degenerate => "not able to grid",
        };
        write!(f, "{}", reason)
    }
}

/// Which layers (1-based) went into a surface and which were left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GriddingReport {
    pub processed: Vec<usize>,
    pub skipped: Vec<(usize, SkipReason)>,
}

impl GriddingReport {
    pub fn process(&mut self, layer: usize) {
        self.processed.push(layer);
    }

    pub fn skip(&mut self, layer: usize, reason: SkipReason) {
        self.skipped.push((layer, reason));
    }

    /// True when nothing contributed to the surface.
    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> Vec<usize> {
        self.skipped.iter().filter(|(_, r)| *r == reason).map(|(k, _)| *k).collect()
    }
}

/// Fills the values of a surface from some source data.
///
/// Gridders hold their diagnostics sink as an `Rc`, so they are not `Send`.
/// Independent gridders may run concurrently only on separate threads that
/// each build their own gridder and surface.
pub trait SurfaceGridder {
    fn with_rerun_stream(self: Box<Self>, stream: Rc<dyn Stream>) -> Box<dyn SurfaceGridder>;

    fn name(&self) -> &'static str;

    fn grid(&self, surface: &mut RegularSurface) -> Result<GriddingReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report() {
        let mut report = GriddingReport::default();
        assert!(report.is_empty());
        report.skip(1, SkipReason::OutsideZoneRange);
        report.process(2);
        report.skip(3, SkipReason::NoSignal);
        report.skip(4, SkipReason::OutsideZoneRange);
        assert!(!report.is_empty());
        assert_eq!(report.skipped_for(SkipReason::OutsideZoneRange), vec![1, 4]);
        assert_eq!(SkipReason::NoSignal.to_string(), "too little signal");
    }
}
