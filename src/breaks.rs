//! Break counting
//!
//! A palm line annotated as several disjoint segments on one image is one
//! line broken into pieces: `n` segments sharing an (image, label) pair mean
//! `n - 1` breaks.
//!
//! The tally is an aggregation pass over every annotation of a dataset. It is
//! built once, before any per-curve extraction, and only read afterwards.

use crate::geometry::CurveType;
use rustc_hash::FxHashMap;

/// Identifier of a source image.
pub type ImageId = u64;

/// Segment counts per (image, label), frozen after construction.
#[derive(Debug, Clone, Default)]
pub struct BreakTally {
    counts: FxHashMap<(ImageId, CurveType), u32>,
}

impl BreakTally {
    /// Count segments per (image, label).
    #[must_use]
    pub fn from_annotations<I>(annotations: I) -> Self
    where
        I: IntoIterator<Item = (ImageId, CurveType)>,
    {
        let mut counts = FxHashMap::default();
        for key in annotations {
            *counts.entry(key).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Breaks for a pair, `None` if no annotation carried it.
    #[must_use]
    pub fn breaks(&self, image_id: ImageId, label: CurveType) -> Option<u32> {
        self.counts
            .get(&(image_id, label))
            .map(|count| count.saturating_sub(1))
    }

    /// Number of segments seen for a pair (zero if absent).
    #[must_use]
    pub fn segments(&self, image_id: ImageId, label: CurveType) -> u32 {
        self.counts.get(&(image_id, label)).copied().unwrap_or(0)
    }

    /// Number of distinct (image, label) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when nothing was tallied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_segments_two_breaks() {
        let tally = BreakTally::from_annotations([
            (7, CurveType::Fate),
            (7, CurveType::Fate),
            (7, CurveType::Fate),
        ]);
        assert_eq!(tally.breaks(7, CurveType::Fate), Some(2));
        assert_eq!(tally.segments(7, CurveType::Fate), 3);
    }

    #[test]
    fn test_single_segment_no_break() {
        let tally = BreakTally::from_annotations([(1, CurveType::Life)]);
        assert_eq!(tally.breaks(1, CurveType::Life), Some(0));
    }

    #[test]
    fn test_absent_pair_is_none() {
        let tally = BreakTally::from_annotations([(1, CurveType::Life)]);
        assert_eq!(tally.breaks(1, CurveType::Heart), None);
        assert_eq!(tally.breaks(2, CurveType::Life), None);
        assert_eq!(tally.segments(2, CurveType::Life), 0);
    }

    #[test]
    fn test_pairs_are_independent() {
        let tally = BreakTally::from_annotations([
            (1, CurveType::Head),
            (1, CurveType::Head),
            (1, CurveType::Heart),
            (2, CurveType::Head),
        ]);
        assert_eq!(tally.len(), 3);
        assert_eq!(tally.breaks(1, CurveType::Head), Some(1));
        assert_eq!(tally.breaks(1, CurveType::Heart), Some(0));
        assert_eq!(tally.breaks(2, CurveType::Head), Some(0));
    }

    #[test]
    fn test_empty_tally() {
        let tally = BreakTally::from_annotations(std::iter::empty());
        assert!(tally.is_empty());
    }
}
