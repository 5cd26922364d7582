//! Replaced-span registry.
//!
//! Records the byte ranges that already produced a finding so that no
//! source range is reported twice. Ranges are half-open and pairwise
//! disjoint; the map is keyed by range start.

use std::collections::BTreeMap;

use getterguard_core::Span;

#[derive(Debug, Default)]
pub struct ReplacedSpanRegistry {
    ranges: BTreeMap<usize, usize>,
}

impl ReplacedSpanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registered range with the greatest start at or before `offset`.
    fn floor(&self, offset: usize) -> Option<Span> {
        self.ranges
            .range(..=offset)
            .next_back()
            .map(|(&start, &end)| Span::new(start, end))
    }

    /// True if `pos` lies inside a registered range.
    pub fn is_filtered(&self, pos: usize) -> bool {
        self.floor(pos).is_some_and(|span| span.contains_offset(pos))
    }

    /// True if `span` overlaps a registered range.
    pub fn is_already_replaced(&self, span: Span) -> bool {
        if let Some(before) = self.floor(span.start) {
            if before.overlaps(&span) {
                return true;
            }
        }
        // A range starting inside `span`.
        self.ranges.range(span.start..span.end).next().is_some()
    }

    /// Record `span`. Callers check [`is_already_replaced`](Self::is_already_replaced)
    /// first; an overlapping span is ignored so the ranges stay disjoint.
    pub fn register(&mut self, span: Span) -> bool {
        if span.is_empty() || self.is_already_replaced(span) {
            return false;
        }
        self.ranges.insert(span.start, span.end);
        true
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Registered ranges in source order.
    pub fn spans(&self) -> impl Iterator<Item = Span> + '_ {
        self.ranges.iter().map(|(&start, &end)| Span::new(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_inside_registered_ranges_are_filtered() {
        let mut registry = ReplacedSpanRegistry::new();
        assert!(registry.register(Span::new(10, 20)));
        assert!(!registry.is_filtered(9));
        assert!(registry.is_filtered(10));
        assert!(registry.is_filtered(19));
        assert!(!registry.is_filtered(20));
    }

    #[test]
    fn overlap_detection() {
        let mut registry = ReplacedSpanRegistry::new();
        registry.register(Span::new(10, 20));
        registry.register(Span::new(30, 40));

        assert!(registry.is_already_replaced(Span::new(15, 25)));
        assert!(registry.is_already_replaced(Span::new(5, 11)));
        assert!(registry.is_already_replaced(Span::new(0, 50)));
        assert!(registry.is_already_replaced(Span::new(12, 14)));
        assert!(!registry.is_already_replaced(Span::new(20, 30)));
        assert!(!registry.is_already_replaced(Span::new(0, 10)));
    }

    #[test]
    fn overlapping_registration_is_refused() {
        let mut registry = ReplacedSpanRegistry::new();
        assert!(registry.register(Span::new(10, 20)));
        assert!(!registry.register(Span::new(12, 14)));
        assert!(!registry.register(Span::new(5, 15)));
        assert!(registry.register(Span::new(20, 25)));
        assert_eq!(
            registry.spans().collect::<Vec<_>>(),
            vec![Span::new(10, 20), Span::new(20, 25)]
        );
        assert_eq!(registry.len(), 2);
    }
}
