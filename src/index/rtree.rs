//! R-tree-family adapter over one-dimensional spans.
//!
//! Implements the four operations a GiST-style access method needs from a
//! key class: union, penalty, picksplit and consistency. All operations are
//! pure and total over well-formed spans; malformed input is rejected at
//! the entry point, never discovered mid-algorithm.

use crate::bound::bound_cmp;
use crate::config::IndexConfig;
use crate::error::{IndexError, Result};
use crate::index::split::{SplitBuilder, fallback_split, search_candidates, span_growth};
use crate::index::{Consistency, IndexEntry, SplitResult, ensure_same_kind};
use crate::scalar::ScalarKind;
use crate::span::Span;
use crate::strategy::Strategy;
use std::cmp::Ordering;

/// R-tree index adapter for span keys.
///
/// ```rust
/// use spanbox::{Span, SpanRTree, Strategy};
///
/// let index = SpanRTree::for_spans();
/// let key = Span::int(10, 20)?;
/// let query = Span::int(15, 25)?;
/// let verdict = index.consistent(&key, &query, Strategy::Overlap, true)?;
/// assert!(verdict.matches);
/// # Ok::<(), spanbox::IndexError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SpanRTree {
    config: IndexConfig,
    derived_keys: bool,
}

impl SpanRTree {
    /// Adapter for values indexed as their own span.
    pub fn for_spans() -> Self {
        Self {
            config: IndexConfig::default(),
            derived_keys: false,
        }
    }

    /// Adapter for rich temporal values indexed through a derived bounding
    /// span. Matches under lossy strategies carry a recheck, since the key
    /// loses information about the value.
    pub fn for_derived_keys() -> Self {
        Self {
            config: IndexConfig::default(),
            derived_keys: true,
        }
    }

    /// Override the configuration.
    pub fn with_config(mut self, config: IndexConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Smallest span containing every entry key.
    pub fn union(&self, entries: &[IndexEntry<Span>]) -> Result<Span> {
        self.validate_entries(entries, "union")?;
        let mut acc = entries[0].key;
        for entry in &entries[1..] {
            acc = acc.union_unchecked(&entry.key);
        }
        Ok(acc)
    }

    /// Cost of inserting `candidate` into a subtree keyed `original`: the
    /// one-sided growth of the union beyond the original key. Non-negative,
    /// zero exactly when no growth is needed.
    pub fn penalty(&self, original: &Span, candidate: &Span) -> Result<f64> {
        ensure_same_kind(original, candidate)?;
        Ok(span_growth(original, candidate))
    }

    /// Exact structural equality of two keys.
    pub fn same(&self, a: &Span, b: &Span) -> bool {
        a.same(b)
    }

    /// Partition overflowing entries into two groups by the double-sorting
    /// heuristic.
    pub fn pick_split(&self, entries: &[IndexEntry<Span>]) -> Result<SplitResult<Span>> {
        if entries.len() < 2 {
            return Err(IndexError::NotEnoughEntries { got: entries.len() });
        }
        self.validate_entries(entries, "pick_split")?;
        let spans: Vec<Span> = entries.iter().map(|e| e.key).collect();

        let Some(cand) = search_candidates(&spans, self.config.limit_ratio) else {
            log::debug!(
                "no split candidate met the balance floor for {} entries, using trivial split",
                spans.len()
            );
            return self.trivial_split(&spans);
        };

        // Entries whose upper bound stays within the left boundary can go
        // left; entries whose lower bound reaches the right boundary can go
        // right; those free to do either are common.
        let mut builder = SplitBuilder::new(|a: &Span, b: &Span| a.union_unchecked(b));
        let mut commons: Vec<(usize, f64)> = Vec::new();
        for (i, span) in spans.iter().enumerate() {
            let can_left = bound_cmp(span.upper(), &cand.left_upper) != Ordering::Greater;
            let can_right = bound_cmp(span.lower(), &cand.right_lower) != Ordering::Less;
            if can_left && can_right {
                // Signed closeness to one side versus the other.
                let delta = span.lower().value.distance(&cand.right_lower.value)
                    - cand.left_upper.value.distance(&span.upper().value);
                commons.push((i, delta));
            } else if can_left {
                builder.place_left(i, span);
            } else {
                builder.place_right(i, span);
            }
        }

        // Left-leaning common entries sort first; the most ambiguous ones
        // land in the middle and are resolved by whichever side still needs
        // entries to reach the targeted balance.
        commons.sort_by(|a, b| a.1.total_cmp(&b.1));
        let common_left = cand
            .left_count
            .saturating_sub(builder.left_len())
            .min(commons.len());
        for (pos, &(i, _)) in commons.iter().enumerate() {
            if pos < common_left {
                builder.place_left(i, &spans[i]);
            } else {
                builder.place_right(i, &spans[i]);
            }
        }

        match builder.build(false) {
            Some(result) => Ok(result),
            None => self.trivial_split(&spans),
        }
    }

    /// Can a key match the query under the strategy?
    ///
    /// At a leaf the strategy maps directly to its predicate. At an
    /// internal node the key is a union of children, so the test relaxes
    /// to "could any descendant match": ordering strategies flip into the
    /// negation of their opposite non-strict form, containment keeps only
    /// the direction unions preserve.
    pub fn consistent(
        &self,
        key: &Span,
        query: &Span,
        strategy: Strategy,
        is_leaf: bool,
    ) -> Result<Consistency> {
        if !strategy.is_span_strategy() {
            return Err(IndexError::UnsupportedStrategy(strategy));
        }
        ensure_same_kind(key, query)?;

        let matches = if is_leaf {
            span_leaf_matches(key, query, strategy)
        } else {
            match strategy {
                Strategy::Overlap | Strategy::ContainedBy => key.overlaps(query),
                Strategy::Contains | Strategy::Same => key.contains_span(query),
                Strategy::Adjacent => key.adjacent(query) || key.overlaps(query),
                Strategy::Before => !key.over_after(query),
                Strategy::OverBefore => !key.after(query),
                Strategy::After => !key.over_before(query),
                Strategy::OverAfter => !key.before(query),
                _ => unreachable!(),
            }
        };

        // When the key is the value itself the test is exact; for derived
        // keys only the ordering strategies stay exact, since boxes enter
        // them through their endpoints alone.
        let recheck = self.derived_keys && !strategy.is_exact_on_bbox();
        Ok(Consistency::new(matches, recheck))
    }

    fn trivial_split(&self, spans: &[Span]) -> Result<SplitResult<Span>> {
        fallback_split(spans, |i| spans[i], |a, b| a.union_unchecked(b)).ok_or(
            // Unreachable with >= 2 entries; kept as a hard error rather
            // than a panic.
            IndexError::NotEnoughEntries { got: spans.len() },
        )
    }

    fn validate_entries(
        &self,
        entries: &[IndexEntry<Span>],
        operation: &'static str,
    ) -> Result<ScalarKind> {
        let Some(first) = entries.first() else {
            return Err(IndexError::EmptyEntries { operation });
        };
        let kind = first.key.kind();
        for entry in entries {
            if entry.key.kind() != kind {
                return Err(IndexError::TypeMismatch {
                    expected: kind,
                    got: entry.key.kind(),
                });
            }
        }
        Ok(kind)
    }
}

/// Leaf-level strategy dispatch, shared with the quad-tree adapter.
pub(crate) fn span_leaf_matches(key: &Span, query: &Span, strategy: Strategy) -> bool {
    match strategy {
        Strategy::Overlap => key.overlaps(query),
        Strategy::Contains => key.contains_span(query),
        Strategy::ContainedBy => key.contained_by(query),
        Strategy::Same => key.same(query),
        Strategy::Adjacent => key.adjacent(query),
        Strategy::Before => key.before(query),
        Strategy::OverBefore => key.over_before(query),
        Strategy::After => key.after(query),
        Strategy::OverAfter => key.over_after(query),
        _ => unreachable!("callers reject non-span strategies"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(i64, i64)]) -> Vec<IndexEntry<Span>> {
        pairs
            .iter()
            .map(|&(l, u)| IndexEntry::new(Span::int(l, u).unwrap(), &b""[..]))
            .collect()
    }

    #[test]
    fn test_union_folds_all_keys() {
        let index = SpanRTree::for_spans();
        let es = entries(&[(3, 5), (0, 2), (9, 12)]);
        assert_eq!(index.union(&es).unwrap(), Span::int(0, 12).unwrap());
    }

    #[test]
    fn test_union_rejects_empty() {
        let index = SpanRTree::for_spans();
        assert_eq!(
            index.union(&[]),
            Err(IndexError::EmptyEntries { operation: "union" })
        );
    }

    #[test]
    fn test_union_rejects_mixed_kinds() {
        let index = SpanRTree::for_spans();
        let es = vec![
            IndexEntry::new(Span::int(0, 2).unwrap(), &b""[..]),
            IndexEntry::new(Span::float(0.0, 2.0).unwrap(), &b""[..]),
        ];
        assert!(matches!(
            index.union(&es),
            Err(IndexError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_penalty_zero_when_covered() {
        let index = SpanRTree::for_spans();
        let original = Span::int(0, 10).unwrap();
        assert_eq!(
            index.penalty(&original, &Span::int(2, 8).unwrap()).unwrap(),
            0.0
        );
        assert_eq!(
            index.penalty(&original, &Span::int(5, 14).unwrap()).unwrap(),
            4.0
        );
        assert_eq!(
            index
                .penalty(&original, &Span::int(-3, 14).unwrap())
                .unwrap(),
            7.0
        );
    }

    #[test]
    fn test_pick_split_worked_example() {
        // [0,1) [1,3) [2,3) [2,4): the winning boundary is
        // left_upper = 3), right_lower = [2; [2,3) is the single common
        // entry and goes right once the left group reaches its target.
        let index = SpanRTree::for_spans();
        let es = entries(&[(0, 1), (1, 3), (2, 3), (2, 4)]);
        let result = index.pick_split(&es).unwrap();

        assert!(!result.used_fallback);
        assert_eq!(result.left, vec![0, 1]);
        let mut right = result.right.clone();
        right.sort_unstable();
        assert_eq!(right, vec![2, 3]);
        assert_eq!(result.left_key, Span::int(0, 3).unwrap());
        assert_eq!(result.right_key, Span::int(2, 4).unwrap());
    }

    #[test]
    fn test_pick_split_partitions_exactly() {
        let index = SpanRTree::for_spans();
        let es = entries(&[(0, 4), (1, 2), (3, 9), (8, 12), (10, 11), (2, 6)]);
        let result = index.pick_split(&es).unwrap();

        let mut seen: Vec<usize> = result.left.iter().chain(&result.right).copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..es.len()).collect::<Vec<_>>());
        assert!(!result.left.is_empty());
        assert!(!result.right.is_empty());

        // Group keys cover their members.
        for &i in &result.left {
            assert!(result.left_key.contains_span(&es[i].key));
        }
        for &i in &result.right {
            assert!(result.right_key.contains_span(&es[i].key));
        }
    }

    #[test]
    fn test_pick_split_falls_back_on_identical_entries() {
        let index = SpanRTree::for_spans();
        let es = entries(&[(5, 9); 6]);
        let result = index.pick_split(&es).unwrap();
        assert!(result.used_fallback);
        assert_eq!(result.left.len(), 3);
        assert_eq!(result.right.len(), 3);
    }

    #[test]
    fn test_pick_split_needs_two_entries() {
        let index = SpanRTree::for_spans();
        assert_eq!(
            index.pick_split(&entries(&[(0, 1)])),
            Err(IndexError::NotEnoughEntries { got: 1 })
        );
    }

    #[test]
    fn test_leaf_consistent_examples() {
        let index = SpanRTree::for_spans();
        let overlap = index
            .consistent(
                &Span::int(10, 20).unwrap(),
                &Span::int(15, 25).unwrap(),
                Strategy::Overlap,
                true,
            )
            .unwrap();
        assert!(overlap.matches);
        assert!(!overlap.recheck);

        let before = index
            .consistent(
                &Span::int(10, 20).unwrap(),
                &Span::int(25, 30).unwrap(),
                Strategy::Before,
                true,
            )
            .unwrap();
        assert!(before.matches);
        assert!(!before.recheck);
    }

    #[test]
    fn test_derived_keys_recheck_lossy_strategies() {
        let index = SpanRTree::for_derived_keys();
        let key = Span::int(10, 20).unwrap();
        let overlap = index
            .consistent(&key, &Span::int(15, 25).unwrap(), Strategy::Overlap, true)
            .unwrap();
        assert!(overlap.matches);
        assert!(overlap.recheck);

        // Ordering touches the value only through the box endpoints, so it
        // stays exact even for derived keys.
        let before = index
            .consistent(&key, &Span::int(25, 30).unwrap(), Strategy::Before, true)
            .unwrap();
        assert!(before.matches);
        assert!(!before.recheck);
    }

    #[test]
    fn test_internal_never_stricter_than_leaf() {
        // If a leaf matches, the union of its page must match at the
        // internal level for the same strategy.
        let index = SpanRTree::for_spans();
        let leaves = [
            Span::int(0, 3).unwrap(),
            Span::int(5, 8).unwrap(),
            Span::int(7, 15).unwrap(),
        ];
        let key = leaves[0]
            .union(&leaves[1])
            .unwrap()
            .union(&leaves[2])
            .unwrap();
        let queries = [
            Span::int(4, 6).unwrap(),
            Span::int(0, 20).unwrap(),
            Span::int(16, 30).unwrap(),
            Span::int(7, 8).unwrap(),
        ];
        let strategies = [
            Strategy::Overlap,
            Strategy::Contains,
            Strategy::ContainedBy,
            Strategy::Same,
            Strategy::Adjacent,
            Strategy::Before,
            Strategy::OverBefore,
            Strategy::After,
            Strategy::OverAfter,
        ];
        for query in &queries {
            for &strategy in &strategies {
                let any_leaf = leaves
                    .iter()
                    .any(|leaf| index.consistent(leaf, query, strategy, true).unwrap().matches);
                if any_leaf {
                    assert!(
                        index.consistent(&key, query, strategy, false).unwrap().matches,
                        "internal test dropped a matching leaf for {:?} vs {}",
                        strategy,
                        query
                    );
                }
            }
        }
    }

    #[test]
    fn test_non_span_strategy_rejected() {
        let index = SpanRTree::for_spans();
        assert_eq!(
            index.consistent(
                &Span::int(0, 1).unwrap(),
                &Span::int(0, 1).unwrap(),
                Strategy::Left,
                true
            ),
            Err(IndexError::UnsupportedStrategy(Strategy::Left))
        );
    }
}
