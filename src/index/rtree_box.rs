//! R-tree-family adapter over multi-dimensional boxes.
//!
//! Re-instantiates the double-sorting split per axis: the candidate search
//! of the one-dimensional adapter runs independently on every present
//! axis, then a single axis+candidate wins overall. Union, penalty and
//! consistency operate per axis and combine by sum or conjunction.

use crate::bound::bound_cmp;
use crate::boxes::AxisKey;
use crate::config::IndexConfig;
use crate::error::{IndexError, Result};
use crate::index::split::{
    SplitBuilder, SplitCandidate, fallback_split, merge_axis_keys, search_candidates, span_growth,
};
use crate::index::{Consistency, IndexEntry, SplitResult, ensure_same_kind};
use crate::span::Span;
use crate::strategy::{OrderingKind, Strategy};
use std::cmp::Ordering;
use std::marker::PhantomData;

/// R-tree index adapter for box keys (TBox, STBox).
#[derive(Debug, Clone)]
pub struct BoxRTree<K: AxisKey> {
    config: IndexConfig,
    derived_keys: bool,
    _key: PhantomData<K>,
}

impl<K: AxisKey> BoxRTree<K> {
    /// Adapter for values indexed as their own box.
    pub fn new() -> Self {
        Self {
            config: IndexConfig::default(),
            derived_keys: false,
            _key: PhantomData,
        }
    }

    /// Adapter for rich values indexed through a derived bounding box;
    /// matches under lossy strategies carry a recheck.
    pub fn for_derived_keys() -> Self {
        Self {
            derived_keys: true,
            ..Self::new()
        }
    }

    /// Override the configuration.
    pub fn with_config(mut self, config: IndexConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Smallest box containing every entry key.
    pub fn union(&self, entries: &[IndexEntry<K>]) -> Result<K> {
        self.validate_entries(entries, "union")?;
        let mut acc = entries[0].key.clone();
        for entry in &entries[1..] {
            acc = merge_axis_keys(&acc, &entry.key);
        }
        Ok(acc)
    }

    /// Per-axis growth of `original` to absorb `candidate`, summed over
    /// the axes. Mismatched axis sets are a dimensionality error.
    pub fn penalty(&self, original: &K, candidate: &K) -> Result<f64> {
        original.ensure_same_axes(candidate)?;
        ensure_axis_kinds(original, candidate)?;
        Ok(key_growth(original, candidate))
    }

    /// Exact structural equality, axis presence included.
    pub fn same(&self, a: &K, b: &K) -> bool {
        a.same(b)
    }

    /// Partition overflowing entries by the best per-axis double-sorting
    /// candidate.
    ///
    /// Cross-axis selection prefers the smaller non-negative-clamped
    /// overlap and breaks ties toward the wider axis; the rule is a
    /// quadratic-ness heuristic carried over for compatibility, not a
    /// proven optimum.
    pub fn pick_split(&self, entries: &[IndexEntry<K>]) -> Result<SplitResult<K>> {
        if entries.len() < 2 {
            return Err(IndexError::NotEnoughEntries { got: entries.len() });
        }
        self.validate_entries(entries, "pick_split")?;
        let keys: Vec<K> = entries.iter().map(|e| e.key.clone()).collect();

        let Some((axis, cand)) = self.select_axis(&keys) else {
            log::debug!(
                "no axis produced an acceptable split for {} entries, using trivial split",
                keys.len()
            );
            return self.trivial_split(&keys);
        };

        let mut builder = SplitBuilder::new(|a: &K, b: &K| merge_axis_keys(a, b));
        let mut commons: Vec<usize> = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            let Some(span) = key.axis(axis) else {
                continue;
            };
            let can_left = bound_cmp(span.upper(), &cand.left_upper) != Ordering::Greater;
            let can_right = bound_cmp(span.lower(), &cand.right_lower) != Ordering::Less;
            if can_left && can_right {
                commons.push(i);
            } else if can_left {
                builder.place_left(i, key);
            } else {
                builder.place_right(i, key);
            }
        }

        // Closeness to one side is not well defined by a single signed
        // distance in N dimensions, so common entries rank by how
        // decisively penalty prefers one group over the other. The most
        // ambiguous go first and pick their cheaper side; the quota forces
        // later entries toward whichever group still needs them.
        let left_seed = builder.left_key().cloned();
        let right_seed = builder.right_key().cloned();
        let mut scored: Vec<(usize, f64)> = commons
            .iter()
            .map(|&i| {
                let dl = seeded_growth(left_seed.as_ref(), &keys[i]);
                let dr = seeded_growth(right_seed.as_ref(), &keys[i]);
                (i, (dl - dr).abs())
            })
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));

        let floor = (self.config.limit_ratio * keys.len() as f64).ceil() as usize;
        for (pos, &(i, _)) in scored.iter().enumerate() {
            let remaining = scored.len() - pos;
            if builder.left_len() + remaining <= floor {
                builder.place_left(i, &keys[i]);
            } else if builder.right_len() + remaining <= floor {
                builder.place_right(i, &keys[i]);
            } else {
                let dl = seeded_growth(builder.left_key(), &keys[i]);
                let dr = seeded_growth(builder.right_key(), &keys[i]);
                if dl < dr {
                    builder.place_left(i, &keys[i]);
                } else {
                    builder.place_right(i, &keys[i]);
                }
            }
        }

        match builder.build(false) {
            Some(result) => Ok(result),
            None => self.trivial_split(&keys),
        }
    }

    /// Can a key match the query under the strategy?
    ///
    /// Topological strategies are evaluated per shared axis and
    /// AND-combined; an axis present on one side only is no constraint.
    /// Ordering strategies resolve to the axis they name and require it on
    /// both operands.
    pub fn consistent(
        &self,
        key: &K,
        query: &K,
        strategy: Strategy,
        is_leaf: bool,
    ) -> Result<Consistency> {
        let matches = if let Some(kind) = strategy.ordering_kind() {
            let Some(axis) = K::axis_for_strategy(strategy) else {
                return Err(IndexError::UnsupportedStrategy(strategy));
            };
            let (Some(key_span), Some(query_span)) = (key.axis(axis), query.axis(axis)) else {
                return Err(IndexError::MissingAxis {
                    strategy,
                    axis: K::axis_label(axis),
                });
            };
            ensure_same_kind(key_span, query_span)?;
            ordering_matches(key_span, query_span, kind, is_leaf)
        } else {
            ensure_axis_kinds(key, query)?;
            if is_leaf {
                match strategy {
                    Strategy::Overlap => key.overlaps(query),
                    Strategy::Contains => key.contains_key(query),
                    Strategy::ContainedBy => key.contained_by(query),
                    Strategy::Same => key.same(query),
                    Strategy::Adjacent => key.adjacent(query),
                    _ => unreachable!("every other strategy has an ordering kind"),
                }
            } else {
                match strategy {
                    Strategy::Overlap | Strategy::ContainedBy => key.overlaps(query),
                    Strategy::Contains | Strategy::Same => key.contains_key(query),
                    // Widened per axis: an inner key may touch the query on
                    // one axis while spilling over it on another.
                    Strategy::Adjacent => {
                        key.all_shared_axes(query, |a, b| a.adjacent(b) || a.overlaps(b))
                    }
                    _ => unreachable!("every other strategy has an ordering kind"),
                }
            }
        };

        // Same exactness rule as the span adapter: the box test is lossy
        // only for derived keys under non-ordering strategies.
        let recheck = self.derived_keys && !strategy.is_exact_on_bbox();
        Ok(Consistency::new(matches, recheck))
    }

    /// Run the candidate search on every present axis and keep the single
    /// best axis+candidate.
    fn select_axis(&self, keys: &[K]) -> Option<(usize, SplitCandidate)> {
        let n = keys.len();
        let mut best: Option<(usize, SplitCandidate, f64, f64)> = None;
        for axis in 0..K::DIMENSIONS {
            let spans: Vec<Span> = keys.iter().filter_map(|k| k.axis(axis).copied()).collect();
            if spans.len() != n {
                continue;
            }
            let Some(cand) = search_candidates(&spans, self.config.limit_ratio) else {
                continue;
            };
            let width = spans[1..]
                .iter()
                .fold(spans[0], |acc, s| acc.union_unchecked(s))
                .width();
            let clamped = cand.overlap.max(0.0);
            let better = match &best {
                None => true,
                Some((_, b_cand, b_clamped, b_width)) => {
                    clamped < *b_clamped
                        || (clamped == *b_clamped && width > *b_width)
                        || (clamped == *b_clamped && width == *b_width && cand.ratio > b_cand.ratio)
                }
            };
            if better {
                best = Some((axis, cand, clamped, width));
            }
        }
        best.map(|(axis, cand, _, _)| (axis, cand))
    }

    fn trivial_split(&self, keys: &[K]) -> Result<SplitResult<K>> {
        // Entries already validated as sharing one axis set, so the first
        // present axis is present everywhere.
        let axis = (0..K::DIMENSIONS)
            .find(|&d| keys[0].axis(d).is_some())
            .ok_or(IndexError::EmptyEntries {
                operation: "pick_split",
            })?;
        let spans: Vec<Span> = keys.iter().filter_map(|k| k.axis(axis).copied()).collect();
        if spans.len() != keys.len() {
            return Err(IndexError::DimensionMismatch {
                axis: K::axis_label(axis),
            });
        }
        fallback_split(keys, |i| spans[i], |a, b| merge_axis_keys(a, b))
            .ok_or(IndexError::NotEnoughEntries { got: keys.len() })
    }

    fn validate_entries(&self, entries: &[IndexEntry<K>], operation: &'static str) -> Result<()> {
        let Some(first) = entries.first() else {
            return Err(IndexError::EmptyEntries { operation });
        };
        for entry in &entries[1..] {
            first.key.ensure_same_axes(&entry.key)?;
            ensure_axis_kinds(&first.key, &entry.key)?;
        }
        Ok(())
    }
}

impl<K: AxisKey> Default for BoxRTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Summed per-axis growth over the axes present on both keys.
pub(crate) fn key_growth<K: AxisKey>(original: &K, candidate: &K) -> f64 {
    let mut total = 0.0;
    for n in 0..K::DIMENSIONS {
        if let (Some(a), Some(b)) = (original.axis(n), candidate.axis(n)) {
            total += span_growth(a, b);
        }
    }
    total
}

/// Growth of a group key by a candidate, zero while the group is empty.
fn seeded_growth<K: AxisKey>(group: Option<&K>, candidate: &K) -> f64 {
    group.map_or(0.0, |g| key_growth(g, candidate))
}

/// Error unless every shared axis carries one base-type kind.
fn ensure_axis_kinds<K: AxisKey>(a: &K, b: &K) -> Result<()> {
    for n in 0..K::DIMENSIONS {
        if let (Some(x), Some(y)) = (a.axis(n), b.axis(n)) {
            ensure_same_kind(x, y)?;
        }
    }
    Ok(())
}

fn ordering_matches(key: &Span, query: &Span, kind: OrderingKind, is_leaf: bool) -> bool {
    if is_leaf {
        match kind {
            OrderingKind::Before => key.before(query),
            OrderingKind::OverBefore => key.over_before(query),
            OrderingKind::After => key.after(query),
            OrderingKind::OverAfter => key.over_after(query),
        }
    } else {
        match kind {
            OrderingKind::Before => !key.over_after(query),
            OrderingKind::OverBefore => !key.after(query),
            OrderingKind::After => !key.over_before(query),
            OrderingKind::OverAfter => !key.before(query),
        }
    }
}
