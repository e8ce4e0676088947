//! Quad-tree-family adapter over span keys.
//!
//! A span maps to a point in the two-dimensional space of its bounds
//! (lower on one axis, upper on the other), so an inner node discriminates
//! by a centroid span into four quadrants. Traversal carries a bounding
//! box over that space and prunes quadrants that cannot satisfy every
//! query condition.

use crate::bound::{SpanBound, bound_cmp, bound_max, bound_min};
use crate::error::{IndexError, Result};
use crate::index::rtree::span_leaf_matches;
use crate::index::{Consistency, IndexEntry, ensure_same_kind};
use crate::span::Span;
use crate::strategy::Strategy;
use smallvec::SmallVec;
use std::cmp::Ordering;

/// Position of a span relative to a centroid span, in bound space.
///
/// The names read the bound-space plot: lower bound on the horizontal
/// axis, upper bound on the vertical. `>=` on an axis means at or past
/// the centroid's bound on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// `lower >= centroid.lower` and `upper >= centroid.upper`.
    UpperRight,
    /// `lower >= centroid.lower` and `upper < centroid.upper`.
    LowerRight,
    /// `lower < centroid.lower` and `upper < centroid.upper`.
    LowerLeft,
    /// `lower < centroid.lower` and `upper >= centroid.upper`.
    UpperLeft,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::UpperRight,
        Quadrant::LowerRight,
        Quadrant::LowerLeft,
        Quadrant::UpperLeft,
    ];

    fn from_flags(lower_ge: bool, upper_ge: bool) -> Self {
        match (lower_ge, upper_ge) {
            (true, true) => Quadrant::UpperRight,
            (true, false) => Quadrant::LowerRight,
            (false, false) => Quadrant::LowerLeft,
            (false, true) => Quadrant::UpperLeft,
        }
    }

    /// Stable child slot for this quadrant.
    pub fn index(self) -> usize {
        match self {
            Quadrant::UpperRight => 0,
            Quadrant::LowerRight => 1,
            Quadrant::LowerLeft => 2,
            Quadrant::UpperLeft => 3,
        }
    }

    fn lower_ge(self) -> bool {
        matches!(self, Quadrant::UpperRight | Quadrant::LowerRight)
    }

    fn upper_ge(self) -> bool {
        matches!(self, Quadrant::UpperRight | Quadrant::UpperLeft)
    }
}

/// Inner-node prefix: the discriminating span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Centroid {
    /// A regular discriminating centroid.
    Point(Span),
    /// Every entry under the node equals this span; the quadrants do not
    /// discriminate and traversal must visit all of them.
    Uniform(Span),
}

impl Centroid {
    /// The prefix span itself, regardless of flavor.
    pub fn span(&self) -> &Span {
        match self {
            Centroid::Point(s) | Centroid::Uniform(s) => s,
        }
    }
}

/// Outcome of a quad-tree picksplit: the new inner node's centroid plus
/// one quadrant per input entry, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadSplit {
    pub centroid: Centroid,
    pub assignments: Vec<Quadrant>,
}

/// Static layout contract the host needs to wire the adapter in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadTreeLayout {
    /// Inner prefixes are centroids, not key values.
    pub prefix_is_centroid: bool,
    /// Inner nodes never answer queries by themselves; only leaves carry
    /// reportable entries.
    pub can_return_data: bool,
}

/// One-sided-open interval of bound values along one bound-space axis.
/// `None` means unconstrained on that side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisInterval {
    pub min: Option<SpanBound>,
    pub max: Option<SpanBound>,
}

impl AxisInterval {
    fn clamp_min(&self, bound: SpanBound) -> Self {
        Self {
            min: Some(match self.min {
                Some(m) => bound_max(m, bound),
                None => bound,
            }),
            max: self.max,
        }
    }

    fn clamp_max(&self, bound: SpanBound) -> Self {
        Self {
            min: self.min,
            max: Some(match self.max {
                Some(m) => bound_min(m, bound),
                None => bound,
            }),
        }
    }

    /// `min <= bound`, vacuously true when unconstrained.
    fn min_le(&self, bound: &SpanBound) -> bool {
        self.min
            .as_ref()
            .is_none_or(|m| bound_cmp(m, bound) != Ordering::Greater)
    }

    /// `min < bound`, vacuously true when unconstrained.
    fn min_lt(&self, bound: &SpanBound) -> bool {
        self.min
            .as_ref()
            .is_none_or(|m| bound_cmp(m, bound) == Ordering::Less)
    }

    /// `max >= bound`, vacuously true when unconstrained.
    fn max_ge(&self, bound: &SpanBound) -> bool {
        self.max
            .as_ref()
            .is_none_or(|m| bound_cmp(m, bound) != Ordering::Less)
    }

    /// `max > bound`, vacuously true when unconstrained.
    fn max_gt(&self, bound: &SpanBound) -> bool {
        self.max
            .as_ref()
            .is_none_or(|m| bound_cmp(m, bound) == Ordering::Greater)
    }

    /// Value-level test that `bound`'s value can fall inside the interval,
    /// ignoring inclusivity. Adjacency compares values, not bounds.
    fn admits_value(&self, bound: &SpanBound) -> bool {
        let above_min = self
            .min
            .as_ref()
            .is_none_or(|m| m.value.total_cmp(&bound.value) != Ordering::Greater);
        let below_max = self
            .max
            .as_ref()
            .is_none_or(|m| m.value.total_cmp(&bound.value) != Ordering::Less);
        above_min && below_max
    }
}

/// Bounding box over the bound space accumulated along a root-to-node
/// path: one interval for the reachable lower bounds, one for the
/// reachable upper bounds.
///
/// The root box is unconstrained; [`descend`](Self::descend) narrows it by
/// one centroid per level. The host threads it through traversal as the
/// per-node reconstruction state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TraversalBox {
    pub lower: AxisInterval,
    pub upper: AxisInterval,
}

impl TraversalBox {
    /// The unconstrained root box.
    pub fn root() -> Self {
        Self::default()
    }

    /// Narrow the box for one quadrant of `centroid`.
    pub fn descend(&self, quadrant: Quadrant, centroid: &Span) -> Self {
        let lower = if quadrant.lower_ge() {
            self.lower.clamp_min(*centroid.lower())
        } else {
            self.lower.clamp_max(*centroid.lower())
        };
        let upper = if quadrant.upper_ge() {
            self.upper.clamp_min(*centroid.upper())
        } else {
            self.upper.clamp_max(*centroid.upper())
        };
        Self { lower, upper }
    }

    /// Necessary condition: can some span inside this box satisfy the
    /// strategy against the query? A false negative here would lose
    /// results, so every test errs toward keeping the quadrant.
    fn may_match(&self, query: &Span, strategy: Strategy) -> bool {
        let ql = query.lower();
        let qu = query.upper();
        match strategy {
            // Some lower can sit at or before the query's upper and some
            // upper at or after the query's lower.
            Strategy::Overlap => self.lower.min_le(qu) && self.upper.max_ge(ql),
            Strategy::Contains => self.lower.min_le(ql) && self.upper.max_ge(qu),
            Strategy::ContainedBy => self.lower.max_ge(ql) && self.upper.min_le(qu),
            // Both of the query's bounds must be reachable exactly.
            Strategy::Same => {
                self.lower.min_le(ql)
                    && self.lower.max_ge(ql)
                    && self.upper.min_le(qu)
                    && self.upper.max_ge(qu)
            }
            // Touching compares bound values only, so the box test does too.
            Strategy::Adjacent => {
                self.upper.admits_value(ql) || self.lower.admits_value(qu)
            }
            Strategy::Before => self.upper.min_lt(ql),
            Strategy::OverBefore => self.upper.min_le(qu),
            Strategy::After => self.lower.max_gt(qu),
            Strategy::OverAfter => self.lower.max_ge(ql),
            _ => unreachable!("callers reject non-span strategies"),
        }
    }
}

/// Quad-tree index adapter for span keys.
///
/// ```rust
/// use spanbox::{Centroid, Quadrant, Span, SpanQuadTree};
///
/// let index = SpanQuadTree::for_spans();
/// let centroid = Centroid::Point(Span::int(10, 20)?);
/// let q = index.choose(&Span::int(12, 30)?, &centroid)?;
/// assert_eq!(q, Quadrant::UpperRight);
/// # Ok::<(), spanbox::IndexError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpanQuadTree {
    derived_keys: bool,
}

impl SpanQuadTree {
    /// Adapter for values indexed as their own span.
    pub fn for_spans() -> Self {
        Self {
            derived_keys: false,
        }
    }

    /// Adapter for rich values indexed through a derived bounding span;
    /// matches under lossy strategies carry a recheck.
    pub fn for_derived_keys() -> Self {
        Self { derived_keys: true }
    }

    /// The layout contract for hosts embedding this adapter.
    pub fn layout(&self) -> QuadTreeLayout {
        QuadTreeLayout {
            prefix_is_centroid: true,
            can_return_data: false,
        }
    }

    /// Route a span being inserted to one quadrant of an inner node.
    pub fn choose(&self, key: &Span, centroid: &Centroid) -> Result<Quadrant> {
        let c = centroid.span();
        ensure_same_kind(key, c)?;
        Ok(Quadrant::from_flags(
            bound_cmp(key.lower(), c.lower()) != Ordering::Less,
            bound_cmp(key.upper(), c.upper()) != Ordering::Less,
        ))
    }

    /// Partition overflowing entries into the four quadrants around a
    /// median centroid.
    ///
    /// The centroid takes the median of the sorted lower bounds and the
    /// median of the sorted upper bounds, which splits evenly on both
    /// axes for any distribution.
    pub fn pick_split(&self, entries: &[IndexEntry<Span>]) -> Result<QuadSplit> {
        if entries.len() < 2 {
            return Err(IndexError::NotEnoughEntries { got: entries.len() });
        }
        let first = entries[0].key;
        for entry in &entries[1..] {
            ensure_same_kind(&first, &entry.key)?;
        }

        if entries.iter().all(|e| e.key.same(&first)) {
            // No bound discriminates; flag the node so traversal knows to
            // descend everywhere.
            return Ok(QuadSplit {
                centroid: Centroid::Uniform(first),
                assignments: vec![Quadrant::UpperRight; entries.len()],
            });
        }

        let mut lowers: Vec<SpanBound> = entries.iter().map(|e| *e.key.lower()).collect();
        let mut uppers: Vec<SpanBound> = entries.iter().map(|e| *e.key.upper()).collect();
        lowers.sort_by(|a, b| bound_cmp(a, b));
        uppers.sort_by(|a, b| bound_cmp(a, b));
        let median = entries.len() / 2;
        let centroid = Span::from_bounds(lowers[median], uppers[median]);

        let assignments = entries
            .iter()
            .map(|e| {
                Quadrant::from_flags(
                    bound_cmp(e.key.lower(), centroid.lower()) != Ordering::Less,
                    bound_cmp(e.key.upper(), centroid.upper()) != Ordering::Less,
                )
            })
            .collect();

        Ok(QuadSplit {
            centroid: Centroid::Point(centroid),
            assignments,
        })
    }

    /// Select the quadrants of an inner node that may hold matches for
    /// every query condition, with the narrowed traversal box for each.
    ///
    /// Conditions combine by conjunction: a quadrant survives only if no
    /// condition rules it out.
    pub fn inner_consistent(
        &self,
        node: &TraversalBox,
        centroid: &Centroid,
        queries: &[(Strategy, Span)],
    ) -> Result<SmallVec<[(Quadrant, TraversalBox); 4]>> {
        for (strategy, query) in queries {
            if !strategy.is_span_strategy() {
                return Err(IndexError::UnsupportedStrategy(*strategy));
            }
            ensure_same_kind(query, centroid.span())?;
        }

        let span = match centroid {
            // Quadrants under a uniform node do not discriminate, so no
            // pruning and no narrowing are sound.
            Centroid::Uniform(_) => {
                return Ok(Quadrant::ALL.iter().map(|&q| (q, *node)).collect());
            }
            Centroid::Point(span) => span,
        };

        let mut out = SmallVec::new();
        for &quadrant in &Quadrant::ALL {
            let child = node.descend(quadrant, span);
            if queries.iter().all(|(s, q)| child.may_match(q, *s)) {
                out.push((quadrant, child));
            }
        }
        Ok(out)
    }

    /// Evaluate every query condition against a leaf span.
    pub fn leaf_consistent(
        &self,
        key: &Span,
        queries: &[(Strategy, Span)],
    ) -> Result<Consistency> {
        let mut matches = true;
        for (strategy, query) in queries {
            if !strategy.is_span_strategy() {
                return Err(IndexError::UnsupportedStrategy(*strategy));
            }
            ensure_same_kind(key, query)?;
            matches &= span_leaf_matches(key, query, *strategy);
        }
        // Lossy only for derived keys, and only when some condition
        // actually depends on more than the box endpoints.
        let recheck =
            self.derived_keys && queries.iter().any(|(s, _)| !s.is_exact_on_bbox());
        Ok(Consistency::new(matches, recheck))
    }
}
