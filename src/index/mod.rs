//! Index adapters: the four operation families the host invokes.
//!
//! Each adapter is a pure decision engine. The host storage engine owns
//! pages, locking and recursion; it calls in once per page split or per
//! candidate-entry test, and nothing here retains state between calls.

pub mod quadtree;
pub mod rtree;
pub mod rtree_box;
pub(crate) mod split;

pub use quadtree::{
    AxisInterval, Centroid, QuadSplit, QuadTreeLayout, Quadrant, SpanQuadTree, TraversalBox,
};
pub use rtree::SpanRTree;
pub use rtree_box::BoxRTree;

use bytes::Bytes;

/// A leaf payload together with its derived bounding key.
///
/// Ownership is by-value within one call; the engine never keeps an entry
/// past the operation that received it.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry<K> {
    pub key: K,
    pub data: Bytes,
}

impl<K> IndexEntry<K> {
    /// Create an entry from a key and an opaque payload.
    pub fn new(key: K, data: impl Into<Bytes>) -> Self {
        Self {
            key,
            data: data.into(),
        }
    }
}

/// Outcome of a picksplit: a partition of the input entries into two
/// groups, each with its enclosing key.
///
/// Indices refer into the entry slice the split was called with; every
/// input index appears in exactly one group.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult<K> {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
    pub left_key: K,
    pub right_key: K,
    /// True when no candidate met the balance floor and the trivial
    /// sort-and-halve fallback was used.
    pub used_fallback: bool,
}

/// Verdict of a consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consistency {
    /// Whether the key can match the query under the given strategy.
    pub matches: bool,
    /// Whether a match must be re-verified against the exact indexed
    /// value, because the bounding-key test is necessary but not
    /// sufficient.
    pub recheck: bool,
}

impl Consistency {
    pub(crate) fn new(matches: bool, recheck: bool) -> Self {
        Self { matches, recheck }
    }
}

/// Error unless two spans share one base-type kind.
pub(crate) fn ensure_same_kind(a: &crate::span::Span, b: &crate::span::Span) -> crate::Result<()> {
    if a.kind() != b.kind() {
        return Err(crate::IndexError::TypeMismatch {
            expected: a.kind(),
            got: b.kind(),
        });
    }
    Ok(())
}
