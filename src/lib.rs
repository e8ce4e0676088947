//! Bounding-interval index engine: R-tree-family and quad-tree-family
//! adapters over spans, temporal boxes and spatio-temporal boxes.
//!
//! The adapters are pure decision engines for a host storage layer in the
//! GiST/SP-GiST mold: the host owns pages, traversal and recursion, and
//! calls in for union, penalty, picksplit and consistency decisions.
//!
//! ```rust
//! use spanbox::{IndexEntry, Span, SpanRTree, Strategy};
//!
//! let index = SpanRTree::for_spans();
//! let entries = vec![
//!     IndexEntry::new(Span::int(0, 10)?, &b"a"[..]),
//!     IndexEntry::new(Span::int(20, 30)?, &b"b"[..]),
//! ];
//! let page_key = index.union(&entries)?;
//!
//! let verdict = index.consistent(&page_key, &Span::int(5, 25)?, Strategy::Overlap, false)?;
//! assert!(verdict.matches);
//! # Ok::<(), spanbox::IndexError>(())
//! ```

pub mod bound;
pub mod boxes;
pub mod config;
pub mod error;
pub mod extract;
pub mod index;
pub mod scalar;
pub mod span;
pub mod strategy;

pub use bound::SpanBound;
pub use boxes::{AxisKey, STBox, TBox};
pub use config::IndexConfig;
pub use error::{IndexError, Result};
pub use extract::ExtractKey;
pub use scalar::{Scalar, ScalarKind};
pub use span::Span;
pub use strategy::{OrderingKind, Strategy};

pub use index::{
    AxisInterval, BoxRTree, Centroid, Consistency, IndexEntry, QuadSplit, QuadTreeLayout,
    Quadrant, SpanQuadTree, SpanRTree, SplitResult, TraversalBox,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{IndexConfig, IndexError, Result};

    pub use crate::{Scalar, ScalarKind, Span, SpanBound};

    pub use crate::{AxisKey, ExtractKey, STBox, TBox};

    pub use crate::{OrderingKind, Strategy};

    pub use crate::index::{
        BoxRTree, Centroid, Consistency, IndexEntry, SpanQuadTree, SpanRTree, SplitResult,
        TraversalBox,
    };
}
