//! Bounding-key extraction: the collaborator interface.
//!
//! Value representations live outside this crate; all the engine asks of
//! them is a cheap bounding key per value. Types whose key captures them
//! exactly (a span indexed as itself) report `is_exact() == true`; richer
//! temporal values behind a bounding box report false, which forces a
//! recheck on every leaf match.

use crate::boxes::{STBox, TBox};
use crate::span::Span;

/// Extraction of an index key from an indexed value.
///
/// Implementations must be cheap: this runs on every insert and on every
/// query argument.
pub trait ExtractKey {
    /// The bounding key type this value is indexed under.
    type Key;

    /// The bounding key of this value.
    fn extract(&self) -> Self::Key;

    /// True when the key loses no information about the value.
    fn is_exact(&self) -> bool;
}

impl ExtractKey for Span {
    type Key = Span;

    fn extract(&self) -> Span {
        *self
    }

    fn is_exact(&self) -> bool {
        true
    }
}

impl ExtractKey for TBox {
    type Key = TBox;

    fn extract(&self) -> TBox {
        *self
    }

    fn is_exact(&self) -> bool {
        true
    }
}

impl ExtractKey for STBox {
    type Key = STBox;

    fn extract(&self) -> STBox {
        *self
    }

    fn is_exact(&self) -> bool {
        true
    }
}
