//! Ordinal base-type values for span bounds.
//!
//! Every bound carries a `Scalar`: a closed set of base-type kinds with
//! their comparators baked in, instead of a runtime registry mapping type
//! identifiers to comparison functions. Adapters validate that all operands
//! share one kind before any algebra runs.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Microseconds per second, the resolution of [`Scalar::Timestamp`].
pub const USECS_PER_SEC: i64 = 1_000_000;

/// The kind of an ordinal base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Int,
    Float,
    Timestamp,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Int => write!(f, "int"),
            ScalarKind::Float => write!(f, "float"),
            ScalarKind::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// A single ordinal value: one endpoint of a span.
///
/// Timestamps are microseconds since the Unix epoch, matching the
/// resolution temporal databases commonly index at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Timestamp(i64),
}

impl Scalar {
    /// The kind tag of this value.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Timestamp(_) => ScalarKind::Timestamp,
        }
    }

    /// Total order over scalars.
    ///
    /// Values of the same kind compare naturally (floats via
    /// `f64::total_cmp`, so NaN has a defined place). Values of different
    /// kinds compare by kind tag; adapters reject mixed kinds at their
    /// entry points, so cross-kind comparison never decides a query.
    pub fn total_cmp(&self, other: &Scalar) -> Ordering {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Float(a), Scalar::Float(b)) => a.total_cmp(b),
            (Scalar::Timestamp(a), Scalar::Timestamp(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    /// Signed difference `self - other` in the base type's natural unit:
    /// integer steps, float delta, or seconds for timestamps.
    pub fn signed_delta(&self, other: &Scalar) -> f64 {
        debug_assert_eq!(self.kind(), other.kind());
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => (*a as f64) - (*b as f64),
            (Scalar::Float(a), Scalar::Float(b)) => a - b,
            (Scalar::Timestamp(a), Scalar::Timestamp(b)) => {
                ((*a as f64) - (*b as f64)) / USECS_PER_SEC as f64
            }
            _ => 0.0,
        }
    }

    /// Absolute distance between two scalars of the same kind.
    pub fn distance(&self, other: &Scalar) -> f64 {
        self.signed_delta(other).abs()
    }

    fn kind_rank(&self) -> u8 {
        match self.kind() {
            ScalarKind::Int => 0,
            ScalarKind::Float => 1,
            ScalarKind::Timestamp => 2,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Timestamp(v) => write!(f, "{}us", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_kind_ordering() {
        assert_eq!(Scalar::Int(1).total_cmp(&Scalar::Int(2)), Ordering::Less);
        assert_eq!(
            Scalar::Float(2.5).total_cmp(&Scalar::Float(2.5)),
            Ordering::Equal
        );
        assert_eq!(
            Scalar::Timestamp(100).total_cmp(&Scalar::Timestamp(50)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_cross_kind_ordering_is_total() {
        let a = Scalar::Int(10);
        let b = Scalar::Float(-1.0);
        let ab = a.total_cmp(&b);
        let ba = b.total_cmp(&a);
        assert_eq!(ab, ba.reverse());
    }

    #[test]
    fn test_signed_delta_units() {
        assert_eq!(Scalar::Int(7).signed_delta(&Scalar::Int(3)), 4.0);
        assert_eq!(
            Scalar::Timestamp(2 * USECS_PER_SEC).signed_delta(&Scalar::Timestamp(0)),
            2.0
        );
        assert_eq!(Scalar::Float(1.0).signed_delta(&Scalar::Float(2.5)), -1.5);
    }

    #[test]
    fn test_distance_is_absolute() {
        assert_eq!(Scalar::Int(3).distance(&Scalar::Int(7)), 4.0);
        assert_eq!(Scalar::Int(7).distance(&Scalar::Int(3)), 4.0);
    }
}
