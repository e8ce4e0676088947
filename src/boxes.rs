//! Multi-dimensional bounding boxes: products of independent spans.
//!
//! A box is an ordered tuple of axes, each an optional span. Absence is
//! explicit (`None`), never a sentinel infinity: an absent axis means "not
//! indexed / no constraint" and pruning must treat it that way on either
//! operand. `TBox` pairs a value axis with a time axis; `STBox` covers up
//! to three spatial axes plus time.

use crate::error::{IndexError, Result};
use crate::span::Span;
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A fixed-arity product of optional spans.
///
/// The N-dimensional R-tree adapter is generic over this trait; it is the
/// seam that lets one split/penalty/consistency implementation serve every
/// box dimensionality.
pub trait AxisKey: Clone + PartialEq + Debug {
    /// Number of axes this key type can carry.
    const DIMENSIONS: usize;

    /// A key with every axis absent.
    fn empty() -> Self;

    /// The span on axis `n`, if present.
    fn axis(&self, n: usize) -> Option<&Span>;

    /// Replace the span on axis `n`.
    fn set_axis(&mut self, n: usize, span: Span);

    /// Human-readable axis name, for error reporting.
    fn axis_label(n: usize) -> &'static str;

    /// The axis an ordering strategy names on this key type, if any.
    fn axis_for_strategy(strategy: Strategy) -> Option<usize>;

    /// Smallest key covering both operands.
    ///
    /// Axes present on both sides take the span union; an axis present on
    /// one side only is copied through.
    fn union_covering(&self, other: &Self) -> Result<Self> {
        let mut out = Self::empty();
        for n in 0..Self::DIMENSIONS {
            match (self.axis(n), other.axis(n)) {
                (Some(a), Some(b)) => out.set_axis(n, a.union(b)?),
                (Some(a), None) => out.set_axis(n, *a),
                (None, Some(b)) => out.set_axis(n, *b),
                (None, None) => {}
            }
        }
        Ok(out)
    }

    /// True when the predicate holds on every axis both keys carry.
    ///
    /// An axis present on one side only is no constraint; with no shared
    /// axis at all nothing can be refuted, so the result is true.
    fn all_shared_axes(&self, other: &Self, pred: impl Fn(&Span, &Span) -> bool) -> bool {
        for n in 0..Self::DIMENSIONS {
            if let (Some(a), Some(b)) = (self.axis(n), other.axis(n))
                && !pred(a, b)
            {
                return false;
            }
        }
        true
    }

    /// True when both keys share at least one point on every shared axis.
    fn overlaps(&self, other: &Self) -> bool {
        self.all_shared_axes(other, Span::overlaps)
    }

    /// True when `other` lies inside this key on every shared axis.
    fn contains_key(&self, other: &Self) -> bool {
        self.all_shared_axes(other, Span::contains_span)
    }

    /// True when this key lies inside `other` on every shared axis.
    fn contained_by(&self, other: &Self) -> bool {
        other.contains_key(self)
    }

    /// True when the keys are adjacent on every shared axis.
    fn adjacent(&self, other: &Self) -> bool {
        self.all_shared_axes(other, Span::adjacent)
    }

    /// Exact structural equality, axis presence included.
    fn same(&self, other: &Self) -> bool {
        self == other
    }

    /// Error unless both keys carry exactly the same axes.
    fn ensure_same_axes(&self, other: &Self) -> Result<()> {
        for n in 0..Self::DIMENSIONS {
            if self.axis(n).is_some() != other.axis(n).is_some() {
                return Err(IndexError::DimensionMismatch {
                    axis: Self::axis_label(n),
                });
            }
        }
        Ok(())
    }
}

/// A value-by-time bounding box: axis 0 is the value span, axis 1 the
/// time span. Either may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TBox {
    pub value: Option<Span>,
    pub time: Option<Span>,
}

impl TBox {
    /// Box with both axes present.
    pub fn new(value: Span, time: Span) -> Self {
        Self {
            value: Some(value),
            time: Some(time),
        }
    }

    /// Box constrained on the value axis only.
    pub fn value_only(value: Span) -> Self {
        Self {
            value: Some(value),
            time: None,
        }
    }

    /// Box constrained on the time axis only.
    pub fn time_only(time: Span) -> Self {
        Self {
            value: None,
            time: Some(time),
        }
    }
}

impl AxisKey for TBox {
    const DIMENSIONS: usize = 2;

    fn empty() -> Self {
        Self::default()
    }

    fn axis(&self, n: usize) -> Option<&Span> {
        match n {
            0 => self.value.as_ref(),
            1 => self.time.as_ref(),
            _ => unreachable!(),
        }
    }

    fn set_axis(&mut self, n: usize, span: Span) {
        match n {
            0 => self.value = Some(span),
            1 => self.time = Some(span),
            _ => unreachable!(),
        }
    }

    fn axis_label(n: usize) -> &'static str {
        match n {
            0 => "value",
            1 => "time",
            _ => unreachable!(),
        }
    }

    fn axis_for_strategy(strategy: Strategy) -> Option<usize> {
        match strategy {
            Strategy::Left | Strategy::OverLeft | Strategy::Right | Strategy::OverRight => Some(0),
            Strategy::Before | Strategy::OverBefore | Strategy::After | Strategy::OverAfter => {
                Some(1)
            }
            _ => None,
        }
    }
}

/// A space-by-time bounding box: x, y, z and time axes, any subset present.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct STBox {
    pub x: Option<Span>,
    pub y: Option<Span>,
    pub z: Option<Span>,
    pub time: Option<Span>,
}

impl STBox {
    /// Box with planar spatial axes and time.
    pub fn new_2d(x: Span, y: Span, time: Span) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: None,
            time: Some(time),
        }
    }

    /// Box with all four axes present.
    pub fn new_3d(x: Span, y: Span, z: Span, time: Span) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
            time: Some(time),
        }
    }

    /// Box constrained on the time axis only.
    pub fn time_only(time: Span) -> Self {
        Self {
            time: Some(time),
            ..Self::default()
        }
    }
}

impl AxisKey for STBox {
    const DIMENSIONS: usize = 4;

    fn empty() -> Self {
        Self::default()
    }

    fn axis(&self, n: usize) -> Option<&Span> {
        match n {
            0 => self.x.as_ref(),
            1 => self.y.as_ref(),
            2 => self.z.as_ref(),
            3 => self.time.as_ref(),
            _ => unreachable!(),
        }
    }

    fn set_axis(&mut self, n: usize, span: Span) {
        match n {
            0 => self.x = Some(span),
            1 => self.y = Some(span),
            2 => self.z = Some(span),
            3 => self.time = Some(span),
            _ => unreachable!(),
        }
    }

    fn axis_label(n: usize) -> &'static str {
        match n {
            0 => "x",
            1 => "y",
            2 => "z",
            3 => "time",
            _ => unreachable!(),
        }
    }

    fn axis_for_strategy(strategy: Strategy) -> Option<usize> {
        match strategy {
            Strategy::Left | Strategy::OverLeft | Strategy::Right | Strategy::OverRight => Some(0),
            Strategy::Below | Strategy::OverBelow | Strategy::Above | Strategy::OverAbove => {
                Some(1)
            }
            Strategy::Front | Strategy::OverFront | Strategy::Back | Strategy::OverBack => Some(2),
            Strategy::Before | Strategy::OverBefore | Strategy::After | Strategy::OverAfter => {
                Some(3)
            }
            _ => None,
        }
    }
}
