//! Query strategies: the wire contract with the host's query planner.

use serde::{Deserialize, Serialize};

/// The closed set of query strategies an index can be probed with.
///
/// The first nine apply to one-dimensional spans. The axis-named ordering
/// families (`Left`/`Right` and friends) exist for the multi-dimensional
/// boxes, where "before" is reserved for the time axis; each maps to the
/// same four span-level ordering predicates on the axis it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Overlap,
    Contains,
    ContainedBy,
    Same,
    Adjacent,
    Before,
    OverBefore,
    After,
    OverAfter,
    Left,
    OverLeft,
    Right,
    OverRight,
    Below,
    OverBelow,
    Above,
    OverAbove,
    Front,
    OverFront,
    Back,
    OverBack,
}

/// The four ordering shapes every axis-specific strategy reduces to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingKind {
    /// Strictly before the query on the axis.
    Before,
    /// Does not extend after the query on the axis.
    OverBefore,
    /// Strictly after the query on the axis.
    After,
    /// Does not extend before the query on the axis.
    OverAfter,
}

impl Strategy {
    /// True for the nine strategies defined directly on spans.
    pub fn is_span_strategy(&self) -> bool {
        matches!(
            self,
            Strategy::Overlap
                | Strategy::Contains
                | Strategy::ContainedBy
                | Strategy::Same
                | Strategy::Adjacent
                | Strategy::Before
                | Strategy::OverBefore
                | Strategy::After
                | Strategy::OverAfter
        )
    }

    /// The ordering shape of this strategy, if it is an ordering strategy.
    pub fn ordering_kind(&self) -> Option<OrderingKind> {
        match self {
            Strategy::Before | Strategy::Left | Strategy::Below | Strategy::Front => {
                Some(OrderingKind::Before)
            }
            Strategy::OverBefore
            | Strategy::OverLeft
            | Strategy::OverBelow
            | Strategy::OverFront => Some(OrderingKind::OverBefore),
            Strategy::After | Strategy::Right | Strategy::Above | Strategy::Back => {
                Some(OrderingKind::After)
            }
            Strategy::OverAfter
            | Strategy::OverRight
            | Strategy::OverAbove
            | Strategy::OverBack => Some(OrderingKind::OverAfter),
            _ => None,
        }
    }

    /// True when the bounding-box test decides this strategy exactly.
    ///
    /// Ordering strategies involve original values only through their
    /// endpoints, so the box test is never lossy for them; everything else
    /// requires a recheck against the exact value.
    pub fn is_exact_on_bbox(&self) -> bool {
        self.ordering_kind().is_some()
    }
}
