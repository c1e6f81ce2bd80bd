use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use opengrid_core::{Point, Vec3};

use crate::order::{HeapOrd, compare_costs};

/// Search bookkeeping for a [`Node`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeState {
    /// Not yet discovered by the current search (also the post-reset state).
    #[default]
    None,
    /// Discovered and waiting in the open set.
    Open,
    /// Minimal cost is final.
    Closed,
}

/// Handle to a node stored in a [`NodeGrid`](crate::NodeGrid).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Flat row-major index into the owning grid.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// One grid cell as seen by a cost-ordered search.
///
/// The terrain fields (`position`, `array_position`, walkability and
/// difficulty) are fixed at construction. The search fields are public and
/// are reset between runs with [`Node::reset`].
///
/// Nodes are ordered by `f = g + h` through [`Node::compare`] only; there is
/// no `PartialOrd` impl. Equality is identity: `a == b` holds only when both
/// refer to the same instance, so a clone is never equal to its source.
/// Hashing uses `position` alone.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    position: Vec3,
    array_position: Point,
    is_walkable: bool,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "positive_multiplier"))]
    difficulty_multiplier: f32,
    /// Predecessor on the best path found so far.
    pub parent: Option<NodeId>,
    pub state: NodeState,
    /// Cost from the start along the best path found so far.
    pub g: f32,
    /// Estimated remaining cost to the goal.
    pub h: f32,
}

impl Node {
    /// Create a node in its initial search state.
    ///
    /// `difficulty_multiplier` should be positive; it is not applied here,
    /// the search loop uses it when pricing a step into this cell.
    pub fn new(
        position: Vec3,
        array_position: Point,
        is_walkable: bool,
        difficulty_multiplier: f32,
    ) -> Self {
        debug_assert!(
            difficulty_multiplier > 0.0,
            "difficulty multiplier must be positive, got {difficulty_multiplier}"
        );
        Self {
            position,
            array_position,
            is_walkable,
            difficulty_multiplier,
            parent: None,
            state: NodeState::None,
            g: 0.0,
            h: 0.0,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn array_position(&self) -> Point {
        self.array_position
    }

    #[inline]
    pub fn is_walkable(&self) -> bool {
        self.is_walkable
    }

    #[inline]
    pub fn difficulty_multiplier(&self) -> f32 {
        self.difficulty_multiplier
    }

    /// Total ordering key, always `g + h`.
    #[inline]
    pub fn f(&self) -> f32 {
        self.g + self.h
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.state == NodeState::Open
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state == NodeState::Closed
    }

    /// Clear the search state, leaving terrain data untouched.
    pub fn reset(&mut self) {
        self.parent = None;
        self.state = NodeState::None;
        self.g = 0.0;
        self.h = 0.0;
    }

    /// Compare by `f`, treating values within
    /// [`COST_EPSILON`](crate::COST_EPSILON) as equal.
    #[inline]
    pub fn compare(&self, other: &Node) -> Ordering {
        compare_costs(self.f(), other.f())
    }
}

#[cfg(feature = "serde")]
fn positive_multiplier<'de, D: serde::Deserializer<'de>>(d: D) -> Result<f32, D::Error> {
    let m = <f32 as serde::Deserialize>::deserialize(d)?;
    if m > 0.0 {
        Ok(m)
    } else {
        Err(serde::de::Error::custom(format!(
            "difficulty multiplier must be positive, got {m}"
        )))
    }
}

impl HeapOrd for Node {
    #[inline]
    fn heap_cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.position.hash(state);
    }
}

// ---------------------------------------------------------------------------
// NodeRef
// ---------------------------------------------------------------------------

/// Open-set entry: a node handle with the `f` it had when pushed.
///
/// Arena nodes stay mutable while referenced from the queue, so the key is
/// captured at push time. When a node is improved and pushed again, the old
/// entry goes stale; compare `f` against the node's current `f()` (or check
/// that it is still open) after popping.
#[derive(Copy, Clone, Debug)]
pub struct NodeRef {
    pub id: NodeId,
    pub f: f32,
}

impl NodeRef {
    #[inline]
    pub fn new(id: NodeId, f: f32) -> Self {
        Self { id, f }
    }

    /// Whether this entry still carries `node`'s current cost.
    #[inline]
    pub fn is_current(&self, node: &Node) -> bool {
        compare_costs(self.f, node.f()) == Ordering::Equal
    }
}

impl HeapOrd for NodeRef {
    #[inline]
    fn heap_cmp(&self, other: &Self) -> Ordering {
        compare_costs(self.f, other.f)
    }
}
