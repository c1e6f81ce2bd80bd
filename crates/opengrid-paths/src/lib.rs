//! Open-set primitives for cost-ordered grid search.
//!
//! This crate does not ship a search algorithm. It provides the two pieces
//! every A*/Dijkstra loop is built from:
//!
//! - [`Node`]: one grid cell's terrain data plus its mutable search state,
//!   ordered by `f = g + h` with an epsilon tie rule ([`COST_EPSILON`]).
//! - [`PriorityQueue`]: a binary min-heap over any [`HeapOrd`] element.
//!
//! [`NodeGrid`] owns the nodes of one grid so that `parent` links can be
//! plain [`NodeId`] handles, and [`NodeRef`] lets a queue refer to arena
//! nodes that keep changing while they wait in the open set.
//!
//! # Open/closed protocol
//!
//! The caller drives the search:
//!
//! 1. push the start node, mark it [`NodeState::Open`];
//! 2. pop the minimum, skip it if it is stale or already closed, mark it
//!    [`NodeState::Closed`];
//! 3. for each walkable neighbour, relax `g`, set `h` and `parent`, mark it
//!    open and push it again;
//! 4. once the goal is closed, rebuild the route with [`NodeGrid::path_to`];
//! 5. call [`NodeGrid::reset_all`] before the next search.
//!
//! The queue never deduplicates, so step 2's staleness check is the caller's.

mod grid;
mod node;
mod order;
mod queue;

pub use grid::{GridError, NodeGrid, NodeSpec};
pub use node::{Node, NodeId, NodeRef, NodeState};
pub use order::{COST_EPSILON, HeapOrd, compare_costs};
pub use queue::{PriorityQueue, QueueError};
