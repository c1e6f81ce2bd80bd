use std::fmt;

use opengrid_core::{Point, Range, Vec3};

use crate::node::{Node, NodeId, NodeRef};

/// Terrain data for one cell, supplied when a [`NodeGrid`] is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSpec {
    pub position: Vec3,
    pub is_walkable: bool,
    pub difficulty_multiplier: f32,
}

impl NodeSpec {
    /// A walkable cell with unit difficulty.
    pub fn open(position: Vec3) -> Self {
        Self {
            position,
            is_walkable: true,
            difficulty_multiplier: 1.0,
        }
    }

    /// An impassable cell.
    pub fn wall(position: Vec3) -> Self {
        Self {
            position,
            is_walkable: false,
            difficulty_multiplier: 1.0,
        }
    }
}

/// Errors from [`NodeGrid`] lookups and path reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// The id does not belong to this grid.
    UnknownNode(NodeId),
    /// Following `parent` links from this node never reached a root.
    ParentCycle(NodeId),
    /// Node count does not match the cell count of the range.
    LayoutMismatch { expected: usize, found: usize },
    /// A node's `array_position` disagrees with its slot in the range.
    MisplacedNode(NodeId),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "node {id} is not part of this grid"),
            Self::ParentCycle(id) => write!(f, "parent links from node {id} form a cycle"),
            Self::LayoutMismatch { expected, found } => {
                write!(f, "grid range holds {expected} cells but {found} nodes were given")
            }
            Self::MisplacedNode(id) => {
                write!(f, "node {id} is stored at a slot that does not match its position")
            }
        }
    }
}

impl std::error::Error for GridError {}

// ---------------------------------------------------------------------------
// NodeGrid
// ---------------------------------------------------------------------------

/// Arena owning one [`Node`] per cell of a [`Range`].
///
/// Nodes are stored row-major and addressed by [`NodeId`]; `parent` links
/// are ids into this arena, never owning pointers. The same grid is meant to
/// serve many searches, with [`reset_all`](Self::reset_all) in between.
///
/// With the `serde` feature, deserialization checks that the nodes fill the
/// range in row-major order and that every `parent` link stays in the arena.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawGrid"))]
pub struct NodeGrid {
    rng: Range,
    #[cfg_attr(feature = "serde", serde(skip_serializing))]
    width: usize,
    nodes: Vec<Node>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGrid {
    rng: Range,
    nodes: Vec<Node>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawGrid> for NodeGrid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self, GridError> {
        let RawGrid { rng, nodes } = raw;
        if nodes.len() != rng.len() {
            return Err(GridError::LayoutMismatch {
                expected: rng.len(),
                found: nodes.len(),
            });
        }
        for ((i, n), p) in nodes.iter().enumerate().zip(rng.iter()) {
            if n.array_position() != p {
                return Err(GridError::MisplacedNode(NodeId(i)));
            }
            if let Some(parent) = n.parent.filter(|parent| parent.0 >= nodes.len()) {
                return Err(GridError::UnknownNode(parent));
            }
        }
        Ok(Self {
            rng,
            width: rng.width().max(0) as usize,
            nodes,
        })
    }
}

impl NodeGrid {
    /// Build a grid over `rng`, asking `cell` for each point's terrain.
    pub fn new(rng: Range, mut cell: impl FnMut(Point) -> NodeSpec) -> Self {
        let nodes: Vec<Node> = rng
            .iter()
            .map(|p| {
                let spec = cell(p);
                Node::new(spec.position, p, spec.is_walkable, spec.difficulty_multiplier)
            })
            .collect();
        log::trace!("built node grid {rng} with {} nodes", nodes.len());
        Self {
            rng,
            width: rng.width().max(0) as usize,
            nodes,
        }
    }

    /// The cell rectangle covered by this grid.
    #[inline]
    pub fn range(&self) -> Range {
        self.rng
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Id of the node at `p`, or `None` outside the range.
    #[inline]
    pub fn id(&self, p: Point) -> Option<NodeId> {
        if !self.rng.contains(p) {
            return None;
        }
        let x = p.x.abs_diff(self.rng.min.x) as usize;
        let y = p.y.abs_diff(self.rng.min.y) as usize;
        Some(NodeId(y * self.width + x))
    }

    /// Grid coordinate of `id`.
    pub fn point(&self, id: NodeId) -> Result<Point, GridError> {
        self.node(id).map(Node::array_position)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Like [`get`](Self::get), but failing with [`GridError::UnknownNode`].
    pub fn node(&self, id: NodeId) -> Result<&Node, GridError> {
        self.get(id).ok_or(GridError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, GridError> {
        self.nodes.get_mut(id.0).ok_or(GridError::UnknownNode(id))
    }

    #[inline]
    pub fn at(&self, p: Point) -> Option<&Node> {
        self.id(p).and_then(|id| self.get(id))
    }

    #[inline]
    pub fn at_mut(&mut self, p: Point) -> Option<&mut Node> {
        let id = self.id(p)?;
        self.get_mut(id)
    }

    /// All nodes with their ids, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Snapshot `id` with its current `f`, ready to push into an open set.
    pub fn node_ref(&self, id: NodeId) -> Result<NodeRef, GridError> {
        self.node(id).map(|n| NodeRef::new(id, n.f()))
    }

    /// Point `child`'s parent link at `parent`, checking both ids.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<(), GridError> {
        self.node(parent)?;
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Reset the search state of every node; terrain data is kept.
    pub fn reset_all(&mut self) {
        for n in &mut self.nodes {
            n.reset();
        }
        log::trace!("reset {} nodes in grid {}", self.nodes.len(), self.rng);
    }

    /// Follow `parent` links back from `goal` and return the route, start
    /// first and `goal` last.
    ///
    /// A node without a parent is the start; a goal that was never reached
    /// therefore yields just `[goal]`. Links that loop (a search started
    /// without [`reset_all`](Self::reset_all)) are reported as
    /// [`GridError::ParentCycle`].
    pub fn path_to(&self, goal: NodeId) -> Result<Vec<NodeId>, GridError> {
        let mut path = vec![goal];
        let mut cur = self.node(goal)?;
        while let Some(parent) = cur.parent {
            if path.len() >= self.nodes.len() {
                log::warn!("parent chain from {goal} exceeds grid size, giving up");
                return Err(GridError::ParentCycle(goal));
            }
            path.push(parent);
            cur = self.node(parent)?;
        }
        path.reverse();
        Ok(path)
    }

    /// [`path_to`](Self::path_to) as grid coordinates.
    pub fn path_points(&self, goal: NodeId) -> Result<Vec<Point>, GridError> {
        self.path_to(goal)?
            .into_iter()
            .map(|id| self.point(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeState;
    use crate::queue::PriorityQueue;

    // '#' wall, '~' rough (x5), anything else open.
    fn grid_from(map: &[&str]) -> NodeGrid {
        let h = map.len() as i32;
        let w = map[0].len() as i32;
        NodeGrid::new(Range::new(0, 0, w, h), |p| {
            let pos = Vec3::new(p.x as f32, 0.0, p.y as f32);
            match map[p.y as usize].as_bytes()[p.x as usize] {
                b'#' => NodeSpec::wall(pos),
                b'~' => NodeSpec {
                    difficulty_multiplier: 5.0,
                    ..NodeSpec::open(pos)
                },
                _ => NodeSpec::open(pos),
            }
        })
    }

    fn manhattan(a: Point, b: Point) -> f32 {
        ((a.x - b.x).abs() + (a.y - b.y).abs()) as f32
    }

    /// Reference open/closed loop: 4-way moves, step cost is the target's
    /// difficulty multiplier, Manhattan heuristic.
    fn search(grid: &mut NodeGrid, from: Point, to: Point) -> Option<Vec<Point>> {
        let start = grid.id(from)?;
        let goal = grid.id(to)?;
        let mut open = PriorityQueue::new();

        {
            let n = grid.get_mut(start)?;
            n.h = manhattan(from, to);
            n.state = NodeState::Open;
        }
        open.push(grid.node_ref(start).ok()?);

        while let Ok(entry) = open.pop() {
            let node = grid.get(entry.id)?;
            if node.is_closed() || !entry.is_current(node) {
                continue;
            }
            let (cur_g, cur_p) = (node.g, node.array_position());
            grid.get_mut(entry.id)?.state = NodeState::Closed;
            if entry.id == goal {
                return grid.path_points(goal).ok();
            }

            for np in cur_p.neighbors_4() {
                let Some(ni) = grid.id(np) else { continue };
                let n = grid.get_mut(ni)?;
                if !n.is_walkable() || n.is_closed() {
                    continue;
                }
                let g = cur_g + n.difficulty_multiplier();
                if n.is_open() && g >= n.g {
                    continue;
                }
                n.g = g;
                n.h = manhattan(np, to);
                n.parent = Some(entry.id);
                n.state = NodeState::Open;
                open.push(NodeRef::new(ni, n.f()));
            }
        }
        None
    }

    #[test]
    fn ids_are_row_major_and_offset_aware() {
        let g = NodeGrid::new(Range::new(2, 3, 5, 5), |p| {
            NodeSpec::open(Vec3::new(p.x as f32, 0.0, p.y as f32))
        });
        assert_eq!(g.len(), 6);
        assert_eq!(g.id(Point::new(2, 3)), Some(NodeId(0)));
        assert_eq!(g.id(Point::new(4, 4)), Some(NodeId(5)));
        assert_eq!(g.id(Point::new(5, 4)), None);
        assert_eq!(g.point(NodeId(4)), Ok(Point::new(3, 4)));
        assert_eq!(g.point(NodeId(6)), Err(GridError::UnknownNode(NodeId(6))));
        assert_eq!(g.at(Point::new(3, 3)).map(Node::position), Some(Vec3::new(3.0, 0.0, 3.0)));
        assert!(g.iter().all(|(id, n)| g.id(n.array_position()) == Some(id)));
    }

    #[test]
    fn builds_terrain_from_specs() {
        let g = grid_from(&[".#", "~."]);
        assert!(g.at(Point::new(0, 0)).is_some_and(Node::is_walkable));
        assert!(!g.at(Point::new(1, 0)).is_some_and(Node::is_walkable));
        assert_eq!(
            g.at(Point::new(0, 1)).map(Node::difficulty_multiplier),
            Some(5.0)
        );
    }

    #[test]
    fn reset_all_clears_search_state() {
        let mut g = grid_from(&["...", "..."]);
        let a = g.id(Point::new(0, 0)).unwrap();
        let b = g.id(Point::new(1, 0)).unwrap();
        g.set_parent(b, a).unwrap();
        {
            let n = g.get_mut(b).unwrap();
            n.g = 2.0;
            n.h = 1.0;
            n.state = NodeState::Closed;
        }
        assert_eq!(g.node_ref(b).map(|r| r.f), Ok(3.0));

        g.reset_all();
        assert!(g.iter().all(|(_, n)| {
            n.parent.is_none() && n.state == NodeState::None && n.f() == 0.0
        }));
        assert!(g.at(Point::new(2, 1)).is_some_and(Node::is_walkable));
    }

    #[test]
    fn set_parent_checks_ids() {
        let mut g = grid_from(&[".."]);
        let bogus = NodeId(40);
        assert_eq!(
            g.set_parent(NodeId(0), bogus),
            Err(GridError::UnknownNode(bogus))
        );
        assert_eq!(
            g.set_parent(bogus, NodeId(0)),
            Err(GridError::UnknownNode(bogus))
        );
        assert_eq!(g.get(NodeId(0)).and_then(|n| n.parent), None);
    }

    #[test]
    fn path_to_walks_parents() {
        let mut g = grid_from(&["...."]);
        for i in 1..4 {
            g.set_parent(NodeId(i), NodeId(i - 1)).unwrap();
        }
        assert_eq!(
            g.path_to(NodeId(3)),
            Ok(vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3)])
        );
        assert_eq!(g.path_to(NodeId(0)), Ok(vec![NodeId(0)]));
        assert_eq!(
            g.path_points(NodeId(2)),
            Ok(vec![Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)])
        );
    }

    #[test]
    fn path_to_detects_cycles() {
        let mut g = grid_from(&["..."]);
        g.set_parent(NodeId(0), NodeId(1)).unwrap();
        g.set_parent(NodeId(1), NodeId(0)).unwrap();
        assert_eq!(g.path_to(NodeId(1)), Err(GridError::ParentCycle(NodeId(1))));
    }

    #[test]
    fn search_finds_shortest_route() {
        let mut g = grid_from(&[
            ".....", //
            ".###.", //
            "...#.", //
        ]);
        let path = search(&mut g, Point::new(0, 2), Point::new(4, 2)).unwrap();
        assert_eq!(path.first(), Some(&Point::new(0, 2)));
        assert_eq!(path.last(), Some(&Point::new(4, 2)));
        assert_eq!(path.len(), 9);
        for w in path.windows(2) {
            assert_eq!(manhattan(w[0], w[1]), 1.0);
            assert!(g.at(w[1]).is_some_and(Node::is_walkable));
        }
        let goal = g.at(Point::new(4, 2)).unwrap();
        assert!(goal.is_closed());
        assert_eq!(goal.g, 8.0);
    }

    #[test]
    fn search_avoids_rough_terrain() {
        let mut g = grid_from(&[
            ".~.", //
            "...", //
        ]);
        let path = search(&mut g, Point::new(0, 0), Point::new(2, 0)).unwrap();
        assert!(!path.contains(&Point::new(1, 0)));
        assert_eq!(g.at(Point::new(2, 0)).map(|n| n.g), Some(4.0));
    }

    #[test]
    fn grid_is_reusable_after_reset() {
        let mut g = grid_from(&["...", ".#.", "..."]);
        let first = search(&mut g, Point::new(0, 0), Point::new(2, 2)).unwrap();
        g.reset_all();
        let back = search(&mut g, Point::new(2, 2), Point::new(0, 0)).unwrap();
        assert_eq!(first.len(), back.len());
        assert_eq!(back.first(), Some(&Point::new(2, 2)));
    }

    #[test]
    fn walled_off_goal_is_unreachable() {
        let mut g = grid_from(&[".#."]);
        assert_eq!(search(&mut g, Point::new(0, 0), Point::new(2, 0)), None);
        let goal = g.id(Point::new(2, 0)).unwrap();
        assert_eq!(g.path_to(goal), Ok(vec![goal]));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            GridError::UnknownNode(NodeId(3)).to_string(),
            "node #3 is not part of this grid"
        );
        assert_eq!(
            GridError::ParentCycle(NodeId(1)).to_string(),
            "parent links from node #1 form a cycle"
        );
        assert_eq!(
            GridError::LayoutMismatch { expected: 4, found: 3 }.to_string(),
            "grid range holds 4 cells but 3 nodes were given"
        );
    }
}
