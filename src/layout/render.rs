//! The positioned output model handed to rendering surfaces.

use crate::{
    geometry::{Bounds, Point, Size},
    graph::{Edge, Node},
};

/// A node with its assigned position and rank.
///
/// `position` is the node's top-left corner; the logical center sits at
/// `position + size / 2`. `rank` equals the node's depth in the forest.
#[derive(Debug, Clone)]
pub struct PositionedNode {
    node: Node,
    position: Point,
    rank: usize,
}

impl PositionedNode {
    pub(crate) fn new(node: Node, position: Point, rank: usize) -> Self {
        Self {
            node,
            position,
            rank,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Top-left corner of the node.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> Size {
        self.node.size()
    }

    /// Logical center of the node.
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x() + self.size().width() / 2.0,
            self.position.y() + self.size().height() / 2.0,
        )
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_origin(self.position, self.size())
    }
}

/// An edge with its geometric exit/entry anchors resolved.
///
/// For a top-to-bottom layout the source exits at its bottom-center and the
/// target is entered at its top-center; left-to-right swaps the axes.
#[derive(Debug, Clone)]
pub struct PositionedEdge {
    edge: Edge,
    exit: Point,
    entry: Point,
}

impl PositionedEdge {
    pub(crate) fn new(edge: Edge, exit: Point, entry: Point) -> Self {
        Self { edge, exit, entry }
    }

    pub fn edge(&self) -> &Edge {
        &self.edge
    }

    /// Anchor point where the edge leaves its source node.
    pub fn exit(&self) -> Point {
        self.exit
    }

    /// Anchor point where the edge enters its target node.
    pub fn entry(&self) -> Point {
        self.entry
    }
}

/// The complete positioned output of a layout run.
#[derive(Debug, Clone, Default)]
pub struct RenderModel {
    nodes: Vec<PositionedNode>,
    edges: Vec<PositionedEdge>,
    bounds: Bounds,
}

impl RenderModel {
    pub(crate) fn new(
        nodes: Vec<PositionedNode>,
        edges: Vec<PositionedEdge>,
        bounds: Bounds,
    ) -> Self {
        Self {
            nodes,
            edges,
            bounds,
        }
    }

    /// Positioned nodes in authored step order.
    pub fn nodes(&self) -> &[PositionedNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[PositionedEdge] {
        &self.edges
    }

    /// Bounding box enclosing all positioned nodes.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a positioned node by step id.
    pub fn node_by_id(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.node().id() == id)
    }
}
