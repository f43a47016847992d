//! The rank-based layout engine.
//!
//! Specialized for forests: rank assignment is plain tree depth, and the
//! ordering inside a rank is the authored step order, so the output is fully
//! deterministic with no crossing-minimization pass. Each call builds its own
//! working structures; the engine itself only carries immutable spacing
//! configuration and can be shared freely across calls.

use std::collections::VecDeque;

use log::debug;
use petgraph::graph::NodeIndex;

use crate::{
    error::LayoutError,
    geometry::Point,
    graph::Topology,
    layout::{Direction, PositionedEdge, PositionedNode, RenderModel},
};

/// Default gap between consecutive ranks.
pub const DEFAULT_RANK_GAP: f32 = 80.0;

/// Default gap between siblings sharing a rank.
pub const DEFAULT_SIBLING_GAP: f32 = 50.0;

/// The layered layout engine.
pub struct Engine {
    direction: Direction,

    /// Gap between consecutive ranks, along the flow direction.
    rank_gap: f32,

    /// Gap between adjacent nodes within a rank.
    sibling_gap: f32,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            direction: Direction::default(),
            rank_gap: DEFAULT_RANK_GAP,
            sibling_gap: DEFAULT_SIBLING_GAP,
        }
    }

    /// Set the flow direction
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the gap between consecutive ranks
    pub fn set_rank_gap(&mut self, gap: f32) -> &mut Self {
        self.rank_gap = gap;
        self
    }

    /// Set the gap between siblings within a rank
    pub fn set_sibling_gap(&mut self, gap: f32) -> &mut Self {
        self.sibling_gap = gap;
        self
    }

    /// Positions every node of the topology and resolves edge anchors.
    ///
    /// The builder only hands out valid forests, but the engine re-validates
    /// defensively and fails with [`LayoutError::InvalidTopology`] rather
    /// than looping or producing overlapping output.
    pub fn calculate(&self, topology: &Topology) -> Result<RenderModel, LayoutError> {
        if topology.is_empty() {
            return Ok(RenderModel::default());
        }

        let ranks = self.assign_ranks(topology)?;

        // Bucket nodes per rank; iterating node indices keeps the authored
        // step order as the in-rank order.
        let max_rank = ranks.iter().copied().max().unwrap_or(0);
        let mut rank_buckets: Vec<Vec<NodeIndex>> = vec![Vec::new(); max_rank + 1];
        for idx in topology.node_indices() {
            rank_buckets[ranks[idx.index()]].push(idx);
        }

        debug!(
            nodes = topology.node_count(),
            ranks = rank_buckets.len(),
            direction:? = self.direction;
            "Assigning coordinates",
        );

        let positions = self.assign_coordinates(topology, &rank_buckets);

        let nodes: Vec<PositionedNode> = topology
            .node_indices()
            .map(|idx| {
                PositionedNode::new(
                    topology.node(idx).clone(),
                    positions[idx.index()],
                    ranks[idx.index()],
                )
            })
            .collect();

        let edges = topology
            .edges()
            .map(|(edge, source, target)| {
                let (exit, entry) = self.anchors(topology, &positions, source, target);
                PositionedEdge::new(edge.clone(), exit, entry)
            })
            .collect();

        let bounds = nodes
            .iter()
            .skip(1)
            .fold(nodes[0].bounds(), |acc, node| acc.merge(&node.bounds()));

        Ok(RenderModel::new(nodes, edges, bounds))
    }

    /// Rank = depth: breadth-first from all roots, each node visited once.
    fn assign_ranks(&self, topology: &Topology) -> Result<Vec<usize>, LayoutError> {
        const UNRANKED: usize = usize::MAX;

        let mut ranks = vec![UNRANKED; topology.node_count()];
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();

        for root in topology.roots() {
            ranks[root.index()] = 0;
            queue.push_back(root);
        }

        while let Some(idx) = queue.pop_front() {
            for child in topology.children(idx) {
                if ranks[child.index()] != UNRANKED {
                    return Err(LayoutError::InvalidTopology(format!(
                        "node `{}` has more than one incoming edge",
                        topology.node(child).id()
                    )));
                }
                ranks[child.index()] = ranks[idx.index()] + 1;
                queue.push_back(child);
            }
        }

        // A cyclic component has no root, so its nodes stay unranked.
        if let Some(pos) = ranks.iter().position(|&rank| rank == UNRANKED) {
            return Err(LayoutError::InvalidTopology(format!(
                "node `{}` is unreachable from any root; parent links form a cycle",
                topology.node(NodeIndex::new(pos)).id()
            )));
        }

        Ok(ranks)
    }

    /// Top-left corner per node: ranks advance along the flow direction,
    /// siblings advance across it, both as running offsets.
    fn assign_coordinates(
        &self,
        topology: &Topology,
        rank_buckets: &[Vec<NodeIndex>],
    ) -> Vec<Point> {
        let mut positions = vec![Point::default(); topology.node_count()];
        let mut main_offset = 0.0f32;

        for bucket in rank_buckets {
            let mut cross_offset = 0.0f32;
            let mut rank_extent = 0.0f32;

            for &idx in bucket {
                let size = topology.node(idx).size();
                positions[idx.index()] = match self.direction {
                    Direction::TopToBottom => Point::new(cross_offset, main_offset),
                    Direction::LeftToRight => Point::new(main_offset, cross_offset),
                };
                match self.direction {
                    Direction::TopToBottom => {
                        cross_offset += size.width() + self.sibling_gap;
                        rank_extent = rank_extent.max(size.height());
                    }
                    Direction::LeftToRight => {
                        cross_offset += size.height() + self.sibling_gap;
                        rank_extent = rank_extent.max(size.width());
                    }
                }
            }

            main_offset += rank_extent + self.rank_gap;
        }

        positions
    }

    /// Exit/entry anchor points for one edge, fixed by the flow direction.
    fn anchors(
        &self,
        topology: &Topology,
        positions: &[Point],
        source: NodeIndex,
        target: NodeIndex,
    ) -> (Point, Point) {
        let source_pos = positions[source.index()];
        let source_size = topology.node(source).size();
        let target_pos = positions[target.index()];
        let target_size = topology.node(target).size();

        match self.direction {
            Direction::TopToBottom => (
                // bottom-center of the source
                Point::new(
                    source_pos.x() + source_size.width() / 2.0,
                    source_pos.y() + source_size.height(),
                ),
                // top-center of the target
                Point::new(target_pos.x() + target_size.width() / 2.0, target_pos.y()),
            ),
            Direction::LeftToRight => (
                // right-center of the source
                Point::new(
                    source_pos.x() + source_size.width(),
                    source_pos.y() + source_size.height() / 2.0,
                ),
                // left-center of the target
                Point::new(target_pos.x(), target_pos.y() + target_size.height() / 2.0),
            ),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        flow::Step,
        graph::{DEFAULT_NODE_SIZE, StepGraphBuilder},
    };
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn step(id: &str, parent: Option<&str>) -> Step {
        Step {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: String::new(),
            phrases: Vec::new(),
            parent: parent.map(str::to_string),
        }
    }

    fn layout(steps: &[Step], direction: Direction) -> RenderModel {
        let topology = StepGraphBuilder::new().build(steps).unwrap();
        Engine::new()
            .with_direction(direction)
            .calculate(&topology)
            .unwrap()
    }

    #[test]
    fn test_single_root_fork() {
        let steps = [step("a", None), step("b", Some("a")), step("c", Some("a"))];
        let model = layout(&steps, Direction::TopToBottom);

        assert_eq!(model.nodes().len(), 3);
        assert_eq!(model.edges().len(), 2);

        let a = model.node_by_id("a").unwrap();
        let b = model.node_by_id("b").unwrap();
        let c = model.node_by_id("c").unwrap();

        assert_eq!(a.rank(), 0);
        assert_eq!(b.rank(), 1);
        assert_eq!(c.rank(), 1);

        // siblings share the rank row but never a horizontal slot
        assert!(approx_eq!(f32, b.position().y(), c.position().y()));
        assert!(b.position().y() > a.position().y());
        assert!(
            (b.position().x() - c.position().x()).abs()
                >= DEFAULT_NODE_SIZE.width() + DEFAULT_SIBLING_GAP
        );
    }

    #[test]
    fn test_rank_rows_use_node_height_and_gap() {
        let steps = [step("a", None), step("b", Some("a")), step("c", Some("b"))];
        let model = layout(&steps, Direction::TopToBottom);

        let row = DEFAULT_NODE_SIZE.height() + DEFAULT_RANK_GAP;
        assert!(approx_eq!(
            f32,
            model.node_by_id("b").unwrap().position().y(),
            row
        ));
        assert!(approx_eq!(
            f32,
            model.node_by_id("c").unwrap().position().y(),
            2.0 * row
        ));
    }

    #[test]
    fn test_left_to_right_swaps_axes() {
        let steps = [step("a", None), step("b", Some("a")), step("c", Some("a"))];
        let model = layout(&steps, Direction::LeftToRight);

        let a = model.node_by_id("a").unwrap();
        let b = model.node_by_id("b").unwrap();
        let c = model.node_by_id("c").unwrap();

        assert!(approx_eq!(f32, b.position().x(), c.position().x()));
        assert!(b.position().x() > a.position().x());
        assert!(
            (b.position().y() - c.position().y()).abs()
                >= DEFAULT_NODE_SIZE.height() + DEFAULT_SIBLING_GAP
        );
    }

    #[test]
    fn test_edge_anchors_top_to_bottom() {
        let steps = [step("a", None), step("b", Some("a"))];
        let model = layout(&steps, Direction::TopToBottom);

        let a = model.node_by_id("a").unwrap();
        let b = model.node_by_id("b").unwrap();
        let edge = &model.edges()[0];

        assert_eq!(edge.edge().id(), "e-a-b");
        assert!(approx_eq!(f32, edge.exit().x(), a.center().x()));
        assert!(approx_eq!(f32, edge.exit().y(), a.bounds().max_y()));
        assert!(approx_eq!(f32, edge.entry().x(), b.center().x()));
        assert!(approx_eq!(f32, edge.entry().y(), b.bounds().min_y()));
    }

    #[test]
    fn test_edge_anchors_left_to_right() {
        let steps = [step("a", None), step("b", Some("a"))];
        let model = layout(&steps, Direction::LeftToRight);

        let a = model.node_by_id("a").unwrap();
        let b = model.node_by_id("b").unwrap();
        let edge = &model.edges()[0];

        assert!(approx_eq!(f32, edge.exit().x(), a.bounds().max_x()));
        assert!(approx_eq!(f32, edge.exit().y(), a.center().y()));
        assert!(approx_eq!(f32, edge.entry().x(), b.bounds().min_x()));
        assert!(approx_eq!(f32, edge.entry().y(), b.center().y()));
    }

    #[test]
    fn test_bounds_enclose_all_nodes() {
        let steps = [step("a", None), step("b", Some("a")), step("c", Some("a"))];
        let model = layout(&steps, Direction::TopToBottom);

        let bounds = model.bounds();
        assert!(approx_eq!(f32, bounds.min_x(), 0.0));
        assert!(approx_eq!(f32, bounds.min_y(), 0.0));
        assert!(approx_eq!(
            f32,
            bounds.width(),
            2.0 * DEFAULT_NODE_SIZE.width() + DEFAULT_SIBLING_GAP
        ));
        assert!(approx_eq!(
            f32,
            bounds.height(),
            2.0 * DEFAULT_NODE_SIZE.height() + DEFAULT_RANK_GAP
        ));
    }

    #[test]
    fn test_empty_topology() {
        let topology = StepGraphBuilder::new().build(&[]).unwrap();
        let model = Engine::new().calculate(&topology).unwrap();
        assert!(model.is_empty());
        assert!(model.bounds().to_size().is_zero());
    }

    #[test]
    fn test_deterministic_output() {
        let steps = [
            step("root", None),
            step("x", Some("root")),
            step("y", Some("root")),
            step("z", Some("x")),
        ];

        let first = layout(&steps, Direction::TopToBottom);
        let second = layout(&steps, Direction::TopToBottom);

        for (a, b) in first.nodes().iter().zip(second.nodes()) {
            assert_eq!(a.node().id(), b.node().id());
            assert_eq!(a.position(), b.position());
            assert_eq!(a.rank(), b.rank());
        }
        assert_eq!(first.bounds(), second.bounds());
    }

    #[test]
    fn test_multi_parent_topology_rejected() {
        use crate::graph::{Edge, Node, Topology};
        use indexmap::IndexMap;
        use petgraph::graph::DiGraph;

        let mut graph = DiGraph::new();
        let a = graph.add_node(Node::stub("a"));
        let b = graph.add_node(Node::stub("b"));
        let c = graph.add_node(Node::stub("c"));
        graph.add_edge(a, c, Edge::stub("a", "c"));
        graph.add_edge(b, c, Edge::stub("b", "c"));

        let mut map = IndexMap::new();
        map.insert("a".to_string(), a);
        map.insert("b".to_string(), b);
        map.insert("c".to_string(), c);

        let topology = Topology::from_parts(graph, map);
        let err = Engine::new().calculate(&topology).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidTopology(_)));
    }

    #[test]
    fn test_cyclic_topology_rejected() {
        use crate::graph::{Edge, Node, Topology};
        use indexmap::IndexMap;
        use petgraph::graph::DiGraph;

        let mut graph = DiGraph::new();
        let a = graph.add_node(Node::stub("a"));
        let b = graph.add_node(Node::stub("b"));
        graph.add_edge(a, b, Edge::stub("a", "b"));
        graph.add_edge(b, a, Edge::stub("b", "a"));

        let mut map = IndexMap::new();
        map.insert("a".to_string(), a);
        map.insert("b".to_string(), b);

        let topology = Topology::from_parts(graph, map);
        let err = Engine::new().calculate(&topology).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidTopology(_)));
    }

    proptest! {
        /// Random forests (every parent earlier in the list) always build
        /// and lay out with consistent counts, ranks and sibling spacing.
        #[test]
        fn prop_forest_layout_is_consistent(
            parents in prop::collection::vec(prop::option::of(any::<prop::sample::Index>()), 1..32)
        ) {
            let steps: Vec<Step> = parents
                .iter()
                .enumerate()
                .map(|(i, parent)| Step {
                    id: format!("s{i}"),
                    name: format!("S{i}"),
                    description: String::new(),
                    phrases: Vec::new(),
                    parent: if i == 0 {
                        None
                    } else {
                        parent.as_ref().map(|ix| format!("s{}", ix.index(i)))
                    },
                })
                .collect();

            let topology = StepGraphBuilder::new().build(&steps).unwrap();
            prop_assert_eq!(topology.node_count(), steps.len());
            prop_assert_eq!(
                topology.edge_count(),
                steps.iter().filter(|s| s.parent.is_some()).count()
            );

            let model = Engine::new().calculate(&topology).unwrap();

            for step in &steps {
                let node = model.node_by_id(&step.id).unwrap();
                match &step.parent {
                    None => prop_assert_eq!(node.rank(), 0),
                    Some(parent) => {
                        let parent_node = model.node_by_id(parent).unwrap();
                        prop_assert_eq!(node.rank(), parent_node.rank() + 1);
                    }
                }
            }

            for a in model.nodes() {
                for b in model.nodes() {
                    if a.node().id() != b.node().id() && a.rank() == b.rank() {
                        let gap = (a.position().x() - b.position().x()).abs();
                        prop_assert!(gap >= a.size().width() + DEFAULT_SIBLING_GAP - 0.001);
                    }
                }
            }
        }
    }
}
