//! Step graph construction.
//!
//! [`StepGraphBuilder`] converts the flat, parent-linked step list of a call
//! flow into a validated [`Topology`]: one node per step, one directed
//! parent→child edge per step with a parent. The topology is guaranteed to be
//! a forest (no cycles, at most one incoming edge per node) before it is
//! handed to the layout engine.

use indexmap::IndexMap;
use log::{debug, trace};
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use crate::{error::GraphError, flow::Step, geometry::Size};

/// Default node footprint used when no configuration overrides it.
pub const DEFAULT_NODE_SIZE: Size = Size::new(200.0, 100.0);

/// The structured display content of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLabel {
    name: String,
    description: String,
    phrases: Vec<String>,
}

impl NodeLabel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// The phrases joined for display, e.g. `Phrases: hello, goodbye`.
    pub fn phrase_caption(&self) -> String {
        format!("Phrases: {}", self.phrases.join(", "))
    }
}

/// A node of the topology; id copied from the originating step.
#[derive(Debug, Clone)]
pub struct Node {
    id: String,
    label: NodeLabel,
    size: Size,
}

impl Node {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &NodeLabel {
        &self.label
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

/// A directed parent→child edge of the topology.
#[derive(Debug, Clone)]
pub struct Edge {
    id: String,
    source: String,
    target: String,
}

impl Edge {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Id of the parent node.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Id of the child node.
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// A validated node/edge forest derived from a step list.
///
/// Nodes are stored in an arena graph indexed by [`NodeIndex`]; the
/// insertion-ordered id map preserves the authored step order, which the
/// layout engine uses as its stable tie-break. Values of this type are
/// immutable once built and recomputed fresh on every view request.
#[derive(Debug)]
pub struct Topology {
    graph: DiGraph<Node, Edge>,
    node_id_map: IndexMap<String, NodeIndex>,
}

impl Topology {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Node indices in authored step order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.graph[idx]
    }

    /// Looks up a node index by step id.
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_id_map.get(id).copied()
    }

    /// The parent of a node, if it has one.
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    /// Children of a node. Order is unspecified; callers needing the
    /// authored order iterate [`Self::node_indices`] instead.
    pub fn children(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> {
        self.graph.neighbors_directed(idx, Direction::Outgoing)
    }

    /// Root nodes (no incoming edge), in authored step order.
    pub fn roots(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| self.parent(idx).is_none())
    }

    /// All edges with their endpoint indices.
    pub fn edges(&self) -> impl Iterator<Item = (&Edge, NodeIndex, NodeIndex)> {
        self.graph
            .edge_references()
            .map(|edge| (edge.weight(), edge.source(), edge.target()))
    }

    /// Assembles a topology without forest validation. Test hook for the
    /// layout engine's defensive re-validation path.
    #[cfg(test)]
    pub(crate) fn from_parts(
        graph: DiGraph<Node, Edge>,
        node_id_map: IndexMap<String, NodeIndex>,
    ) -> Self {
        Self { graph, node_id_map }
    }
}

/// Builds a [`Topology`] from an authored step sequence.
///
/// Pure: no state survives a [`build`](Self::build) call, and the same input
/// always produces the same topology.
#[derive(Debug, Clone)]
pub struct StepGraphBuilder {
    node_size: Size,
}

impl StepGraphBuilder {
    pub fn new() -> Self {
        Self {
            node_size: DEFAULT_NODE_SIZE,
        }
    }

    /// Sets the uniform node footprint recorded on every node.
    pub fn with_node_size(mut self, size: Size) -> Self {
        self.node_size = size;
        self
    }

    /// Converts the step list into a validated forest topology.
    ///
    /// Validation happens before anything is returned: duplicate step ids,
    /// parent references that resolve to no step, and cyclic parent chains
    /// all fail fast with a typed [`GraphError`].
    pub fn build(&self, steps: &[Step]) -> Result<Topology, GraphError> {
        let mut graph = DiGraph::with_capacity(steps.len(), steps.len());
        let mut node_id_map = IndexMap::with_capacity(steps.len());

        // First pass: one node per step, rejecting duplicate ids.
        for step in steps {
            if node_id_map.contains_key(&step.id) {
                return Err(GraphError::DuplicateId {
                    id: step.id.clone(),
                });
            }

            let node_idx = graph.add_node(Node {
                id: step.id.clone(),
                label: NodeLabel {
                    name: step.name.clone(),
                    description: step.description.clone(),
                    phrases: step.phrases.clone(),
                },
                size: self.node_size,
            });
            node_id_map.insert(step.id.clone(), node_idx);
        }

        // Second pass: one parent→child edge per step with a parent,
        // rejecting dangling references.
        for step in steps {
            let Some(parent) = &step.parent else {
                continue;
            };
            let Some(&source_idx) = node_id_map.get(parent) else {
                return Err(GraphError::DanglingParent {
                    id: step.id.clone(),
                    parent: parent.clone(),
                });
            };
            let target_idx = node_id_map[step.id.as_str()];
            let edge = Edge {
                id: format!("e-{}-{}", parent, step.id),
                source: parent.clone(),
                target: step.id.clone(),
            };
            graph.add_edge(source_idx, target_idx, edge);
        }

        check_acyclic(&graph)?;

        trace!(nodes = graph.node_count(), edges = graph.edge_count(); "Step graph validated");

        Ok(Topology {
            graph,
            node_id_map,
        })
    }
}

impl Default for StepGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks parent links from every node with path marking; revisiting a node
/// already on the current path means the parent chain loops.
fn check_acyclic(graph: &DiGraph<Node, Edge>) -> Result<(), GraphError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; graph.node_count()];

    for start in graph.node_indices() {
        if marks[start.index()] != Mark::Unvisited {
            continue;
        }

        let mut path = Vec::new();
        let mut current = start;
        loop {
            match marks[current.index()] {
                Mark::Done => break,
                Mark::OnPath => {
                    debug!(step_id = graph[current].id(); "Cycle detected in parent links");
                    return Err(GraphError::Cycle {
                        id: graph[current].id.clone(),
                    });
                }
                Mark::Unvisited => {
                    marks[current.index()] = Mark::OnPath;
                    path.push(current);
                    match graph
                        .neighbors_directed(current, Direction::Incoming)
                        .next()
                    {
                        Some(parent) => current = parent,
                        None => break,
                    }
                }
            }
        }

        for idx in path {
            marks[idx.index()] = Mark::Done;
        }
    }

    Ok(())
}

#[cfg(test)]
impl Node {
    pub(crate) fn stub(id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: NodeLabel {
                name: id.to_uppercase(),
                description: String::new(),
                phrases: Vec::new(),
            },
            size: DEFAULT_NODE_SIZE,
        }
    }
}

#[cfg(test)]
impl Edge {
    pub(crate) fn stub(source: &str, target: &str) -> Self {
        Self {
            id: format!("e-{source}-{target}"),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}
