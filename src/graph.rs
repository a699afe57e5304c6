//! De Bruijn graph construction and Eulerian walks.
//!
//! Building and walking are split: [`DeBruijnBuilder`] accepts fragments and
//! [`DeBruijnBuilder::build`] hands back an immutable [`DeBruijnGraph`]. Each
//! inserted fragment of length `k` becomes one directed edge from the node of
//! its `(k - 1)` prefix to the node of its `(k - 1)` suffix. Nodes are
//! deduplicated by structural equality of their labels, and repeated
//! fragments produce parallel edges.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use log::{debug, trace};

use crate::error::{AssemblyError, Infeasibility, Result};
use crate::unit::SequenceUnit;

/// Index of a node in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A distinct prefix/suffix observed while building the graph.
#[derive(Debug, Clone)]
pub struct Node<K> {
    label: K,
    inbound: usize,
    outbound: usize,
}

impl<K> Node<K> {
    fn new(label: K) -> Self {
        Self {
            label,
            inbound: 0,
            outbound: 0,
        }
    }

    pub fn label(&self) -> &K {
        &self.label
    }

    pub fn inbound(&self) -> usize {
        self.inbound
    }

    pub fn outbound(&self) -> usize {
        self.outbound
    }

    /// `inbound - outbound`.
    pub fn delta(&self) -> isize {
        self.inbound as isize - self.outbound as isize
    }

    pub fn is_balanced(&self) -> bool {
        self.inbound == self.outbound
    }

    pub fn is_semi_balanced(&self) -> bool {
        self.delta().abs() == 1
    }
}

/// Feasible walk shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eulerian {
    /// Every node is balanced.
    Circuit,
    /// `head` has one surplus outbound edge, `tail` one surplus inbound edge.
    Path { head: NodeId, tail: NodeId },
}

/// Mutable build phase of a De Bruijn graph.
#[derive(Debug, Clone)]
pub struct DeBruijnBuilder<K> {
    fragment_len: usize,
    nodes: Vec<Node<K>>,
    index: HashMap<K, NodeId>,
    adjacency: Vec<Vec<NodeId>>,
    edge_count: usize,
}

impl<K> DeBruijnBuilder<K>
where
    K: SequenceUnit + Eq + Hash + Clone,
{
    /// Create a builder that only accepts fragments of length `fragment_len`.
    pub fn new(fragment_len: usize) -> Self {
        Self {
            fragment_len,
            nodes: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
            edge_count: 0,
        }
    }

    pub fn fragment_len(&self) -> usize {
        self.fragment_len
    }

    /// Insert one fragment as an edge `prefix -> suffix`.
    ///
    /// The builder is untouched when the fragment has the wrong length.
    pub fn insert(&mut self, unit: &K) -> Result<()> {
        let actual = unit.size();
        if actual != self.fragment_len {
            return Err(AssemblyError::SizeMismatch {
                expected: self.fragment_len,
                actual,
            });
        }

        let from = self.node_for(unit.prefix());
        let to = self.node_for(unit.suffix());

        self.nodes[from.0].outbound += 1;
        self.nodes[to.0].inbound += 1;
        self.adjacency[from.0].push(to);
        self.edge_count += 1;
        Ok(())
    }

    /// Insert every fragment in order, stopping at the first error.
    pub fn extend<'a, I>(&mut self, units: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        units.into_iter().try_for_each(|unit| self.insert(unit))
    }

    fn node_for(&mut self, label: K) -> NodeId {
        if let Some(&id) = self.index.get(&label) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.index.insert(label.clone(), id);
        self.nodes.push(Node::new(label));
        self.adjacency.push(Vec::new());
        id
    }

    /// Freeze the builder into a walkable graph.
    pub fn build(self) -> DeBruijnGraph<K> {
        debug!(
            "Built De Bruijn graph (k = {}): {} nodes, {} edges",
            self.fragment_len,
            self.nodes.len(),
            self.edge_count
        );
        DeBruijnGraph {
            fragment_len: self.fragment_len,
            nodes: self.nodes,
            index: self.index,
            adjacency: self.adjacency,
            edge_count: self.edge_count,
        }
    }
}

/// Immutable De Bruijn graph ready for traversal.
#[derive(Debug, Clone)]
pub struct DeBruijnGraph<K> {
    fragment_len: usize,
    nodes: Vec<Node<K>>,
    index: HashMap<K, NodeId>,
    adjacency: Vec<Vec<NodeId>>,
    edge_count: usize,
}

/// Identifies the adjacency entry used to reach a node during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EdgeRef {
    from: NodeId,
    slot: usize,
}

impl<K> DeBruijnGraph<K>
where
    K: Eq + Hash,
{
    pub fn fragment_len(&self) -> usize {
        self.fragment_len
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Nodes in registration order, paired with their ids.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node<K>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx), node))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<K>> {
        self.nodes.get(id.0)
    }

    /// Look up a node by label.
    pub fn node_id(&self, label: &K) -> Option<NodeId> {
        self.index.get(label).copied()
    }

    /// Outgoing edge targets of `id`, in insertion order.
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        self.adjacency
            .get(id.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Classify the degree distribution as a circuit, a path, or neither.
    pub fn classify(&self) -> Result<Eulerian> {
        let mut head = None;
        let mut tail = None;
        let mut semi_balanced = 0usize;
        let mut unbalanced = 0usize;

        for (id, node) in self.nodes() {
            match node.delta() {
                0 => {}
                -1 => {
                    head = Some(id);
                    semi_balanced += 1;
                }
                1 => {
                    tail = Some(id);
                    semi_balanced += 1;
                }
                _ => unbalanced += 1,
            }
        }

        debug!(
            "Degree classification: {} semi-balanced, {} unbalanced of {} nodes",
            semi_balanced,
            unbalanced,
            self.nodes.len()
        );

        if unbalanced > 0 {
            return Err(AssemblyError::NotEulerian(Infeasibility::Unbalanced {
                count: unbalanced,
            }));
        }

        match (semi_balanced, head, tail) {
            (0, _, _) => Ok(Eulerian::Circuit),
            (2, Some(head), Some(tail)) => Ok(Eulerian::Path { head, tail }),
            (2, _, _) => Err(AssemblyError::NotEulerian(
                Infeasibility::MismatchedEndpoints,
            )),
            (count, _, _) => Err(AssemblyError::NotEulerian(
                Infeasibility::SemiBalanced { count },
            )),
        }
    }

    /// Compute an Eulerian walk as a sequence of node ids.
    ///
    /// Every edge is used exactly once. A path has `edge_count() + 1`
    /// entries and starts at its head. A circuit drops its repeated closing
    /// node, leaving `edge_count()` entries that start at the first
    /// registered node with an outgoing edge; any other rotation would be
    /// just as valid.
    pub fn eulerian_walk(&self) -> Result<Vec<NodeId>> {
        if self.edge_count == 0 {
            return Err(AssemblyError::EmptyGraph);
        }

        let shape = self.classify()?;

        // A path is walked as a circuit closed by one extra tail -> head edge.
        let bridge = match shape {
            Eulerian::Circuit => None,
            Eulerian::Path { head, tail } => Some((tail, head)),
        };
        let bridge_ref = bridge.map(|(tail, _)| EdgeRef {
            from: tail,
            slot: self.adjacency[tail.0].len(),
        });
        let target = |from: NodeId, slot: usize| -> Option<NodeId> {
            match self.adjacency[from.0].get(slot) {
                Some(&to) => Some(to),
                None => match bridge {
                    Some((tail, head)) if tail == from && slot == self.adjacency[from.0].len() => {
                        Some(head)
                    }
                    _ => None,
                },
            }
        };

        let start = self
            .adjacency
            .iter()
            .position(|targets| !targets.is_empty())
            .map(NodeId)
            .ok_or(AssemblyError::EmptyGraph)?;

        let total_edges = self.edge_count + usize::from(bridge.is_some());
        let mut cursor = vec![0usize; self.nodes.len()];
        let mut stack: Vec<(NodeId, Option<EdgeRef>)> = vec![(start, None)];
        let mut circuit: Vec<(NodeId, Option<EdgeRef>)> = Vec::with_capacity(total_edges + 1);

        while let Some(&(node, _)) = stack.last() {
            let slot = cursor[node.0];
            match target(node, slot) {
                Some(next) => {
                    cursor[node.0] += 1;
                    stack.push((next, Some(EdgeRef { from: node, slot })));
                }
                None => {
                    if let Some(frame) = stack.pop() {
                        circuit.push(frame);
                    }
                }
            }
        }
        trace!(
            "Hierholzer traversal finished with {} circuit entries",
            circuit.len()
        );

        let visited = circuit.len().saturating_sub(1);
        if visited != total_edges {
            return Err(AssemblyError::NotEulerian(Infeasibility::Disconnected {
                visited,
                total: total_edges,
            }));
        }

        circuit.reverse();
        let entry = bridge_ref.and_then(|bridge_ref| {
            circuit
                .iter()
                .position(|&(_, via)| via == Some(bridge_ref))
        });

        // First and last entries are the same node; keep one. A bridge that
        // enters the dropped last entry maps onto index 0.
        circuit.pop();
        if let Some(entry) = entry {
            let len = circuit.len();
            circuit.rotate_left(entry % len);
        }

        Ok(circuit.into_iter().map(|(node, _)| node).collect())
    }
}

impl<K> DeBruijnGraph<K>
where
    K: Eq + Hash + Display,
{
    /// Compute an Eulerian walk and render each node label.
    pub fn compute_walk(&self) -> Result<Vec<String>> {
        let walk = self.eulerian_walk()?;
        Ok(walk
            .into_iter()
            .map(|id| self.nodes[id.0].label.to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmer::PackedKmer;

    fn graph_from(k: usize, fragments: &[&str]) -> DeBruijnGraph<PackedKmer> {
        let mut builder = DeBruijnBuilder::new(k);
        for fragment in fragments {
            builder.insert(&PackedKmer::encode(fragment)).unwrap();
        }
        builder.build()
    }

    fn id_of(graph: &DeBruijnGraph<PackedKmer>, text: &str) -> NodeId {
        graph.node_id(&PackedKmer::encode(text)).expect("node present")
    }

    #[test]
    fn builds_deduplicated_nodes_and_edges() {
        let graph = graph_from(3, &["ACT", "CTG", "TGA"]);
        assert_eq!(graph.fragment_len(), 3);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);

        let labels: Vec<String> = graph.nodes().map(|(_, n)| n.label().to_string()).collect();
        assert_eq!(labels, ["AC", "CT", "TG", "GA"]);

        let ac = id_of(&graph, "AC");
        let ct = id_of(&graph, "CT");
        assert_eq!(graph.successors(ac), &[ct]);
        assert_eq!(graph.node(ac).unwrap().outbound(), 1);
        assert_eq!(graph.node(ac).unwrap().inbound(), 0);
    }

    #[test]
    fn size_mismatch_leaves_builder_unchanged() {
        let mut builder = DeBruijnBuilder::new(3);
        builder.insert(&PackedKmer::encode("ACT")).unwrap();
        let err = builder.insert(&PackedKmer::encode("ACTG")).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::SizeMismatch {
                expected: 3,
                actual: 4
            }
        );

        let graph = builder.build();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.node_id(&PackedKmer::encode("CTG")).is_none());
    }

    #[test]
    fn walks_simple_path() {
        let graph = graph_from(3, &["ACT", "CTG", "TGA"]);
        assert_eq!(
            graph.classify().unwrap(),
            Eulerian::Path {
                head: id_of(&graph, "AC"),
                tail: id_of(&graph, "GA"),
            }
        );
        assert_eq!(graph.compute_walk().unwrap(), ["AC", "CT", "TG", "GA"]);
    }

    #[test]
    fn repeated_fragments_become_parallel_edges() {
        let graph = graph_from(3, &["ACA", "CAC", "ACA"]);
        let ac = id_of(&graph, "AC");
        let ca = id_of(&graph, "CA");
        assert_eq!(graph.successors(ac), &[ca, ca]);
        assert_eq!(graph.node(ca).unwrap().inbound(), 2);
        assert_eq!(graph.compute_walk().unwrap(), ["AC", "CA", "AC", "CA"]);
    }

    #[test]
    fn path_starts_at_head_when_head_is_revisited() {
        let graph = graph_from(3, &["ACA", "CAC", "ACT"]);
        let walk = graph.compute_walk().unwrap();
        assert_eq!(walk, ["AC", "CA", "AC", "CT"]);
        assert_eq!(walk.len(), graph.edge_count() + 1);
    }

    #[test]
    fn path_rotation_when_start_is_mid_path() {
        // First registered node with edges is CT, not the head GA.
        let graph = graph_from(3, &["CTA", "GAC", "ACT"]);
        assert_eq!(graph.compute_walk().unwrap(), ["GA", "AC", "CT", "TA"]);
    }

    #[test]
    fn circuit_drops_closing_node() {
        let graph = graph_from(3, &["ACG", "CGA", "GAC"]);
        assert_eq!(graph.classify().unwrap(), Eulerian::Circuit);
        assert_eq!(graph.compute_walk().unwrap(), ["AC", "CG", "GA"]);
    }

    #[test]
    fn self_loop_on_head_still_forms_a_path() {
        // AA: in 1 (self loop), out 2; CA: in 1.
        let graph = graph_from(3, &["AAA", "AAC", "ACA"]);
        assert!(matches!(graph.classify().unwrap(), Eulerian::Path { .. }));
        assert_eq!(graph.compute_walk().unwrap(), ["AA", "AA", "AC", "CA"]);
    }

    #[test]
    fn rejects_unbalanced_node() {
        // AA: in 1, out 3.
        let graph = graph_from(3, &["AAA", "AAC", "ACA", "AAG"]);
        assert!(matches!(
            graph.compute_walk(),
            Err(AssemblyError::NotEulerian(Infeasibility::Unbalanced { count: 1 }))
        ));
    }

    #[test]
    fn rejects_three_semi_balanced_nodes() {
        // A fans out to C, G and T; the fan-out node itself is unbalanced.
        let graph = graph_from(2, &["AC", "AG", "AT"]);
        let semi = graph.nodes().filter(|(_, n)| n.is_semi_balanced()).count();
        assert_eq!(semi, 3);
        assert!(matches!(
            graph.compute_walk(),
            Err(AssemblyError::NotEulerian(_))
        ));
    }

    #[test]
    fn rejects_four_semi_balanced_nodes() {
        let graph = graph_from(2, &["AC", "GT"]);
        assert_eq!(
            graph.classify().unwrap_err(),
            AssemblyError::NotEulerian(Infeasibility::SemiBalanced { count: 4 })
        );
    }

    #[test]
    fn rejects_balanced_but_disconnected_graph() {
        let graph = graph_from(3, &["ACA", "CAC", "GTG", "TGT"]);
        assert_eq!(graph.classify().unwrap(), Eulerian::Circuit);
        assert_eq!(
            graph.eulerian_walk().unwrap_err(),
            AssemblyError::NotEulerian(Infeasibility::Disconnected {
                visited: 2,
                total: 4
            })
        );
    }

    #[test]
    fn empty_graph_has_no_walk() {
        let graph: DeBruijnGraph<PackedKmer> = DeBruijnBuilder::new(3).build();
        assert_eq!(graph.compute_walk(), Err(AssemblyError::EmptyGraph));
    }

    #[test]
    fn works_over_plain_strings() {
        let mut builder = DeBruijnBuilder::new(4);
        let reads: Vec<String> = ["GATT", "ATTA", "TTAC"].iter().map(|s| s.to_string()).collect();
        builder.extend(&reads).unwrap();
        let graph = builder.build();
        assert_eq!(graph.compute_walk().unwrap(), ["GAT", "ATT", "TTA", "TAC"]);
    }
}
