//! Root-to-leaf lineage enumeration.
//!
//! Every distinct path from a root (a node without parents) down to the
//! queried node is returned as a [`Lineage`], root first. The walk is a full
//! enumeration: a node with several parents yields one lineage per ancestor
//! path. It never fails:
//! - a parent that was never described becomes a `missing` node, which has no
//!   parents and so ends its branch;
//! - a parent already present in the current chain (compared by pid) ends the
//!   branch with a synthetic `loop` node carrying that pid at the head.
//!
//! The walk uses an explicit stack instead of recursion so deep hierarchies
//! cannot overflow the call stack. Frames are pushed in reverse so lineages
//! come out in the same order a recursive walk over parents in declaration
//! order would produce them.

use crate::graph::Graph;
use crate::node::Node;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// An ordered chain of nodes: root first, queried node last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Lineage {
    nodes: Vec<Node>,
}

impl Lineage {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Head of the chain. A `loop` or `missing` node when the walk ended early.
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// The queried node.
    pub fn target(&self) -> Option<&Node> {
        self.nodes.last()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True if the walk hit a cycle on this branch.
    pub fn has_loop(&self) -> bool {
        self.nodes.iter().any(Node::is_loop)
    }

    /// True if any ancestor on this branch was never described.
    pub fn has_missing(&self) -> bool {
        self.nodes.iter().any(Node::is_missing)
    }

    pub fn pids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.pid.as_str()).collect()
    }
}

impl From<VecDeque<Node>> for Lineage {
    fn from(chain: VecDeque<Node>) -> Self {
        Self {
            nodes: chain.into(),
        }
    }
}

impl fmt::Display for Lineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            f.write_str(&node.pid)?;
            if let Some(state) = node.state.as_ref().filter(|s| s.is_synthetic()) {
                write!(f, " [{}]", state)?;
            }
        }
        Ok(())
    }
}

/// Pending work on the walk stack.
enum Frame {
    /// Expand the head of this chain upward.
    Walk(VecDeque<Node>),
    /// A finished chain (cycle detected) waiting for its turn in the output.
    Emit(VecDeque<Node>),
}

impl Graph {
    /// Enumerate every lineage ending at `node`.
    ///
    /// May insert `missing` placeholders for undescribed parents.
    /// A node with no parents yields a single lineage containing only itself.
    pub fn ancestries(&mut self, node: &Node) -> Vec<Lineage> {
        let mut collections = Vec::new();
        let mut stack = vec![Frame::Walk(VecDeque::from([node.clone()]))];

        while let Some(frame) = stack.pop() {
            let lineage = match frame {
                Frame::Emit(chain) => {
                    collections.push(Lineage::from(chain));
                    continue;
                }
                Frame::Walk(chain) => chain,
            };

            let parents = self.parents_of(&lineage[0]);
            if parents.is_empty() {
                collections.push(Lineage::from(lineage));
                continue;
            }

            let mut branches = Vec::with_capacity(parents.len());
            for parent in parents {
                let mut branch = lineage.clone();
                if lineage.iter().any(|n| n.pid == parent.pid) {
                    debug!(pid = %parent.pid, target = %node.pid, "loop detected in lineage");
                    branch.push_front(Node::looped(&parent.pid));
                    branches.push(Frame::Emit(branch));
                } else {
                    branch.push_front(parent);
                    branches.push(Frame::Walk(branch));
                }
            }
            stack.extend(branches.into_iter().rev());
        }

        collections
    }

    /// Enumerate lineages for the node with `pid`, or `None` if it is unknown.
    pub fn ancestries_of(&mut self, pid: &str) -> Option<Vec<Lineage>> {
        let node = self.lookup(pid)?.clone();
        Some(self.ancestries(&node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::RelationshipRecord;
    use crate::node::State;

    fn graph_from(edges: &[(&str, &str)]) -> Graph {
        let mut graph = Graph::new();
        for (child, parent) in edges {
            graph.insert_relationship(RelationshipRecord {
                child: (*child).to_string(),
                parent: (*parent).to_string(),
            });
        }
        graph
    }

    #[test]
    fn test_lineage_display_marks_synthetic_nodes() {
        let mut graph = graph_from(&[("a:1", "b:1")]);
        let lineages = graph.ancestries_of("a:1").unwrap();
        assert_eq!(lineages[0].to_string(), "b:1 [missing] -> a:1 [missing]");
    }

    #[test]
    fn test_output_order_matches_declaration_order() {
        // a has parents b (loop back to a), c (root), d (root)
        let mut graph = graph_from(&[("a:1", "b:1"), ("a:1", "c:1"), ("a:1", "d:1"), ("b:1", "a:1")]);
        let lineages = graph.ancestries_of("a:1").unwrap();
        let rendered: Vec<Vec<&str>> = lineages.iter().map(Lineage::pids).collect();
        assert_eq!(
            rendered,
            vec![
                vec!["a:1", "b:1", "a:1"],
                vec!["c:1", "a:1"],
                vec!["d:1", "a:1"],
            ]
        );
        assert_eq!(lineages[0].root().unwrap().state, Some(State::Loop));
    }

    #[test]
    fn test_loop_marker_does_not_leak_into_siblings() {
        // x has parents y and z; y's only parent is x (cycle); z is a root.
        let mut graph = graph_from(&[("x:1", "y:1"), ("x:1", "z:1"), ("y:1", "x:1")]);
        let lineages = graph.ancestries_of("x:1").unwrap();
        assert_eq!(lineages.len(), 2);
        assert!(lineages[0].has_loop());
        assert!(!lineages[1].has_loop());
        assert_eq!(lineages[1].pids(), vec!["z:1", "x:1"]);
    }

    #[test]
    fn test_unknown_pid() {
        let mut graph = Graph::new();
        assert!(graph.ancestries_of("nope:1").is_none());
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut graph = Graph::new();
        for i in 0..2_000 {
            graph.insert_relationship(RelationshipRecord {
                child: format!("n:{}", i),
                parent: format!("n:{}", i + 1),
            });
        }
        let lineages = graph.ancestries_of("n:0").unwrap();
        assert_eq!(lineages.len(), 1);
        assert_eq!(lineages[0].len(), 2_001);
    }
}
