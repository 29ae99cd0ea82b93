//! Adjacency map of repository objects keyed by pid.
//!
//! Relationship records establish parent edges (creating `missing` placeholders
//! for unseen children). Model records attach content models and state,
//! upgrading placeholders in place. Parents that are referenced but never
//! described are materialized lazily by [`Graph::parents_of`].

use crate::error::GraphError;
use crate::load::{self, ModelRecord, RelationshipRecord};
use crate::node::{Node, State};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace};

/// Generic content model carried by every object; pruned by default.
pub const ENTITY_CMODEL: &str = "entityCModel";

/// The object graph. Append-only: nodes are never removed.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: BTreeMap<String, Node>,
    /// Tags stripped from a node's content models after every model record.
    pruned_content_models: Vec<String>,
}

/// Aggregate counts for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    /// Nodes still in the `missing` state.
    pub missing: usize,
    /// Nodes with no declared parents.
    pub roots: usize,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create an empty graph that prunes `entityCModel`.
    pub fn new() -> Self {
        Self::with_pruned_content_models(vec![ENTITY_CMODEL.to_string()])
    }

    /// Create an empty graph with a custom list of pruned content models.
    pub fn with_pruned_content_models(tags: Vec<String>) -> Self {
        Self {
            nodes: BTreeMap::new(),
            pruned_content_models: tags,
        }
    }

    /// Load `child,parent` records from a file.
    pub fn load_relationships_file(&mut self, path: &Path) -> Result<usize, GraphError> {
        let file = File::open(path).map_err(|e| GraphError::io(path, e))?;
        self.load_relationships(BufReader::new(file))
    }

    /// Load `child,parent` records from any line-readable stream.
    /// Returns the number of accepted records; non-matching lines are skipped.
    pub fn load_relationships<R: BufRead>(&mut self, reader: R) -> Result<usize, GraphError> {
        let mut accepted = 0;
        for_each_line(reader, |line| {
            if let Some(record) = load::parse_relationship(line) {
                self.insert_relationship(record);
                accepted += 1;
            }
        })?;
        debug!(
            accepted,
            nodes = self.nodes.len(),
            edges = self.edge_count(),
            "loaded relationships"
        );
        Ok(accepted)
    }

    /// Load `pid,content-model,state` records from a file.
    pub fn load_models_file(&mut self, path: &Path) -> Result<usize, GraphError> {
        let file = File::open(path).map_err(|e| GraphError::io(path, e))?;
        self.load_models(BufReader::new(file))
    }

    /// Load `pid,content-model,state` records from any line-readable stream.
    /// Returns the number of accepted records; non-matching lines are skipped.
    pub fn load_models<R: BufRead>(&mut self, reader: R) -> Result<usize, GraphError> {
        let mut accepted = 0;
        for_each_line(reader, |line| {
            if let Some(record) = load::parse_model(line) {
                self.apply_model(record);
                accepted += 1;
            }
        })?;
        debug!(accepted, nodes = self.nodes.len(), "loaded models");
        Ok(accepted)
    }

    /// Record a parent edge on `child`, creating a `missing` placeholder for
    /// the child if needed. The parent itself is not materialized here.
    pub fn insert_relationship(&mut self, record: RelationshipRecord) {
        let RelationshipRecord { child, parent } = record;
        self.nodes
            .entry(child)
            .or_insert_with_key(|pid| Node::missing(pid))
            .add_parent(parent);
    }

    /// Attach a model record's state and content model to its node,
    /// creating the node if it is unknown. Existing parents are kept.
    pub fn apply_model(&mut self, record: ModelRecord) {
        let ModelRecord {
            pid,
            content_model,
            state,
        } = record;
        let node = self
            .nodes
            .entry(pid)
            .or_insert_with_key(|pid| Node::new(pid, None, Vec::new()));
        node.state = Some(state);
        node.add_content_model(content_model);
        node.prune_content_models(&self.pruned_content_models);
    }

    pub fn lookup(&self, pid: &str) -> Option<&Node> {
        self.nodes.get(pid)
    }

    pub fn contains(&self, pid: &str) -> bool {
        self.nodes.contains_key(pid)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total parent edges, summed over all nodes.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.parent_ids.len()).sum()
    }

    /// Resolve the declared parents of `node`, in declaration order.
    ///
    /// Parents absent from the graph are inserted as `missing` placeholders,
    /// so this call may grow the graph. Returned nodes are snapshots.
    pub fn parents_of(&mut self, node: &Node) -> Vec<Node> {
        node.parent_ids
            .iter()
            .map(|pid| self.resolve(pid).clone())
            .collect()
    }

    /// Ensure every referenced parent exists as a node.
    /// Returns the number of placeholders created.
    pub fn materialize_parents(&mut self) -> usize {
        let referenced: Vec<String> = self
            .nodes
            .values()
            .flat_map(|n| n.parent_ids.iter())
            .filter(|pid| !self.nodes.contains_key(*pid))
            .cloned()
            .collect();
        let before = self.nodes.len();
        for pid in &referenced {
            self.resolve(pid);
        }
        let created = self.nodes.len() - before;
        debug!(created, "materialized missing parents");
        created
    }

    fn resolve(&mut self, pid: &str) -> &Node {
        self.nodes.entry(pid.to_string()).or_insert_with_key(|pid| {
            trace!(pid = %pid, "synthesized missing parent");
            Node::missing(pid)
        })
    }

    /// Iterate all nodes in pid order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Invoke `visitor` once per node, in pid order.
    pub fn for_each<F: FnMut(&Node)>(&self, visitor: F) {
        self.nodes.values().for_each(visitor);
    }

    /// Mutable access for traversal marking.
    pub fn lookup_mut(&mut self, pid: &str) -> Option<&mut Node> {
        self.nodes.get_mut(pid)
    }

    /// Pids of nodes with no declared parents.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .values()
            .filter(|n| !n.has_parents())
            .map(|n| n.pid.as_str())
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.nodes.len(),
            edges: self.edge_count(),
            missing: self
                .nodes
                .values()
                .filter(|n| n.state == Some(State::Missing))
                .count(),
            roots: self.nodes.values().filter(|n| !n.has_parents()).count(),
        }
    }
}

/// Feed each line of `reader` to `f`, one at a time. Invalid UTF-8 is
/// replaced rather than rejected so a bad line cannot abort the load.
fn for_each_line<R: BufRead, F: FnMut(&str)>(reader: R, mut f: F) -> Result<(), GraphError> {
    for bytes in reader.split(b'\n') {
        let bytes = bytes?;
        f(&String::from_utf8_lossy(&bytes));
    }
    Ok(())
}
