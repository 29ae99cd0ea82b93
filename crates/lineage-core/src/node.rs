//! A single repository object: pid, lifecycle state, content models, and parent edges.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// URI prefix carried by pids in the triplestore exports.
pub const PID_PREFIX: &str = "info:fedora/";

/// Lifecycle state of an object, or one of the two synthetic markers.
/// Serialized as its bare tag string, whatever the variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum State {
    Active,
    Inactive,
    Deleted,
    /// Referenced as a parent but never described by a model record.
    Missing,
    /// Inserted at the head of a lineage when a walk revisits a node.
    Loop,
    /// Any other state tag found in the data.
    Other(String),
}

impl State {
    /// Map a lower-cased state tag to a variant.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "active" => Self::Active,
            "inactive" => Self::Inactive,
            "deleted" => Self::Deleted,
            "missing" => Self::Missing,
            "loop" => Self::Loop,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Deleted => "deleted",
            Self::Missing => "missing",
            Self::Loop => "loop",
            Self::Other(tag) => tag,
        }
    }

    /// True for the markers the graph invents rather than reads.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Missing | Self::Loop)
    }
}

impl From<State> for String {
    fn from(state: State) -> Self {
        match state {
            State::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl From<String> for State {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A repository object (graph vertex).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub pid: String,
    pub state: Option<State>,
    /// Content-model tags in first-seen order. Duplicates are allowed.
    pub content_models: Vec<String>,
    /// Declared parent pids, in declaration order, without duplicates.
    pub parent_ids: IndexSet<String>,
    /// Traversal labels. Callers namespace labels per algorithm.
    #[serde(skip)]
    marks: BTreeSet<String>,
}

impl Node {
    /// Create a node, stripping the `info:fedora/` prefix from `pid`.
    pub fn new(pid: &str, state: Option<State>, content_models: Vec<String>) -> Self {
        Self {
            pid: pid.strip_prefix(PID_PREFIX).unwrap_or(pid).to_string(),
            state,
            content_models,
            parent_ids: IndexSet::new(),
            marks: BTreeSet::new(),
        }
    }

    /// Placeholder for a pid referenced as a parent but not yet described.
    pub fn missing(pid: &str) -> Self {
        Self::new(pid, Some(State::Missing), Vec::new())
    }

    /// Loop marker carrying the pid of the revisited node.
    pub fn looped(pid: &str) -> Self {
        Self::new(pid, Some(State::Loop), Vec::new())
    }

    pub fn is_missing(&self) -> bool {
        self.state == Some(State::Missing)
    }

    pub fn is_loop(&self) -> bool {
        self.state == Some(State::Loop)
    }

    /// Append a content model. No deduplication happens here.
    pub fn add_content_model(&mut self, model: impl Into<String>) {
        self.content_models.push(model.into());
    }

    /// Remove every occurrence of each of `tags` from the content models.
    pub fn prune_content_models<S: AsRef<str>>(&mut self, tags: &[S]) {
        self.content_models
            .retain(|m| !tags.iter().any(|t| t.as_ref() == m));
    }

    /// Record a parent edge. Re-adding an existing parent is a no-op.
    pub fn add_parent(&mut self, parent: impl Into<String>) {
        self.parent_ids.insert(parent.into());
    }

    pub fn has_parents(&self) -> bool {
        !self.parent_ids.is_empty()
    }

    pub fn mark(&mut self, label: impl Into<String>) {
        self.marks.insert(label.into());
    }

    pub fn unmark(&mut self, label: &str) {
        self.marks.remove(label);
    }

    pub fn is_marked(&self, label: &str) -> bool {
        self.marks.contains(label)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.as_ref().map_or("", State::as_str);
        let parents: Vec<&str> = self.parent_ids.iter().map(String::as_str).collect();
        write!(
            f,
            "{}/{} {} => [{}]",
            self.pid,
            state,
            self.content_models.join(", "),
            parents.join(", ")
        )
    }
}
