//! Line recognisers and field normalization for the two export formats.
//!
//! Relationship export: `info:fedora/<child>,info:fedora/<parent>`
//! Model export: `info:fedora/<pid>,info:fedora/<ns>:<model>,info:fedora/fedora-system:def/model#<State>`
//!
//! Lines that do not match are dropped. Nothing here fails.

use crate::node::{PID_PREFIX, State};
use regex::Regex;
use std::sync::OnceLock;

/// Model lines must start with the repository URI scheme.
const MODEL_SCHEME: &str = "info:fedora";

/// State tags follow the last occurrence of this marker.
const STATE_MARKER: &str = "model#";

/// One accepted relationship line: `child` declares `parent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRecord {
    pub child: String,
    pub parent: String,
}

/// One accepted model line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRecord {
    pub pid: String,
    pub content_model: String,
    pub state: State,
}

fn relationship_re() -> &'static Regex {
    static RELATIONSHIP_RE: OnceLock<Regex> = OnceLock::new();
    // Two colon-bearing, comma-separated tokens
    RELATIONSHIP_RE.get_or_init(|| Regex::new(r"^.*:.*,.*:.*").unwrap())
}

/// Strip the `info:fedora/` prefix from a pid.
pub fn clean_pid(raw: &str) -> &str {
    let raw = raw.trim();
    raw.strip_prefix(PID_PREFIX).unwrap_or(raw)
}

/// Content-model tag: everything after the final colon.
pub fn clean_model(raw: &str) -> &str {
    let raw = raw.trim();
    raw.rsplit_once(':').map_or(raw, |(_, tag)| tag)
}

/// State tag: everything after the final `model#`, lower-cased.
pub fn clean_state(raw: &str) -> String {
    let raw = raw.trim();
    raw.rfind(STATE_MARKER)
        .map_or(raw, |i| &raw[i + STATE_MARKER.len()..])
        .to_lowercase()
}

/// Parse a relationship line, or `None` if it should be skipped.
pub fn parse_relationship(line: &str) -> Option<RelationshipRecord> {
    let line = line.trim();
    if !relationship_re().is_match(line) {
        return None;
    }
    let mut fields = line.split(',');
    let child = clean_pid(fields.next()?);
    let parent = clean_pid(fields.next()?);
    if child.is_empty() || parent.is_empty() {
        return None;
    }
    Some(RelationshipRecord {
        child: child.to_string(),
        parent: parent.to_string(),
    })
}

/// Parse a model line, or `None` if it should be skipped.
pub fn parse_model(line: &str) -> Option<ModelRecord> {
    let line = line.trim();
    if !line.starts_with(MODEL_SCHEME) {
        return None;
    }
    let mut fields = line.split(',');
    let pid = clean_pid(fields.next()?);
    let content_model = clean_model(fields.next()?);
    let state = clean_state(fields.next()?);
    if pid.is_empty() {
        return None;
    }
    Some(ModelRecord {
        pid: pid.to_string(),
        content_model: content_model.to_string(),
        state: State::from_tag(&state),
    })
}
