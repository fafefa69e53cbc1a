//! Immutable dialogue graph: the parsed scene payload with id-keyed lookup.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Scene payload model
// ---------------------------------------------------------------------------

/// A labeled, selectable transition out of a node.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub text: String,
    /// Id of the node this choice jumps to.
    pub next: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// One unit of dialogue: speaker, body text, and outgoing transition(s).
///
/// A node has either a non-empty `choices` list or a `next` id; neither
/// means the node is terminal. When both are present, choices win.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueNode {
    pub id: String,
    #[serde(default)]
    pub speaker: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Follow-up node when there are no choices.
    #[serde(default)]
    pub next: Option<String>,
    /// Optional expression tag for the speaker's portrait.
    #[serde(default)]
    pub expression: Option<String>,
}

impl DialogueNode {
    /// The click-to-continue target, if this node has a usable one.
    pub fn next_id(&self) -> Option<&str> {
        self.next.as_deref().filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScenePayload {
    start_node: String,
    #[serde(default)]
    nodes: Vec<DialogueNode>,
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dialogue source not found: {path}")]
    NotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed dialogue source: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("dialogue source has a blank startNode")]
    MissingStart,
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// The full scene: a map of node-id -> node, built once at load and
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct DialogueGraph {
    start: String,
    nodes: HashMap<String, DialogueNode>,
}

impl DialogueGraph {
    /// Parse a JSON scene payload. Duplicate ids keep the first occurrence;
    /// dangling references are warnings, not errors.
    pub fn from_json(payload: &str) -> Result<Self, LoadError> {
        let raw: ScenePayload = serde_json::from_str(payload)?;
        if raw.start_node.trim().is_empty() {
            return Err(LoadError::MissingStart);
        }

        let mut nodes = HashMap::new();
        for node in raw.nodes {
            match nodes.entry(node.id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(node);
                }
                Entry::Occupied(_) => warn!("Duplicate node id dropped: {:?}", node.id),
            }
        }

        let graph = DialogueGraph {
            start: raw.start_node,
            nodes,
        };
        graph.warn_on_dangling_refs();
        info!(
            "Loaded dialogue graph: {} nodes, start {:?}",
            graph.nodes.len(),
            graph.start
        );
        Ok(graph)
    }

    /// Read and parse a scene file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let payload = fs::read_to_string(path).map_err(|source| LoadError::NotFound {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&payload)
    }

    pub fn start_node_id(&self) -> &str {
        &self.start
    }

    pub fn lookup(&self, id: &str) -> Option<&DialogueNode> {
        self.nodes.get(id)
    }

    #[allow(dead_code)]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn warn_on_dangling_refs(&self) {
        if !self.nodes.contains_key(&self.start) {
            warn!("Start node {:?} does not exist", self.start);
        }
        for node in self.nodes.values() {
            if let Some(next) = node.next_id() {
                if !self.nodes.contains_key(next) {
                    warn!("Node {:?} points at unknown next {:?}", node.id, next);
                }
            }
            for choice in &node.choices {
                if !self.nodes.contains_key(&choice.next) {
                    warn!(
                        "Choice {:?} on node {:?} points at unknown node {:?}",
                        choice.text, node.id, choice.next
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_minimal_scene() {
        let graph = DialogueGraph::from_json(
            r#"{
                "startNode": "n1",
                "nodes": [
                    { "id": "n1", "speaker": "Aiko", "text": "Hi", "next": "n2" },
                    { "id": "n2", "speaker": "Aiko", "text": "Bye" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(graph.start_node_id(), "n1");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.lookup("n1").unwrap().next_id(), Some("n2"));
        assert!(graph.lookup("n2").unwrap().next_id().is_none());
        assert!(graph.lookup("n3").is_none());
    }

    #[test]
    fn test_choice_fields() {
        let graph = DialogueGraph::from_json(
            r#"{
                "startNode": "n1",
                "nodes": [
                    { "id": "n1", "speaker": "Aiko", "text": "Hm?", "choices": [
                        { "text": "A", "next": "n1", "isCorrect": true },
                        { "text": "B", "next": "n1" }
                    ]}
                ]
            }"#,
        )
        .unwrap();
        let choices = &graph.lookup("n1").unwrap().choices;
        assert!(choices[0].is_correct);
        assert!(!choices[1].is_correct);
    }

    #[test]
    fn test_duplicate_id_keeps_first() {
        let graph = DialogueGraph::from_json(
            r#"{
                "startNode": "n1",
                "nodes": [
                    { "id": "n1", "speaker": "Aiko", "text": "first" },
                    { "id": "n1", "speaker": "Aiko", "text": "second" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.lookup("n1").unwrap().text, "first");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let graph = DialogueGraph::from_json(
            r#"{
                "startNode": "n1",
                "sceneAuthor": "someone",
                "nodes": [
                    { "id": "n1", "speaker": "Aiko", "text": "Hi", "mood": 3 }
                ]
            }"#,
        );
        assert!(graph.is_ok());
    }

    #[test]
    fn test_dangling_refs_are_not_fatal() {
        let graph = DialogueGraph::from_json(
            r#"{
                "startNode": "n1",
                "nodes": [
                    { "id": "n1", "speaker": "Aiko", "text": "Hi", "next": "nowhere" }
                ]
            }"#,
        );
        assert!(graph.is_ok());
    }

    #[test]
    fn test_malformed_payload() {
        assert!(matches!(
            DialogueGraph::from_json("not json at all"),
            Err(LoadError::Parse(_))
        ));
        assert!(matches!(
            DialogueGraph::from_json(r#"{ "nodes": [] }"#),
            Err(LoadError::Parse(_))
        ));
    }

    #[test]
    fn test_blank_start_node() {
        assert!(matches!(
            DialogueGraph::from_json(r#"{ "startNode": "  ", "nodes": [] }"#),
            Err(LoadError::MissingStart)
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            DialogueGraph::load("definitely/not/here.json"),
            Err(LoadError::NotFound { .. })
        ));
    }
}
