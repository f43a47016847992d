//! Typed records for the persisted call-flow boundary.
//!
//! The external storage layer moves `flow_data` around as unstructured JSON.
//! Everything crossing into the core is deserialized into these types once,
//! at the boundary; validation of the step structure itself happens in
//! [`crate::graph::StepGraphBuilder`].

use serde::{Deserialize, Serialize};

/// A single authored step in a call flow.
///
/// `parent`, when present, must name the `id` of another step in the same
/// flow; the builder rejects dangling references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub phrases: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
}

/// A persisted call-flow configuration, exactly as stored.
///
/// The core treats this as read-only input; the timestamps are carried as
/// opaque strings and never interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallFlowConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub flow_data: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

impl CallFlowConfig {
    /// Returns the `{ id, name }` listing shape used by flow listings.
    pub fn summary(&self) -> FlowSummary {
        FlowSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.flow_data
    }
}

/// The summary shape returned when listing stored configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSummary {
    pub id: String,
    pub name: String,
}

/// Input accepted by the CLI: either a full persisted configuration record
/// or a bare `flow_data` step array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlowDocument {
    Config(CallFlowConfig),
    Steps(Vec<Step>),
}

impl FlowDocument {
    pub fn steps(&self) -> &[Step] {
        match self {
            FlowDocument::Config(config) => config.steps(),
            FlowDocument::Steps(steps) => steps,
        }
    }

    /// The flow name, when the input carries one.
    pub fn name(&self) -> Option<&str> {
        match self {
            FlowDocument::Config(config) => Some(&config.name),
            FlowDocument::Steps(_) => None,
        }
    }
}
