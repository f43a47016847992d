//! Error types for call-flow processing.
//!
//! The main error type [`CallFlowError`] wraps the typed domain failures
//! produced by the graph builder and the layout engine along with the
//! boundary concerns (I/O, JSON, configuration, export).

use std::{io, path::PathBuf};

use thiserror::Error;

/// Structural validation failures raised by the step graph builder.
///
/// The builder validates eagerly and fails fast; no partial topology is
/// ever returned. Callers surface these as user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Two steps share an id.
    #[error("duplicate step id `{id}`")]
    DuplicateId { id: String },

    /// A step references a parent id that does not exist in the flow.
    #[error("step `{id}` references unknown parent `{parent}`")]
    DanglingParent { id: String, parent: String },

    /// Parent links form a cycle. A step naming itself as its own parent is
    /// a one-step cycle and is reported through this variant as well.
    #[error("parent links form a cycle through step `{id}`")]
    Cycle { id: String },
}

/// Failures raised by the layout engine.
///
/// A topology produced by the builder is always a valid forest, so these
/// only fire when the engine's defensive re-validation trips.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    MissingFile(PathBuf),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The main error type for call-flow operations.
#[derive(Debug, Error)]
pub enum CallFlowError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for CallFlowError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}
