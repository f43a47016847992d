//! Application configuration loaded from a TOML file.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::{
    error::{CallFlowError, ConfigError},
    geometry::Size,
    graph::DEFAULT_NODE_SIZE,
    layout::{
        Direction,
        layered::{DEFAULT_RANK_GAP, DEFAULT_SIBLING_GAP},
    },
};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Layout configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Flow direction of the diagram
    pub direction: Direction,

    /// Uniform node width
    pub node_width: f32,

    /// Uniform node height
    pub node_height: f32,

    /// Gap between consecutive ranks
    pub rank_gap: f32,

    /// Gap between siblings within a rank
    pub sibling_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            node_width: DEFAULT_NODE_SIZE.width(),
            node_height: DEFAULT_NODE_SIZE.height(),
            rank_gap: DEFAULT_RANK_GAP,
            sibling_gap: DEFAULT_SIBLING_GAP,
        }
    }
}

impl LayoutConfig {
    pub fn node_size(&self) -> Size {
        Size::new(self.node_width, self.node_height)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CallFlowError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CallFlowError::Config(ConfigError::MissingFile(
                path.to_path_buf(),
            )));
        }

        let content = fs::read_to_string(path)?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(ConfigError::from)
            .map_err(CallFlowError::Config)?;

        Ok(config)
    }
}
