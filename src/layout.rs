//! Layered layout of step graph topologies.
//!
//! The engine assigns every node a rank equal to its depth in the forest,
//! orders nodes within a rank by authored step order, and produces the
//! positioned [`RenderModel`] consumed by an external rendering surface.

pub mod layered;
mod render;

pub use layered::Engine;
pub use render::{PositionedEdge, PositionedNode, RenderModel};

use clap::ValueEnum;
use serde::Deserialize;

/// Flow direction of the layered layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Ranks grow downwards; siblings spread horizontally.
    #[default]
    TopToBottom,

    /// Ranks grow rightwards; siblings spread vertically.
    LeftToRight,
}
