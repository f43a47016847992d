//! Layered graph layout for call-flow configurations.
//!
//! A call flow is authored as a flat list of named steps connected by parent
//! references. This crate turns that list into a positioned node/edge
//! diagram:
//!
//! 1. [`StepGraphBuilder`] validates the step list and builds a forest
//!    [`Topology`] (one node per step, one parent→child edge per step with a
//!    parent);
//! 2. the layered [`layout::Engine`] assigns every node a rank equal to its
//!    depth and produces a positioned [`RenderModel`];
//! 3. an exporter (SVG shipped here) or an external rendering surface
//!    consumes the model.
//!
//! Persistence and transport of configurations are external collaborators;
//! the crate only reads the persisted `flow_data` shape via [`flow`].

pub mod config;
pub mod error;
pub mod export;
pub mod flow;
pub mod geometry;
pub mod graph;
pub mod layout;

pub use error::{CallFlowError, GraphError, LayoutError};
pub use flow::{CallFlowConfig, FlowDocument, FlowSummary, Step};
pub use graph::{StepGraphBuilder, Topology};
pub use layout::{Direction, RenderModel};

use clap::Parser;
use export::Exporter;
use log::{debug, info, trace};
use std::fs;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Path to the persisted call-flow JSON file (a full configuration
    /// record or a bare step array)
    #[arg(help = "Path to the call-flow JSON file")]
    pub file: String,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Flow direction, overriding the configuration file
    #[arg(short, long, value_enum)]
    pub direction: Option<Direction>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,
}

pub fn run(args: &Args) -> Result<(), CallFlowError> {
    info!(
        input_path = args.file,
        output_path = args.output;
        "Processing call flow",
    );

    let app_config = match &args.config {
        Some(path) => config::AppConfig::load(path)?,
        None => config::AppConfig::default(),
    };

    // Reading the persisted flow
    let content = fs::read_to_string(&args.file)?;
    trace!(content; "File content");

    let document: FlowDocument = serde_json::from_str(&content)?;
    if let Some(name) = document.name() {
        info!(flow_name = name; "Loaded call-flow configuration");
    }

    // Building the step graph
    info!("Building step graph");
    let builder = StepGraphBuilder::new().with_node_size(app_config.layout.node_size());
    let topology = builder.build(document.steps())?;
    debug!(
        nodes_count = topology.node_count(),
        edges_count = topology.edge_count();
        "Step graph built successfully",
    );

    // Calculating the layered layout
    let direction = args.direction.unwrap_or(app_config.layout.direction);
    info!(direction:?; "Calculating layered layout");
    let mut engine = layout::Engine::new().with_direction(direction);
    engine
        .set_rank_gap(app_config.layout.rank_gap)
        .set_sibling_gap(app_config.layout.sibling_gap);
    let model = engine.calculate(&topology)?;
    debug!(
        positioned_nodes = model.nodes().len(),
        positioned_edges = model.edges().len();
        "Layout calculated",
    );

    // Exporting the render model
    info!("Exporting call-flow diagram to SVG");
    let svg_exporter = export::svg::Svg::new(&args.output);
    svg_exporter.export_render_model(&model)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
