//! SVG rendering of a positioned render model.
//!
//! Draws one rectangle per node with the structured step label (name,
//! description, phrase caption) and one arrowed line per edge between the
//! anchors computed by the layout engine. This is a convenience surface for
//! inspecting layouts, not an interactive canvas.

use log::debug;
use svg::{
    Document,
    node::element::{Definitions, Group, Marker, Path, Rectangle, Text},
};

use crate::{
    export::{self, Exporter},
    layout::{PositionedEdge, PositionedNode, RenderModel},
};

/// Margin around the diagram content.
const MARGIN: f32 = 40.0;

/// Font sizes for the three label lines.
const NAME_FONT_SIZE: u32 = 14;
const DESCRIPTION_FONT_SIZE: u32 = 12;
const CAPTION_FONT_SIZE: u32 = 11;

/// SVG exporter writing to a file.
pub struct Svg {
    file_name: String,
}

impl Svg {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
        }
    }

    /// Renders the model into an SVG document.
    pub fn render_document(&self, model: &RenderModel) -> Document {
        let content_size = model.bounds().to_size();
        let svg_width = content_size.width() + 2.0 * MARGIN;
        let svg_height = content_size.height() + 2.0 * MARGIN;

        let mut doc = Document::new()
            .set("viewBox", format!("0 0 {svg_width} {svg_height}"))
            .set("width", svg_width)
            .set("height", svg_height);

        doc = doc.add(arrowhead_definitions());

        let mut main_group =
            Group::new().set("transform", format!("translate({MARGIN}, {MARGIN})"));

        for edge in model.edges() {
            main_group = main_group.add(render_edge(edge));
        }

        for node in model.nodes() {
            main_group = main_group.add(render_node(node));
        }

        doc.add(main_group)
    }
}

impl Exporter for Svg {
    fn export_render_model(&self, model: &RenderModel) -> Result<(), export::Error> {
        let doc = self.render_document(model);
        debug!(
            file_name = self.file_name,
            nodes = model.nodes().len(),
            edges = model.edges().len();
            "Writing SVG document",
        );
        svg::save(&self.file_name, &doc).map_err(export::Error::Io)
    }
}

fn arrowhead_definitions() -> Definitions {
    let marker = Marker::new()
        .set("id", "arrowhead")
        .set("markerWidth", 10)
        .set("markerHeight", 7)
        .set("refX", 10)
        .set("refY", 3.5)
        .set("orient", "auto")
        .add(
            Path::new()
                .set("d", "M 0 0 L 10 3.5 L 0 7 z")
                .set("fill", "#555555"),
        );

    Definitions::new().add(marker)
}

fn render_node(node: &PositionedNode) -> Group {
    let position = node.position();
    let size = node.size();
    let label = node.node().label();

    let rect = Rectangle::new()
        .set("x", position.x())
        .set("y", position.y())
        .set("width", size.width())
        .set("height", size.height())
        .set("fill", "white")
        .set("stroke", "#333333")
        .set("rx", 4.0);

    let mut group = Group::new().add(rect);

    let center_x = node.center().x();
    let mut line_y = position.y() + 22.0;

    group = group.add(
        Text::new(label.name())
            .set("x", center_x)
            .set("y", line_y)
            .set("text-anchor", "middle")
            .set("font-family", "Arial")
            .set("font-size", NAME_FONT_SIZE)
            .set("font-weight", "bold"),
    );

    if !label.description().is_empty() {
        line_y += 20.0;
        group = group.add(
            Text::new(label.description())
                .set("x", center_x)
                .set("y", line_y)
                .set("text-anchor", "middle")
                .set("font-family", "Arial")
                .set("font-size", DESCRIPTION_FONT_SIZE),
        );
    }

    if !label.phrases().is_empty() {
        line_y += 20.0;
        group = group.add(
            Text::new(label.phrase_caption())
                .set("x", center_x)
                .set("y", line_y)
                .set("text-anchor", "middle")
                .set("font-family", "Arial")
                .set("font-size", CAPTION_FONT_SIZE)
                .set("fill", "#666666"),
        );
    }

    group
}

fn render_edge(edge: &PositionedEdge) -> Path {
    let exit = edge.exit();
    let entry = edge.entry();

    Path::new()
        .set(
            "d",
            format!(
                "M {} {} L {} {}",
                exit.x(),
                exit.y(),
                entry.x(),
                entry.y()
            ),
        )
        .set("stroke", "#555555")
        .set("fill", "none")
        .set("marker-end", "url(#arrowhead)")
}
