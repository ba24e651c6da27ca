// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! SVG export of the current diagram view.
//!
//! The artifact is self-contained: XML declaration, doctype, an opaque white
//! background rectangle first, and the node/edge styling inlined so the file
//! renders identically outside the application.

use std::fmt::Write;

use super::RenderedDiagram;

const EXPORT_SCALE: f64 = 2.0;
const CELL_WIDTH: f64 = 10.0;
const CELL_HEIGHT: f64 = 20.0;

const STYLE_RULES: &str = "\
    .node rect { fill: #e3f2fd; stroke: #1976d2; stroke-width: 1px; }\n\
    .node text { fill: #1976d2; font-size: 12px; font-weight: 500; }\n\
    .node.main rect { fill: #0288d1; stroke: #0277bd; stroke-width: 2px; }\n\
    .node.main text { fill: #ffffff; }\n\
    .edge { stroke: #34495e; stroke-width: 2px; }\n\
    text { font-family: -apple-system, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif; text-anchor: middle; dominant-baseline: central; }";

/// Serializes a rendered diagram as a standalone SVG document at 2x scale.
pub fn export_svg(rendered: &RenderedDiagram) -> String {
    let (grid_width, grid_height) = rendered.size();
    let width = grid_width * CELL_WIDTH;
    let height = grid_height * CELL_HEIGHT;

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
    svg.push_str(
        "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n",
    );
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {width} {height}\" width=\"{}\" height=\"{}\">",
        width * EXPORT_SCALE,
        height * EXPORT_SCALE
    );
    svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n");
    let _ = writeln!(svg, "<style>\n{STYLE_RULES}\n</style>");

    for (from, to) in rendered.edges() {
        let (Some(from_node), Some(to_node)) = (rendered.node(from), rendered.node(to)) else {
            continue;
        };
        let (from_x, from_y, from_w, from_h) = from_node.bounds();
        let (to_x, to_y, to_w, _) = to_node.bounds();
        let _ = writeln!(
            svg,
            "<line class=\"edge\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"/>",
            (from_x + from_w / 2.0) * CELL_WIDTH,
            (from_y + from_h) * CELL_HEIGHT,
            (to_x + to_w / 2.0) * CELL_WIDTH,
            to_y * CELL_HEIGHT
        );
    }

    for node in rendered.nodes() {
        let (x, y, w, h) = node.bounds();
        let class = if node.highlighted() { "node main" } else { "node" };
        let _ = writeln!(
            svg,
            "<g class=\"{class}\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"8\"/><text x=\"{}\" y=\"{}\">{}</text></g>",
            x * CELL_WIDTH,
            y * CELL_HEIGHT,
            w * CELL_WIDTH,
            h * CELL_HEIGHT,
            (x + w / 2.0) * CELL_WIDTH,
            (y + h / 2.0) * CELL_HEIGHT,
            xml_escape(node.label())
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{export_svg, xml_escape};
    use crate::render::{DiagramRenderer, TextGridRenderer};

    #[test]
    fn exported_svg_is_standalone_with_a_white_background_first() {
        let rendered = TextGridRenderer::new()
            .render("graph TD\n    A[Etch & Rinse] --> B[Dry]\nclass A mainNode;\n")
            .expect("render");
        let svg = export_svg(&rendered);

        assert!(svg.starts_with("<?xml version=\"1.0\""));
        assert!(svg.contains("<!DOCTYPE svg"));

        let background = svg.find("fill=\"#FFFFFF\"").expect("background");
        let first_node = svg.find("<g class=").expect("node group");
        assert!(background < first_node);

        assert!(svg.contains("node main"));
        assert!(svg.contains("Etch &amp; Rinse"));
        assert!(svg.contains("<line class=\"edge\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn escaping_covers_markup_characters() {
        assert_eq!(xml_escape("a<b> & \"c\""), "a&lt;b&gt; &amp; &quot;c&quot;");
    }
}
