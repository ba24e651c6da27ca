// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagram rendering seam.
//!
//! The external renderer is a black box behind [`DiagramRenderer`]: flowchart
//! text in, markup plus per-node geometry out. [`adapter::DiagramView`] owns
//! everything around that seam (style preamble, node-identity registry, fit
//! transform, click resolution, SVG export). The built-in
//! [`TextGridRenderer`] is a plain text-grid implementation for the TUI;
//! layout quality is explicitly out of scope.

mod adapter;
mod svg;
mod text_grid;

use std::fmt;

use smol_str::SmolStr;

pub use adapter::{DiagramView, NodeInspection, CLICK_SLOP};
pub use svg::export_svg;
pub use text_grid::TextGridRenderer;

/// Rendering-library failure. Logged by the adapter; the previous view is
/// kept and no retry is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError {
    message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "diagram rendering failed: {}", self.message)
    }
}

impl std::error::Error for RenderError {}

/// Turns flowchart text into rendered markup with node geometry.
pub trait DiagramRenderer {
    fn render(&self, text: &str) -> Result<RenderedDiagram, RenderError>;
}

/// Geometry and current label of one rendered node. This registry entry is
/// the node-identity contract: stable identifier to current label, no
/// scraping of rendered output.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedNode {
    id: SmolStr,
    label: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    highlighted: bool,
}

impl RenderedNode {
    pub fn new(
        id: impl Into<SmolStr>,
        label: impl Into<String>,
        bounds: (f64, f64, f64, f64),
        highlighted: bool,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            x: bounds.0,
            y: bounds.1,
            width: bounds.2,
            height: bounds.3,
            highlighted,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.width, self.height)
    }

    pub fn highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn contains(&self, content_point: (f64, f64)) -> bool {
        content_point.0 >= self.x
            && content_point.0 < self.x + self.width
            && content_point.1 >= self.y
            && content_point.1 < self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// One rendered diagram: markup lines in content coordinates plus the node
/// registry and edge list.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDiagram {
    width: f64,
    height: f64,
    lines: Vec<String>,
    nodes: Vec<RenderedNode>,
    edges: Vec<(SmolStr, SmolStr)>,
}

impl RenderedDiagram {
    pub fn new(
        width: f64,
        height: f64,
        lines: Vec<String>,
        nodes: Vec<RenderedNode>,
        edges: Vec<(SmolStr, SmolStr)>,
    ) -> Self {
        Self {
            width,
            height,
            lines,
            nodes,
            edges,
        }
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn nodes(&self) -> &[RenderedNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(SmolStr, SmolStr)] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&RenderedNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn node_at(&self, content_point: (f64, f64)) -> Option<&RenderedNode> {
        self.nodes.iter().find(|node| node.contains(content_point))
    }
}
