// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use super::svg::export_svg;
use super::text_grid::HIGHLIGHT_CLASS;
use super::{DiagramRenderer, RenderError, RenderedDiagram};
use crate::model::FlowchartDocument;
use crate::viewport::Viewport;

/// Pointer travel (in viewport units) beyond which a press/release pair is
/// the end of a drag, not a click.
pub const CLICK_SLOP: f64 = 5.0;

/// Root node identifier highlighted by convention.
const ROOT_NODE_ID: &str = "A";

const PATH_SEPARATOR: &str = " → ";

/// Result of an accepted node click: identity, current label, and the
/// arrow-joined root-to-node path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInspection {
    node_id: SmolStr,
    label: String,
    path: String,
}

impl NodeInspection {
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Owns one rendered diagram: the document, the renderer seam, the node
/// registry of the last successful render, and the viewport transform.
#[derive(Debug)]
pub struct DiagramView<R> {
    renderer: R,
    document: FlowchartDocument,
    rendered: Option<RenderedDiagram>,
    viewport: Viewport,
    view_size: (f64, f64),
}

impl<R: DiagramRenderer> DiagramView<R> {
    pub fn new(renderer: R, document: FlowchartDocument, view_size: (f64, f64)) -> Self {
        let mut view = Self {
            renderer,
            document,
            rendered: None,
            viewport: Viewport::new(),
            view_size,
        };
        view.rerender();
        view
    }

    pub fn document(&self) -> &FlowchartDocument {
        &self.document
    }

    pub fn rendered(&self) -> Option<&RenderedDiagram> {
        self.rendered.as_ref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn view_size(&self) -> (f64, f64) {
        self.view_size
    }

    /// Replaces the document and re-renders, fitting the new content.
    pub fn set_document(&mut self, document: FlowchartDocument) {
        self.document = document;
        self.rerender();
    }

    /// Re-renders on container size change.
    pub fn resize(&mut self, view_size: (f64, f64)) {
        if view_size != self.view_size {
            self.view_size = view_size;
            self.rerender();
        }
    }

    /// Re-fits the current content to the container.
    pub fn reset_view(&mut self) {
        self.rerender();
    }

    /// Feeds the styled document through the renderer. On success the prior
    /// content is replaced and the transform re-fitted; on failure the error
    /// is logged and the previous view kept, no retry.
    pub fn rerender(&mut self) {
        let styled = with_style_preamble(self.document.text());
        match self.renderer.render(&styled) {
            Ok(rendered) => {
                self.viewport.fit(rendered.size(), self.view_size);
                self.rendered = Some(rendered);
            }
            Err(err) => {
                tracing::error!(error = %err, "diagram render failed; keeping previous view");
            }
        }
    }

    /// Resolves the node under a viewport point, if any.
    pub fn node_at(&self, viewport_point: (f64, f64)) -> Option<&super::RenderedNode> {
        let rendered = self.rendered.as_ref()?;
        let content_point = self.viewport.transform().content_point(viewport_point);
        rendered.node_at(content_point)
    }

    /// Click resolution: rejects release points that traveled beyond
    /// [`CLICK_SLOP`] since the press, then builds the ancestor path for the
    /// node under the pointer.
    pub fn inspect(&self, viewport_point: (f64, f64), travel: f64) -> Option<NodeInspection> {
        if travel > CLICK_SLOP {
            return None;
        }
        let node = self.node_at(viewport_point)?;
        let node_id = SmolStr::new(node.id());
        let label = node.label().to_owned();

        let path = self
            .document
            .ancestor_chain(node.id())
            .iter()
            .map(|id| self.label_for(id))
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR);

        Some(NodeInspection {
            node_id,
            label,
            path,
        })
    }

    /// Current label for a node id: registry of the last render first, then
    /// the document text, then the bare id.
    pub fn label_for(&self, node_id: &str) -> String {
        if let Some(node) = self.rendered.as_ref().and_then(|r| r.node(node_id)) {
            return node.label().to_owned();
        }
        self.document
            .node_label(node_id)
            .unwrap_or_else(|| node_id.to_owned())
    }

    /// Rewrites a node label in the document and re-renders. Returns `false`
    /// without re-rendering when no definition matched.
    pub fn rewrite_label(&mut self, node_id: &str, new_label: &str) -> bool {
        if !self.document.rewrite_node_label(node_id, new_label) {
            return false;
        }
        self.rerender();
        true
    }

    /// Serializes the current view as a standalone SVG artifact.
    pub fn export_svg(&self) -> Result<String, RenderError> {
        let rendered = self
            .rendered
            .as_ref()
            .ok_or_else(|| RenderError::new("nothing rendered yet"))?;
        Ok(export_svg(rendered))
    }
}

/// Wraps flowchart text with the fixed style preamble: a default orientation
/// unless one is already declared, a uniform node class, and the highlighted
/// class on the root node.
pub(crate) fn with_style_preamble(text: &str) -> String {
    let declares_orientation = {
        let trimmed = text.trim_start();
        trimmed.starts_with("graph") || trimmed.starts_with("flowchart")
    };
    let orientation = if declares_orientation { "" } else { "graph TD\n" };

    format!(
        "%%{{init: {{'theme': 'base'}}}}%%\n{orientation}{text}\n\n\
         classDef default fill:#e3f2fd,stroke:#1976d2,color:#1976d2,stroke-width:1px;\n\
         classDef {HIGHLIGHT_CLASS} fill:#0288d1,stroke:#0277bd,color:#ffffff,stroke-width:2px;\n\
         class {ROOT_NODE_ID} {HIGHLIGHT_CLASS};\n"
    )
}

#[cfg(test)]
mod tests {
    use super::{with_style_preamble, DiagramView, CLICK_SLOP};
    use crate::model::FlowchartDocument;
    use crate::render::{DiagramRenderer, RenderError, RenderedDiagram, TextGridRenderer};

    const VIEW: (f64, f64) = (40.0, 30.0);

    fn fixture_view() -> DiagramView<TextGridRenderer> {
        DiagramView::new(
            TextGridRenderer::new(),
            FlowchartDocument::new("graph TD\n    A[Start] --> B[Bake]\n    B --> C[Inspect]\n"),
            VIEW,
        )
    }

    #[test]
    fn preamble_adds_an_orientation_only_when_missing() {
        let styled = with_style_preamble("A[Start]");
        assert!(styled.contains("graph TD\nA[Start]"));

        let declared = with_style_preamble("flowchart LR\nA[Start]");
        assert!(!declared.contains("graph TD"));

        assert!(styled.contains("class A mainNode;"));
        assert!(styled.contains("classDef default"));
    }

    #[test]
    fn render_fits_content_to_the_container() {
        let view = fixture_view();
        let rendered = view.rendered().expect("rendered");
        let (content_w, content_h) = rendered.size();
        let expected = (VIEW.0 / content_w).min(VIEW.1 / content_h) * 0.9;
        assert!((view.viewport().transform().scale() - expected).abs() < 1e-9);
    }

    #[test]
    fn clicks_resolve_the_ancestor_path_with_current_labels() {
        let view = fixture_view();
        let node_c = view.rendered().expect("rendered").node("C").expect("node C");
        let viewport_point = view.viewport().transform().viewport_point(node_c.center());

        let inspection = view.inspect(viewport_point, 0.0).expect("inspection");
        assert_eq!(inspection.node_id(), "C");
        assert_eq!(inspection.label(), "Inspect");
        assert_eq!(inspection.path(), "Start → Bake → Inspect");
    }

    #[test]
    fn clicks_after_a_drag_are_rejected() {
        let view = fixture_view();
        let node_c = view.rendered().expect("rendered").node("C").expect("node C");
        let viewport_point = view.viewport().transform().viewport_point(node_c.center());

        assert!(view.inspect(viewport_point, CLICK_SLOP + 0.1).is_none());
        assert!(view.inspect(viewport_point, CLICK_SLOP).is_some());
    }

    #[test]
    fn clicks_outside_every_node_resolve_nothing() {
        let view = fixture_view();
        assert!(view.inspect((-50.0, -50.0), 0.0).is_none());
    }

    #[test]
    fn label_rewrite_rerenders_and_updates_the_registry() {
        let mut view = fixture_view();
        assert!(view.rewrite_label("B", "Hard bake"));
        assert!(view.document().text().contains("B[Hard bake]"));
        assert_eq!(view.label_for("B"), "Hard bake");

        let before = view.document().text().to_owned();
        assert!(!view.rewrite_label("Z", "Nope"));
        assert_eq!(view.document().text(), before);
    }

    struct FailingRenderer;

    impl DiagramRenderer for FailingRenderer {
        fn render(&self, _text: &str) -> Result<RenderedDiagram, RenderError> {
            Err(RenderError::new("backend unavailable"))
        }
    }

    #[test]
    fn render_failure_keeps_the_previous_content() {
        let mut view = fixture_view();
        assert!(view.rendered().is_some());

        // Swapping documents through a failing render path must not clear
        // the last good view.
        let mut failing = DiagramView::new(
            FailingRenderer,
            FlowchartDocument::new("A[Start]"),
            VIEW,
        );
        assert!(failing.rendered().is_none());
        failing.set_document(FlowchartDocument::new("B[Next]"));
        assert!(failing.rendered().is_none());

        view.set_document(FlowchartDocument::new("A[Only]"));
        assert!(view.rendered().is_some());
    }

    #[test]
    fn export_requires_a_rendered_diagram() {
        let view = fixture_view();
        let svg = view.export_svg().expect("svg");
        assert!(svg.contains("</svg>"));

        let failing = DiagramView::new(FailingRenderer, FlowchartDocument::new("A"), VIEW);
        assert!(failing.export_svg().is_err());
    }
}
