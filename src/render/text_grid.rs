// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Built-in text-grid renderer.
//!
//! A deliberately plain stand-in for the external rendering library: nodes
//! are boxed in first-appearance order, one per row, with a connector glyph
//! where a direct edge links vertical neighbors. One grid cell is one
//! content unit.

use std::collections::BTreeSet;

use smol_str::SmolStr;

use super::{DiagramRenderer, RenderError, RenderedDiagram, RenderedNode};

const BOX_HEIGHT: usize = 3;
const ROW_PITCH: usize = 4;
const SIDE_MARGIN: usize = 2;

/// Highlight marker class applied by the adapter's style preamble.
pub(crate) const HIGHLIGHT_CLASS: &str = "mainNode";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextGridRenderer;

impl TextGridRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl DiagramRenderer for TextGridRenderer {
    fn render(&self, text: &str) -> Result<RenderedDiagram, RenderError> {
        let parsed = parse(text);
        if parsed.order.is_empty() {
            return Err(RenderError::new("document defines no nodes"));
        }
        Ok(layout(&parsed))
    }
}

#[derive(Debug, Default)]
struct ParsedChart {
    order: Vec<String>,
    labels: Vec<(String, String)>,
    edges: Vec<(String, String)>,
    highlighted: BTreeSet<String>,
}

impl ParsedChart {
    fn register(&mut self, id: &str, label: Option<String>) {
        if id.is_empty() {
            return;
        }
        if !self.order.iter().any(|known| known == id) {
            self.order.push(id.to_owned());
        }
        if let Some(label) = label {
            if !self.labels.iter().any(|(known, _)| known == id) {
                self.labels.push((id.to_owned(), label));
            }
        }
    }

    fn label(&self, id: &str) -> String {
        self.labels
            .iter()
            .find_map(|(known, label)| (known == id).then(|| label.clone()))
            .unwrap_or_else(|| id.to_owned())
    }
}

fn parse(text: &str) -> ParsedChart {
    let mut chart = ParsedChart::default();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("%%") || line.starts_with("classDef") {
            continue;
        }
        if line.starts_with("graph") || line.starts_with("flowchart") {
            continue;
        }
        if let Some(rest) = line.strip_prefix("class ") {
            parse_class_assignment(rest, &mut chart);
            continue;
        }

        if line.contains("-->") {
            let mut previous: Option<String> = None;
            for part in line.split("-->") {
                let (id, label) = parse_node_token(part);
                if id.is_empty() {
                    previous = None;
                    continue;
                }
                chart.register(&id, label);
                if let Some(from) = previous.take() {
                    chart.edges.push((from, id.clone()));
                }
                previous = Some(id);
            }
        } else {
            let (id, label) = parse_node_token(line);
            chart.register(&id, label);
        }
    }

    chart
}

fn parse_class_assignment(rest: &str, chart: &mut ParsedChart) {
    let rest = rest.trim_end_matches(';');
    let mut parts = rest.split_whitespace();
    let (Some(ids), Some(class)) = (parts.next(), parts.next()) else {
        return;
    };
    if class != HIGHLIGHT_CLASS {
        return;
    }
    for id in ids.split(',') {
        let id = id.trim();
        if !id.is_empty() {
            chart.highlighted.insert(id.to_owned());
        }
    }
}

/// Splits one endpoint token into identifier and optional bracketed label.
/// The identifier is the token preceding the label's opening bracket.
fn parse_node_token(token: &str) -> (String, Option<String>) {
    let mut token = token.trim();
    if let Some(rest) = token.strip_prefix('|') {
        token = match rest.split_once('|') {
            Some((_, after)) => after.trim_start(),
            None => rest,
        };
    }

    match token.find(['[', '(', '{']) {
        Some(open) => {
            let id = token[..open].trim().to_owned();
            let label = token[open + 1..]
                .trim_end_matches([']', ')', '}'])
                .trim()
                .to_owned();
            let label = (!label.is_empty()).then_some(label);
            (id, label)
        }
        None => (token.to_owned(), None),
    }
}

fn layout(chart: &ParsedChart) -> RenderedDiagram {
    let box_widths: Vec<usize> = chart
        .order
        .iter()
        .map(|id| chart.label(id).chars().count() + 4)
        .collect();
    let content_width = box_widths.iter().copied().max().unwrap_or(0) + SIDE_MARGIN * 2;
    let content_height = chart.order.len() * ROW_PITCH - (ROW_PITCH - BOX_HEIGHT);

    let mut grid: Vec<Vec<char>> = vec![vec![' '; content_width]; content_height];
    let mut nodes = Vec::with_capacity(chart.order.len());

    for (index, id) in chart.order.iter().enumerate() {
        let label = chart.label(id);
        let box_width = box_widths[index];
        let x = (content_width - box_width) / 2;
        let y = index * ROW_PITCH;
        let highlighted = chart.highlighted.contains(id);

        draw_box(&mut grid, x, y, box_width, &label, highlighted);
        nodes.push(RenderedNode::new(
            SmolStr::new(id),
            label,
            (x as f64, y as f64, box_width as f64, BOX_HEIGHT as f64),
            highlighted,
        ));

        if index + 1 < chart.order.len() {
            let next = &chart.order[index + 1];
            let connected = chart
                .edges
                .iter()
                .any(|(from, to)| from == id && to == next);
            if connected {
                grid[y + BOX_HEIGHT][content_width / 2] = '▼';
            }
        }
    }

    let lines = grid.into_iter().map(|row| row.into_iter().collect()).collect();
    let edges = chart
        .edges
        .iter()
        .map(|(from, to)| (SmolStr::new(from), SmolStr::new(to)))
        .collect();

    RenderedDiagram::new(content_width as f64, content_height as f64, lines, nodes, edges)
}

fn draw_box(grid: &mut [Vec<char>], x: usize, y: usize, width: usize, label: &str, highlighted: bool) {
    let (tl, tr, bl, br, horizontal, vertical) = if highlighted {
        ('╔', '╗', '╚', '╝', '═', '║')
    } else {
        ('┌', '┐', '└', '┘', '─', '│')
    };

    for col in 0..width {
        grid[y][x + col] = horizontal;
        grid[y + 2][x + col] = horizontal;
    }
    grid[y][x] = tl;
    grid[y][x + width - 1] = tr;
    grid[y + 2][x] = bl;
    grid[y + 2][x + width - 1] = br;
    grid[y + 1][x] = vertical;
    grid[y + 1][x + width - 1] = vertical;

    for (offset, ch) in label.chars().enumerate() {
        grid[y + 1][x + 2 + offset] = ch;
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_node_token, TextGridRenderer};
    use crate::render::DiagramRenderer;

    const CHART: &str = "graph TD\n    A[Start] --> B[Bake wafer]\n    B --> C{Inspect}\nclass A mainNode;\n";

    #[test]
    fn nodes_are_registered_in_first_appearance_order() {
        let rendered = TextGridRenderer::new().render(CHART).expect("render");
        let ids: Vec<&str> = rendered.nodes().iter().map(|node| node.id()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(rendered.node("B").expect("node B").label(), "Bake wafer");
    }

    #[test]
    fn highlight_class_marks_the_root_node() {
        let rendered = TextGridRenderer::new().render(CHART).expect("render");
        assert!(rendered.node("A").expect("node A").highlighted());
        assert!(!rendered.node("B").expect("node B").highlighted());
    }

    #[test]
    fn geometry_matches_the_grid() {
        let rendered = TextGridRenderer::new().render(CHART).expect("render");
        let (width, height) = rendered.size();
        assert_eq!(rendered.lines().len(), height as usize);
        assert!(rendered.lines().iter().all(|line| line.chars().count() == width as usize));

        let node = rendered.node("A").expect("node A");
        assert!(node.contains(node.center()));
        assert!(!node.contains((-1.0, -1.0)));
    }

    #[test]
    fn direct_edges_between_vertical_neighbors_get_a_connector() {
        let rendered = TextGridRenderer::new().render(CHART).expect("render");
        let connector_rows: usize = rendered
            .lines()
            .iter()
            .filter(|line| line.contains('▼'))
            .count();
        assert_eq!(connector_rows, 2);
    }

    #[test]
    fn empty_documents_are_a_render_error() {
        let error = TextGridRenderer::new()
            .render("graph TD\n%% nothing\n")
            .expect_err("no nodes");
        assert!(error.message().contains("no nodes"));
    }

    #[test]
    fn node_tokens_split_identifier_and_label() {
        assert_eq!(
            parse_node_token(" B[Bake wafer] "),
            ("B".to_owned(), Some("Bake wafer".to_owned()))
        );
        assert_eq!(parse_node_token("C"), ("C".to_owned(), None));
        assert_eq!(
            parse_node_token("|yes| D{Check}"),
            ("D".to_owned(), Some("Check".to_owned()))
        );
    }
}
