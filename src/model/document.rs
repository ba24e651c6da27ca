// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use regex::Regex;

/// A flowchart document in the external renderer's Mermaid grammar.
///
/// The text is treated as opaque except for two conventions: node definitions
/// of the form `<id>[<label>]` (the identifier is the token preceding the
/// opening bracket) and edge lines of the form `<source> --> <target>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowchartDocument {
    text: String,
}

impl FlowchartDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Scans edge lines and returns `(source, target)` identifier pairs in
    /// document order.
    pub fn edges(&self) -> Vec<(String, String)> {
        self.text
            .lines()
            .filter_map(|line| {
                let (source, target) = line.split_once("-->")?;
                let source = edge_endpoint(source);
                let target = edge_endpoint(target);
                if source.is_empty() || target.is_empty() {
                    return None;
                }
                Some((source, target))
            })
            .collect()
    }

    /// Returns the current label of `node_id`, if a `<id>[<label>]`
    /// definition exists.
    pub fn node_label(&self, node_id: &str) -> Option<String> {
        let pattern = node_definition_pattern(node_id)?;
        for line in self.text.lines() {
            if let Some(captures) = pattern.captures(line) {
                return captures.get(2).map(|label| label.as_str().to_owned());
            }
        }
        None
    }

    /// Walks the edge list backward from `node_id` and returns the
    /// root-to-node identifier chain (including `node_id` itself).
    ///
    /// Each step picks the first edge whose target matches the current
    /// identifier. Cycles terminate the walk instead of looping.
    pub fn ancestor_chain(&self, node_id: &str) -> Vec<String> {
        let edges = self.edges();
        let mut chain = vec![node_id.to_owned()];
        let mut seen: BTreeSet<String> = BTreeSet::new();
        seen.insert(node_id.to_owned());

        let mut current = node_id.to_owned();
        while let Some((source, _)) = edges.iter().find(|(_, target)| *target == current) {
            if !seen.insert(source.clone()) {
                break;
            }
            chain.insert(0, source.clone());
            current = source.clone();
        }

        chain
    }

    /// Rewrites the bracketed label of the single line defining
    /// `<node_id>[<label>]`, preserving the rest of the line.
    ///
    /// Returns `false` (and leaves the text unchanged) when no line matches.
    pub fn rewrite_node_label(&mut self, node_id: &str, new_label: &str) -> bool {
        let Some(pattern) = node_definition_pattern(node_id) else {
            return false;
        };

        let mut rewritten = false;
        let lines: Vec<String> = self
            .text
            .lines()
            .map(|line| {
                if rewritten {
                    return line.to_owned();
                }
                if let Some(captures) = pattern.captures(line) {
                    if let Some(full) = captures.get(0) {
                        rewritten = true;
                        let prefix = captures.get(1).map_or("", |m| m.as_str());
                        let replacement = format!("{prefix}{node_id}[{new_label}]");
                        return line.replacen(full.as_str(), &replacement, 1);
                    }
                }
                line.to_owned()
            })
            .collect();

        if rewritten {
            let trailing_newline = self.text.ends_with('\n');
            self.text = lines.join("\n");
            if trailing_newline {
                self.text.push('\n');
            }
        }
        rewritten
    }
}

/// Strips edge decoration (connector labels, shape brackets) from one side of
/// a `-->` line and returns the bare identifier token.
fn edge_endpoint(part: &str) -> String {
    let mut token = part.trim();
    if let Some(rest) = token.strip_prefix('|') {
        token = match rest.split_once('|') {
            Some((_, after)) => after.trim_start(),
            None => rest,
        };
    }
    token
        .split(['[', '{', '('])
        .next()
        .unwrap_or("")
        .trim()
        .to_owned()
}

fn node_definition_pattern(node_id: &str) -> Option<Regex> {
    let escaped = regex::escape(node_id);
    Regex::new(&format!(r"(^|[^A-Za-z0-9_]){escaped}\[([^\]]+)\]")).ok()
}

#[cfg(test)]
mod tests {
    use super::FlowchartDocument;

    fn fixture() -> FlowchartDocument {
        FlowchartDocument::new(
            "graph TD\n    A[Start] --> B[Old Label]\n    B --> C{Check}\n    C -->|yes| D[Done]\n",
        )
    }

    #[test]
    fn edges_returns_identifier_pairs_in_order() {
        let document = fixture();
        assert_eq!(
            document.edges(),
            vec![
                ("A".to_owned(), "B".to_owned()),
                ("B".to_owned(), "C".to_owned()),
                ("C".to_owned(), "D".to_owned()),
            ]
        );
    }

    #[test]
    fn edges_strips_connector_labels_from_targets() {
        let document = FlowchartDocument::new("X -->|maybe| Y[End]");
        assert_eq!(document.edges(), vec![("X".to_owned(), "Y".to_owned())]);
    }

    #[test]
    fn node_label_resolves_bracketed_definitions() {
        let document = fixture();
        assert_eq!(document.node_label("B"), Some("Old Label".to_owned()));
        assert_eq!(document.node_label("D"), Some("Done".to_owned()));
        assert_eq!(document.node_label("C"), None);
        assert_eq!(document.node_label("missing"), None);
    }

    #[test]
    fn node_label_does_not_match_identifier_suffixes() {
        let document = FlowchartDocument::new("AB[Other]\nB[Mine]");
        assert_eq!(document.node_label("B"), Some("Mine".to_owned()));
    }

    #[test]
    fn ancestor_chain_walks_back_to_the_root() {
        let document = FlowchartDocument::new("A --> B\nB --> C\n");
        assert_eq!(document.ancestor_chain("C"), vec!["A", "B", "C"]);
        assert_eq!(document.ancestor_chain("A"), vec!["A"]);
    }

    #[test]
    fn ancestor_chain_terminates_on_cycles() {
        let document = FlowchartDocument::new("A --> B\nB --> A\n");
        assert_eq!(document.ancestor_chain("B"), vec!["A", "B"]);
    }

    #[test]
    fn rewrite_node_label_replaces_only_the_bracketed_text() {
        let mut document = fixture();
        assert!(document.rewrite_node_label("B", "New"));
        assert_eq!(
            document.text(),
            "graph TD\n    A[Start] --> B[New]\n    B --> C{Check}\n    C -->|yes| D[Done]\n"
        );
    }

    #[test]
    fn rewrite_node_label_of_unknown_node_is_a_no_op() {
        let mut document = fixture();
        let before = document.text().to_owned();
        assert!(!document.rewrite_node_label("Z", "New"));
        assert_eq!(document.text(), before);
    }

    #[test]
    fn rewrite_node_label_touches_a_single_line() {
        let mut document = FlowchartDocument::new("B[First]\nB[Second]\n");
        assert!(document.rewrite_node_label("B", "Edited"));
        assert_eq!(document.text(), "B[Edited]\nB[Second]\n");
    }
}
