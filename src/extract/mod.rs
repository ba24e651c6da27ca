// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Message protocol extraction.
//!
//! Assistant replies are free text with up to three embedded payloads: a
//! mermaid-fenced flowchart, a bracketed quoted list of process names, and a
//! document block delimited by lines consisting solely of `@`. The three
//! extractions are independent and may co-occur in one reply.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::FlowchartDocument;

/// Marker substituted for mermaid-fenced payloads in display text.
pub const FLOWCHART_PLACEHOLDER: &str = "[flowchart attached]";

const DEFAULT_DOCUMENT_NAME: &str = "document.md";

fn mermaid_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```mermaid\s*(.*?)\s*```").expect("mermaid fence regex"))
}

fn bracketed_list() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(.*?)\]").expect("bracketed list regex"))
}

fn document_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?ms)^@\r?\n(.*?)\r?\n@$").expect("document block regex"))
}

fn level_one_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^# (.*?)\s*$").expect("heading regex"))
}

/// A `@`-delimited markdown block, offered to the user as a downloadable
/// artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlock {
    file_name: String,
    content: String,
}

impl DocumentBlock {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Structured data scraped from one raw reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedReply {
    display_text: String,
    flowchart: Option<FlowchartDocument>,
    processes: Option<Vec<String>>,
    document: Option<DocumentBlock>,
}

impl ExtractedReply {
    /// Reply text with mermaid payloads replaced by [`FLOWCHART_PLACEHOLDER`]
    /// and generic code-fence markers stripped.
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn flowchart(&self) -> Option<&FlowchartDocument> {
        self.flowchart.as_ref()
    }

    pub fn processes(&self) -> Option<&[String]> {
        self.processes.as_deref()
    }

    pub fn document(&self) -> Option<&DocumentBlock> {
        self.document.as_ref()
    }

    pub fn into_parts(
        self,
    ) -> (
        String,
        Option<FlowchartDocument>,
        Option<Vec<String>>,
        Option<DocumentBlock>,
    ) {
        (self.display_text, self.flowchart, self.processes, self.document)
    }
}

/// Runs all three extractions over a raw reply.
pub fn extract_reply(text: &str) -> ExtractedReply {
    ExtractedReply {
        display_text: display_text(text),
        flowchart: extract_flowchart(text),
        processes: extract_process_list(text),
        document: extract_document_block(text),
    }
}

/// First mermaid-fenced block, interior trimmed.
pub fn extract_flowchart(text: &str) -> Option<FlowchartDocument> {
    mermaid_fence()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|interior| FlowchartDocument::new(interior.as_str().trim()))
}

/// First bracketed, comma-separated, quoted list outside any mermaid block,
/// parsed as a literal list of process names.
///
/// Anything that does not parse to a non-empty list of strings is treated as
/// absent; the failure is logged, never surfaced.
pub fn extract_process_list(text: &str) -> Option<Vec<String>> {
    let without_mermaid = mermaid_fence().replace_all(text, "");
    let candidate = bracketed_list().find(&without_mermaid)?.as_str();
    let normalized = candidate.replace('\'', "\"");

    match serde_json::from_str::<Vec<String>>(&normalized) {
        Ok(processes) if !processes.is_empty() => Some(processes),
        Ok(_) => None,
        Err(err) => {
            tracing::warn!(candidate, error = %err, "discarding unparsable process list");
            None
        }
    }
}

/// First text delimited by a line containing only `@` ... a line containing
/// only `@`. The display file name comes from the first level-1 heading
/// inside, defaulting to `document.md`.
pub fn extract_document_block(text: &str) -> Option<DocumentBlock> {
    let captures = document_block().captures(text)?;
    let content = captures.get(1)?.as_str().to_owned();
    let file_name = level_one_heading()
        .captures(&content)
        .and_then(|heading| heading.get(1))
        .map_or_else(
            || DEFAULT_DOCUMENT_NAME.to_owned(),
            |title| format!("{}.md", title.as_str()),
        );
    Some(DocumentBlock { file_name, content })
}

fn display_text(text: &str) -> String {
    mermaid_fence()
        .replace_all(text, FLOWCHART_PLACEHOLDER)
        .replace("```", "")
}
