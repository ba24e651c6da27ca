// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::document::FlowchartDocument;

/// Who produced a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatRole {
    User,
    Assistant,
    /// Placeholder shown while a reply is in flight; replaced in place when
    /// the reply arrives.
    Thinking,
}

/// One entry of the chronological chat history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    role: ChatRole,
    display_text: String,
    raw_flowchart: Option<FlowchartDocument>,
}

impl ChatMessage {
    pub fn user(display_text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            display_text: display_text.into(),
            raw_flowchart: None,
        }
    }

    pub fn assistant(
        display_text: impl Into<String>,
        raw_flowchart: Option<FlowchartDocument>,
    ) -> Self {
        Self {
            role: ChatRole::Assistant,
            display_text: display_text.into(),
            raw_flowchart,
        }
    }

    pub fn thinking() -> Self {
        Self {
            role: ChatRole::Thinking,
            display_text: String::new(),
            raw_flowchart: None,
        }
    }

    pub fn role(&self) -> ChatRole {
        self.role
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn raw_flowchart(&self) -> Option<&FlowchartDocument> {
        self.raw_flowchart.as_ref()
    }
}
