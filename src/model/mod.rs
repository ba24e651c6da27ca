// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model: chat messages, conversation sessions, flowchart
//! documents, and questionnaire data.

mod document;
mod message;
mod questionnaire;
mod session;

pub use document::FlowchartDocument;
pub use message::{ChatMessage, ChatRole};
pub use questionnaire::{Outcome, QuestionNode};
pub use session::ConversationSession;
