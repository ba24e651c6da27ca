// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::client::ChatReply;
use crate::extract::{extract_reply, DocumentBlock};
use crate::model::{ChatMessage, ChatRole, ConversationSession, FlowchartDocument};

/// Fixed first message of every conversation.
pub const WELCOME_MESSAGE: &str = "👋 Hello! I am the fabrication process assistant. \
Describe the process flow you need and I will map it out as a flowchart.";

/// Fixed user-visible message after an endpoint failure.
pub const APOLOGY_MESSAGE: &str = "Sorry, something went wrong. Please try again later.";

/// Marker prefixing questionnaire submissions sent through the chat.
pub const SUBMISSION_PREFIX: &str = "submit questionnaire\n";

const FALLBACK_ANSWER: &str = "Sorry, I cannot answer that right now.";
const SUBMISSION_DISPLAY: &str = "Questionnaire submitted";

/// Side-channel data extracted from a reply, raised to listeners as typed
/// events instead of callback parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    ProcessesDetected(Vec<String>),
    FlowchartDetected(FlowchartDocument),
    DocumentDetected(DocumentBlock),
}

/// Handle for one in-flight turn: which placeholder it owns and the epoch it
/// was started in. A reply whose epoch no longer matches is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    epoch: u64,
    message_index: usize,
    query: String,
    user_id: String,
    conversation_id: String,
}

impl PendingTurn {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }
}

/// Owns the chronological message history and the request/response cycle.
///
/// Sends are neither queued nor de-duplicated: overlapping turns each own
/// their placeholder entry and may resolve in any order. A reset bumps the
/// epoch so replies begun before it land inert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationController {
    messages: Vec<ChatMessage>,
    session: ConversationSession,
    epoch: u64,
}

impl ConversationController {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(WELCOME_MESSAGE, None)],
            session: ConversationSession::new(user_id),
            epoch: 0,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    /// True while at least one thinking placeholder is outstanding.
    pub fn is_thinking(&self) -> bool {
        self.messages
            .iter()
            .any(|message| message.role() == ChatRole::Thinking)
    }

    /// Clears history back to the single welcome message and drops the
    /// session id. In-flight turns are not cancelled; their replies are
    /// discarded on arrival via the epoch bump.
    pub fn reset(&mut self) {
        self.messages = vec![ChatMessage::assistant(WELCOME_MESSAGE, None)];
        self.session.clear_conversation();
        self.epoch += 1;
    }

    /// Appends the user message plus its thinking placeholder and returns
    /// the turn handle carrying everything the transport needs.
    pub fn begin_turn(&mut self, text: &str) -> PendingTurn {
        let display = if text.starts_with(SUBMISSION_PREFIX) {
            SUBMISSION_DISPLAY.to_owned()
        } else {
            extract_reply(text).display_text().to_owned()
        };
        self.messages.push(ChatMessage::user(display));
        self.messages.push(ChatMessage::thinking());

        PendingTurn {
            epoch: self.epoch,
            message_index: self.messages.len() - 1,
            query: text.to_owned(),
            user_id: self.session.user_id().to_owned(),
            conversation_id: self.session.conversation_id().to_owned(),
        }
    }

    /// Applies a successful reply: adopts the conversation id, extracts the
    /// payloads, replaces the turn's own placeholder, and returns the events
    /// to raise.
    pub fn apply_reply(&mut self, turn: &PendingTurn, reply: &ChatReply) -> Vec<ChatEvent> {
        if turn.epoch != self.epoch {
            tracing::debug!(query = turn.query(), "discarding reply from a reset conversation");
            return Vec::new();
        }

        if let Some(conversation_id) = reply.conversation_id() {
            self.session.adopt_conversation_id(conversation_id);
        }

        let answer = match reply.answer() {
            Some(answer) if !answer.is_empty() => answer,
            _ => FALLBACK_ANSWER,
        };

        let extracted = extract_reply(answer);
        let mut events = Vec::new();
        if let Some(processes) = extracted.processes() {
            events.push(ChatEvent::ProcessesDetected(processes.to_vec()));
        }
        if let Some(flowchart) = extracted.flowchart() {
            events.push(ChatEvent::FlowchartDetected(flowchart.clone()));
        }
        if let Some(document) = extracted.document() {
            events.push(ChatEvent::DocumentDetected(document.clone()));
        }

        let message = ChatMessage::assistant(
            extracted.display_text(),
            extracted.flowchart().cloned(),
        );
        self.replace_placeholder(turn, message);
        events
    }

    /// Applies a failed turn: the placeholder becomes the fixed apology
    /// message; the error is logged and not re-raised.
    pub fn apply_failure(&mut self, turn: &PendingTurn, error: &dyn fmt::Display) {
        tracing::warn!(query = turn.query(), error = %error, "chat turn failed");
        if turn.epoch != self.epoch {
            return;
        }
        self.replace_placeholder(turn, ChatMessage::assistant(APOLOGY_MESSAGE, None));
    }

    fn replace_placeholder(&mut self, turn: &PendingTurn, message: ChatMessage) {
        match self.messages.get_mut(turn.message_index) {
            Some(slot) if slot.role() == ChatRole::Thinking => *slot = message,
            _ => {
                tracing::warn!(
                    index = turn.message_index,
                    "thinking placeholder missing; dropping reply"
                );
            }
        }
    }
}
