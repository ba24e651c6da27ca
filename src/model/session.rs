// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Identity of one conversation with the hosted chat endpoint.
///
/// The user id is generated once at startup and stays stable for the run.
/// The conversation id starts empty, is adopted from the first server reply,
/// and is reused for every later turn until an explicit reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSession {
    user_id: String,
    conversation_id: String,
}

impl ConversationSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            conversation_id: String::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Adopts a server-issued conversation id. Empty ids are ignored.
    pub fn adopt_conversation_id(&mut self, conversation_id: &str) {
        if !conversation_id.is_empty() {
            self.conversation_id = conversation_id.to_owned();
        }
    }

    pub fn clear_conversation(&mut self) {
        self.conversation_id.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::ConversationSession;

    #[test]
    fn conversation_id_starts_empty_and_is_adopted_once_issued() {
        let mut session = ConversationSession::new("user_1700000000000");
        assert_eq!(session.user_id(), "user_1700000000000");
        assert_eq!(session.conversation_id(), "");

        session.adopt_conversation_id("conv-42");
        assert_eq!(session.conversation_id(), "conv-42");

        session.adopt_conversation_id("");
        assert_eq!(session.conversation_id(), "conv-42");

        session.clear_conversation();
        assert_eq!(session.conversation_id(), "");
    }
}
