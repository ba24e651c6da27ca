// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Conversation state and the hosted chat endpoint client.

mod client;
mod controller;

pub use client::{ChatClient, ChatClientError, ChatReply};
pub use controller::{
    ChatEvent, ConversationController, PendingTurn, APOLOGY_MESSAGE, SUBMISSION_PREFIX,
    WELCOME_MESSAGE,
};
