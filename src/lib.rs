// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Fabflow — terminal-first fabrication-process assistant.
//!
//! A chat panel talking to a hosted conversational endpoint, a pan/zoom
//! viewport over a rendered Mermaid flowchart, and a wizard questionnaire
//! driven by static question data.

pub mod chat;
pub mod extract;
pub mod model;
pub mod questionnaire;
pub mod render;
pub mod tui;
pub mod viewport;
