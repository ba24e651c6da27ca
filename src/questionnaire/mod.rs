// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Wizard questionnaire: static question data plus the selection state
//! machine.

mod data;
mod machine;

pub use data::{QuestionData, QuestionDataError};
pub use machine::{
    ChoiceEffect, Questionnaire, QuestionnairePhase, ENTRY_QUESTION_ID, SUBMIT_QUESTION_ID,
};
