// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// What choosing an option does. Exactly one outcome per option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Advance to another question of the active process.
    Next(String),
    /// Terminal recommendation text for the active process.
    Recommend(String),
    /// Trigger questionnaire submission.
    Submit,
}

/// One question of a process's question chain, loaded from static data and
/// read-only thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionNode {
    id: String,
    question: String,
    options: Vec<(String, Outcome)>,
}

impl QuestionNode {
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        options: Vec<(String, Outcome)>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            options,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[(String, Outcome)] {
        &self.options
    }

    pub fn outcome(&self, label: &str) -> Option<&Outcome> {
        self.options
            .iter()
            .find_map(|(text, outcome)| (text == label).then_some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::{Outcome, QuestionNode};

    #[test]
    fn outcome_lookup_is_by_option_label() {
        let node = QuestionNode::new(
            "Q1",
            "Dry or wet?",
            vec![
                ("dry".to_owned(), Outcome::Next("Q2".to_owned())),
                ("wet".to_owned(), Outcome::Recommend("use the wet bench".to_owned())),
            ],
        );

        assert_eq!(node.id(), "Q1");
        assert_eq!(node.outcome("dry"), Some(&Outcome::Next("Q2".to_owned())));
        assert_eq!(
            node.outcome("wet"),
            Some(&Outcome::Recommend("use the wet bench".to_owned()))
        );
        assert_eq!(node.outcome("plasma"), None);
    }
}
