// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::data::QuestionData;
use crate::chat::SUBMISSION_PREFIX;
use crate::model::{Outcome, QuestionNode};

/// Entry question id of every process chain.
pub const ENTRY_QUESTION_ID: &str = "Q1";

/// Id of the synthetic final question; never present in the data file.
pub const SUBMIT_QUESTION_ID: &str = "submit";

const SUBMIT_PROMPT: &str = "All questions answered. Submit the questionnaire?";
const SUBMIT_OPTION_LABEL: &str = "Submit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionnairePhase {
    /// No process list yet.
    Loading,
    /// Walking a question chain.
    Selecting,
    /// Submitted; awaiting the delayed close.
    Completed,
}

/// One answered question, for stepping back.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HistoryEntry {
    process: String,
    question_id: String,
    chosen_label: String,
}

/// What a choice produced beyond advancing the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceEffect {
    None,
    /// The submission message to forward through the chat, prefix included.
    Submitted(String),
}

/// Wizard over the static question data: one process at a time, entry
/// question `Q1`, recommendations collected per process, a synthetic submit
/// question once every process carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Questionnaire {
    data: QuestionData,
    processes: Vec<String>,
    active_process: Option<String>,
    current: Option<QuestionNode>,
    history: Vec<HistoryEntry>,
    results: BTreeMap<String, String>,
    banner: Option<String>,
    phase: QuestionnairePhase,
}

impl Questionnaire {
    pub fn new(data: QuestionData) -> Self {
        Self {
            data,
            processes: Vec::new(),
            active_process: None,
            current: None,
            history: Vec::new(),
            results: BTreeMap::new(),
            banner: None,
            phase: QuestionnairePhase::Loading,
        }
    }

    pub fn phase(&self) -> QuestionnairePhase {
        self.phase
    }

    pub fn processes(&self) -> &[String] {
        &self.processes
    }

    pub fn active_process(&self) -> Option<&str> {
        self.active_process.as_deref()
    }

    pub fn current_question(&self) -> Option<&QuestionNode> {
        self.current.as_ref()
    }

    /// Question ids answered so far within the active process, current
    /// question included.
    pub fn path_taken(&self) -> Vec<String> {
        let mut path: Vec<String> = self
            .history
            .iter()
            .filter(|entry| Some(entry.process.as_str()) == self.active_process())
            .map(|entry| entry.question_id.clone())
            .collect();
        if let Some(current) = &self.current {
            path.push(current.id().to_owned());
        }
        path
    }

    pub fn results(&self) -> &BTreeMap<String, String> {
        &self.results
    }

    /// Non-fatal data problem to surface in the debug banner.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn all_completed(&self) -> bool {
        !self.processes.is_empty()
            && self
                .processes
                .iter()
                .all(|process| self.results.contains_key(process))
    }

    /// Installs the detected process list and enters the first chain.
    pub fn set_processes(&mut self, processes: Vec<String>) {
        self.processes = processes;
        self.active_process = None;
        self.current = None;
        self.history.clear();
        self.results.clear();
        self.banner = None;
        self.phase = QuestionnairePhase::Loading;

        if let Some(first) = self.processes.first().cloned() {
            self.enter_process(&first);
        }
    }

    /// Enters a process at its entry question. Missing data is reported
    /// through the banner, never a panic.
    pub fn enter_process(&mut self, process: &str) {
        if self.data.questions(process).is_none() {
            self.banner = Some(format!("no question data for process '{process}'"));
            return;
        }
        let Some(entry) = self.data.question(process, ENTRY_QUESTION_ID) else {
            self.banner = Some(format!(
                "process '{process}' has no entry question '{ENTRY_QUESTION_ID}'"
            ));
            return;
        };

        self.active_process = Some(process.to_owned());
        self.current = Some(entry.clone());
        self.banner = None;
        self.phase = QuestionnairePhase::Selecting;
    }

    /// Jumps to another detected process, keeping recorded recommendations.
    pub fn switch_process(&mut self, process: &str) {
        if self.phase == QuestionnairePhase::Completed {
            return;
        }
        if self.processes.iter().any(|name| name == process) {
            // Drop the abandoned chain's steps so back does not cross into it.
            self.history.retain(|entry| entry.process != process);
            self.enter_process(process);
        }
    }

    /// Applies the chosen option of the current question.
    pub fn choose(&mut self, label: &str) -> ChoiceEffect {
        let (Some(process), Some(current)) = (self.active_process.clone(), self.current.clone())
        else {
            return ChoiceEffect::None;
        };
        let Some(outcome) = current.outcome(label).cloned() else {
            self.banner = Some(format!(
                "question '{}' has no option '{label}'",
                current.id()
            ));
            return ChoiceEffect::None;
        };

        match outcome {
            Outcome::Next(question_id) => {
                let Some(next) = self.data.question(&process, &question_id).cloned() else {
                    self.banner = Some(format!(
                        "process '{process}' has no question '{question_id}'"
                    ));
                    return ChoiceEffect::None;
                };
                self.push_history(&process, current.id(), label);
                self.current = Some(next);
                self.banner = None;
                ChoiceEffect::None
            }
            Outcome::Recommend(text) => {
                self.push_history(&process, current.id(), label);
                self.results.insert(process, text);
                self.banner = None;
                self.advance_past_completed_process();
                ChoiceEffect::None
            }
            Outcome::Submit => self.submit(),
        }
    }

    /// Steps back to the previously answered question. Unavailable on the
    /// synthetic submit question and with an empty history.
    pub fn back(&mut self) -> bool {
        if self
            .current
            .as_ref()
            .is_some_and(|node| node.id() == SUBMIT_QUESTION_ID)
        {
            return false;
        }
        let Some(entry) = self.history.pop() else {
            return false;
        };

        // Undo a recorded recommendation when stepping back over it.
        if let Some(question) = self.data.question(&entry.process, &entry.question_id) {
            if matches!(question.outcome(&entry.chosen_label), Some(Outcome::Recommend(_))) {
                self.results.remove(&entry.process);
            }
            self.active_process = Some(entry.process.clone());
            self.current = Some(question.clone());
            self.banner = None;
            self.phase = QuestionnairePhase::Selecting;
            true
        } else {
            self.banner = Some(format!(
                "process '{}' has no question '{}'",
                entry.process, entry.question_id
            ));
            false
        }
    }

    /// Submits directly, skipping the synthetic submit question; only once
    /// every process has a recorded recommendation.
    pub fn request_submit(&mut self) -> ChoiceEffect {
        if !self.all_completed() {
            return ChoiceEffect::None;
        }
        self.submit()
    }

    /// Clears everything except the loaded data.
    pub fn reset(&mut self) {
        self.processes.clear();
        self.active_process = None;
        self.current = None;
        self.history.clear();
        self.results.clear();
        self.banner = None;
        self.phase = QuestionnairePhase::Loading;
    }

    fn push_history(&mut self, process: &str, question_id: &str, label: &str) {
        self.history.push(HistoryEntry {
            process: process.to_owned(),
            question_id: question_id.to_owned(),
            chosen_label: label.to_owned(),
        });
    }

    fn advance_past_completed_process(&mut self) {
        let pending = self
            .processes
            .iter()
            .find(|process| !self.results.contains_key(*process))
            .cloned();
        match pending {
            Some(process) => self.enter_process(&process),
            None => self.present_submit_question(),
        }
    }

    fn present_submit_question(&mut self) {
        self.current = Some(QuestionNode::new(
            SUBMIT_QUESTION_ID,
            SUBMIT_PROMPT,
            vec![(SUBMIT_OPTION_LABEL.to_owned(), Outcome::Submit)],
        ));
        self.phase = QuestionnairePhase::Selecting;
    }

    fn submit(&mut self) -> ChoiceEffect {
        let lines: Vec<String> = self
            .processes
            .iter()
            .filter_map(|process| {
                self.results
                    .get(process)
                    .map(|recommendation| format!("{process}: {recommendation}"))
            })
            .collect();
        self.phase = QuestionnairePhase::Completed;
        ChoiceEffect::Submitted(format!("{SUBMISSION_PREFIX}{}", lines.join("\n")))
    }
}
