// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Static question data: process name -> ordered question chain.
//!
//! The on-disk format is JSON. Option order inside a question is
//! significant and preserved as written.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::model::{Outcome, QuestionNode};

/// Failure loading or validating the question-data file.
#[derive(Debug)]
pub enum QuestionDataError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        source: serde_json::Error,
    },
    /// An option carried neither `next`, `output`, nor `submit`.
    MissingOutcome {
        process: String,
        question_id: String,
        option: String,
    },
    /// An option carried more than one of `next`, `output`, `submit`.
    AmbiguousOutcome {
        process: String,
        question_id: String,
        option: String,
    },
}

impl fmt::Display for QuestionDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read question data {}: {source}", path.display())
            }
            Self::Json { source } => write!(f, "malformed question data: {source}"),
            Self::MissingOutcome {
                process,
                question_id,
                option,
            } => write!(
                f,
                "option '{option}' of {process}/{question_id} declares no outcome"
            ),
            Self::AmbiguousOutcome {
                process,
                question_id,
                option,
            } => write!(
                f,
                "option '{option}' of {process}/{question_id} declares more than one outcome"
            ),
        }
    }
}

impl std::error::Error for QuestionDataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: String,
    question: String,
    // serde_json's preserve_order keeps option order as authored.
    options: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOption {
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    submit: Option<bool>,
}

/// Validated question data, keyed by process name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionData {
    processes: BTreeMap<String, Vec<QuestionNode>>,
}

impl QuestionData {
    pub fn load(path: &Path) -> Result<Self, QuestionDataError> {
        let text = fs::read_to_string(path).map_err(|source| QuestionDataError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, QuestionDataError> {
        let raw: BTreeMap<String, Vec<RawQuestion>> =
            serde_json::from_str(text).map_err(|source| QuestionDataError::Json { source })?;

        let mut processes = BTreeMap::new();
        for (process, questions) in raw {
            let mut nodes = Vec::with_capacity(questions.len());
            for question in questions {
                let mut options = Vec::with_capacity(question.options.len());
                for (label, value) in &question.options {
                    let raw_option: RawOption = serde_json::from_value(value.clone())
                        .map_err(|source| QuestionDataError::Json { source })?;
                    let outcome = resolve_outcome(&process, &question.id, label, raw_option)?;
                    options.push((label.clone(), outcome));
                }
                nodes.push(QuestionNode::new(question.id, question.question, options));
            }
            processes.insert(process, nodes);
        }
        Ok(Self { processes })
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn questions(&self, process: &str) -> Option<&[QuestionNode]> {
        self.processes.get(process).map(Vec::as_slice)
    }

    pub fn question(&self, process: &str, question_id: &str) -> Option<&QuestionNode> {
        self.questions(process)?
            .iter()
            .find(|node| node.id() == question_id)
    }
}

fn resolve_outcome(
    process: &str,
    question_id: &str,
    label: &str,
    raw: RawOption,
) -> Result<Outcome, QuestionDataError> {
    let declared = usize::from(raw.next.is_some())
        + usize::from(raw.output.is_some())
        + usize::from(raw.submit == Some(true));
    match declared {
        0 => Err(QuestionDataError::MissingOutcome {
            process: process.to_owned(),
            question_id: question_id.to_owned(),
            option: label.to_owned(),
        }),
        1 => Ok(match (raw.next, raw.output) {
            (Some(next), _) => Outcome::Next(next),
            (_, Some(output)) => Outcome::Recommend(output),
            _ => Outcome::Submit,
        }),
        _ => Err(QuestionDataError::AmbiguousOutcome {
            process: process.to_owned(),
            question_id: question_id.to_owned(),
            option: label.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{QuestionData, QuestionDataError};
    use crate::model::Outcome;

    const FIXTURE: &str = r#"{
        "etching": [
            {
                "id": "Q1",
                "question": "Dry or wet etch?",
                "options": {
                    "dry": {"next": "Q2"},
                    "wet": {"output": "use the wet bench"}
                }
            },
            {
                "id": "Q2",
                "question": "Which gas?",
                "options": {
                    "SF6": {"output": "fluorine plasma recipe"},
                    "Cl2": {"output": "chlorine plasma recipe"}
                }
            }
        ]
    }"#;

    #[test]
    fn questions_load_with_option_order_preserved() {
        let data = QuestionData::from_json_str(FIXTURE).expect("load");
        let questions = data.questions("etching").expect("process");
        assert_eq!(questions.len(), 2);

        let q1 = &questions[0];
        assert_eq!(q1.id(), "Q1");
        assert_eq!(q1.options()[0].0, "dry");
        assert_eq!(q1.options()[1].0, "wet");
        assert_eq!(q1.outcome("dry"), Some(&Outcome::Next("Q2".to_owned())));
        assert_eq!(
            q1.outcome("wet"),
            Some(&Outcome::Recommend("use the wet bench".to_owned()))
        );

        assert!(data.question("etching", "Q2").is_some());
        assert!(data.questions("deposition").is_none());
    }

    #[test]
    fn options_must_declare_exactly_one_outcome() {
        let missing = r#"{"p": [{"id": "Q1", "question": "?", "options": {"a": {}}}]}"#;
        assert!(matches!(
            QuestionData::from_json_str(missing),
            Err(QuestionDataError::MissingOutcome { .. })
        ));

        let ambiguous = r#"{"p": [{"id": "Q1", "question": "?",
            "options": {"a": {"next": "Q2", "output": "done"}}}]}"#;
        assert!(matches!(
            QuestionData::from_json_str(ambiguous),
            Err(QuestionDataError::AmbiguousOutcome { .. })
        ));
    }

    #[test]
    fn submit_options_parse() {
        let text = r#"{"p": [{"id": "submit", "question": "Ready?",
            "options": {"Submit": {"submit": true}}}]}"#;
        let data = QuestionData::from_json_str(text).expect("load");
        assert_eq!(
            data.question("p", "submit").expect("question").outcome("Submit"),
            Some(&Outcome::Submit)
        );
    }
}
