// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Fabflow CLI entrypoint.
//!
//! Runs the interactive TUI against a hosted chat endpoint. The API key comes
//! from `--api-key` or the `FABFLOW_API_KEY` environment variable.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_QUESTIONS_PATH: &str = "questions.json";
const DEFAULT_LOG_PATH: &str = "fabflow.log";
const API_KEY_ENV: &str = "FABFLOW_API_KEY";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} --endpoint <url> [--api-key <key>] [--questions <path>] [--log-file <path>]\n\n\
         --endpoint   chat-completion endpoint URL (required)\n\
         --api-key    bearer token; defaults to ${API_KEY_ENV}\n\
         --questions  question-data JSON (default {DEFAULT_QUESTIONS_PATH})\n\
         --log-file   log destination (default {DEFAULT_LOG_PATH})"
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    endpoint: Option<String>,
    api_key: Option<String>,
    questions: Option<String>,
    log_file: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--endpoint" => {
                if options.endpoint.is_some() {
                    return Err(());
                }
                options.endpoint = Some(args.next().ok_or(())?);
            }
            "--api-key" => {
                if options.api_key.is_some() {
                    return Err(());
                }
                options.api_key = Some(args.next().ok_or(())?);
            }
            "--questions" => {
                if options.questions.is_some() {
                    return Err(());
                }
                options.questions = Some(args.next().ok_or(())?);
            }
            "--log-file" => {
                if options.log_file.is_some() {
                    return Err(());
                }
                options.log_file = Some(args.next().ok_or(())?);
            }
            _ => return Err(()),
        }
    }

    if options.endpoint.is_none() {
        return Err(());
    }

    Ok(options)
}

fn init_logging(path: &str) -> Result<(), Box<dyn Error>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "fabflow".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let endpoint = options.endpoint.unwrap_or_default();
        let api_key = match options.api_key.or_else(|| std::env::var(API_KEY_ENV).ok()) {
            Some(key) => key,
            None => {
                eprintln!("fabflow: no API key; pass --api-key or set {API_KEY_ENV}");
                std::process::exit(2);
            }
        };

        init_logging(options.log_file.as_deref().unwrap_or(DEFAULT_LOG_PATH))?;

        let questions_path =
            PathBuf::from(options.questions.unwrap_or_else(|| DEFAULT_QUESTIONS_PATH.to_owned()));
        let data = fabflow::questionnaire::QuestionData::load(&questions_path)?;

        let now_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let user_id = format!("user_{now_millis}");

        let client = fabflow::chat::ChatClient::new(endpoint, api_key);

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let handle = runtime.handle().clone();

        runtime.block_on(async move {
            let tui_join = tokio::task::spawn_blocking(move || {
                fabflow::tui::run(client, data, user_id, handle).map_err(|err| err.to_string())
            })
            .await;

            let tui_result = tui_join.map_err(|err| -> Box<dyn Error> { Box::new(err) })?;
            tui_result.map_err(|err| {
                Box::new(std::io::Error::new(std::io::ErrorKind::Other, err)) as Box<dyn Error>
            })?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("fabflow: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values.iter().map(|value| (*value).to_owned()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn requires_an_endpoint() {
        parse_options(std::iter::empty()).unwrap_err();

        let options =
            parse_options(args(&["--endpoint", "https://api.example/chat"])).expect("parse");
        assert_eq!(
            options,
            CliOptions {
                endpoint: Some("https://api.example/chat".to_owned()),
                ..CliOptions::default()
            }
        );
    }

    #[test]
    fn parses_all_flags() {
        let options = parse_options(args(&[
            "--endpoint",
            "https://api.example/chat",
            "--api-key",
            "secret",
            "--questions",
            "data/questions.json",
            "--log-file",
            "/tmp/fabflow.log",
        ]))
        .expect("parse");

        assert_eq!(options.api_key.as_deref(), Some("secret"));
        assert_eq!(options.questions.as_deref(), Some("data/questions.json"));
        assert_eq!(options.log_file.as_deref(), Some("/tmp/fabflow.log"));
    }

    #[test]
    fn rejects_duplicate_flags() {
        parse_options(args(&["--endpoint", "a", "--endpoint", "b"])).unwrap_err();
    }

    #[test]
    fn rejects_unknown_and_positional_args() {
        parse_options(args(&["--endpoint", "a", "--nope"])).unwrap_err();
        parse_options(args(&["--endpoint", "a", "stray"])).unwrap_err();
    }

    #[test]
    fn rejects_missing_flag_values() {
        parse_options(args(&["--endpoint"])).unwrap_err();
        parse_options(args(&["--endpoint", "a", "--api-key"])).unwrap_err();
    }
}
