// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire body of one blocking chat-completion request.
#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    inputs: serde_json::Value,
    query: &'a str,
    response_mode: &'a str,
    conversation_id: &'a str,
    user: &'a str,
    files: Vec<serde_json::Value>,
}

/// The subset of the endpoint's reply this system consumes. The
/// conversation id is empty or absent on the first turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    conversation_id: Option<String>,
}

impl ChatReply {
    pub fn new(answer: Option<String>, conversation_id: Option<String>) -> Self {
        Self {
            answer,
            conversation_id,
        }
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }
}

/// Failure talking to the chat endpoint. Recovered locally by the
/// conversation controller; never re-raised past it.
#[derive(Debug)]
pub struct ChatClientError {
    source: reqwest::Error,
}

impl fmt::Display for ChatClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chat endpoint request failed: {}", self.source)
    }
}

impl std::error::Error for ChatClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl From<reqwest::Error> for ChatClientError {
    fn from(source: reqwest::Error) -> Self {
        Self { source }
    }
}

/// Bearer-authenticated client for the hosted chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    endpoint: String,
    api_key: String,
    http: reqwest::Client,
}

impl ChatClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issues one blocking chat turn. `conversation_id` is empty on the
    /// first turn of a session.
    pub async fn send_message(
        &self,
        query: &str,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<ChatReply, ChatClientError> {
        let body = ChatRequestBody {
            inputs: serde_json::json!({}),
            query,
            response_mode: "blocking",
            conversation_id,
            user: user_id,
            files: Vec::new(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let reply = response.error_for_status()?.json::<ChatReply>().await?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatReply, ChatRequestBody};

    #[test]
    fn request_body_matches_the_endpoint_contract() {
        let body = ChatRequestBody {
            inputs: serde_json::json!({}),
            query: "make me a flow",
            response_mode: "blocking",
            conversation_id: "",
            user: "user_1700000000000",
            files: Vec::new(),
        };

        let value = serde_json::to_value(&body).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "inputs": {},
                "query": "make me a flow",
                "response_mode": "blocking",
                "conversation_id": "",
                "user": "user_1700000000000",
                "files": [],
            })
        );
    }

    #[test]
    fn replies_tolerate_absent_fields() {
        let reply: ChatReply = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(reply.answer(), None);
        assert_eq!(reply.conversation_id(), None);

        let reply: ChatReply =
            serde_json::from_str(r#"{"answer":"hi","conversation_id":"c1","extra":42}"#)
                .expect("deserialize");
        assert_eq!(reply.answer(), Some("hi"));
        assert_eq!(reply.conversation_id(), Some("c1"));
    }
}
