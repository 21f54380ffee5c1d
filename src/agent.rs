use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Serialize)]
struct ChatRequest {
    question: String,
    thread_id: String,
}

/// Response shape of `POST /chat/agent`. The backend also sends fields like
/// `sources` which this client does not use.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub status: String,
    pub answer: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// The controller switches exhaustively on this; transport failures arrive
/// separately as the `Err` side of the request task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentReply {
    /// Plain conversational answer, appended to the chat verbatim.
    Answer(String),
    /// Report-shaped answer: raw markup for the report pane.
    Report(String),
    /// Agent hit human-intervention and stopped. Resuming is a backend
    /// operation, not something this console does.
    Paused {
        message: Option<String>,
        error: Option<String>,
    },
    /// Response carried neither an answer nor a recognizable pause status.
    Failed(String),
}

/// A report is an HTML document or container fragment; everything else the
/// agent returns is chat text. Prefix inspection works on chars, never on
/// byte offsets, so multibyte content cannot break the check.
fn is_report_markup(answer: &str) -> bool {
    let head: String = answer
        .trim_start()
        .chars()
        .take("<!doctype".len())
        .collect::<String>()
        .to_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html") || head.starts_with("<div")
}

impl ChatResponse {
    pub fn into_reply(self) -> AgentReply {
        if self.status == "PAUSED" {
            return AgentReply::Paused {
                message: self.message,
                error: self.error,
            };
        }
        match self.answer {
            Some(answer) if is_report_markup(&answer) => AgentReply::Report(answer),
            Some(answer) => AgentReply::Answer(answer),
            None => AgentReply::Failed(format!(
                "response with status {:?} had no answer",
                self.status
            )),
        }
    }
}

#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    base_url: String,
}

impl AgentClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat(&self, question: &str, thread_id: &str) -> Result<ChatResponse> {
        let url = format!("{}/chat/agent", self.base_url);

        let request = ChatRequest {
            question: question.to_string(),
            thread_id: thread_id.to_string(),
        };

        tracing::debug!(%url, thread_id, "sending question to agent");

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "agent request failed with status: {}",
                response.status()
            ));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: &str, answer: Option<&str>) -> ChatResponse {
        ChatResponse {
            status: status.to_string(),
            answer: answer.map(|a| a.to_string()),
            message: None,
            error: None,
        }
    }

    #[test]
    fn plain_answer_is_chat_text() {
        let reply = response("COMPLETED", Some("Hi there")).into_reply();
        assert_eq!(reply, AgentReply::Answer("Hi there".to_string()));
    }

    #[test]
    fn doctype_answer_is_a_report_with_exact_markup() {
        let markup = "<!DOCTYPE html>\n<html><body>Report</body></html>";
        let reply = response("COMPLETED", Some(markup)).into_reply();
        assert_eq!(reply, AgentReply::Report(markup.to_string()));
    }

    #[test]
    fn html_document_without_doctype_is_a_report() {
        let markup = "<html><body><h1>AAPL</h1></body></html>";
        let reply = response("COMPLETED", Some(markup)).into_reply();
        assert_eq!(reply, AgentReply::Report(markup.to_string()));
    }

    #[test]
    fn multibyte_content_near_the_prefix_still_classifies_as_a_report() {
        // The euro sign straddles what used to be a fixed byte-offset cut.
        let markup = "<div>123456789\u{20ac}</div>";
        let reply = response("COMPLETED", Some(markup)).into_reply();
        assert_eq!(reply, AgentReply::Report(markup.to_string()));
    }

    #[test]
    fn container_fragment_is_a_report() {
        let reply = response("COMPLETED", Some("<div>Report</div>")).into_reply();
        assert_eq!(reply, AgentReply::Report("<div>Report</div>".to_string()));
    }

    #[test]
    fn doctype_detection_ignores_leading_whitespace_and_case() {
        let reply = response("COMPLETED", Some("  \n<!doctype HTML><html></html>")).into_reply();
        assert!(matches!(reply, AgentReply::Report(_)));
    }

    #[test]
    fn angle_bracket_prose_is_not_a_report() {
        let reply = response("COMPLETED", Some("<insert ticker> is required")).into_reply();
        assert_eq!(
            reply,
            AgentReply::Answer("<insert ticker> is required".to_string())
        );
    }

    #[test]
    fn paused_status_wins_over_answer() {
        let mut resp = response("PAUSED", Some("<div>partial</div>"));
        resp.message = Some("Agent paused for human intervention.".to_string());
        resp.error = Some("calculator tool failed".to_string());
        let reply = resp.into_reply();
        assert_eq!(
            reply,
            AgentReply::Paused {
                message: Some("Agent paused for human intervention.".to_string()),
                error: Some("calculator tool failed".to_string()),
            }
        );
    }

    #[test]
    fn missing_answer_is_a_failure_not_silent_success() {
        let reply = response("COMPLETED", None).into_reply();
        assert!(matches!(reply, AgentReply::Failed(_)));
    }

    #[test]
    fn response_deserializes_with_unknown_fields() {
        let raw = r#"{"status":"COMPLETED","answer":"ok","sources":["10-K"]}"#;
        let resp: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.status, "COMPLETED");
        assert_eq!(resp.answer.as_deref(), Some("ok"));
        assert!(resp.message.is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = AgentClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
