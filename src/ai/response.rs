use anyhow::Result;
use serde::{Deserialize, Serialize};

// ============================================================================
// Chat Completion Response Structures
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// OpenAI-style error envelope: `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl ChatCompletion {
    /// Text of the first choice.
    pub fn text(&self) -> Result<&str> {
        let choice = self
            .choices
            .first()
            .ok_or_else(|| anyhow::anyhow!("Empty completion: response contained no choices"))?;

        choice
            .message
            .content
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Empty completion: first choice has no content"))
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.choices.first()?.finish_reason.as_deref()
    }
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse_completion(body: &str) -> Result<ChatCompletion> {
        Ok(serde_json::from_str(body)?)
    }

    /// Extracts the server's error message from a failed response body,
    /// falling back to the raw body when it isn't the OpenAI shape.
    pub fn error_message(body: &str) -> Option<String> {
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
            return Some(envelope.error.message);
        }

        let trimmed = body.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.chars().take(300).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_choice_text() {
        let body = r#"{
            "id": "chatcmpl-7",
            "object": "chat.completion",
            "model": "gpt-oss:20b",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Hello, DreamWorld!"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "second"}}
            ],
            "usage": {"prompt_tokens": 40, "completion_tokens": 5, "total_tokens": 45}
        }"#;

        let completion = ResponseParser::parse_completion(body).unwrap();
        assert_eq!(completion.text().unwrap(), "Hello, DreamWorld!");
        assert_eq!(completion.finish_reason(), Some("stop"));
        assert_eq!(completion.usage.unwrap().total_tokens, 45);
    }

    #[test]
    fn no_choices_is_an_error() {
        let completion = ResponseParser::parse_completion(r#"{"choices": []}"#).unwrap();
        assert!(completion.text().is_err());
    }

    #[test]
    fn null_content_is_an_error() {
        let completion = ResponseParser::parse_completion(
            r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": null}}]}"#,
        )
        .unwrap();
        assert!(completion.text().is_err());
    }

    #[test]
    fn error_message_prefers_openai_envelope() {
        let body = r#"{"error": {"message": "model \"llama9\" not found", "type": "api_error"}}"#;
        assert_eq!(
            ResponseParser::error_message(body).as_deref(),
            Some("model \"llama9\" not found")
        );
        assert_eq!(
            ResponseParser::error_message("bad gateway\n").as_deref(),
            Some("bad gateway")
        );
        assert_eq!(ResponseParser::error_message("   "), None);
    }
}
