//! Typed request and response bodies for the completion endpoints

use serde::{Deserialize, Serialize};
use crate::RequestMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   pub fn system(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "system".to_string()
          , content: content.into()
        }
    }

    pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "user".to_string()
          , content: content.into()
        }
    }
}

/// Body for the chat endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub max_tokens: u32
  , pub temperature: f32
}

/// Body for the legacy completion endpoint
#[derive(Debug, Clone, Serialize)]
pub struct LegacyCompletionRequest
{   pub model: String
  , pub prompt: String
  , pub max_tokens: u32
  , pub temperature: f32
}

/// One outbound payload, shaped for the configured mode
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CompletionRequest
{   Chat(ChatRequest)
  , Completion(LegacyCompletionRequest)
}

/// Parsed reply from either endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse
{   pub choices: Vec<Choice>
}

/// Message inside a chat reply; role and content may be absent
/// or null
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub role: Option<String>
  , #[serde(default)]
    pub content: Option<String>
}

/// A candidate completion; chat replies carry `message`,
/// legacy replies carry `text`
#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   #[serde(default)]
    pub message: Option<ResponseMessage>
  , #[serde(default)]
    pub text: Option<String>
  , #[serde(default)]
    pub finish_reason: Option<String>
}

impl Choice
{   /// `message.content` for chat, `text` for completion. No
    /// fallback to the other field.
    pub fn text_content(&self, mode: RequestMode) -> Option<&str>
    {   match mode
        {   RequestMode::Chat => self.message.as_ref()
              .and_then(|m| m.content.as_deref())
          , RequestMode::Completion => self.text.as_deref()
        }
    }
}
