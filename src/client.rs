use std::time::Duration;
use log::{debug, trace, error};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::request::{ChatMessage, ChatRequest, CompletionRequest
  , CompletionResponse, LegacyCompletionRequest};
use crate::RequestMode;

/// Sends one prompt per call to the configured endpoint and
/// extracts the answer text
pub struct PromptCompletionClient
{   config: ClientConfig
  , http_client: reqwest::Client
}

impl PromptCompletionClient
{   /// Fails on an unusable config before any network I/O
    pub fn new(config: ClientConfig) -> Result<Self>
    {   config.validate()?;
        debug!(
          "Creating PromptCompletionClient for {}",
          config.endpoint_url()
        );

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs
        {   builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(|e| {
          error!("Cannot build HTTP client: {}", e);
          Error::HttpError(e.to_string())
        })?;

        Ok(PromptCompletionClient
        {   config
          , http_client
        })
    }

    pub fn config(&self) -> &ClientConfig
    {   &self.config
    }

    /// Payload for `prompt` in the configured mode
    pub fn build_request(&self, prompt: &str) -> CompletionRequest
    {   match self.config.mode
        {   RequestMode::Chat => {
              let mut messages = Vec::with_capacity(2);
              if let Some(system) = &self.config.system_prompt
              {   messages.push(ChatMessage::system(system.clone()));
              }
              messages.push(ChatMessage::user(prompt));
              CompletionRequest::Chat(ChatRequest
              {   model: self.config.model.clone()
                , messages
                , max_tokens: self.config.max_tokens
                , temperature: self.config.temperature
              })
            }
          , RequestMode::Completion => {
              CompletionRequest::Completion(LegacyCompletionRequest
              {   model: self.config.model.clone()
                , prompt: prompt.to_string()
                , max_tokens: self.config.max_tokens
                , temperature: self.config.temperature
              })
            }
        }
    }

    /// Whole answer text, trimmed
    pub async fn complete_text(&self, prompt: &str) -> Result<String>
    {   let response = self.send(prompt).await?;

        let choice = response.choices.first().ok_or_else(|| {
          error!("No choices in response");
          Error::NoChoicesInResponse
        })?;

        debug!("First choice finish_reason: {:?}", choice.finish_reason);

        let mode = self.config.mode;
        choice.text_content(mode)
          .map(|t| t.trim().to_string())
          .ok_or_else(|| {
            let field = match mode
            {   RequestMode::Chat => "message.content"
              , RequestMode::Completion => "text"
            };
            error!("First choice carries no {}", field);
            Error::ParseError(
              format!("first choice has no {}", field)
            )
          })
    }

    /// Answer text split into lines, in order. The number of
    /// lines is not checked against anything.
    pub async fn send_completion(&self, prompt: &str)
      -> Result<Vec<String>>
    {   let text = self.complete_text(prompt).await?;
        let answers = split_answers(&text);
        debug!("Extracted {} answer lines", answers.len());
        Ok(answers)
    }

    async fn send(&self, prompt: &str) -> Result<CompletionResponse>
    {   if self.config.api_key.trim().is_empty()
        {   error!("Refusing to send without an API key");
            return Err(Error::MissingApiKey);
        }

        let url = self.config.endpoint_url();
        let request = self.build_request(prompt);
        debug!("Sending {:?} request to {}", self.config.mode, url);
        trace!("Request body: {:?}", request);

        let response = self.http_client
          .post(&url)
          .header(
            "Authorization",
            format!("Bearer {}", self.config.api_key)
          )
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            Error::from(e)
          })?;

        let status = response.status();
        trace!("Response status: {}", status);

        let body = response.text().await.map_err(|e| {
          error!("Failed to read response body: {}", e);
          Error::from(e)
        })?;

        if status != reqwest::StatusCode::OK
        {   error!("API error {}: {}", status.as_u16(), body);
            return Err(Error::ApiError
            {   status: status.as_u16()
              , body
            });
        }

        trace!("Response body: {}", body);
        serde_json::from_str::<CompletionResponse>(&body)
          .map_err(|e| {
            error!("Parse error: {}", e);
            Error::from(e)
          })
    }
}

/// Trim `content`, split on newlines, drop blank lines
pub fn split_answers(content: &str) -> Vec<String>
{   content.trim()
      .lines()
      .map(str::trim)
      .filter(|l| !l.is_empty())
      .map(str::to_string)
      .collect()
}

/// A question paired with the answer line at the same position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredQuestion
{   /// 1-based
    pub index: usize
  , pub question: String
  , pub answer: Option<String>
}

/// Result of lining answers up against questions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerPairing
{   pub answered: Vec<AnsweredQuestion>
  , /// Answer lines beyond the last question
    pub unmatched_answers: Vec<String>
}

impl AnswerPairing
{   pub fn is_complete(&self) -> bool
    {   self.unmatched_answers.is_empty()
          && self.answered.iter().all(|a| a.answer.is_some())
    }

    pub fn missing_count(&self) -> usize
    {   self.answered.iter().filter(|a| a.answer.is_none()).count()
    }
}

/// Pair by position. Counts may differ; the gap is reported
/// rather than hidden.
pub fn pair_answers(questions: &[String], answers: &[String])
  -> AnswerPairing
{   let answered = questions.iter()
      .enumerate()
      .map(|(i, q)| AnsweredQuestion
      {   index: i + 1
        , question: q.clone()
        , answer: answers.get(i).cloned()
      })
      .collect();

    let unmatched_answers = answers.iter()
      .skip(questions.len())
      .cloned()
      .collect();

    AnswerPairing
    {   answered
      , unmatched_answers
    }
}
