pub mod error;
pub mod config;
pub mod prompt;
pub mod resources;
pub mod request;
pub mod client;
pub mod app;
use serde::{Deserialize, Serialize};

/*

promptcall sends one assembled prompt to a hosted completion
API and hands back the extracted answer text. One client covers
both the chat endpoint and the legacy completion endpoint.

promptcall/
├── Cargo.toml
├── resources/          # Text fragments used by the CLI
├── src/
│   ├── lib.rs          # Re-exports and shared enums
│   ├── main.rs         # CLI: title / questions
│   ├── error.rs        # Error taxonomy
│   ├── config.rs       # ClientConfig from env-style sources
│   ├── prompt.rs       # Prompt assembly
│   ├── resources.rs    # Named text fragment loading
│   ├── request.rs      # Wire request/response types
│   ├── client.rs       # PromptCompletionClient
│   └── app.rs          # Command flows and printed output
└── tests/

*/

pub use client::{pair_answers, split_answers, AnswerPairing
  , AnsweredQuestion, PromptCompletionClient};
pub use config::ClientConfig;
pub use error::{Error, ErrorKind, Result, FAILURE_SENTINEL};
pub use prompt::PromptTemplate;
pub use resources::ResourceDir;

/// Which remote endpoint a request is shaped for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode
{   /// `/chat/completions`, message list in, `message.content` out
    Chat
  , /// `/completions`, raw prompt in, `text` out
    Completion
}

impl RequestMode
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   RequestMode::Chat => "chat"
          , RequestMode::Completion => "completion"
        }
    }

    pub fn endpoint_path(&self) -> &'static str
    {   match self
        {   RequestMode::Chat => "/chat/completions"
          , RequestMode::Completion => "/completions"
        }
    }

    pub fn default_model(&self) -> &'static str
    {   match self
        {   RequestMode::Chat => "gpt-3.5-turbo"
          , RequestMode::Completion => "babbage-002"
        }
    }

    pub fn default_max_tokens(&self) -> u32
    {   match self
        {   RequestMode::Chat => 256
          , RequestMode::Completion => 50
        }
    }
}

impl Default for RequestMode
{   fn default() -> Self
    {   RequestMode::Chat
    }
}

impl std::fmt::Display for RequestMode
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestMode
{   type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self>
    {   match s.trim().to_ascii_lowercase().as_str()
        {   "chat" => Ok(RequestMode::Chat)
          , "completion" | "completions" => Ok(RequestMode::Completion)
          , other => Err(crate::error::Error::InvalidConfiguration(
              format!("unknown request mode: {}", other)
            ))
        }
    }
}
