use std::fmt;

/// Value printed in place of answers when a run fails
pub const FAILURE_SENTINEL: &str = "error occurred";

pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure category, one per error variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind
{   Configuration
  , Transport
  , Remote
  , Parse
}

/// Custom error type for prompt completion operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// API key is missing or empty
    MissingApiKey
  , /// A named text fragment could not be found
    ResourceNotFound(String)
  , /// A configuration value is present but unusable
    InvalidConfiguration(String)
  , /// Connection, timeout or body read failure
    HttpError(String)
  , /// Remote endpoint answered with a non-200 status
    ApiError
    {   status: u16
      , body: String
    }
  , /// Response body is not the expected JSON
    ParseError(String)
  , /// Response JSON carried an empty choices list
    NoChoicesInResponse
}

impl Error
{   pub fn kind(&self) -> ErrorKind
    {   match self
        {   Error::MissingApiKey
          | Error::ResourceNotFound(_)
          | Error::InvalidConfiguration(_) => ErrorKind::Configuration
          , Error::HttpError(_) => ErrorKind::Transport
          , Error::ApiError { .. } => ErrorKind::Remote
          , Error::ParseError(_)
          | Error::NoChoicesInResponse => ErrorKind::Parse
        }
    }

    /// HTTP status of a remote error, if any
    pub fn status(&self) -> Option<u16>
    {   match self
        {   Error::ApiError { status, .. } => Some(*status)
          , _ => None
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingApiKey => {
              write!(f, "Missing API key: set API_KEY")
            }
          , Error::ResourceNotFound(name) => {
              write!(f, "Text resource not found: {}", name)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError { status, body } => {
              write!(f, "API error ({}): {}", status, body)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::HttpError(format!("request timed out: {}", e))
        } else
        {   Error::HttpError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::ParseError(e.to_string())
    }
}
