//! Client configuration built from env-style key/value sources

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::RequestMode;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const KEY_API_KEY: &str = "API_KEY";
pub const KEY_MODEL: &str = "MODEL";
pub const KEY_MODE: &str = "MODE";
pub const KEY_API_BASE: &str = "API_BASE";
pub const KEY_MAX_TOKENS: &str = "MAX_TOKENS";
pub const KEY_TEMPERATURE: &str = "TEMPERATURE";
pub const KEY_SYSTEM_PROMPT: &str = "SYSTEM_PROMPT";
pub const KEY_TIMEOUT_SECS: &str = "TIMEOUT_SECS";

/// Everything the client needs to make one call, passed in
/// explicitly at construction
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig
{   /// Bearer token
    #[serde(skip_serializing)]
    pub api_key: String
  , /// Model identifier known to the remote service
    pub model: String
  , /// Chat or legacy completion
    pub mode: RequestMode
  , /// Endpoint base, without trailing slash
    pub api_base: String
  , pub max_tokens: u32
  , /// Sent as-is; the remote service enforces its range
    pub temperature: f32
  , /// Optional system message, chat mode only
    pub system_prompt: Option<String>
  , /// Request timeout in seconds; none means the HTTP
    /// client default
    pub timeout_secs: Option<u64>
}

impl ClientConfig
{   /// Config with every optional value at its default for `mode`
    pub fn new(
      api_key: impl Into<String>
    , mode: RequestMode
    ) -> Self
    {   ClientConfig
        {   api_key: api_key.into()
          , model: mode.default_model().to_string()
          , mode
          , api_base: DEFAULT_API_BASE.to_string()
          , max_tokens: mode.default_max_tokens()
          , temperature: DEFAULT_TEMPERATURE
          , system_prompt: None
          , timeout_secs: None
        }
    }

    /// Build from any key lookup. Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where F: Fn(&str) -> Option<String>
    {   let get = |key: &str| {
          lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        };

        let api_key = get(KEY_API_KEY).ok_or_else(|| {
          error!("{} is missing or empty", KEY_API_KEY);
          Error::MissingApiKey
        })?;

        let mode = match get(KEY_MODE)
        {   Some(raw) => raw.parse::<RequestMode>()?
          , None => RequestMode::default()
        };

        let mut config = ClientConfig::new(api_key, mode);

        if let Some(model) = get(KEY_MODEL)
        {   config.model = model;
        }
        if let Some(base) = get(KEY_API_BASE)
        {   config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(raw) = get(KEY_MAX_TOKENS)
        {   config.max_tokens = parse_value(KEY_MAX_TOKENS, &raw)?;
        }
        if let Some(raw) = get(KEY_TEMPERATURE)
        {   config.temperature = parse_value(KEY_TEMPERATURE, &raw)?;
        }
        if let Some(raw) = get(KEY_TIMEOUT_SECS)
        {   config.timeout_secs
              = Some(parse_value(KEY_TIMEOUT_SECS, &raw)?);
        }
        config.system_prompt = get(KEY_SYSTEM_PROMPT);

        config.validate()?;
        debug!(
          "Loaded config: mode={:?} model={}",
          config.mode, config.model
        );
        Ok(config)
    }

    /// Read an env file without touching the process environment.
    /// Keys absent from the file fall back to the process
    /// environment. A missing file is an error.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self>
    {   let file_values = read_env_file(path.as_ref())?;
        ClientConfig::from_value_layers(
          &HashMap::new(),
          &file_values,
          &HashMap::new()
        )
    }

    /// Layered lookup, highest priority first: `overrides`, the env
    /// file (skipped when it does not exist), the process
    /// environment, then `fallbacks`.
    pub fn from_layers(
      env_file: Option<&Path>
    , overrides: &HashMap<String, String>
    , fallbacks: &HashMap<String, String>
    ) -> Result<Self>
    {   let file_values = match env_file
        {   Some(path) if path.exists() => read_env_file(path)?
          , Some(path) => {
              debug!(
                "No env file at {}, using process env",
                path.display()
              );
              HashMap::new()
            }
          , None => HashMap::new()
        };
        ClientConfig::from_value_layers(overrides, &file_values, fallbacks)
    }

    fn from_value_layers(
      overrides: &HashMap<String, String>
    , file_values: &HashMap<String, String>
    , fallbacks: &HashMap<String, String>
    ) -> Result<Self>
    {   ClientConfig::from_lookup(|key| {
          overrides.get(key).cloned()
            .or_else(|| file_values.get(key).cloned())
            .or_else(|| std::env::var(key).ok())
            .or_else(|| fallbacks.get(key).cloned())
        })
    }

    pub fn validate(&self) -> Result<()>
    {   if self.api_key.trim().is_empty()
        {   return Err(Error::MissingApiKey);
        }
        if self.model.trim().is_empty()
        {   return Err(Error::InvalidConfiguration(
              "model must not be empty".to_string()
            ));
        }
        if self.max_tokens == 0
        {   return Err(Error::InvalidConfiguration(
              "max_tokens must be greater than 0".to_string()
            ));
        }
        Ok(())
    }

    pub fn endpoint_url(&self) -> String
    {   format!(
          "{}{}",
          self.api_base.trim_end_matches('/'),
          self.mode.endpoint_path()
        )
    }
}

impl fmt::Debug for ClientConfig
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("ClientConfig")
          .field("api_key", &"<redacted>")
          .field("model", &self.model)
          .field("mode", &self.mode)
          .field("api_base", &self.api_base)
          .field("max_tokens", &self.max_tokens)
          .field("temperature", &self.temperature)
          .field("system_prompt", &self.system_prompt)
          .field("timeout_secs", &self.timeout_secs)
          .finish()
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str)
  -> Result<T>
{   raw.parse::<T>().map_err(|_| {
      error!("Bad value for {}: {}", key, raw);
      Error::InvalidConfiguration(
        format!("{} has an unusable value: {}", key, raw)
      )
    })
}

/// Parse an env file into a map
pub fn read_env_file(path: &Path)
  -> Result<HashMap<String, String>>
{   debug!("Reading env file: {}", path.display());
    let iter = dotenvy::from_path_iter(path).map_err(|e| {
      error!("Cannot open env file {}: {}", path.display(), e);
      if e.not_found()
      {   Error::InvalidConfiguration(
            format!("env file not found: {}", path.display())
          )
      } else
      {   Error::InvalidConfiguration(e.to_string())
      }
    })?;

    let mut values = HashMap::new();
    for item in iter
    {   let (key, value) = item.map_err(|e| {
          error!("Malformed env file {}: {}", path.display(), e);
          Error::InvalidConfiguration(e.to_string())
        })?;
        values.insert(key, value);
    }
    Ok(values)
}
