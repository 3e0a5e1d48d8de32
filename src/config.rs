//! Configuration for backends, failover and normalization

use serde::{Deserialize, Serialize};
use log::{debug, warn};

pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Primary (Gemini) backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryConfig
{   /// Default model identifier
    pub model: String
  , /// Models a request may select instead of the default
    pub allowed_models: Vec<String>
  , /// API base URL
    pub api_base: String
  , /// Environment variable holding the credential
    pub api_key_env: String
  , /// Nucleus sampling
    pub top_p: f32
  , /// Top-k sampling
    pub top_k: u32
}

impl Default for PrimaryConfig
{   fn default() -> Self
    {   PrimaryConfig
        {   model: "gemini-2.0-flash".to_string()
          , allowed_models: vec![
              "gemini-2.0-flash".to_string()
            , "gemini-2.0-pro".to_string()
            ]
          , api_base: 
              "https://generativelanguage.googleapis.com/v1beta"
              .to_string()
          , api_key_env: GOOGLE_API_KEY_ENV.to_string()
          , top_p: 0.95
          , top_k: 40
        }
    }
}

impl PrimaryConfig
{   /// Resolve the model for a request: the override if it is
    /// one of the allowed models, otherwise the default
    pub fn model_for(
      &self
    , requested: Option<&str>
    ) -> String
    {   match requested
        {   Some(m) if self.allowed_models
                .iter()
                .any(|a| a == m) => m.to_string()
          , Some(m) => {
              warn!(
                "Model {} not allowed, using {}",
                m, self.model
              );
              self.model.clone()
            }
          , None => self.model.clone()
        }
    }
}

/// Secondary (crew) backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryConfig
{   /// Chat model the crew agents run on
    pub model: String
  , /// OpenAI-compatible API base URL
    pub api_base: String
  , /// Environment variable holding the credential
    pub api_key_env: String
  , /// Role of the study agent
    pub agent_role: String
  , /// Goal of the study agent
    pub agent_goal: String
  , /// Backstory of the study agent
    pub agent_backstory: String
}

impl Default for SecondaryConfig
{   fn default() -> Self
    {   SecondaryConfig
        {   model: "gpt-4o-mini".to_string()
          , api_base: "https://api.openai.com/v1".to_string()
          , api_key_env: OPENAI_API_KEY_ENV.to_string()
          , agent_role: "Study Assistant".to_string()
          , agent_goal: 
              "Help students understand concepts, answer \
               questions clearly, and give step-by-step \
               explanations."
              .to_string()
          , agent_backstory: 
              "You are a friendly expert tutor who adapts \
               explanations to the student's level and \
               focuses on clarity."
              .to_string()
        }
    }
}

/// Failover configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FailoverConfig
{   /// Fall back to primary when the secondary fails
    pub allow_secondary_fallback: bool
  , /// Retries of the primary on transient failure
    pub max_retries: usize
  , /// Backoff multiplier for retries
    pub backoff_multiplier: f32
  , /// Initial backoff duration in milliseconds
    pub initial_backoff_ms: u64
}

impl Default for FailoverConfig
{   fn default() -> Self
    {   FailoverConfig
        {   allow_secondary_fallback: true
          , max_retries: 1
          , backoff_multiplier: 2.0
          , initial_backoff_ms: 250
        }
    }
}

/// Character budgets for summaries, per requested length
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig
{   pub very_short_chars: usize
  , pub short_chars: usize
  , pub medium_chars: usize
  , pub detailed_chars: usize
}

impl Default for NormalizerConfig
{   fn default() -> Self
    {   NormalizerConfig
        {   very_short_chars: 800
          , short_chars: 1500
          , medium_chars: 3000
          , detailed_chars: 6000
        }
    }
}

impl NormalizerConfig
{   /// Budget for a requested summary length
    pub fn budget_for(
      &self
    , length: crate::SummaryLength
    ) -> usize
    {   match length
        {   crate::SummaryLength::VeryShort => self.very_short_chars
          , crate::SummaryLength::Short => self.short_chars
          , crate::SummaryLength::Medium => self.medium_chars
          , crate::SummaryLength::Detailed => self.detailed_chars
        }
    }
}

/// studyagent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig
{   pub primary: PrimaryConfig
  , pub secondary: SecondaryConfig
  , pub failover: FailoverConfig
  , pub normalizer: NormalizerConfig
  , /// Per-invocation time budget in seconds
    pub timeout_secs: u64
}

impl Default for StudyConfig
{   fn default() -> Self
    {   StudyConfig
        {   primary: PrimaryConfig::default()
          , secondary: SecondaryConfig::default()
          , failover: FailoverConfig::default()
          , normalizer: NormalizerConfig::default()
          , timeout_secs: 30
        }
    }
}

impl StudyConfig
{   /// Parse a JSON document; missing fields take defaults
    pub fn from_json_str(s: &str) -> crate::Result<Self>
    {   let config: StudyConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_json_file(
      path: impl AsRef<std::path::Path>
    ) -> crate::Result<Self>
    {   let path = path.as_ref();
        debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(path)
          .map_err(|e| {
            crate::Error::InvalidConfiguration(
              format!("{}: {}", path.display(), e)
            )
          })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> crate::Result<()>
    {   if self.timeout_secs == 0
        {   return Err(crate::Error::InvalidConfiguration(
              "timeout_secs must be positive".to_string()
            ));
        }
        if self.primary.model.trim().is_empty()
        {   return Err(crate::Error::InvalidConfiguration(
              "primary.model must not be empty".to_string()
            ));
        }
        if self.failover.backoff_multiplier < 1.0
        {   return Err(crate::Error::InvalidConfiguration(
              "failover.backoff_multiplier must be >= 1.0"
                .to_string()
            ));
        }
        Ok(())
    }

    /// Per-invocation timeout
    pub fn timeout(&self) -> std::time::Duration
    {   std::time::Duration::from_secs(self.timeout_secs)
    }
}

/// Backend credentials injected by the hosting environment
#[derive(Clone, Default)]
pub struct Credentials
{   pub google_api_key: Option<String>
  , pub openai_api_key: Option<String>
}

impl std::fmt::Debug for Credentials
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) 
      -> std::fmt::Result
    {   f.debug_struct("Credentials")
          .field("google_api_key", 
            &self.google_api_key.as_ref().map(|_| "[REDACTED]")
          )
          .field("openai_api_key", 
            &self.openai_api_key.as_ref().map(|_| "[REDACTED]")
          )
          .finish()
    }
}

impl Credentials
{   /// Load `.env` (if any) and read both keys
    pub fn from_env(config: &StudyConfig) -> Self
    {   match dotenvy::dotenv()
        {   Ok(path) => debug!("Loaded {}", path.display())
          , Err(_) => debug!("No .env file loaded")
        }
        Credentials
        {   google_api_key: read_env(&config.primary.api_key_env)
          , openai_api_key: read_env(&config.secondary.api_key_env)
        }
    }
}

/// Read a variable, treating empty values as absent
pub fn read_env(name: &str) -> Option<String>
{   std::env::var(name)
      .ok()
      .map(|v| v.trim().to_string())
      .filter(|v| !v.is_empty())
}
