use std::fmt;

/// Result alias used throughout studyagent
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`], used by the
/// dispatcher to decide between retry, fallback and surfacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind
{   /// Strict prompt validation failed (reserved)
    Composition
  , /// Secondary backend prerequisites missing
    CapabilityUnavailable
  , /// Timeout, rate limit, network fault, provider 5xx
    BackendTransient
  , /// Bad credential, rejected request, malformed reply
    BackendFatal
  , /// Anything else (session plumbing, configuration)
    Other
}

/// Custom error type for studyagent operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Credential is missing for a backend
    MissingApiKey(String)
  , /// Prompt composition rejected the request
    Composition(String)
  , /// Secondary backend cannot be used in this process
    CapabilityUnavailable(String)
  , /// Backend call exceeded its time budget
    Timeout
  , /// Provider signalled rate limiting
    RateLimitExceeded
  , /// Transport level failure
    HttpError(String)
  , /// Provider answered with a 5xx status
    ServerError(u16, String)
  , /// Provider rejected the request
    ApiError(u16, String)
  , /// Failed to parse provider response
    ParseError(String)
  , /// Provider response carried no text
    EmptyResponse(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Session task is gone
    SessionClosed
  , /// Every applicable backend failed
    Backend
    {   attempted: Vec<crate::Backend>
      , cause: Box<Error>
    }
  , /// Generic error
    Other(String)
}

impl Error
{   /// Classify this error
    pub fn kind(&self) -> ErrorKind
    {   match self
        {   Error::Composition(_) => ErrorKind::Composition
          , Error::CapabilityUnavailable(_) => {
              ErrorKind::CapabilityUnavailable
            }
          , Error::Timeout
          | Error::RateLimitExceeded
          | Error::HttpError(_)
          | Error::ServerError(..) => ErrorKind::BackendTransient
          , Error::MissingApiKey(_)
          | Error::ApiError(..)
          | Error::ParseError(_)
          | Error::EmptyResponse(_) => ErrorKind::BackendFatal
          , Error::Backend { cause, .. } => cause.kind()
          , Error::InvalidConfiguration(_)
          | Error::SessionClosed
          | Error::Other(_) => ErrorKind::Other
        }
    }

    /// Whether the failure may go away on a second attempt
    pub fn is_transient(&self) -> bool
    {   self.kind() == ErrorKind::BackendTransient
    }

    /// Backends tried before this error was surfaced
    pub fn attempted(&self) -> &[crate::Backend]
    {   match self
        {   Error::Backend { attempted, .. } => attempted
          , _ => &[]
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) 
      -> fmt::Result
    {   match self
        {   Error::MissingApiKey(name) => {
              write!(f, "Missing API key: {} is not set", name)
            }
          , Error::Composition(msg) => {
              write!(f, "Could not compose prompt: {}", msg)
            }
          , Error::CapabilityUnavailable(msg) => {
              write!(f, "Backend unavailable: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::RateLimitExceeded => {
              write!(f, "API rate limit exceeded")
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ServerError(status, msg) => {
              write!(f, "Server error ({}): {}", status, msg)
            }
          , Error::ApiError(status, msg) => {
              write!(f, "API error ({}): {}", status, msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::EmptyResponse(msg) => {
              write!(f, "Empty response: {}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::SessionClosed => {
              write!(f, "Study session disconnected")
            }
          , Error::Backend { attempted, cause } => {
              let names: Vec<&str> = attempted
                .iter()
                .map(|b| b.as_str())
                .collect();
              write!(f, 
                "Generation failed (tried {}): {}", 
                names.join(" -> "),
                cause
              )
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::Timeout
        } else if e.is_decode()
        {   Error::ParseError(e.to_string())
        } else
        {   Error::HttpError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::InvalidConfiguration(e.to_string())
    }
}
