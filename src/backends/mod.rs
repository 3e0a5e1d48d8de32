//! Answer-generation backends

pub mod gemini;
#[cfg(feature = "crew")]
pub mod crew;

use async_trait::async_trait;

pub use gemini::GeminiClient;
#[cfg(feature = "crew")]
pub use crew::CrewClient;

/// One way of turning a composed prompt into raw text.
/// The dispatcher is written once against this trait.
#[async_trait]
pub trait GenerationBackend: Send + Sync
{   /// Which backend slot this implementation fills
    fn kind(&self) -> crate::Backend;

    /// Run one generation. Temperature and token cap are
    /// taken from `request` verbatim.
    async fn generate(
      &self
    , prompt: &crate::ComposedPrompt
    , request: &crate::GenerationRequest
    ) -> crate::Result<String>;
}

/// Map a non-success HTTP status to an error
pub(crate) fn error_for_status(
  status: reqwest::StatusCode
, body: String
) -> crate::Error
{   match status.as_u16()
    {   429 => crate::Error::RateLimitExceeded
      , 408 => crate::Error::Timeout
      , code if status.is_server_error() => {
          crate::Error::ServerError(code, body)
        }
      , code => crate::Error::ApiError(code, body)
    }
}
