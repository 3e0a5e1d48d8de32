//! Backend selection, retry and fallback
//!
//! Policy for one request:
//! - `Secondary` preferred and available: try the secondary
//!   once, then fall back to the primary on any failure.
//! - `Secondary` preferred but unavailable: primary, silently.
//! - `Auto` / `Primary`: primary.
//! The primary is retried on transient failures per the
//! retry policy. Backends are only ever called one after the
//! other, never concurrently.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::backends::GenerationBackend;
use crate::capability::CapabilityProbe;
use crate::config::{Credentials, StudyConfig};
use crate::failover::{FallbackSequence, RetryPolicy};
use crate::normalizer::ResponseNormalizer;
use crate::request::{ComposedPrompt, GenerationRequest, GenerationResult};
use crate::{Backend, Error};

pub struct AgentDispatcher
{   primary: Box<dyn GenerationBackend>
  , secondary: Option<Box<dyn GenerationBackend>>
  , probe: Arc<CapabilityProbe>
  , retry: RetryPolicy
  , timeout: Duration
  , allow_secondary_fallback: bool
  , normalizer: ResponseNormalizer
}

impl AgentDispatcher
{   /// Dispatcher with default policy and no secondary backend
    pub fn new(
      primary: Box<dyn GenerationBackend>
    , probe: Arc<CapabilityProbe>
    ) -> Self
    {   let defaults = StudyConfig::default();
        AgentDispatcher
        {   primary
          , secondary: None
          , probe
          , retry: RetryPolicy::default()
          , timeout: defaults.timeout()
          , allow_secondary_fallback: 
              defaults.failover.allow_secondary_fallback
          , normalizer: ResponseNormalizer::default()
        }
    }

    /// Wire up the real backends from configuration
    ///
    /// The secondary reads its key through `probe`, so what the
    /// probe reports and what the client sends never disagree.
    /// Use `CapabilityProbe::from_credentials` to pin it to
    /// `credentials`.
    pub fn from_config(
      config: &StudyConfig
    , credentials: &Credentials
    , probe: Arc<CapabilityProbe>
    ) -> crate::Result<Self>
    {   config.validate()?;
        let primary = crate::backends::GeminiClient::new(
            credentials.google_api_key.clone()
          , config.primary.clone()
          , config.timeout()
          )?;

        let mut dispatcher = AgentDispatcher::new(
            Box::new(primary)
          , Arc::clone(&probe)
          )
          .with_retry_policy(RetryPolicy::from_config(&config.failover))
          .with_timeout(config.timeout())
          .with_secondary_fallback(
            config.failover.allow_secondary_fallback
          )
          .with_normalizer(
            ResponseNormalizer::new(config.normalizer.clone())
          );

        #[cfg(feature = "crew")]
        {   let secondary = crate::backends::CrewClient::new(
                probe
              , config.secondary.clone()
              , config.timeout()
              )?;
            dispatcher = dispatcher.with_secondary(Box::new(secondary));
        }

        Ok(dispatcher)
    }

    /// Default configuration, credentials from the environment
    /// (and `.env`), process-wide capability probe
    pub fn from_env() -> crate::Result<Self>
    {   let config = StudyConfig::default();
        let credentials = Credentials::from_env(&config);
        Self::from_config(
          &config
        , &credentials
        , CapabilityProbe::global()
        )
    }

    pub fn with_secondary(
      mut self
    , secondary: Box<dyn GenerationBackend>
    ) -> Self
    {   self.secondary = Some(secondary);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self
    {   self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self
    {   self.timeout = timeout;
        self
    }

    pub fn with_secondary_fallback(mut self, allow: bool) -> Self
    {   self.allow_secondary_fallback = allow;
        self
    }

    pub fn with_normalizer(
      mut self
    , normalizer: ResponseNormalizer
    ) -> Self
    {   self.normalizer = normalizer;
        self
    }

    /// Secondary backend is wired in and its prerequisites hold
    pub fn is_secondary_available(&self) -> bool
    {   self.secondary.is_some() && self.probe.is_secondary_available()
    }

    /// Compose and dispatch in one go
    pub async fn generate(
      &self
    , request: &GenerationRequest
    ) -> crate::Result<GenerationResult>
    {   let prompt = crate::composer::compose(request);
        self.dispatch(&prompt, request).await
    }

    /// Run `prompt` on the resolved backend(s) and normalize
    /// the answer. Errors only when every applicable backend
    /// failed.
    pub async fn dispatch(
      &self
    , prompt: &ComposedPrompt
    , request: &GenerationRequest
    ) -> crate::Result<GenerationResult>
    {   let request = &request.sanitized();
        let mut sequence = FallbackSequence::resolve(
            request.backend_preference
          , self.is_secondary_available()
          , self.allow_secondary_fallback
          );
        info!(
          "Dispatching {:?} request (preference {:?}) via {:?}",
          request.task_type(),
          request.backend_preference,
          sequence.backends()
        );

        let mut last_error = None;
        let mut current = sequence.current();
        while let Some(backend) = current
        {   let outcome = match backend
            {   Backend::Primary => {
                  self.run_primary(prompt, request).await
                }
              , Backend::Secondary => {
                  self.run_secondary(prompt, request).await
                }
            };

            match outcome
            {   Ok(raw) => {
                  debug!("{} backend answered", backend.as_str());
                  return Ok(
                    self.normalizer.normalize(&raw, request, backend)
                  );
                }
              , Err(e) => {
                  let attempted = sequence.attempted();
                  current = sequence.fall_back();
                  if current.is_none()
                  {   warn!("{} backend failed: {}", backend.as_str(), e);
                      return Err(Error::Backend
                      {   attempted
                        , cause: Box::new(e)
                      });
                  }
                  warn!(
                    "{} backend failed ({}), falling back",
                    backend.as_str(),
                    e
                  );
                  last_error = Some(e);
                }
            }
        }

        Err(Error::Backend
        {   attempted: sequence.attempted()
          , cause: Box::new(last_error.unwrap_or_else(|| {
              Error::Other("no backend to dispatch to".to_string())
            }))
        })
    }

    async fn run_primary(
      &self
    , prompt: &ComposedPrompt
    , request: &GenerationRequest
    ) -> crate::Result<String>
    {   let mut retries = 0;
        loop
        {   match self.invoke(self.primary.as_ref(), prompt, request).await
            {   Ok(text) => return Ok(text)
              , Err(e) if e.is_transient() => {
                  let Some(delay) = self.retry.next_delay(retries)
                  else
                  {   return Err(e);
                  };
                  warn!(
                    "Primary backend transient failure ({}), \
                     retrying in {:?}",
                    e,
                    delay
                  );
                  tokio::time::sleep(delay).await;
                  retries += 1;
                }
              , Err(e) => return Err(e)
            }
        }
    }

    async fn run_secondary(
      &self
    , prompt: &ComposedPrompt
    , request: &GenerationRequest
    ) -> crate::Result<String>
    {   match self.secondary.as_deref()
        {   Some(secondary) => {
              self.invoke(secondary, prompt, request).await
            }
          , None => Err(Error::CapabilityUnavailable(
              "secondary backend not configured".to_string()
            ))
        }
    }

    /// One bounded backend call; a timed-out call is dropped
    async fn invoke(
      &self
    , backend: &dyn GenerationBackend
    , prompt: &ComposedPrompt
    , request: &GenerationRequest
    ) -> crate::Result<String>
    {   debug!("Invoking {} backend", backend.kind().as_str());
        match tokio::time::timeout(
          self.timeout,
          backend.generate(prompt, request)
        ).await
        {   Ok(result) => result
          , Err(_) => {
              warn!(
                "{} backend timed out after {:?}",
                backend.kind().as_str(),
                self.timeout
              );
              Err(Error::Timeout)
            }
        }
    }
}
