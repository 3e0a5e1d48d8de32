#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use studyagent::capability::CapabilityProbe;
use studyagent::failover::RetryPolicy;
use studyagent::{
  AgentDispatcher, Backend, ComposedPrompt, GenerationBackend,
  GenerationRequest,
};

/// Backend replaying a fixed script of outcomes
pub struct ScriptedBackend
{   kind: Backend
  , script: Mutex<VecDeque<studyagent::Result<String>>>
  , delay: Option<Duration>
  , pub calls: Arc<AtomicUsize>
  , pub seen: Arc<Mutex<Vec<(ComposedPrompt, f32, u32)>>>
}

impl ScriptedBackend
{   pub fn new(
      kind: Backend
    , script: Vec<studyagent::Result<String>>
    ) -> Self
    {   ScriptedBackend
        {   kind
          , script: Mutex::new(script.into())
          , delay: None
          , calls: Arc::new(AtomicUsize::new(0))
          , seen: Arc::new(Mutex::new(Vec::new()))
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self
    {   self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend
{   fn kind(&self) -> Backend
    {   self.kind
    }

    async fn generate(
      &self
    , prompt: &ComposedPrompt
    , request: &GenerationRequest
    ) -> studyagent::Result<String>
    {   self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push((
          prompt.clone()
        , request.temperature
        , request.max_output_tokens
        ));
        if let Some(delay) = self.delay
        {   tokio::time::sleep(delay).await;
        }
        self.script
          .lock()
          .unwrap()
          .pop_front()
          .unwrap_or_else(|| Err(studyagent::Error::Other(
            "script exhausted".to_string()
          )))
    }
}

/// Probe answering from a fixed credential
pub fn probe(linked: bool, credential: Option<&str>) -> Arc<CapabilityProbe>
{   let credential = credential.map(str::to_string);
    Arc::new(CapabilityProbe::new(
      linked
    , "OPENAI_API_KEY"
    , Arc::new(move |_: &str| credential.clone())
    ))
}

/// No backoff so retry tests stay fast
pub fn fast_retry() -> RetryPolicy
{   RetryPolicy::new(1, Duration::ZERO, 1.0)
}

pub fn dispatcher(
  primary: ScriptedBackend
, secondary: Option<ScriptedBackend>
, probe: Arc<CapabilityProbe>
) -> AgentDispatcher
{   let mut dispatcher = AgentDispatcher::new(Box::new(primary), probe)
      .with_retry_policy(fast_retry());
    if let Some(secondary) = secondary
    {   dispatcher = dispatcher.with_secondary(Box::new(secondary));
    }
    dispatcher
}

pub fn init_logging()
{   studyagent::init_logging();
}
