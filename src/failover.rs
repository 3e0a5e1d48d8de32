//! Retry budget for the primary and the order backends are
//! tried in for one request

use std::time::Duration;
use log::debug;

use crate::{Backend, BackendPreference};

/// How often, and how patiently, a transient primary failure
/// is retried. Delays grow geometrically from `initial_backoff`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy
{   pub max_retries: usize
  , pub initial_backoff: Duration
  , pub backoff_multiplier: f32
}

impl RetryPolicy
{   pub fn new(
      max_retries: usize
    , initial_backoff: Duration
    , backoff_multiplier: f32
    ) -> Self
    {   RetryPolicy
        {   max_retries
          , initial_backoff
          , backoff_multiplier
        }
    }

    pub fn from_config(config: &crate::config::FailoverConfig) -> Self
    {   RetryPolicy::new(
          config.max_retries
        , Duration::from_millis(config.initial_backoff_ms)
        , config.backoff_multiplier
        )
    }

    /// Pause before the next retry, or `None` once
    /// `retries_done` has used up the budget
    pub fn next_delay(&self, retries_done: usize) -> Option<Duration>
    {   if retries_done >= self.max_retries
        {   return None;
        }
        let exponent = i32::try_from(retries_done).unwrap_or(i32::MAX);
        let factor = f64::from(self.backoff_multiplier)
          .max(0.0)
          .powi(exponent);
        let millis = self.initial_backoff.as_millis() as f64 * factor;
        // Out of range keeps the first delay
        if !millis.is_finite() || millis > u64::MAX as f64
        {   return Some(self.initial_backoff);
        }
        Some(Duration::from_millis(millis.round() as u64))
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::new(1, Duration::from_millis(250), 2.0)
    }
}

/// Backends to try for one request, first to last.
/// At most two entries, each backend at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackSequence
{   order: Vec<Backend>
  , position: usize
}

impl FallbackSequence
{   /// Resolve a preference against what is usable right now
    pub fn resolve(
      preference: BackendPreference
    , secondary_available: bool
    , allow_secondary_fallback: bool
    ) -> Self
    {   let order = match preference
        {   BackendPreference::Secondary if secondary_available => {
              if allow_secondary_fallback
              {   vec![Backend::Secondary, Backend::Primary]
              } else
              {   vec![Backend::Secondary]
              }
            }
          , BackendPreference::Secondary => {
              debug!("Secondary requested but unavailable");
              vec![Backend::Primary]
            }
          , BackendPreference::Auto
          | BackendPreference::Primary => vec![Backend::Primary]
        };
        FallbackSequence
        {   order
          , position: 0
        }
    }

    pub fn backends(&self) -> &[Backend]
    {   &self.order
    }

    pub fn current(&self) -> Option<Backend>
    {   self.order.get(self.position).copied()
    }

    /// Step to the next backend if one is left
    pub fn fall_back(&mut self) -> Option<Backend>
    {   if self.position + 1 >= self.order.len()
        {   return None;
        }
        self.position += 1;
        self.current()
    }

    /// Backends tried so far, including the current one
    pub fn attempted(&self) -> Vec<Backend>
    {   let end = (self.position + 1).min(self.order.len());
        self.order[..end].to_vec()
    }
}
