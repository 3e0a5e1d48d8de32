//! Is the secondary (crew) backend usable in this process?
//!
//! Two prerequisites: the `crew` feature was compiled in, and
//! its credential is present and non-empty. The answer is
//! computed once and cached until `invalidate` is called
//! (e.g. after credentials were reloaded). No network call is
//! made; a bad key only shows up when the backend is invoked.
//!
//! The probe is also where the secondary backend reads its
//! key from, at call time, so availability and the key in
//! use always come from the same source.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use log::{debug, info};
use once_cell::sync::Lazy;

/// Reads a credential by variable name
pub type CredentialLookup 
  = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Cached result of a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityState
{   pub secondary_available: bool
  , pub checked_at: DateTime<Utc>
}

pub struct CapabilityProbe
{   library_linked: bool
  , credential_env: String
  , lookup: CredentialLookup
  , state: RwLock<Option<CapabilityState>>
}

impl std::fmt::Debug for CapabilityProbe
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) 
      -> std::fmt::Result
    {   f.debug_struct("CapabilityProbe")
          .field("library_linked", &self.library_linked)
          .field("credential_env", &self.credential_env)
          .field("state", &self.state)
          .finish()
    }
}

static GLOBAL_PROBE: Lazy<Arc<CapabilityProbe>> = Lazy::new(|| {
  Arc::new(CapabilityProbe::from_env(
    crate::config::OPENAI_API_KEY_ENV
  ))
});

impl CapabilityProbe
{   /// Probe reading the process environment
    pub fn from_env(credential_env: impl Into<String>) -> Self
    {   Self::new(
          cfg!(feature = "crew")
        , credential_env
        , Arc::new(crate::config::read_env)
        )
    }

    /// Probe answering from already loaded credentials
    pub fn from_credentials(
      credentials: &crate::config::Credentials
    , credential_env: impl Into<String>
    ) -> Self
    {   let key = credentials.openai_api_key.clone();
        Self::new(
          cfg!(feature = "crew")
        , credential_env
        , Arc::new(move |_: &str| key.clone())
        )
    }

    /// Probe with an explicit linkage flag and credential source
    pub fn new(
      library_linked: bool
    , credential_env: impl Into<String>
    , lookup: CredentialLookup
    ) -> Self
    {   CapabilityProbe
        {   library_linked
          , credential_env: credential_env.into()
          , lookup
          , state: RwLock::new(None)
        }
    }

    /// Process-wide probe for the default credential variable
    pub fn global() -> Arc<CapabilityProbe>
    {   Arc::clone(&GLOBAL_PROBE)
    }

    /// Cached state, computing it on first use
    pub fn state(&self) -> CapabilityState
    {   if let Ok(guard) = self.state.read()
        {   if let Some(state) = *guard
            {   return state;
            }
        }

        // State is Copy; a poisoned lock still holds a valid value
        let mut guard = self.state
          .write()
          .unwrap_or_else(|e| e.into_inner());
        if let Some(state) = *guard
        {   return state;
        }
        let state = self.compute();
        *guard = Some(state);
        state
    }

    /// Variable the secondary credential is read from
    pub fn credential_env(&self) -> &str
    {   &self.credential_env
    }

    /// Current secondary credential, read live (not cached)
    pub fn credential(&self) -> Option<String>
    {   (self.lookup)(&self.credential_env)
          .map(|v| v.trim().to_string())
          .filter(|v| !v.is_empty())
    }

    pub fn is_secondary_available(&self) -> bool
    {   self.state().secondary_available
    }

    /// Forget the cached state; next read recomputes
    pub fn invalidate(&self)
    {   debug!("Invalidating capability state");
        let mut guard = self.state
          .write()
          .unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    fn compute(&self) -> CapabilityState
    {   let has_credential = self.credential().is_some();
        let secondary_available 
          = self.library_linked && has_credential;
        info!(
          "Secondary backend available: {} \
           (linked: {}, {} set: {})",
          secondary_available,
          self.library_linked,
          self.credential_env,
          has_credential
        );
        CapabilityState
        {   secondary_available
          , checked_at: Utc::now()
        }
    }
}
