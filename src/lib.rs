pub mod error;
pub mod config;
pub mod request;
pub mod composer;
pub mod capability;
pub mod backends;
pub mod failover;
pub mod normalizer;
pub mod dispatcher;
pub mod reminders;
pub mod session;
use serde::{Deserialize, Serialize};

/*

studyagent: the request layer behind a personal study assistant.

It turns a handful of user-chosen options (explanation style, level,
creativity, study mode, summary length, quiz difficulty) into a prompt,
sends it to one of two answer-generation backends, and normalizes what
comes back before it is shown.

studyagent/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports, shared enums, session channel types
│   ├── error.rs        # Error type and classification
│   ├── config.rs       # Backend, failover and normalizer settings
│   ├── request.rs      # Request / prompt / result types
│   ├── composer.rs     # Prompt templates
│   ├── capability.rs   # Is the secondary backend usable?
│   ├── backends/       # Primary (Gemini) and secondary (crew) backends
│   ├── failover.rs     # Retry policy and backend order
│   ├── dispatcher.rs   # Backend selection, retry and fallback
│   ├── normalizer.rs   # Output contracts (answer key, length budget)
│   ├── reminders.rs    # Session scoped reminder list
│   └── session.rs      # Per-session actor
└── tests/

  compose(request) -> ComposedPrompt
  dispatch(prompt, request) -> GenerationResult
  normalize(raw, request) -> GenerationResult
  ReminderStore::{add, clear, list}

*/

pub use error::{Error, ErrorKind, Result};
pub use config::{Credentials, StudyConfig};
pub use request::
{   ComposedPrompt, ExplanationStyle, GenerationRequest
  , GenerationResult, Level, NormalizationWarning, NotesDepth
  , QuizDifficulty, QuizFormat, StudyMode, StudyTask
  , SummaryLength, TaskType
};
pub use composer::compose;
pub use capability::{CapabilityProbe, CapabilityState};
pub use backends::GenerationBackend;
pub use dispatcher::AgentDispatcher;
pub use normalizer::ResponseNormalizer;
pub use reminders::{Reminder, ReminderStore};
pub use session::StudySession;

/// Install env_logger as the `log` backend.
/// Safe to call more than once.
pub fn init_logging()
{   let _ = env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).try_init();
}

/// STUDYAGENT SESSION INTERFACE:

// ===== Generate =====

pub type GenerateReply = Result<GenerationResult>;
pub type GenerateReplySender 
  = tokio::sync::mpsc::UnboundedSender<GenerateReply>;

pub struct GenerateArgs 
{   pub request: GenerationRequest
  , pub reply: GenerateReplySender
}

// ===== AddReminder =====

pub type AddReminderReply = Reminder;
pub type AddReminderReplySender 
  = tokio::sync::mpsc::UnboundedSender<AddReminderReply>;

pub struct AddReminderArgs 
{   pub label: String
  , pub when: chrono::NaiveDateTime
  , pub reply: AddReminderReplySender
}

// ===== ListReminders =====

pub type ListRemindersReply = Vec<Reminder>;
pub type ListRemindersReplySender 
  = tokio::sync::mpsc::UnboundedSender<ListRemindersReply>;

pub struct ListRemindersArgs 
{   pub reply: ListRemindersReplySender
}

// ===== ClearReminders =====

pub type ClearRemindersReply = ();
pub type ClearRemindersReplySender 
  = tokio::sync::mpsc::UnboundedSender<ClearRemindersReply>;

pub struct ClearRemindersArgs 
{   pub reply: ClearRemindersReplySender
}

// ===== KillSession =====

pub type KillSessionReply = Result<()>;
pub type KillSessionReplySender 
  = tokio::sync::mpsc::UnboundedSender<KillSessionReply>;

pub struct KillSessionArgs 
{   pub reply: KillSessionReplySender
}

// ===== SessionHand (sender side) =====

pub struct SessionHand 
{   pub generate_tx
      : tokio::sync::mpsc::UnboundedSender<GenerateArgs>
  , pub add_reminder_tx
      : tokio::sync::mpsc::UnboundedSender<AddReminderArgs>
  , pub list_reminders_tx
      : tokio::sync::mpsc::UnboundedSender<ListRemindersArgs>
  , pub clear_reminders_tx
      : tokio::sync::mpsc::UnboundedSender<ClearRemindersArgs>
  , pub kill_session_tx
      : tokio::sync::mpsc::UnboundedSender<KillSessionArgs>
}

// ===== SessionFoot (receiver side) =====

pub struct SessionFoot 
{   pub generate_rx
      : tokio::sync::mpsc::UnboundedReceiver<GenerateArgs>
  , pub add_reminder_rx
      : tokio::sync::mpsc::UnboundedReceiver<AddReminderArgs>
  , pub list_reminders_rx
      : tokio::sync::mpsc::UnboundedReceiver<ListRemindersArgs>
  , pub clear_reminders_rx
      : tokio::sync::mpsc::UnboundedReceiver<ClearRemindersArgs>
  , pub kill_session_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillSessionArgs>
}

/// STUDYAGENT STRUCTURES:

/// The two interchangeable answer-generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend 
{   /// Single-call remote text generation (Gemini)
    Primary
  , /// Multi-step agent runtime (crew over an OpenAI endpoint)
    Secondary
}

impl Backend
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   Backend::Primary => "primary"
          , Backend::Secondary => "secondary"
        }
    }
}

/// Which backend the caller would like to answer a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum BackendPreference 
{   /// Let the dispatcher decide (currently: primary)
    #[default]
    Auto
  , /// Primary backend only
    Primary
  , /// Secondary if available, primary otherwise
    Secondary
}

impl From<&str> for BackendPreference
{   fn from(s: &str) -> Self
    {   match s.trim().to_ascii_lowercase().as_str()
        {   "primary" | "gemini" => BackendPreference::Primary
          , "secondary" | "crew" | "crewai" => {
              BackendPreference::Secondary
            }
          , _ => BackendPreference::Auto
        }
    }
}

impl From<String> for BackendPreference
{   fn from(s: String) -> Self
    {   Self::from(s.as_str())
    }
}
