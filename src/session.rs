use std::sync::Arc;
use tokio::sync::mpsc;
use log::{debug, error, info};

use crate::{GenerationRequest, Reminder, SessionFoot};
use crate::dispatcher::AgentDispatcher;
use crate::reminders::ReminderStore;

/// Per-session state: the session's own reminders plus the
/// dispatcher it shares with other sessions
pub struct SessionState
{   pub dispatcher: Arc<AgentDispatcher>
  , pub reminders: ReminderStore
}

impl SessionState
{   pub fn new(dispatcher: Arc<AgentDispatcher>) -> Self
    {   debug!("Initializing SessionState");
        SessionState
        {   dispatcher
          , reminders: ReminderStore::new()
        }
    }
}

/// One interactive session - owns its task
pub struct StudySession
{   hand: crate::SessionHand
  , _task_handle: tokio::task::JoinHandle<()>
}

fn disconnected<T>(_: T) -> crate::Error
{   error!("Session channel closed");
    crate::Error::SessionClosed
}

impl StudySession
{   /// Start a session with a fresh, empty reminder list.
    /// Must be called from within a tokio runtime.
    pub fn spawn(dispatcher: Arc<AgentDispatcher>) -> Self
    {   debug!("Spawning StudySession");

        let (generate_tx, generate_rx)
          = mpsc::unbounded_channel();
        let (add_reminder_tx, add_reminder_rx)
          = mpsc::unbounded_channel();
        let (list_reminders_tx, list_reminders_rx)
          = mpsc::unbounded_channel();
        let (clear_reminders_tx, clear_reminders_rx)
          = mpsc::unbounded_channel();
        let (kill_session_tx, kill_session_rx)
          = mpsc::unbounded_channel();

        let hand = crate::SessionHand
        {   generate_tx
          , add_reminder_tx
          , list_reminders_tx
          , clear_reminders_tx
          , kill_session_tx
        };

        let foot = crate::SessionFoot
        {   generate_rx
          , add_reminder_rx
          , list_reminders_rx
          , clear_reminders_rx
          , kill_session_rx
        };

        let _task_handle = tokio::spawn(async move {
          run_session_loop(foot, SessionState::new(dispatcher)).await
        });

        StudySession
        {   hand
          , _task_handle
        }
    }

    /// Queue a generation request - returns immediately
    pub fn generate(
      &self
    , request: GenerationRequest
    ) -> crate::Result<mpsc::UnboundedReceiver<crate::GenerateReply>>
    {   debug!("generate queuing {:?} request", request.task_type());
        let (reply, reply_rx) = mpsc::unbounded_channel();
        self.hand.generate_tx
          .send(crate::GenerateArgs { request, reply })
          .map_err(disconnected)?;
        Ok(reply_rx)
    }

    /// Queue a new reminder - returns immediately
    pub fn add_reminder(
      &self
    , label: impl Into<String>
    , when: chrono::NaiveDateTime
    ) -> crate::Result<mpsc::UnboundedReceiver<crate::AddReminderReply>>
    {   let (reply, reply_rx) = mpsc::unbounded_channel();
        self.hand.add_reminder_tx
          .send(crate::AddReminderArgs
          {   label: label.into()
            , when
            , reply
          })
          .map_err(disconnected)?;
        Ok(reply_rx)
    }

    /// Queue a snapshot of the reminder list
    pub fn list_reminders(
      &self
    ) -> crate::Result<mpsc::UnboundedReceiver<crate::ListRemindersReply>>
    {   let (reply, reply_rx) = mpsc::unbounded_channel();
        self.hand.list_reminders_tx
          .send(crate::ListRemindersArgs { reply })
          .map_err(disconnected)?;
        Ok(reply_rx)
    }

    /// Queue removal of every reminder
    pub fn clear_reminders(
      &self
    ) -> crate::Result<mpsc::UnboundedReceiver<crate::ClearRemindersReply>>
    {   let (reply, reply_rx) = mpsc::unbounded_channel();
        self.hand.clear_reminders_tx
          .send(crate::ClearRemindersArgs { reply })
          .map_err(disconnected)?;
        Ok(reply_rx)
    }

    /// End the session; its reminders are discarded
    pub async fn shutdown(self) -> crate::Result<()>
    {   debug!("Shutting down StudySession");
        let (reply, mut reply_rx) = mpsc::unbounded_channel();
        self.hand.kill_session_tx
          .send(crate::KillSessionArgs { reply })
          .map_err(disconnected)?;

        match reply_rx.recv().await
        {   Some(result) => {
              debug!("Session shutdown confirmed");
              result
            }
          , None => {
              error!("Session ended without confirming shutdown");
              Err(crate::Error::SessionClosed)
            }
        }
    }
}

/// Main session event loop
///
/// Commands are handled one at a time, so a session never
/// has more than one generation in flight.
async fn run_session_loop(
  foot: SessionFoot
, mut state: SessionState
)
{   debug!("Starting session event loop");
    let SessionFoot
    {   mut generate_rx
      , mut add_reminder_rx
      , mut list_reminders_rx
      , mut clear_reminders_rx
      , mut kill_session_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = generate_rx.recv() => {
          debug!("Received Generate");
          let result = state.dispatcher
            .generate(&cmd.request)
            .await;
          let _ = cmd.reply.send(result);
        }
      , Some(cmd) = add_reminder_rx.recv() => {
          debug!("Received AddReminder");
          let reminder: Reminder 
            = state.reminders.add(cmd.label, cmd.when);
          let _ = cmd.reply.send(reminder);
        }
      , Some(cmd) = list_reminders_rx.recv() => {
          debug!("Received ListReminders");
          let _ = cmd.reply.send(state.reminders.list());
        }
      , Some(cmd) = clear_reminders_rx.recv() => {
          debug!("Received ClearReminders");
          state.reminders.clear();
          let _ = cmd.reply.send(());
        }
      , Some(cmd) = kill_session_rx.recv() => {
          debug!("Received KillSession");
          let _ = cmd.reply.send(Ok(()));
          info!("Study session shutting down");
          break;
        }
      , else => {
          debug!("All session channels closed");
          break;
        }
      }
    }
}
