//! Session scoped study reminders
//!
//! Insertion order is kept as is; reminders are never sorted
//! by time and never removed one at a time.

use std::fmt;

use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder
{   pub id: Uuid
  , pub label: String
  , pub when: NaiveDateTime
}

impl fmt::Display for Reminder
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   write!(
          f,
          "{} \u{2014} {}",
          self.label,
          self.when.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Ordered reminders owned by one session
#[derive(Debug, Clone, Default)]
pub struct ReminderStore
{   reminders: Vec<Reminder>
}

impl ReminderStore
{   pub fn new() -> Self
    {   ReminderStore::default()
    }

    /// Append a reminder with a fresh id
    pub fn add(
      &mut self
    , label: impl Into<String>
    , when: NaiveDateTime
    ) -> Reminder
    {   let reminder = Reminder
        {   id: Uuid::new_v4()
          , label: label.into().trim().to_string()
          , when
        };
        debug!("Adding reminder {} at {}", reminder.id, when);
        self.reminders.push(reminder.clone());
        reminder
    }

    /// Remove everything; clearing an empty store is a no-op
    pub fn clear(&mut self)
    {   debug!("Clearing {} reminders", self.reminders.len());
        self.reminders.clear();
    }

    /// Snapshot in insertion order
    pub fn list(&self) -> Vec<Reminder>
    {   self.reminders.clone()
    }

    pub fn len(&self) -> usize
    {   self.reminders.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.reminders.is_empty()
    }
}
