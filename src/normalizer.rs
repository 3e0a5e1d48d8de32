//! Output contracts applied to raw backend text
//!
//! Quizzes must carry an answer key; summaries must fit the
//! budget of their requested length. Everything is trimmed.

use log::{debug, warn};

use crate::composer::ANSWER_KEY_TITLE;
use crate::config::NormalizerConfig;
use crate::request::
{   GenerationRequest, GenerationResult, NormalizationWarning
  , StudyTask
};

/// Appended when a quiz came back without an answer key
pub const ANSWER_KEY_PLACEHOLDER: &str = 
  "_The answer key could not be located in the generated quiz. \
   No answers have been filled in._";

#[derive(Debug, Clone, Default)]
pub struct ResponseNormalizer
{   budgets: NormalizerConfig
}

impl ResponseNormalizer
{   pub fn new(budgets: NormalizerConfig) -> Self
    {   ResponseNormalizer { budgets }
    }

    pub fn normalize(
      &self
    , raw: &str
    , request: &GenerationRequest
    , backend_used: crate::Backend
    ) -> GenerationResult
    {   let mut text = raw.trim().to_string();
        let mut truncated = false;
        let mut warnings = Vec::new();

        match &request.task
        {   StudyTask::Quiz { .. } => {
              if !has_answer_key(&text)
              {   warn!("Quiz output has no answer key, adding placeholder");
                  text = format!(
                    "{}\n\n## {}\n\n{}",
                    text, ANSWER_KEY_TITLE, ANSWER_KEY_PLACEHOLDER
                  );
                  warnings.push(NormalizationWarning::MissingAnswerKey);
              }
            }
          , StudyTask::Summary { length, .. } => {
              let budget = self.budgets.budget_for(*length);
              if let Some(cut) = truncate_at_sentence(&text, budget)
              {   let original_chars = text.chars().count();
                  debug!(
                    "Summary truncated from {} to {} chars",
                    original_chars,
                    cut.chars().count()
                  );
                  text = cut;
                  truncated = true;
                  warnings.push(
                    NormalizationWarning::SummaryTruncated
                    {   budget_chars: budget
                      , original_chars
                    }
                  );
              }
            }
          , StudyTask::Qa { .. } | StudyTask::Notes { .. } => {}
        }

        GenerationResult
        {   text
          , backend_used
          , truncated
          , warnings
        }
    }
}

const ANSWER_KEY_TITLES: &[&str] = &[
  "answer key"
, "answer keys"
, "answers"
, "answer sheet"
, "solutions"
];

/// Whether `text` has a line that is nothing but an answer key
/// title, give or take heading marks, emphasis and a colon.
/// Prose that merely starts with "Answer key" does not count.
pub fn has_answer_key(text: &str) -> bool
{   text.lines().any(|line| {
      let cleaned = line
        .trim()
        .trim_start_matches(|c: char| {
          c == '#' || c == '*' || c == '_' || c.is_whitespace()
        })
        .trim_end_matches(|c: char| {
          c == '*' || c == '_' || c == ':' || c.is_whitespace()
        })
        .to_ascii_lowercase();
      ANSWER_KEY_TITLES.contains(&cleaned.as_str())
    })
}

/// Cut `text` to at most `budget` characters, ending on the
/// last sentence or line boundary inside the budget.
/// `None` when the text already fits.
pub fn truncate_at_sentence(text: &str, budget: usize) -> Option<String>
{   let cut_byte = text.char_indices().nth(budget)?.0;
    let window = &text[..cut_byte];

    let mut boundary = None;
    let mut chars = window.char_indices().peekable();
    while let Some((idx, c)) = chars.next()
    {   let end = idx + c.len_utf8();
        let followed_by_space = match chars.peek()
        {   Some((_, next)) => next.is_whitespace()
          , None => text[end..]
              .chars()
              .next()
              .map_or(true, char::is_whitespace)
        };
        if matches!(c, '.' | '!' | '?') && followed_by_space
        {   boundary = Some(end);
        } else if c == '\n'
        {   boundary = Some(idx);
        }
    }

    let end = match boundary
    {   Some(end) if end > 0 => end
      , _ => window
          .rfind(char::is_whitespace)
          .filter(|i| *i > 0)
          .unwrap_or(cut_byte)
    };

    Some(text[..end].trim_end().to_string())
}
