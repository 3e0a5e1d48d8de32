//! Request, prompt and result types for studyagent
//!
//! Every option a UI can hand us is a closed enum. Unknown
//! strings degrade to the enum's default via `From<&str>`,
//! and deserialization goes through the same parser.

use serde::{Deserialize, Serialize};

pub const MIN_QUIZ_QUESTIONS: u8 = 3;
pub const MAX_QUIZ_QUESTIONS: u8 = 20;
pub const DEFAULT_QUIZ_QUESTIONS: u8 = 5;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;

/// Temperature in [0, 1]; NaN becomes the default
pub fn clamp_temperature(temperature: f32) -> f32
{   if temperature.is_nan()
    {   DEFAULT_TEMPERATURE
    } else
    {   temperature.clamp(0.0, 1.0)
    }
}

/// Quiz length within 3..=20
pub fn clamp_num_questions(num_questions: u8) -> u8
{   num_questions.clamp(MIN_QUIZ_QUESTIONS, MAX_QUIZ_QUESTIONS)
}

fn normalize_key(s: &str) -> String
{   s.trim()
      .to_ascii_lowercase()
      .replace(['_', '-'], " ")
}

/// Which kind of study task a request is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType
{   Qa
  , Summary
  , Notes
  , Quiz
}

/// Academic level the answer should target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Level
{   School
  , College
  , Graduate
  , #[default]
    General
}

impl Level
{   pub fn describe(&self) -> &'static str
    {   match self
        {   Level::School => "school"
          , Level::College => "college (undergraduate)"
          , Level::Graduate => "graduate"
          , Level::General => "general"
        }
    }
}

impl From<&str> for Level
{   fn from(s: &str) -> Self
    {   match normalize_key(s).as_str()
        {   "school" | "high school" => Level::School
          , "college" | "undergraduate" | "university" => {
              Level::College
            }
          , "graduate" | "postgraduate" => Level::Graduate
          , _ => Level::General
        }
    }
}

impl From<String> for Level
{   fn from(s: String) -> Self
    {   Self::from(s.as_str())
    }
}

/// How a Q&A answer should be explained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ExplanationStyle
{   Simple
  , Detailed
  , #[default]
    StepByStep
}

impl ExplanationStyle
{   pub fn describe(&self) -> &'static str
    {   match self
        {   ExplanationStyle::Simple => "Simple"
          , ExplanationStyle::Detailed => "Detailed"
          , ExplanationStyle::StepByStep => "Step-by-step"
        }
    }
}

impl From<&str> for ExplanationStyle
{   fn from(s: &str) -> Self
    {   match normalize_key(s).as_str()
        {   "simple" => ExplanationStyle::Simple
          , "detailed" => ExplanationStyle::Detailed
          , _ => ExplanationStyle::StepByStep
        }
    }
}

impl From<String> for ExplanationStyle
{   fn from(s: String) -> Self
    {   Self::from(s.as_str())
    }
}

/// Overall study mode, applied to every task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum StudyMode
{   #[default]
    Balanced
  , ExamPrep
  , DeepUnderstanding
}

impl StudyMode
{   pub fn describe(&self) -> &'static str
    {   match self
        {   StudyMode::Balanced => "Balanced"
          , StudyMode::ExamPrep => "Exam prep"
          , StudyMode::DeepUnderstanding => "Deep understanding"
        }
    }
}

impl From<&str> for StudyMode
{   fn from(s: &str) -> Self
    {   match normalize_key(s).as_str()
        {   "exam prep" | "exam" => StudyMode::ExamPrep
          , "deep understanding" | "deep" => {
              StudyMode::DeepUnderstanding
            }
          , _ => StudyMode::Balanced
        }
    }
}

impl From<String> for StudyMode
{   fn from(s: String) -> Self
    {   Self::from(s.as_str())
    }
}

/// Requested summary length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum SummaryLength
{   VeryShort
  , #[default]
    Short
  , Medium
  , Detailed
}

impl SummaryLength
{   pub fn describe(&self) -> &'static str
    {   match self
        {   SummaryLength::VeryShort => "Very short (bullet points)"
          , SummaryLength::Short => "Short"
          , SummaryLength::Medium => "Medium"
          , SummaryLength::Detailed => "Detailed"
        }
    }
}

impl From<&str> for SummaryLength
{   fn from(s: &str) -> Self
    {   let key = normalize_key(s);
        if key.starts_with("very short")
        {   return SummaryLength::VeryShort;
        }
        match key.as_str()
        {   "medium" => SummaryLength::Medium
          , "detailed" | "long" => SummaryLength::Detailed
          , _ => SummaryLength::Short
        }
    }
}

impl From<String> for SummaryLength
{   fn from(s: String) -> Self
    {   Self::from(s.as_str())
    }
}

/// Depth of generated topic notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum NotesDepth
{   Overview
  , #[default]
    Standard
  , InDepth
}

impl NotesDepth
{   pub fn describe(&self) -> &'static str
    {   match self
        {   NotesDepth::Overview => "Overview"
          , NotesDepth::Standard => "Standard"
          , NotesDepth::InDepth => "In-depth"
        }
    }
}

impl From<&str> for NotesDepth
{   fn from(s: &str) -> Self
    {   match normalize_key(s).as_str()
        {   "overview" => NotesDepth::Overview
          , "in depth" | "indepth" | "deep" => NotesDepth::InDepth
          , _ => NotesDepth::Standard
        }
    }
}

impl From<String> for NotesDepth
{   fn from(s: String) -> Self
    {   Self::from(s.as_str())
    }
}

/// Quiz difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum QuizDifficulty
{   Easy
  , #[default]
    Medium
  , Hard
  , Mixed
}

impl QuizDifficulty
{   pub fn describe(&self) -> &'static str
    {   match self
        {   QuizDifficulty::Easy => "Easy"
          , QuizDifficulty::Medium => "Medium"
          , QuizDifficulty::Hard => "Hard"
          , QuizDifficulty::Mixed => "Mixed"
        }
    }
}

impl From<&str> for QuizDifficulty
{   fn from(s: &str) -> Self
    {   match normalize_key(s).as_str()
        {   "easy" => QuizDifficulty::Easy
          , "hard" => QuizDifficulty::Hard
          , "mixed" => QuizDifficulty::Mixed
          , _ => QuizDifficulty::Medium
        }
    }
}

impl From<String> for QuizDifficulty
{   fn from(s: String) -> Self
    {   Self::from(s.as_str())
    }
}

/// Quiz question format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum QuizFormat
{   #[default]
    MultipleChoice
  , ShortAnswer
  , Mixed
}

impl QuizFormat
{   pub fn describe(&self) -> &'static str
    {   match self
        {   QuizFormat::MultipleChoice => "Multiple choice"
          , QuizFormat::ShortAnswer => "Short answer"
          , QuizFormat::Mixed => "Mixed"
        }
    }
}

impl From<&str> for QuizFormat
{   fn from(s: &str) -> Self
    {   match normalize_key(s).as_str()
        {   "short answer" | "short" => QuizFormat::ShortAnswer
          , "mixed" => QuizFormat::Mixed
          , _ => QuizFormat::MultipleChoice
        }
    }
}

impl From<String> for QuizFormat
{   fn from(s: String) -> Self
    {   Self::from(s.as_str())
    }
}

/// Task-specific options. Only the fields of the selected
/// task exist, so there is nothing irrelevant to validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum StudyTask
{   Qa
    {   subject: Option<String>
      , style: ExplanationStyle
    }
  , Summary
    {   length: SummaryLength
      , highlight_key_terms: bool
    }
  , Notes
    {   depth: NotesDepth
    }
  , Quiz
    {   difficulty: QuizDifficulty
      , format: QuizFormat
      , num_questions: u8
    }
}

impl StudyTask
{   pub fn task_type(&self) -> TaskType
    {   match self
        {   StudyTask::Qa { .. } => TaskType::Qa
          , StudyTask::Summary { .. } => TaskType::Summary
          , StudyTask::Notes { .. } => TaskType::Notes
          , StudyTask::Quiz { .. } => TaskType::Quiz
        }
    }
}

/// One generation request as handed over by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest
{   /// Task and its options
    pub task: StudyTask
  , /// Question, text to summarize, or topic
    pub topic: String
  , pub level: Level
  , pub study_mode: StudyMode
  , /// Sampling temperature in [0, 1]
    pub temperature: f32
  , /// Generation cap, always positive
    pub max_output_tokens: u32
  , pub backend_preference: crate::BackendPreference
  , /// Primary model override
    pub model: Option<String>
}

impl GenerationRequest
{   fn with_task(task: StudyTask, topic: impl Into<String>) -> Self
    {   GenerationRequest
        {   task
          , topic: topic.into()
          , level: Level::default()
          , study_mode: StudyMode::default()
          , temperature: DEFAULT_TEMPERATURE
          , max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS
          , backend_preference: crate::BackendPreference::default()
          , model: None
        }
    }

    /// Ask a study question
    pub fn qa(question: impl Into<String>) -> Self
    {   Self::with_task(
          StudyTask::Qa
          {   subject: None
            , style: ExplanationStyle::default()
          }
        , question
        )
    }

    /// Summarize pasted study material
    pub fn summary(text: impl Into<String>) -> Self
    {   Self::with_task(
          StudyTask::Summary
          {   length: SummaryLength::default()
            , highlight_key_terms: true
          }
        , text
        )
    }

    /// Turn a topic into structured notes
    pub fn notes(topic: impl Into<String>) -> Self
    {   Self::with_task(
          StudyTask::Notes { depth: NotesDepth::default() }
        , topic
        )
    }

    /// Generate a quiz on a topic
    pub fn quiz(topic: impl Into<String>) -> Self
    {   Self::with_task(
          StudyTask::Quiz
          {   difficulty: QuizDifficulty::default()
            , format: QuizFormat::default()
            , num_questions: DEFAULT_QUIZ_QUESTIONS
          }
        , topic
        )
    }

    pub fn task_type(&self) -> TaskType
    {   self.task.task_type()
    }

    /// Copy with every numeric option forced into range
    pub fn sanitized(&self) -> Self
    {   let mut request = self.clone();
        request.temperature = clamp_temperature(request.temperature);
        request.max_output_tokens = request.max_output_tokens.max(1);
        if let StudyTask::Quiz { num_questions, .. } = &mut request.task
        {   *num_questions = clamp_num_questions(*num_questions);
        }
        request
    }

    pub fn with_level(mut self, level: Level) -> Self
    {   self.level = level;
        self
    }

    pub fn with_study_mode(mut self, mode: StudyMode) -> Self
    {   self.study_mode = mode;
        self
    }

    /// Clamped into [0, 1]; NaN becomes the default
    pub fn with_temperature(mut self, temperature: f32) -> Self
    {   self.temperature = clamp_temperature(temperature);
        self
    }

    /// Zero is raised to one
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self
    {   self.max_output_tokens = tokens.max(1);
        self
    }

    pub fn with_backend_preference(
      mut self
    , preference: crate::BackendPreference
    ) -> Self
    {   self.backend_preference = preference;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self
    {   self.model = Some(model.into());
        self
    }

    /// Q&A subject line; ignored for other tasks
    pub fn with_subject(mut self, value: impl Into<String>) -> Self
    {   if let StudyTask::Qa { subject, .. } = &mut self.task
        {   let value = value.into();
            *subject = if value.trim().is_empty()
            {   None
            } else
            {   Some(value)
            };
        }
        self
    }

    /// Q&A explanation style; ignored for other tasks
    pub fn with_style(mut self, value: ExplanationStyle) -> Self
    {   if let StudyTask::Qa { style, .. } = &mut self.task
        {   *style = value;
        }
        self
    }

    /// Summary length; ignored for other tasks
    pub fn with_summary_length(mut self, value: SummaryLength) -> Self
    {   if let StudyTask::Summary { length, .. } = &mut self.task
        {   *length = value;
        }
        self
    }

    /// Summary key-term highlighting; ignored for other tasks
    pub fn with_highlight_key_terms(mut self, value: bool) -> Self
    {   if let StudyTask::Summary { highlight_key_terms, .. } 
          = &mut self.task
        {   *highlight_key_terms = value;
        }
        self
    }

    /// Notes depth; ignored for other tasks
    pub fn with_depth(mut self, value: NotesDepth) -> Self
    {   if let StudyTask::Notes { depth } = &mut self.task
        {   *depth = value;
        }
        self
    }

    /// Quiz difficulty; ignored for other tasks
    pub fn with_difficulty(mut self, value: QuizDifficulty) -> Self
    {   if let StudyTask::Quiz { difficulty, .. } = &mut self.task
        {   *difficulty = value;
        }
        self
    }

    /// Quiz format; ignored for other tasks
    pub fn with_quiz_format(mut self, value: QuizFormat) -> Self
    {   if let StudyTask::Quiz { format, .. } = &mut self.task
        {   *format = value;
        }
        self
    }

    /// Quiz length, clamped to 3..=20; ignored for other tasks
    pub fn with_num_questions(mut self, value: u8) -> Self
    {   if let StudyTask::Quiz { num_questions, .. } = &mut self.task
        {   *num_questions = clamp_num_questions(value);
        }
        self
    }
}

/// Finished prompt pair handed to a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedPrompt
{   pub system_instruction: String
  , pub user_instruction: String
}

impl ComposedPrompt
{   /// Single task description for backends without a
    /// separate system channel
    pub fn task_description(&self) -> String
    {   format!(
          "{}\n\n{}", 
          self.system_instruction, 
          self.user_instruction
        )
    }
}

/// Non-fatal findings of the normalizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationWarning
{   /// Quiz output had no answer key; a placeholder was added
    MissingAnswerKey
  , /// Summary exceeded its budget and was cut
    SummaryTruncated
    {   budget_chars: usize
      , original_chars: usize
    }
}

/// Normalized answer returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult
{   pub text: String
  , pub backend_used: crate::Backend
  , pub truncated: bool
  , pub warnings: Vec<NormalizationWarning>
}
