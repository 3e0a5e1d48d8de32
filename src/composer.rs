//! Prompt templates for each study task
//!
//! `compose` is pure: same request, byte-identical prompt.

use log::trace;

use crate::request::
{   ComposedPrompt, GenerationRequest, StudyTask, SummaryLength
};

/// Title of the section every quiz must end with
pub const ANSWER_KEY_TITLE: &str = "Answer Key";

/// Formatting directive appended to every quiz prompt
pub const ANSWER_KEY_DIRECTIVE: &str = 
  "- End the quiz output with a section titled \"Answer Key\" \
   containing one answer per question, in question order.";

/// Rough word target handed to the model for a summary length
pub fn summary_word_target(length: SummaryLength) -> usize
{   match length
    {   SummaryLength::VeryShort => 100
      , SummaryLength::Short => 200
      , SummaryLength::Medium => 400
      , SummaryLength::Detailed => 800
    }
}

/// Build the system/user prompt pair for a request
pub fn compose(request: &GenerationRequest) -> ComposedPrompt
{   let request = &request.sanitized();
    let level = request.level.describe();
    let mode = request.study_mode.describe();
    let topic = request.topic.trim();

    let prompt = match &request.task
    {   StudyTask::Qa { subject, style } => {
          let system_instruction = format!(
            "You are a helpful personal study assistant for \
             students. Explain concepts clearly, with examples. \
             Adapt your explanation to a {} level student and \
             keep the tone encouraging. \
             Explanation style: {}. \
             Overall study mode: {}.",
            level,
            style.describe(),
            mode
          );
          let user_instruction = match subject
              .as_deref()
              .map(str::trim)
              .filter(|s| !s.is_empty())
          {   Some(subject) => format!(
                "Subject: {}\nQuestion: {}", subject, topic
              )
            , None => format!("Question: {}", topic)
          };
          ComposedPrompt { system_instruction, user_instruction }
        }
      , StudyTask::Summary { length, highlight_key_terms } => {
          let system_instruction = format!(
            "You are an AI note-taker. Summarize the input text \
             into clear study notes.\n\
             - Summary length: {} (at most about {} words).\n\
             - Highlight key terms: {}.\n\
             - Target level: {}.\n\
             - Overall study mode: {}.\n\
             - Use headings and bullet points where helpful.",
            length.describe(),
            summary_word_target(*length),
            if *highlight_key_terms { "yes" } else { "no" },
            level,
            mode
          );
          let user_instruction = format!(
            "Summarize the following text:\n\n{}", topic
          );
          ComposedPrompt { system_instruction, user_instruction }
        }
      , StudyTask::Notes { depth } => {
          let system_instruction = format!(
            "You are an expert tutor. Create structured study \
             notes on the given topic.\n\
             - Use headings and bullet points.\n\
             - Include definitions, key formulas or dates, and \
             simple examples.\n\
             - Depth: {}.\n\
             - Target level: {}.\n\
             - Overall study mode: {}.",
            depth.describe(),
            level,
            mode
          );
          let user_instruction = format!(
            "Create study notes on: {}", topic
          );
          ComposedPrompt { system_instruction, user_instruction }
        }
      , StudyTask::Quiz { difficulty, format, num_questions } => {
          let system_instruction = format!(
            "You are an AI quiz generator for students.\n\
             Create a quiz in Markdown format. Include clear \
             numbering.\n\
             - Question type: {}.\n\
             - Difficulty: {}.\n\
             - Target level: {}.\n\
             - Overall study mode: {}.\n\
             {}",
            format.describe(),
            difficulty.describe(),
            level,
            mode,
            ANSWER_KEY_DIRECTIVE
          );
          let user_instruction = format!(
            "Create a {}-question quiz on the topic: {}.\n\
             Use friendly wording appropriate for students.",
            num_questions,
            topic
          );
          ComposedPrompt { system_instruction, user_instruction }
        }
    };

    trace!("Composed prompt: {:?}", prompt);
    prompt
}
