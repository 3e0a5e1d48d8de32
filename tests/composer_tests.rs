use studyagent::composer::{ANSWER_KEY_DIRECTIVE, summary_word_target};
use studyagent::{
  compose, ExplanationStyle, GenerationRequest, Level, NotesDepth,
  QuizDifficulty, QuizFormat, StudyMode, StudyTask, SummaryLength,
  TaskType,
};

#[test]
fn test_compose_is_deterministic()
{   let request = GenerationRequest::qa("What is a derivative?")
      .with_subject("Calculus")
      .with_level(Level::College)
      .with_style(ExplanationStyle::Detailed)
      .with_study_mode(StudyMode::ExamPrep);

    let first = compose(&request);
    let second = compose(&request.clone());
    assert_eq!(first, second);
}

#[test]
fn test_qa_prompt_carries_options()
{   let request = GenerationRequest::qa("What is a derivative?")
      .with_subject("Calculus")
      .with_level(Level::School)
      .with_style(ExplanationStyle::Simple)
      .with_study_mode(StudyMode::DeepUnderstanding);
    let prompt = compose(&request);

    assert!(prompt.system_instruction.contains("school level student"));
    assert!(prompt.system_instruction.contains("Explanation style: Simple."));
    assert!(prompt.system_instruction
      .contains("Overall study mode: Deep understanding."));
    assert_eq!(
      prompt.user_instruction,
      "Subject: Calculus\nQuestion: What is a derivative?"
    );
}

#[test]
fn test_qa_without_subject_has_no_subject_line()
{   let prompt = compose(
      &GenerationRequest::qa("  What is a derivative?  ")
        .with_subject("   ")
    );
    assert_eq!(prompt.user_instruction, "Question: What is a derivative?");
}

#[test]
fn test_summary_prompt_frames_the_text()
{   let request = GenerationRequest::summary("Mitochondria make ATP.")
      .with_summary_length(SummaryLength::VeryShort)
      .with_highlight_key_terms(false);
    let prompt = compose(&request);

    assert!(prompt.user_instruction
      .starts_with("Summarize the following text:"));
    assert!(prompt.user_instruction.ends_with("Mitochondria make ATP."));
    assert!(prompt.system_instruction
      .contains("Very short (bullet points)"));
    assert!(prompt.system_instruction.contains("Highlight key terms: no."));
    assert!(prompt.system_instruction.contains(&format!(
      "at most about {} words",
      summary_word_target(SummaryLength::VeryShort)
    )));
}

#[test]
fn test_notes_prompt_uses_depth()
{   let prompt = compose(
      &GenerationRequest::notes("French Revolution")
        .with_depth(NotesDepth::InDepth)
    );
    assert!(prompt.system_instruction.contains("Depth: In-depth."));
    assert_eq!(
      prompt.user_instruction,
      "Create study notes on: French Revolution"
    );
}

#[test]
fn test_quiz_prompt_requires_answer_key()
{   let request = GenerationRequest::quiz("Photosynthesis")
      .with_difficulty(QuizDifficulty::Medium)
      .with_quiz_format(QuizFormat::ShortAnswer)
      .with_num_questions(7);
    let prompt = compose(&request);

    assert!(prompt.system_instruction.contains(ANSWER_KEY_DIRECTIVE));
    assert!(prompt.system_instruction.contains("\"Answer Key\""));
    assert!(prompt.system_instruction.contains("Difficulty: Medium."));
    assert!(prompt.system_instruction.contains("Question type: Short answer."));
    assert!(prompt.user_instruction
      .starts_with("Create a 7-question quiz on the topic: Photosynthesis."));
}

#[test]
fn test_unknown_option_strings_degrade_to_defaults()
{   assert_eq!(Level::from("kindergarten"), Level::General);
    assert_eq!(Level::from("Undergraduate"), Level::College);
    assert_eq!(ExplanationStyle::from("poetic"), ExplanationStyle::StepByStep);
    assert_eq!(ExplanationStyle::from("Detailed"), ExplanationStyle::Detailed);
    assert_eq!(StudyMode::from("Exam prep"), StudyMode::ExamPrep);
    assert_eq!(StudyMode::from("???"), StudyMode::Balanced);
    assert_eq!(
      SummaryLength::from("Very short (bullet points)"),
      SummaryLength::VeryShort
    );
    assert_eq!(SummaryLength::from("huge"), SummaryLength::Short);
    assert_eq!(NotesDepth::from("In-depth"), NotesDepth::InDepth);
    assert_eq!(QuizDifficulty::from("Nightmare"), QuizDifficulty::Medium);
    assert_eq!(QuizFormat::from("Multiple choice"), QuizFormat::MultipleChoice);
    assert_eq!(
      studyagent::BackendPreference::from("CrewAI"),
      studyagent::BackendPreference::Secondary
    );
    assert_eq!(
      studyagent::BackendPreference::from("whatever"),
      studyagent::BackendPreference::Auto
    );
}

#[test]
fn test_irrelevant_options_are_ignored()
{   let request = GenerationRequest::qa("What is a vector?")
      .with_difficulty(QuizDifficulty::Hard)
      .with_summary_length(SummaryLength::Detailed)
      .with_num_questions(12);

    assert_eq!(request.task_type(), TaskType::Qa);
    assert_eq!(
      request.task,
      StudyTask::Qa
      {   subject: None
        , style: ExplanationStyle::StepByStep
      }
    );
    assert_eq!(compose(&request), compose(&GenerationRequest::qa("What is a vector?")));
}

#[test]
fn test_request_values_are_clamped()
{   let request = GenerationRequest::quiz("Cells")
      .with_num_questions(50)
      .with_temperature(3.5)
      .with_max_output_tokens(0);
    assert_eq!(
      request.task,
      StudyTask::Quiz
      {   difficulty: QuizDifficulty::Medium
        , format: QuizFormat::MultipleChoice
        , num_questions: 20
      }
    );
    assert_eq!(request.temperature, 1.0);
    assert_eq!(request.max_output_tokens, 1);

    let low = GenerationRequest::quiz("Cells").with_num_questions(1);
    assert!(compose(&low).user_instruction.starts_with("Create a 3-question"));
}

#[test]
fn test_json_request_accepts_ui_labels()
{   let request: GenerationRequest = serde_json::from_str(r#"{
      "task": { "task": "qa", "subject": null, "style": "Simple" },
      "topic": "What is entropy?",
      "level": "Undergraduate",
      "study_mode": "Exam prep",
      "temperature": 0.5,
      "max_output_tokens": 100,
      "backend_preference": "CrewAI",
      "model": null
    }"#).unwrap();

    assert_eq!(request.level, Level::College);
    assert_eq!(request.study_mode, StudyMode::ExamPrep);
    assert_eq!(
      request.task,
      StudyTask::Qa
      {   subject: None
        , style: ExplanationStyle::Simple
      }
    );
    assert_eq!(
      request.backend_preference,
      studyagent::BackendPreference::Secondary
    );
}

#[test]
fn test_json_request_unknown_labels_degrade_to_defaults()
{   let request: GenerationRequest = serde_json::from_str(r#"{
      "task": {
        "task": "quiz",
        "difficulty": "Nightmare",
        "format": "essay",
        "num_questions": 7
      },
      "topic": "Cells",
      "level": "phd",
      "study_mode": "cramming",
      "temperature": 0.5,
      "max_output_tokens": 100,
      "backend_preference": "whatever",
      "model": null
    }"#).unwrap();

    assert_eq!(request.level, Level::General);
    assert_eq!(request.study_mode, StudyMode::Balanced);
    assert_eq!(
      request.task,
      StudyTask::Quiz
      {   difficulty: QuizDifficulty::Medium
        , format: QuizFormat::MultipleChoice
        , num_questions: 7
      }
    );
    assert_eq!(
      request.backend_preference,
      studyagent::BackendPreference::Auto
    );
}

#[test]
fn test_serialized_request_reads_back_the_same()
{   let request = GenerationRequest::notes("Mitosis")
      .with_depth(NotesDepth::InDepth)
      .with_level(Level::Graduate)
      .with_study_mode(StudyMode::DeepUnderstanding);

    let json = serde_json::to_string(&request).unwrap();
    let back: GenerationRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, request);
}

#[test]
fn test_json_quiz_count_is_clamped_when_composed()
{   let request: GenerationRequest = serde_json::from_str(r#"{
      "task": {
        "task": "quiz",
        "difficulty": "easy",
        "format": "mixed",
        "num_questions": 0
      },
      "topic": "Cells",
      "level": "school",
      "study_mode": "balanced",
      "temperature": 9.0,
      "max_output_tokens": 0,
      "backend_preference": "auto",
      "model": null
    }"#).unwrap();

    let prompt = compose(&request);
    assert!(prompt.user_instruction.starts_with("Create a 3-question"));
    assert_eq!(compose(&request.sanitized()), prompt);
}
