use studyagent::config::NormalizerConfig;
use studyagent::normalizer::{
  has_answer_key, truncate_at_sentence, ANSWER_KEY_PLACEHOLDER,
};
use studyagent::{
  Backend, GenerationRequest, NormalizationWarning, ResponseNormalizer,
  SummaryLength,
};

fn small_budgets() -> NormalizerConfig
{   NormalizerConfig
    {   very_short_chars: 40
      , short_chars: 60
      , medium_chars: 200
      , detailed_chars: 400
    }
}

#[test]
fn test_quiz_without_answer_key_gets_placeholder()
{   let normalizer = ResponseNormalizer::default();
    let request = GenerationRequest::quiz("Photosynthesis");
    let raw = "1. Where does photosynthesis happen?\n2. What gas is released?\n";

    let result = normalizer.normalize(raw, &request, Backend::Primary);

    assert!(result.text.starts_with("1. Where does photosynthesis happen?"));
    assert!(result.text.contains("## Answer Key"));
    assert!(result.text.contains(ANSWER_KEY_PLACEHOLDER));
    assert!(has_answer_key(&result.text));
    assert_eq!(result.warnings, vec![NormalizationWarning::MissingAnswerKey]);
    assert!(!result.truncated);
}

#[test]
fn test_quiz_with_answer_key_is_untouched()
{   let normalizer = ResponseNormalizer::default();
    let request = GenerationRequest::quiz("Photosynthesis");
    let raw = "\n1. Question?\n\n**Answer Key:**\n1. B\n\n";

    let result = normalizer.normalize(raw, &request, Backend::Secondary);

    assert_eq!(result.text, "1. Question?\n\n**Answer Key:**\n1. B");
    assert_eq!(result.backend_used, Backend::Secondary);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_answer_key_detection_variants()
{   assert!(has_answer_key("### Answer key\n1. A"));
    assert!(has_answer_key("Answers:\n1. A"));
    assert!(has_answer_key("## Solutions\n1. A"));
    assert!(!has_answer_key("1. Which answer is right?\n2. Key ideas?"));
}

#[test]
fn test_answer_key_title_must_stand_alone()
{   assert!(has_answer_key("**Answer Key:**\n1. B"));
    assert!(has_answer_key("## Answer Key\n1. B"));
    assert!(has_answer_key("1. Q?\nAnswer Key\n1. B"));
    assert!(!has_answer_key("Answer key concepts in your own words."));
    assert!(!has_answer_key("1. Q?\n\nAnswer key will follow."));
}

#[test]
fn test_quiz_mentioning_answer_key_in_prose_gets_placeholder()
{   let normalizer = ResponseNormalizer::default();
    let request = GenerationRequest::quiz("Cells");
    let raw = "Answer key concepts in your own words.\n\
               1. What is a cell?\n\
               Answer key will follow.";

    let result = normalizer.normalize(raw, &request, Backend::Primary);

    assert!(result.text.contains(ANSWER_KEY_PLACEHOLDER));
    assert_eq!(result.warnings, vec![NormalizationWarning::MissingAnswerKey]);
}

#[test]
fn test_long_summary_is_cut_at_sentence_boundary()
{   let normalizer = ResponseNormalizer::new(small_budgets());
    let request = GenerationRequest::summary("cells")
      .with_summary_length(SummaryLength::VeryShort);
    let raw = "Cells are small. They make energy. Mitochondria are key parts.";

    let result = normalizer.normalize(raw, &request, Backend::Primary);

    assert!(result.truncated);
    assert_eq!(result.text, "Cells are small. They make energy.");
    assert_eq!(
      result.warnings,
      vec![NormalizationWarning::SummaryTruncated
      {   budget_chars: 40
        , original_chars: raw.chars().count()
      }]
    );
}

#[test]
fn test_short_summary_is_kept()
{   let normalizer = ResponseNormalizer::new(small_budgets());
    let request = GenerationRequest::summary("cells")
      .with_summary_length(SummaryLength::Short);

    let result = normalizer.normalize(
      "  Cells are small.  ", &request, Backend::Primary
    );

    assert!(!result.truncated);
    assert_eq!(result.text, "Cells are small.");
    assert!(result.warnings.is_empty());
}

#[test]
fn test_other_tasks_are_only_trimmed()
{   let normalizer = ResponseNormalizer::new(small_budgets());
    let long = "word ".repeat(500);
    for request in [
      GenerationRequest::qa("q")
    , GenerationRequest::notes("topic")
    ]
    {   let result = normalizer.normalize(&long, &request, Backend::Primary);
        assert_eq!(result.text, long.trim());
        assert!(!result.truncated);
        assert!(result.warnings.is_empty());
    }
}

#[test]
fn test_truncate_prefers_line_breaks_for_bullets()
{   let text = "- first point\n- second point\n- third point that is long";
    assert_eq!(
      truncate_at_sentence(text, 35).as_deref(),
      Some("- first point\n- second point")
    );
}

#[test]
fn test_truncate_without_boundary_cuts_at_word()
{   assert_eq!(
      truncate_at_sentence("alpha beta gamma delta", 13).as_deref(),
      Some("alpha beta")
    );
    assert_eq!(truncate_at_sentence("short", 10), None);
}

#[test]
fn test_truncate_counts_characters_not_bytes()
{   let text = "Ça va. Très bien. Étonnant!";
    assert_eq!(truncate_at_sentence(text, 17).as_deref(), Some("Ça va. Très bien."));
}
