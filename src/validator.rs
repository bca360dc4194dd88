//! Pure lesson-plan inspection. Never mutates, never panics, always
//! terminates.
//!
//! Blocking errors mean the plan must not reach a renderer; warnings are
//! quality signals (logged, reported in metadata) and never affect validity.
//! Every message is prefixed with the step index so the upstream contract
//! violation is actionable.

use std::collections::HashSet;

use crate::domain::{ActivityKind, LessonPlan, LessonStep, BLANK_MARKER};

/// Outcome of a validation pass. `is_valid` iff no blocking errors.
#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
}

impl ValidationReport {
  pub fn is_valid(&self) -> bool {
    self.errors.is_empty()
  }
}

/// Inspect a plan against the rendering contract.
pub fn validate(plan: &LessonPlan) -> ValidationReport {
  let mut report = ValidationReport::default();

  if plan.id.trim().is_empty() {
    report.errors.push("plan: missing id".into());
  }
  if plan.title.trim().is_empty() {
    report.errors.push("plan: missing title".into());
  }
  if plan.steps.is_empty() {
    // Nothing further to inspect on an empty plan.
    report.errors.push("plan: has no steps".into());
    return report;
  }

  let count = plan.steps.len();
  if !(3..=30).contains(&count) {
    report
      .warnings
      .push(format!("plan: unusual step count {count} (expected 3..=30)"));
  }

  let actual: i32 = plan.steps.iter().map(|s| s.activity.reward).sum();
  if actual != plan.total_reward {
    report.warnings.push(format!(
      "plan: declared totalReward {} but steps sum to {}",
      plan.total_reward, actual
    ));
  }

  // Teach-first ordering: a quiz step before any intro is pedagogically off,
  // but still safe to render.
  let first_info = plan.steps.iter().position(|s| s.activity.kind.is_info());
  let first_quiz = plan.steps.iter().position(|s| !s.activity.kind.is_info());
  if let Some(quiz_at) = first_quiz {
    if first_info.map_or(true, |info_at| quiz_at < info_at) {
      report.warnings.push(format!(
        "step {quiz_at}: {} appears before any intro step",
        plan.steps[quiz_at].activity.kind.type_name()
      ));
    }
  }

  for (idx, step) in plan.steps.iter().enumerate() {
    check_step(idx, step, &mut report.errors);
  }

  report
}

/// Per-step blocking checks: reward range plus the required-field table of
/// the step's activity type.
fn check_step(idx: usize, step: &LessonStep, errors: &mut Vec<String>) {
  let reward = step.activity.reward;
  if !(0..=4).contains(&reward) {
    errors.push(format!("step {idx}: reward {reward} outside [0,4]"));
  }

  match &step.activity.kind {
    ActivityKind::Info { title, content, .. } => {
      if title.trim().is_empty() && content.trim().is_empty() {
        errors.push(format!("step {idx}: info needs a title or content"));
      }
    }
    ActivityKind::MultipleChoice { question, options, correct_index } => {
      if question.trim().is_empty() {
        errors.push(format!("step {idx}: multiple_choice: missing question"));
      }
      if options.len() < 2 {
        errors.push(format!(
          "step {idx}: multiple_choice: needs at least 2 options, got {}",
          options.len()
        ));
      }
      match correct_index {
        None => errors.push(format!("step {idx}: multiple_choice: missing correctIndex")),
        Some(ci) if *ci >= options.len() => errors.push(format!(
          "step {idx}: multiple_choice: correctIndex {} out of range for {} options",
          ci,
          options.len()
        )),
        Some(_) => {}
      }
      let mut seen = HashSet::new();
      for option in options {
        if !seen.insert(option.trim().to_lowercase()) {
          errors.push(format!("step {idx}: multiple_choice: duplicate option \"{}\"", option.trim()));
          break;
        }
      }
    }
    ActivityKind::FillBlank { sentence, correct_answer, .. } => {
      if sentence.trim().is_empty() {
        errors.push(format!("step {idx}: fill_blank: missing sentence"));
      } else if !sentence.contains(BLANK_MARKER) {
        errors.push(format!("step {idx}: fill_blank: sentence has no \"{BLANK_MARKER}\" marker"));
      }
      if correct_answer.trim().is_empty() {
        errors.push(format!("step {idx}: fill_blank: missing correctAnswer"));
      }
    }
    ActivityKind::Translate { source_phrase, accepted_answers, .. } => {
      if source_phrase.trim().is_empty() {
        errors.push(format!("step {idx}: translate: missing sourcePhrase"));
      }
      if accepted_answers.is_empty() {
        errors.push(format!("step {idx}: translate: needs at least 1 accepted answer"));
      }
    }
    ActivityKind::TrueFalse { statement, question, is_true } => {
      if statement.trim().is_empty() && question.trim().is_empty() {
        errors.push(format!("step {idx}: true_false: needs a statement or question"));
      }
      if is_true.is_none() {
        errors.push(format!("step {idx}: true_false: missing isTrue"));
      }
    }
    ActivityKind::Matching { pairs } => {
      if pairs.len() < 2 {
        errors.push(format!("step {idx}: matching: needs at least 2 pairs, got {}", pairs.len()));
      }
      for (pair_idx, pair) in pairs.iter().enumerate() {
        if pair.left.trim().is_empty() || pair.right.trim().is_empty() {
          errors.push(format!("step {idx}: matching: pair {pair_idx} has an empty side"));
        }
      }
    }
    ActivityKind::WordArrange { target_sentence, scrambled_words } => {
      if target_sentence.trim().is_empty() {
        errors.push(format!("step {idx}: word_arrange: missing targetSentence"));
      }
      if scrambled_words.len() < 2 {
        errors.push(format!(
          "step {idx}: word_arrange: needs at least 2 scrambled words, got {}",
          scrambled_words.len()
        ));
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assembler::assemble;
  use crate::domain::{Activity, ChunkContent, LessonContent, MatchPair, RawChunk};

  fn sample_content() -> LessonContent {
    let chunk = ChunkContent::from_untrusted(RawChunk {
      target_phrase: "Hallo".into(),
      native_translation: "Hello".into(),
      example_sentence: "Hallo, Anna!".into(),
      usage_note: "Casual greeting.".into(),
      explanation: "The everyday German hello.".into(),
      distractors: vec!["Goodbye".into(), "Thank you".into(), "Sorry".into()],
      correct_usage_context: "Meeting a friend".into(),
      wrong_usage_contexts: vec![
        "Leaving a party".into(),
        "Ordering food".into(),
        "Going to bed".into(),
      ],
    })
    .expect("chunk");
    LessonContent {
      title: "Greetings".into(),
      target_language_code: "de".into(),
      native_language_code: "en".into(),
      chunks: vec![chunk],
    }
  }

  #[test]
  fn assembled_plan_passes() {
    let report = validate(&assemble(&sample_content()));
    assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
  }

  #[test]
  fn missing_correct_index_is_exactly_one_error_at_that_step() {
    let mut plan = assemble(&sample_content());
    if let ActivityKind::MultipleChoice { correct_index, .. } = &mut plan.steps[1].activity.kind {
      *correct_index = None;
    } else {
      panic!("step 1 should be multiple choice");
    }
    let report = validate(&plan);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("step 1:"));
    assert!(report.errors[0].contains("correctIndex"));
  }

  #[test]
  fn out_of_range_correct_index_is_blocking() {
    let mut plan = assemble(&sample_content());
    if let ActivityKind::MultipleChoice { correct_index, .. } = &mut plan.steps[1].activity.kind {
      *correct_index = Some(7);
    }
    let report = validate(&plan);
    assert!(!report.is_valid());
    assert!(report.errors[0].contains("out of range"));
  }

  #[test]
  fn duplicate_options_are_blocking_case_insensitive() {
    let mut plan = assemble(&sample_content());
    if let ActivityKind::MultipleChoice { options, .. } = &mut plan.steps[1].activity.kind {
      options[0] = " hello ".into(); // collides with the correct answer
    }
    let report = validate(&plan);
    assert!(report.errors.iter().any(|e| e.contains("duplicate option")));
  }

  #[test]
  fn empty_plan_reports_and_stops() {
    let plan = LessonPlan { id: "p".into(), title: "t".into(), steps: vec![], total_reward: 0 };
    let report = validate(&plan);
    assert_eq!(report.errors, vec!["plan: has no steps".to_string()]);
    assert!(report.warnings.is_empty());
  }

  #[test]
  fn reward_out_of_range_is_blocking() {
    let mut plan = assemble(&sample_content());
    plan.steps[3].activity.reward = 7;
    let report = validate(&plan);
    assert!(report.errors.iter().any(|e| e.contains("reward 7")));
  }

  #[test]
  fn total_reward_mismatch_is_warning_only() {
    let mut plan = assemble(&sample_content());
    plan.total_reward += 5;
    let report = validate(&plan);
    assert!(report.is_valid());
    assert!(report.warnings.iter().any(|w| w.contains("totalReward")));
  }

  #[test]
  fn quiz_before_intro_is_warning_only() {
    let mut plan = assemble(&sample_content());
    plan.steps.swap(0, 1);
    let report = validate(&plan);
    assert!(report.is_valid());
    assert!(report.warnings.iter().any(|w| w.contains("before any intro")));
  }

  #[test]
  fn short_plan_warns_on_step_count() {
    let mut plan = assemble(&sample_content());
    plan.steps.truncate(2);
    plan.total_reward = plan.steps.iter().map(|s| s.activity.reward).sum();
    let report = validate(&plan);
    assert!(report.warnings.iter().any(|w| w.contains("step count")));
  }

  #[test]
  fn remaining_variants_enforce_required_fields() {
    let mut plan = assemble(&sample_content());
    plan.steps[0].activity = Activity {
      reward: 1,
      kind: ActivityKind::TrueFalse { statement: String::new(), question: String::new(), is_true: None },
    };
    plan.steps[2].activity = Activity {
      reward: 2,
      kind: ActivityKind::Matching {
        pairs: vec![MatchPair { left: "Hallo".into(), right: String::new() }],
      },
    };
    plan.steps[3].activity = Activity {
      reward: 2,
      kind: ActivityKind::WordArrange { target_sentence: "Guten Tag".into(), scrambled_words: vec!["Guten".into()] },
    };
    let report = validate(&plan);
    assert!(report.errors.iter().any(|e| e.contains("statement or question")));
    assert!(report.errors.iter().any(|e| e.contains("missing isTrue")));
    assert!(report.errors.iter().any(|e| e.contains("at least 2 pairs")));
    assert!(report.errors.iter().any(|e| e.contains("empty side")));
    assert!(report.errors.iter().any(|e| e.contains("at least 2 scrambled words")));
  }

  #[test]
  fn fill_blank_requires_marker_and_answer() {
    let mut plan = assemble(&sample_content());
    if let ActivityKind::FillBlank { sentence, correct_answer, .. } = &mut plan.steps[2].activity.kind {
      *sentence = "no marker here".into();
      *correct_answer = String::new();
    }
    let report = validate(&plan);
    assert!(report.errors.iter().any(|e| e.contains("marker")));
    assert!(report.errors.iter().any(|e| e.contains("correctAnswer")));
  }
}
