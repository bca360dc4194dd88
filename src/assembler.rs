//! Pure chunk → lesson-plan transform.
//!
//! For each chunk, in input order, exactly five steps are emitted in a
//! teach-first progression:
//!
//!   INTRODUCE (info, 0) → RECOGNIZE (multiple choice, 1) →
//!   PRACTICE (fill blank, 2) → RECALL (translate, 3) →
//!   APPLY (multiple choice, 2)
//!
//! Everything here is deterministic: same content, same plan, including the
//! plan id (name-based UUID over the content) and the answer placement rule.
//! Duplicate option text that survives placement is left for the validator;
//! resolving it would need semantic judgment this transform doesn't have.

use uuid::Uuid;

use crate::domain::{
  Activity, ActivityKind, ChunkContent, LessonContent, LessonPlan, LessonStep, BLANK_MARKER,
};
use crate::util::answer_variants;

pub const STEPS_PER_CHUNK: usize = 5;
/// 0 + 1 + 2 + 3 + 2 per chunk.
pub const REWARD_PER_CHUNK: i32 = 8;

const REWARD_INTRODUCE: i32 = 0;
const REWARD_RECOGNIZE: i32 = 1;
const REWARD_PRACTICE: i32 = 2;
const REWARD_RECALL: i32 = 3;
const REWARD_APPLY: i32 = 2;

/// Deterministic placement for a correct answer among three wrong options.
/// Stable across calls; derived from the answer text, so the correct option
/// is not anchored to a fixed index.
pub fn placement_index(correct: &str) -> usize {
  correct.chars().count() % 4
}

/// Insert the correct answer into the wrong options at the placement index.
/// The chunk contract guarantees exactly three wrong options, so the insert
/// position [0,3] is always in bounds.
fn place_options(correct: &str, wrong: &[String]) -> (Vec<String>, usize) {
  let position = placement_index(correct);
  let mut options: Vec<String> = wrong.to_vec();
  options.insert(position, correct.to_string());
  (options, position)
}

/// Assemble a full lesson plan from validated chunk content.
pub fn assemble(content: &LessonContent) -> LessonPlan {
  let mut steps = Vec::with_capacity(content.chunks.len() * STEPS_PER_CHUNK);
  for chunk in &content.chunks {
    steps.push(introduce_step(chunk));
    steps.push(recognize_step(chunk));
    steps.push(practice_step(chunk));
    steps.push(recall_step(chunk));
    steps.push(apply_step(chunk));
  }
  LessonPlan {
    id: plan_id(content),
    title: content.title.clone(),
    total_reward: content.chunks.len() as i32 * REWARD_PER_CHUNK,
    steps,
  }
}

/// Name-based UUID over the lesson framing and taught phrases. Content-derived
/// so repeated assembly of the same content yields the same id.
fn plan_id(content: &LessonContent) -> String {
  let mut seed = format!(
    "{}|{}|{}",
    content.title, content.target_language_code, content.native_language_code
  );
  for chunk in &content.chunks {
    seed.push('|');
    seed.push_str(&chunk.target_phrase);
  }
  Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()).to_string()
}

fn introduce_step(chunk: &ChunkContent) -> LessonStep {
  LessonStep {
    tutor_text: format!("New phrase time! Let's learn \"{}\".", chunk.target_phrase),
    help_text: chunk.usage_note.clone(),
    activity: Activity {
      reward: REWARD_INTRODUCE,
      kind: ActivityKind::Info {
        title: chunk.target_phrase.clone(),
        content: format!("{} = {}", chunk.target_phrase, chunk.native_translation),
        explanation: chunk.explanation.clone(),
        example: chunk.example_sentence.clone(),
      },
    },
  }
}

fn recognize_step(chunk: &ChunkContent) -> LessonStep {
  let (options, correct_index) = place_options(&chunk.native_translation, &chunk.distractors);
  LessonStep {
    tutor_text: format!("Do you remember what \"{}\" means?", chunk.target_phrase),
    help_text: format!("We just saw it: {}", chunk.example_sentence),
    activity: Activity {
      reward: REWARD_RECOGNIZE,
      kind: ActivityKind::MultipleChoice {
        question: format!("What does \"{}\" mean?", chunk.target_phrase),
        options,
        correct_index: Some(correct_index),
      },
    },
  }
}

fn practice_step(chunk: &ChunkContent) -> LessonStep {
  let words: Vec<&str> = chunk.target_phrase.split_whitespace().collect();
  let (sentence, correct_answer) = if words.len() >= 2 {
    let final_word = words[words.len() - 1];
    let lead = words[..words.len() - 1].join(" ");
    (format!("{} {}", lead, BLANK_MARKER), final_word.to_string())
  } else {
    // Single word: blank the whole phrase against its translation.
    (
      format!("{} = {}", BLANK_MARKER, chunk.native_translation),
      chunk.target_phrase.clone(),
    )
  };
  let accepted_answers = answer_variants(&correct_answer);
  LessonStep {
    tutor_text: "Fill in the missing part!".into(),
    help_text: format!("The full phrase is about: {}", chunk.native_translation),
    activity: Activity {
      reward: REWARD_PRACTICE,
      kind: ActivityKind::FillBlank { sentence, correct_answer, accepted_answers },
    },
  }
}

fn recall_step(chunk: &ChunkContent) -> LessonStep {
  LessonStep {
    tutor_text: "Now say it in the language you're learning!".into(),
    help_text: format!("It's the phrase for \"{}\".", chunk.native_translation),
    activity: Activity {
      reward: REWARD_RECALL,
      kind: ActivityKind::Translate {
        source_phrase: chunk.native_translation.clone(),
        accepted_answers: answer_variants(&chunk.target_phrase),
        hint: phrase_prefix_hint(&chunk.target_phrase),
      },
    },
  }
}

fn apply_step(chunk: &ChunkContent) -> LessonStep {
  let (options, correct_index) =
    place_options(&chunk.correct_usage_context, &chunk.wrong_usage_contexts);
  LessonStep {
    tutor_text: format!("One more: when does \"{}\" fit?", chunk.target_phrase),
    help_text: chunk.usage_note.clone(),
    activity: Activity {
      reward: REWARD_APPLY,
      kind: ActivityKind::MultipleChoice {
        question: format!("When would you say \"{}\"?", chunk.target_phrase),
        options,
        correct_index: Some(correct_index),
      },
    },
  }
}

/// Short prefix hint that never gives the whole answer away: the first word
/// for multi-word phrases, the first character otherwise.
fn phrase_prefix_hint(phrase: &str) -> String {
  let words: Vec<&str> = phrase.split_whitespace().collect();
  let prefix: String = if words.len() >= 2 {
    words[0].to_string()
  } else {
    phrase.chars().take(1).collect()
  };
  format!("Starts with \"{}…\"", prefix)
}
