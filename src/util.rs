//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Strip a surrounding markdown code fence from model output, if present.
/// Handles an optional language tag on the opening fence (```json).
/// Text without fences is returned trimmed and otherwise untouched.
pub fn strip_code_fences(s: &str) -> String {
  let trimmed = s.trim();
  if !trimmed.starts_with("```") {
    return trimmed.to_string();
  }
  let mut lines = trimmed.lines();
  lines.next(); // opening fence, with or without language tag
  let mut body: Vec<&str> = lines.collect();
  if let Some(last) = body.last() {
    if last.trim().starts_with("```") {
      body.pop();
    }
  }
  body.join("\n").trim().to_string()
}

/// Remove punctuation (ASCII + common fullwidth marks) from a phrase.
/// Used when building tolerant accepted-answer variants.
pub fn strip_punctuation(s: &str) -> String {
  s.chars()
    .filter(|c| {
      !c.is_ascii_punctuation() && !matches!(c, '。' | '，' | '！' | '？' | '¿' | '¡' | '…' | '«' | '»')
    })
    .collect::<String>()
    .trim()
    .to_string()
}

/// Accepted-answer variants for a phrase: exact, lowercase, punctuation-stripped.
/// Deduplicated, original order preserved, empty variants dropped.
pub fn answer_variants(s: &str) -> Vec<String> {
  let exact = s.trim().to_string();
  let candidates = [exact.clone(), exact.to_lowercase(), strip_punctuation(&exact)];
  let mut out: Vec<String> = Vec::new();
  for c in candidates {
    if !c.is_empty() && !out.contains(&c) {
      out.push(c);
    }
  }
  out
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max { s.to_string() } else { format!("{}… ({} bytes total)", &s[..max], s.len()) }
}
