use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub key: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub stem: String,
    pub options: Vec<QuizOption>,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn option(&self, key: &str) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.key == key)
    }

    pub fn is_correct(&self, key: &str) -> bool {
        self.answer == key
    }
}

/// Wire shape of one element in a source file. Every field is optional here so
/// that a missing mandatory field is reported as a validation failure rather
/// than a generic parse error.
#[derive(Debug, Deserialize)]
pub(crate) struct RawQuestion {
    id: Option<String>,
    stem: Option<String>,
    options: Option<Vec<QuizOption>>,
    answer: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    explanation: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(format!("missing or empty `{field}`")),
    }
}

impl RawQuestion {
    /// Check mandatory fields and option keys, producing a `Question` or a
    /// human-readable reason.
    pub(crate) fn validate(self) -> Result<Question, String> {
        let id = required(self.id, "id")?;
        let stem = required(self.stem, "stem")?;
        let options = match self.options {
            Some(o) if !o.is_empty() => o,
            _ => return Err("missing or empty `options`".to_string()),
        };
        let answer = required(self.answer, "answer")?;

        let mut seen = HashSet::new();
        for opt in &options {
            if opt.key.is_empty() {
                return Err("option with empty `key`".to_string());
            }
            if !seen.insert(opt.key.as_str()) {
                return Err(format!("duplicate option key `{}`", opt.key));
            }
        }

        Ok(Question {
            id,
            stem,
            options,
            answer,
            tags: self.tags.unwrap_or_default(),
            explanation: self.explanation.filter(|e| !e.is_empty()),
        })
    }
}

/// The merged, deduplicated question set (ALL), in manifest-then-file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(|q| q.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawQuestion {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_validate_accepts_minimal_question() {
        let q = raw(json!({
            "id": "A",
            "stem": "?",
            "options": [{"key": "a", "text": "x"}, {"key": "b", "text": "y"}],
            "answer": "a"
        }))
        .validate()
        .unwrap();
        assert_eq!(q.id, "A");
        assert!(q.tags.is_empty());
        assert!(q.explanation.is_none());
        assert!(q.is_correct("a"));
        assert!(!q.is_correct("b"));
        assert_eq!(q.option("b").map(|o| o.text.as_str()), Some("y"));
    }

    #[test]
    fn test_validate_rejects_missing_answer() {
        let err = raw(json!({
            "id": "A",
            "stem": "?",
            "options": [{"key": "a", "text": "x"}]
        }))
        .validate()
        .unwrap_err();
        assert!(err.contains("answer"));
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let err = raw(json!({
            "id": "",
            "stem": "?",
            "options": [{"key": "a", "text": "x"}],
            "answer": "a"
        }))
        .validate()
        .unwrap_err();
        assert!(err.contains("`id`"));

        let err = raw(json!({"id": "A", "stem": "?", "options": [], "answer": "a"}))
            .validate()
            .unwrap_err();
        assert!(err.contains("`options`"));
    }

    #[test]
    fn test_validate_rejects_duplicate_option_keys() {
        let err = raw(json!({
            "id": "A",
            "stem": "?",
            "options": [{"key": "a", "text": "x"}, {"key": "a", "text": "y"}],
            "answer": "a"
        }))
        .validate()
        .unwrap_err();
        assert!(err.contains("duplicate option key `a`"));
    }

    #[test]
    fn test_validate_rejects_empty_option_key() {
        let err = raw(json!({
            "id": "A",
            "stem": "?",
            "options": [{"key": "a", "text": "x"}, {"key": "", "text": "y"}],
            "answer": "a"
        }))
        .validate()
        .unwrap_err();
        assert!(err.contains("empty `key`"));
    }

    #[test]
    fn test_validate_keeps_tags_and_explanation() {
        let q = raw(json!({
            "id": "T",
            "stem": "Which?",
            "options": [{"key": "a", "text": "x"}],
            "answer": "a",
            "tags": ["net", "tcp"],
            "explanation": "Because."
        }))
        .validate()
        .unwrap();
        assert_eq!(q.tags, vec!["net", "tcp"]);
        assert_eq!(q.explanation.as_deref(), Some("Because."));
    }
}
