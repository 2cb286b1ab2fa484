//! Quiz item model and the wire-record transform.
//!
//! The question server sends records with labeled choices (`A`/`B`/`C`, up
//! to `E`) and a correct answer given either as a label or as the exact
//! choice text. Ingest turns each record into a validated [`QuizItem`] with
//! positional choices, or rejects it with an [`ItemError`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ItemError;

/// One question-and-choices unit offered to the user. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    /// Unique id; server-provided, or a content fingerprint when absent.
    pub id: String,
    pub title: String,
    pub prompt: String,
    /// Positional choices in label order (A first).
    pub choices: Vec<String>,
    pub correct_choice: usize,
    /// Optional effect applied when this item is answered wrong.
    #[serde(default)]
    pub punishment_tag: Option<String>,
}

impl QuizItem {
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_choice
    }
}

/// A question record as it arrives from the quiz source.
///
/// `choices` is a label-to-text map; `BTreeMap` keeps labels in `A` < `B`
/// < `C` order so the positional mapping is stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub question: String,
    pub choices: BTreeMap<String, String>,
    pub correct_answer: String,
    #[serde(default)]
    pub punishment: Option<String>,
}

impl RawQuestion {
    /// Validate and convert into a [`QuizItem`].
    ///
    /// The correct answer is resolved as a label first (case-insensitive),
    /// then as exact choice text. Records without an id get a stable
    /// fingerprint so re-polled batches de-duplicate.
    pub fn into_item(self) -> Result<QuizItem, ItemError> {
        let prompt = self.question.trim().to_string();
        if prompt.is_empty() {
            return Err(ItemError::EmptyPrompt);
        }

        let labels: Vec<String> = self.choices.keys().cloned().collect();
        let choices: Vec<String> = self.choices.into_values().collect();
        if choices.len() < 2 {
            return Err(ItemError::TooFewChoices { got: choices.len() });
        }

        let answer = self.correct_answer.trim();
        let correct_choice = labels
            .iter()
            .position(|label| label.eq_ignore_ascii_case(answer))
            .or_else(|| choices.iter().position(|choice| choice == answer))
            .ok_or_else(|| ItemError::UnresolvedAnswer {
                answer: answer.to_string(),
            })?;

        let id = match self.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => fingerprint(&prompt, &choices),
        };

        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| truncate_title(&prompt));

        Ok(QuizItem {
            id,
            title,
            prompt,
            choices,
            correct_choice,
            punishment_tag: self.punishment,
        })
    }
}

/// Stable content id for records that arrive without one.
fn fingerprint(prompt: &str, choices: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    for choice in choices {
        hasher.update(b"\n");
        hasher.update(choice.as_bytes());
    }
    hex::encode(&hasher.finalize()[..8])
}

fn truncate_title(prompt: &str) -> String {
    const MAX: usize = 48;
    if prompt.chars().count() <= MAX {
        prompt.to_string()
    } else {
        let head: String = prompt.chars().take(MAX).collect();
        format!("{}...", head.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(question: &str, choices: &[(&str, &str)], correct: &str) -> RawQuestion {
        RawQuestion {
            id: None,
            title: None,
            question: question.to_string(),
            choices: choices
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            correct_answer: correct.to_string(),
            punishment: None,
        }
    }

    #[test]
    fn label_maps_to_index() {
        let item = raw("Q", &[("A", "x"), ("B", "y"), ("C", "z")], "B")
            .into_item()
            .unwrap();
        assert_eq!(item.prompt, "Q");
        assert_eq!(item.choices, vec!["x", "y", "z"]);
        assert_eq!(item.correct_choice, 1);
    }

    #[test]
    fn correct_answer_resolves_by_text() {
        let item = raw("Q", &[("A", "x"), ("B", "y"), ("C", "z")], "z")
            .into_item()
            .unwrap();
        assert_eq!(item.correct_choice, 2);
    }

    #[test]
    fn label_resolution_is_case_insensitive() {
        let item = raw("Q", &[("A", "x"), ("B", "y")], "b").into_item().unwrap();
        assert_eq!(item.correct_choice, 1);
    }

    #[test]
    fn empty_prompt_is_rejected() {
        let err = raw("   ", &[("A", "x"), ("B", "y")], "A")
            .into_item()
            .unwrap_err();
        assert_eq!(err, ItemError::EmptyPrompt);
    }

    #[test]
    fn single_choice_is_rejected() {
        let err = raw("Q", &[("A", "x")], "A").into_item().unwrap_err();
        assert_eq!(err, ItemError::TooFewChoices { got: 1 });
    }

    #[test]
    fn unresolvable_answer_is_rejected() {
        let err = raw("Q", &[("A", "x"), ("B", "y")], "D")
            .into_item()
            .unwrap_err();
        assert_eq!(
            err,
            ItemError::UnresolvedAnswer {
                answer: "D".to_string()
            }
        );
    }

    #[test]
    fn missing_id_gets_stable_fingerprint() {
        let a = raw("Q", &[("A", "x"), ("B", "y")], "A").into_item().unwrap();
        let b = raw("Q", &[("A", "x"), ("B", "y")], "A").into_item().unwrap();
        let c = raw("Other", &[("A", "x"), ("B", "y")], "A")
            .into_item()
            .unwrap();
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn provided_id_wins_over_fingerprint() {
        let mut record = raw("Q", &[("A", "x"), ("B", "y")], "A");
        record.id = Some("q-42".to_string());
        assert_eq!(record.into_item().unwrap().id, "q-42");
    }

    #[test]
    fn long_prompt_is_truncated_into_title() {
        let prompt = "w".repeat(100);
        let item = raw(&prompt, &[("A", "x"), ("B", "y")], "A")
            .into_item()
            .unwrap();
        assert!(item.title.len() < prompt.len());
        assert!(item.title.ends_with("..."));
    }
}
