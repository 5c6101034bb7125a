use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::QuizQuestion;

/// Answers picked so far, keyed by 0-based question index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnswerSet(BTreeMap<usize, String>);

impl UserAnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the option chosen for a question, replacing an earlier choice.
    pub fn select(&mut self, index: usize, option: impl Into<String>) {
        self.0.insert(index, option.into());
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(usize, String)> for UserAnswerSet {
    fn from_iter<I: IntoIterator<Item = (usize, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Counts questions whose selected option matches the stored answer, ignoring case and
/// surrounding whitespace. Unanswered questions are wrong.
pub fn score(quiz: &[QuizQuestion], answers: &UserAnswerSet) -> usize {
    quiz.iter()
        .enumerate()
        .filter(|(index, question)| {
            answers
                .get(*index)
                .is_some_and(|given| question.is_correct(given))
        })
        .count()
}
