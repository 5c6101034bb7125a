pub mod extract;
pub mod prompt;
pub mod score;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use extract::{extract_quiz, QuizFormatError};
pub use prompt::{build_prompt, QUESTION_COUNT};
pub use score::{score, UserAnswerSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuizQuestion {
    pub fn is_correct(&self, given: &str) -> bool {
        normalize(given) == normalize(&self.answer)
    }
}

fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub quiz: Vec<QuizQuestion>,
}

impl Quiz {
    pub fn new(quiz: Vec<QuizQuestion>) -> Self {
        Self { quiz }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.quiz
    }

    pub fn len(&self) -> usize {
        self.quiz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quiz.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const VARIANTS: [&'static str; 3] = ["easy", "medium", "hard"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!(
                "Unknown difficulty '{value}', expected one of: {}",
                Difficulty::VARIANTS.join(", ")
            )),
        }
    }
}

/// A validated quiz submission. The topic is trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    topic: String,
    difficulty: Difficulty,
}

impl QuizRequest {
    pub fn new(topic: &str, difficulty: Difficulty) -> Result<Self, String> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err("Topic must not be empty".to_owned());
        }
        Ok(Self {
            topic: topic.to_owned(),
            difficulty,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}
