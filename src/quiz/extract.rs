use serde_json::Value;
use thiserror::Error;

use super::{Quiz, QuizQuestion};

pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizFormatError {
    #[error("no JSON object found in model response")]
    NoJsonObject,
    #[error("malformed JSON in model response: {0}")]
    MalformedJson(String),
    #[error("model response has no \"quiz\" array")]
    MissingQuizField,
    #[error("question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: String },
}

/// Pulls the quiz out of free-form model output.
///
/// The text between the first `{` and the last `}` is tried first. When that slice does not
/// parse (prose around the payload containing braces, usually) every balanced top-level object
/// is tried in order. Every question is then checked and the first bad one is reported.
pub fn extract_quiz(raw: &str) -> Result<Quiz, QuizFormatError> {
    let value = locate_json(raw.trim())?;
    validate(value)
}

fn locate_json(text: &str) -> Result<Value, QuizFormatError> {
    let (start, end) = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => return Err(QuizFormatError::NoJsonObject),
    };

    let err = match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    tracing::debug!("Outer brace slice is not valid JSON ({err}), scanning balanced objects");

    let candidates: Vec<Value> = balanced_objects(text)
        .into_iter()
        .filter_map(|candidate| serde_json::from_str(candidate).ok())
        .collect();
    let position = candidates
        .iter()
        .position(|value| value.get("quiz").is_some())
        .unwrap_or(0);
    candidates
        .into_iter()
        .nth(position)
        .ok_or_else(|| QuizFormatError::MalformedJson(err.to_string()))
}

// top-level `{...}` spans; braces inside JSON strings don't count
fn balanced_objects(text: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if depth == 0 {
            if c == '{' {
                depth = 1;
                start = i;
            }
            continue;
        }
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    objects.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    objects
}

fn validate(value: Value) -> Result<Quiz, QuizFormatError> {
    let Value::Object(mut root) = value else {
        return Err(QuizFormatError::MissingQuizField);
    };
    let Some(Value::Array(items)) = root.remove("quiz") else {
        return Err(QuizFormatError::MissingQuizField);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            validate_question(item).map_err(|reason| QuizFormatError::InvalidQuestion { index, reason })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Quiz::new)
}

fn validate_question(item: Value) -> Result<QuizQuestion, String> {
    let question: QuizQuestion = serde_json::from_value(item).map_err(|e| e.to_string())?;
    if question.question.trim().is_empty() {
        return Err("field `question` is empty".to_owned());
    }
    if question.options.len() != OPTION_COUNT {
        return Err(format!(
            "expected {OPTION_COUNT} options, found {}",
            question.options.len()
        ));
    }
    Ok(question)
}
