use super::Difficulty;

/// Number of questions requested per quiz.
pub const QUESTION_COUNT: usize = 5;

const JSON_SHAPE: &str = r#"{
  "quiz": [
    {
      "question": "MCQ question?",
      "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
      "answer": "Correct option",
      "explanation": "Why the answer is correct"
    }
  ]
}"#;

/// Builds the instruction sent to the model.
///
/// The topic is interpolated verbatim, so instructions hidden in it reach the model as-is.
pub fn build_prompt(topic: &str, question_count: usize, difficulty: Difficulty) -> String {
    format!(
        "Generate a {question_count}-question multiple-choice quiz on \"{topic}\" \
         at {difficulty} difficulty. Use this strict JSON format:\n\
         {JSON_SHAPE}\n\
         Rules:\n\
         1. Only MCQs (no coding questions)\n\
         2. Exactly 4 options per question; \"answer\" must repeat one option verbatim\n\
         3. Strict JSON format only (no markdown, explanations, or extra text)"
    )
}
