use serde::{Deserialize, Serialize};

/// How a question is answered: by picking an option or by typing a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "mcq")]
    MultipleChoice,
    #[serde(rename = "fill-in-the-blank")]
    FillInBlank,
}

/// Accepted answer(s) of a question. On the wire this is either a plain
/// string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Single(String),
    AnyOf(Vec<String>),
}

impl CorrectAnswer {
    pub fn accepted(&self) -> Vec<&str> {
        match self {
            CorrectAnswer::Single(answer) => vec![answer.as_str()],
            CorrectAnswer::AnyOf(answers) => answers.iter().map(String::as_str).collect(),
        }
    }

    /// Human readable form shown next to a wrong answer.
    pub fn display(&self) -> String {
        self.accepted().join(" / ")
    }
}

impl From<&str> for CorrectAnswer {
    fn from(value: &str) -> Self {
        CorrectAnswer::Single(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(rename = "answer")]
    pub correct_answer: CorrectAnswer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub title: String,
    pub questions: Vec<Question>,
}

impl ExerciseDefinition {
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}
