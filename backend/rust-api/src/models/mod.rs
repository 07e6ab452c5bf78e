use serde::{Deserialize, Serialize};

pub mod content;
pub mod generation;
pub mod question;
pub mod user;

pub use content::{
    CourseData, CourseListing, ExamSession, ExamYear, LessonData, LessonSection, Level,
    ListeningExerciseData, Topic, TopicContent, TopicFilter, TopicKind, TopicSummary,
};
pub use generation::{Difficulty, GenerateRequest};
pub use question::{CorrectAnswer, ExerciseDefinition, Question, QuestionKind};
pub use user::{Credentials, StoredUser, User};

/// Error payload of every failed API call: `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
