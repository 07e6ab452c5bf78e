use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::question::{ExerciseDefinition, Question};

/// Academic tier of the student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "3A")]
    ThirdYear,
    #[serde(rename = "BAC")]
    Baccalaureate,
}

impl Level {
    pub fn code(self) -> &'static str {
        match self {
            Level::ThirdYear => "3A",
            Level::Baccalaureate => "BAC",
        }
    }

    /// Label used in navigation and in the AI prompt.
    pub fn label(self) -> &'static str {
        match self {
            Level::ThirdYear => "3ème Année",
            Level::Baccalaureate => "Baccalauréat",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "3A" => Ok(Level::ThirdYear),
            "BAC" => Ok(Level::Baccalaureate),
            other => Err(format!("Unknown level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKind {
    Lesson,
    Exercise,
    ListeningExercise,
}

/// Narrowing applied to the topic list of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicFilter {
    #[default]
    All,
    #[serde(rename = "lessons")]
    LessonsOnly,
    #[serde(rename = "exercises")]
    ExercisesOnly,
}

impl TopicFilter {
    pub fn matches(self, kind: TopicKind) -> bool {
        match self {
            TopicFilter::All => true,
            TopicFilter::LessonsOnly => kind == TopicKind::Lesson,
            TopicFilter::ExercisesOnly => {
                matches!(kind, TopicKind::Exercise | TopicKind::ListeningExercise)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonSection {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonData {
    pub title: String,
    pub introduction: String,
    pub sections: Vec<LessonSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_transcription: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningExerciseData {
    pub title: String,
    pub audio_src: String,
    pub transcription: String,
    pub questions: Vec<Question>,
}

impl ListeningExerciseData {
    /// The gradable part of a listening exercise.
    pub fn exercise(&self) -> ExerciseDefinition {
        ExerciseDefinition {
            title: self.title.clone(),
            questions: self.questions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TopicContent {
    Lesson(LessonData),
    Exercise(ExerciseDefinition),
    ListeningExercise(ListeningExerciseData),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub content: TopicContent,
}

impl Topic {
    pub fn kind(&self) -> TopicKind {
        match self.content {
            TopicContent::Lesson(_) => TopicKind::Lesson,
            TopicContent::Exercise(_) => TopicKind::Exercise,
            TopicContent::ListeningExercise(_) => TopicKind::ListeningExercise,
        }
    }

    pub fn summary(&self) -> TopicSummary {
        TopicSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            kind: self.kind(),
        }
    }
}

/// Navigation entry: what the topic list shows before a topic is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TopicKind,
}

/// Topic list of one level, as returned by `GET /api/courses/{level}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseListing {
    pub level: Level,
    pub label: String,
    pub topics: Vec<TopicSummary>,
    pub has_exam_archive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseData {
    #[serde(rename = "3A")]
    pub third_year: Vec<Topic>,
    #[serde(rename = "BAC")]
    pub baccalaureate: Vec<Topic>,
}

impl CourseData {
    pub fn topics(&self, level: Level) -> &[Topic] {
        match level {
            Level::ThirdYear => &self.third_year,
            Level::Baccalaureate => &self.baccalaureate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSession {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamYear {
    pub year: u16,
    pub sessions: Vec<ExamSession>,
}
