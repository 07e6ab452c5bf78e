use anyhow::{Context, Result};

use crate::models::{CourseData, ExamYear, Level, Topic, TopicFilter};

const COURSE_DATA: &str = include_str!("../../data/course_data.json");
const EXAM_DATA: &str = include_str!("../../data/exam_data.json");

/// Static lessons, exercises and the Bac exam archive.
#[derive(Debug, Clone)]
pub struct Catalog {
    course: CourseData,
    exams: Vec<ExamYear>,
}

impl Catalog {
    pub fn new(course: CourseData, exams: Vec<ExamYear>) -> Self {
        Self { course, exams }
    }

    /// Parses the content compiled into the binary.
    pub fn load_embedded() -> Result<Self> {
        let course: CourseData =
            serde_json::from_str(COURSE_DATA).context("Failed to parse embedded course data")?;
        let exams: Vec<ExamYear> =
            serde_json::from_str(EXAM_DATA).context("Failed to parse embedded exam data")?;

        tracing::info!(
            "Catalog loaded: {} topics for 3A, {} topics for BAC, {} exam years",
            course.third_year.len(),
            course.baccalaureate.len(),
            exams.len()
        );

        Ok(Self::new(course, exams))
    }

    pub fn topics(&self, level: Level) -> &[Topic] {
        self.course.topics(level)
    }

    pub fn find_topic(&self, level: Level, topic_id: &str) -> Option<&Topic> {
        self.topics(level).iter().find(|topic| topic.id == topic_id)
    }

    /// Topics of `level` passing `filter` whose title contains `query`,
    /// ignoring case. An empty query keeps everything.
    pub fn filtered_topics(&self, level: Level, filter: TopicFilter, query: &str) -> Vec<&Topic> {
        let needle = query.to_lowercase();
        self.topics(level)
            .iter()
            .filter(|topic| filter.matches(topic.kind()))
            .filter(|topic| topic.title.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn topic_titles(&self, level: Level) -> Vec<&str> {
        self.topics(level)
            .iter()
            .map(|topic| topic.title.as_str())
            .collect()
    }

    pub fn exams(&self) -> &[ExamYear] {
        &self.exams
    }

    /// The Bac archive is only offered to Baccalauréat students.
    pub fn has_exam_archive(&self, level: Level) -> bool {
        level == Level::Baccalaureate && !self.exams.is_empty()
    }
}
