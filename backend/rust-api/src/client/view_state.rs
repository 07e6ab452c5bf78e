use crate::models::{Level, Topic, TopicFilter};
use crate::services::catalog::Catalog;

/// `active_topic_id` while the Bac exam archive is shown.
pub const EXAM_ARCHIVE_ID: &str = "bac-exams";
/// `active_topic_id` of the AI generated exercise.
pub const GENERATED_TOPIC_ID: &str = "generated-exercise";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Topic,
    ExamArchive,
}

/// A navigation action, applied synchronously to [`ViewState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    SelectLevel(Level),
    SelectTopic(String),
    ShowExamArchive,
    ChangeFilter(TopicFilter),
    SetSearchQuery(String),
}

/// Which level, topic and display mode the navigation panel points at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub level: Option<Level>,
    pub active_topic_id: Option<String>,
    pub mode: ViewMode,
    pub topic_filter: TopicFilter,
    pub search_query: String,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_level(&mut self, level: Level) {
        self.level = Some(level);
        self.active_topic_id = None;
        self.mode = ViewMode::Topic;
        self.topic_filter = TopicFilter::All;
        self.search_query.clear();
    }

    /// The filter is kept so the user stays in their browsing context.
    pub fn select_topic(&mut self, topic_id: impl Into<String>) {
        self.active_topic_id = Some(topic_id.into());
        self.mode = ViewMode::Topic;
    }

    pub fn show_exam_archive(&mut self) {
        self.active_topic_id = Some(EXAM_ARCHIVE_ID.to_string());
        self.mode = ViewMode::ExamArchive;
        self.topic_filter = TopicFilter::All;
    }

    pub fn change_filter(&mut self, filter: TopicFilter) {
        self.topic_filter = filter;
        if self.mode == ViewMode::ExamArchive {
            self.mode = ViewMode::Topic;
            self.active_topic_id = None;
        }
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Points the content panel at the generated exercise slot.
    pub fn begin_generation(&mut self) {
        self.active_topic_id = Some(GENERATED_TOPIC_ID.to_string());
        self.mode = ViewMode::Topic;
    }

    pub fn is_showing_generated(&self) -> bool {
        self.mode == ViewMode::Topic && self.active_topic_id.as_deref() == Some(GENERATED_TOPIC_ID)
    }

    pub fn apply(&mut self, command: ViewCommand) {
        match command {
            ViewCommand::SelectLevel(level) => self.select_level(level),
            ViewCommand::SelectTopic(topic_id) => self.select_topic(topic_id),
            ViewCommand::ShowExamArchive => self.show_exam_archive(),
            ViewCommand::ChangeFilter(filter) => self.change_filter(filter),
            ViewCommand::SetSearchQuery(query) => self.set_search_query(query),
        }
    }

    /// Topics of the active level left after filter and search.
    pub fn visible_topics<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Topic> {
        match self.level {
            Some(level) => catalog.filtered_topics(level, self.topic_filter, &self.search_query),
            None => Vec::new(),
        }
    }
}
