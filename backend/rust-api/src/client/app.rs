use chrono::Utc;
use std::sync::Arc;

use super::auth_service::{AuthError, AuthService};
use super::exercise_session::{ExerciseSession, ListeningSession};
use super::generation_client::{ExerciseGenerator, GenerationError};
use super::storage::{KeyValueStore, MemoryStore, StorageError};
use super::tabs::TabSet;
use super::theme::{Theme, ThemePreference};
use super::view_state::{ViewCommand, ViewState, EXAM_ARCHIVE_ID, GENERATED_TOPIC_ID};
use crate::models::{Credentials, Difficulty, ExerciseDefinition, Topic, TopicContent, User};
use crate::services::catalog::Catalog;

/// A user action consumed by [`AppController::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    View(ViewCommand),
    SetDifficulty(Difficulty),
    DismissError,
}

impl From<ViewCommand> for Command {
    fn from(command: ViewCommand) -> Self {
        Command::View(command)
    }
}

/// Proof that a generation request was started; only the latest ticket
/// may deliver a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    sequence: u64,
    topic_hint: String,
    level: String,
    difficulty: Difficulty,
}

impl GenerationTicket {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn topic_hint(&self) -> &str {
        &self.topic_hint
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

/// Grading state of whatever exercise the content panel shows.
#[derive(Debug, Clone)]
pub enum ActiveSession {
    Exercise(ExerciseSession),
    Listening(ListeningSession),
}

impl ActiveSession {
    fn for_topic(topic: &Topic) -> Option<Self> {
        match &topic.content {
            TopicContent::Exercise(def) => {
                Some(ActiveSession::Exercise(ExerciseSession::new(def.clone())))
            }
            TopicContent::ListeningExercise(data) => {
                Some(ActiveSession::Listening(ListeningSession::new(data.clone())))
            }
            TopicContent::Lesson(_) => None,
        }
    }

    pub fn exercise_session(&self) -> &ExerciseSession {
        match self {
            ActiveSession::Exercise(session) => session,
            ActiveSession::Listening(listening) => listening.session(),
        }
    }

    pub fn exercise_session_mut(&mut self) -> &mut ExerciseSession {
        match self {
            ActiveSession::Exercise(session) => session,
            ActiveSession::Listening(listening) => listening.session_mut(),
        }
    }
}

/// Top-level state of the learning app: navigation, AI generation, the
/// active exercise session and the locally persisted account and theme.
pub struct AppController {
    catalog: Arc<Catalog>,
    generator: Arc<dyn ExerciseGenerator>,
    auth: AuthService,
    theme: ThemePreference,
    current_user: Option<User>,
    tabs: Option<TabSet>,
    view: ViewState,
    difficulty: Difficulty,
    generated: Option<Topic>,
    is_loading: bool,
    error: Option<String>,
    sequence: u64,
    session: Option<ActiveSession>,
    session_topic_id: Option<String>,
}

impl AppController {
    /// Controller whose account and theme live in memory only.
    pub fn new(catalog: Arc<Catalog>, generator: Arc<dyn ExerciseGenerator>) -> Self {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        Self::with_store(catalog, generator, store, false)
    }

    /// Controller persisting account and theme in `store`.
    pub fn with_store(
        catalog: Arc<Catalog>,
        generator: Arc<dyn ExerciseGenerator>,
        store: Arc<dyn KeyValueStore>,
        prefers_dark: bool,
    ) -> Self {
        let auth = AuthService::new(Arc::clone(&store));
        let theme = ThemePreference::load(store, prefers_dark);
        Self::with_services(catalog, generator, auth, theme)
    }

    pub fn with_services(
        catalog: Arc<Catalog>,
        generator: Arc<dyn ExerciseGenerator>,
        auth: AuthService,
        theme: ThemePreference,
    ) -> Self {
        let current_user = auth.current_user();
        Self {
            catalog,
            generator,
            auth,
            theme,
            current_user,
            tabs: None,
            view: ViewState::new(),
            difficulty: Difficulty::default(),
            generated: None,
            is_loading: false,
            error: None,
            sequence: 0,
            session: None,
            session_topic_id: None,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn visible_topics(&self) -> Vec<&Topic> {
        self.view.visible_topics(&self.catalog)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn signup(&mut self, credentials: &Credentials) -> Result<&User, AuthError> {
        let user = self.auth.signup(credentials)?;
        Ok(self.current_user.insert(user))
    }

    pub fn login(&mut self, credentials: &Credentials) -> Result<&User, AuthError> {
        let user = self.auth.login(credentials)?;
        Ok(self.current_user.insert(user))
    }

    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.auth.logout()?;
        self.current_user = None;
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        self.theme.current()
    }

    /// Switches light/dark and writes the choice back to the store.
    pub fn toggle_theme(&mut self) -> Result<Theme, StorageError> {
        self.theme.toggle()
    }

    /// Tab row of the selected topic, rebuilt whenever the topic changes.
    pub fn tabs(&self) -> Option<&TabSet> {
        self.tabs.as_ref()
    }

    pub fn select_tab(&mut self, tab: &str) -> bool {
        self.tabs.as_mut().is_some_and(|tabs| tabs.select(tab))
    }

    pub fn dispatch(&mut self, command: impl Into<Command>) {
        match command.into() {
            Command::View(view_command) => {
                // Search only narrows the list; everything else navigates.
                if !matches!(view_command, ViewCommand::SetSearchQuery(_)) {
                    self.invalidate_generation();
                    self.generated = None;
                }
                self.view.apply(view_command);
                self.sync_session();
            }
            Command::SetDifficulty(difficulty) => self.difficulty = difficulty,
            Command::DismissError => self.error = None,
        }
    }

    fn invalidate_generation(&mut self) {
        if self.is_loading {
            tracing::debug!("Discarding pending generation #{}", self.sequence);
            self.sequence += 1;
            self.is_loading = false;
        }
        self.error = None;
    }

    /// Topic shown in the content panel, if any.
    pub fn selected_topic(&self) -> Option<&Topic> {
        let topic_id = self.view.active_topic_id.as_deref()?;
        if topic_id == GENERATED_TOPIC_ID {
            return self.generated.as_ref();
        }
        if topic_id == EXAM_ARCHIVE_ID {
            return None;
        }
        self.catalog.find_topic(self.view.level?, topic_id)
    }

    pub fn session(&self) -> Option<&ActiveSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut ActiveSession> {
        self.session.as_mut()
    }

    /// Builds a fresh session and tab row whenever the selected topic changes.
    fn sync_session(&mut self) {
        let selected_id = self.selected_topic().map(|topic| topic.id.clone());
        if selected_id == self.session_topic_id {
            return;
        }
        self.session = self.selected_topic().and_then(ActiveSession::for_topic);
        self.tabs = selected_id.as_deref().and_then(|id| TabSet::new([id]));
        self.session_topic_id = selected_id;
    }

    /// Starts a generation for the selected level. Returns `None` without a
    /// level or while another request is pending.
    pub fn begin_generation(&mut self) -> Option<GenerationTicket> {
        let level = self.view.level?;
        if self.is_loading {
            return None;
        }

        self.sequence += 1;
        self.is_loading = true;
        self.error = None;
        self.generated = None;
        self.view.begin_generation();
        self.sync_session();

        let topic_hint = format!(
            "un des sujets suivants: {}",
            self.catalog.topic_titles(level).join(", ")
        );
        tracing::info!(
            "Generation #{} started: level={}, difficulty={}",
            self.sequence,
            level,
            self.difficulty
        );

        Some(GenerationTicket {
            sequence: self.sequence,
            topic_hint,
            level: level.label().to_string(),
            difficulty: self.difficulty,
        })
    }

    /// Applies a generation result. Results of superseded tickets are
    /// dropped and `false` is returned.
    pub fn finish_generation(
        &mut self,
        ticket: &GenerationTicket,
        result: Result<ExerciseDefinition, GenerationError>,
    ) -> bool {
        if !self.is_loading || ticket.sequence != self.sequence {
            tracing::debug!(
                "Dropping stale generation result #{} (latest #{})",
                ticket.sequence,
                self.sequence
            );
            return false;
        }

        self.is_loading = false;
        match result {
            Ok(exercise) => {
                self.generated = Some(Topic {
                    id: format!("gen-{}", Utc::now().timestamp_millis()),
                    title: format!("{} ({})", exercise.title, ticket.difficulty),
                    content: TopicContent::Exercise(exercise),
                });
            }
            Err(e) => {
                tracing::error!("Generation #{} failed: {:?}", ticket.sequence, e);
                self.error = Some(e.to_string());
            }
        }
        self.sync_session();
        true
    }

    /// Runs a whole generation round trip against the configured generator.
    pub async fn generate_exercise(&mut self) -> bool {
        let Some(ticket) = self.begin_generation() else {
            return false;
        };

        let generator = Arc::clone(&self.generator);
        let result = generator
            .request_exercise(ticket.topic_hint(), ticket.level(), ticket.difficulty())
            .await;

        self.finish_generation(&ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::view_state::ViewMode;
    use crate::models::{Level, TopicFilter};
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl ExerciseGenerator for Unreachable {
        async fn request_exercise(
            &self,
            _topic_hint: &str,
            _level: &str,
            _difficulty: Difficulty,
        ) -> Result<ExerciseDefinition, GenerationError> {
            Err(GenerationError::Connection)
        }
    }

    fn controller() -> AppController {
        let catalog = Arc::new(Catalog::load_embedded().unwrap());
        AppController::new(catalog, Arc::new(Unreachable))
    }

    #[test]
    fn generation_needs_a_level() {
        let mut app = controller();
        assert!(app.begin_generation().is_none());
        assert!(!app.is_loading());
    }

    #[test]
    fn ticket_carries_prompt_inputs() {
        let mut app = controller();
        app.dispatch(ViewCommand::SelectLevel(Level::Baccalaureate));
        app.dispatch(Command::SetDifficulty(Difficulty::Hard));

        let ticket = app.begin_generation().unwrap();
        assert_eq!(ticket.level(), "Baccalauréat");
        assert_eq!(ticket.difficulty(), Difficulty::Hard);
        assert!(ticket.topic_hint().starts_with("un des sujets suivants: "));
        let first_title = &app.catalog().topics(Level::Baccalaureate)[0].title;
        assert!(ticket.topic_hint().contains(first_title.as_str()));

        assert!(app.is_loading());
        assert!(app.view().is_showing_generated());
        assert!(app.selected_topic().is_none());
        assert!(app.begin_generation().is_none());
    }

    #[test]
    fn navigation_invalidates_a_pending_generation() {
        let mut app = controller();
        app.dispatch(ViewCommand::SelectLevel(Level::ThirdYear));
        let ticket = app.begin_generation().unwrap();

        app.dispatch(ViewCommand::ChangeFilter(TopicFilter::LessonsOnly));
        assert!(!app.is_loading());

        let exercise = ExerciseDefinition {
            title: "Trop tard".to_string(),
            questions: vec![],
        };
        assert!(!app.finish_generation(&ticket, Ok(exercise)));
        assert!(app.selected_topic().is_none());
    }

    #[test]
    fn search_does_not_cancel_generation() {
        let mut app = controller();
        app.dispatch(ViewCommand::SelectLevel(Level::ThirdYear));
        app.begin_generation().unwrap();
        app.dispatch(ViewCommand::SetSearchQuery("art".to_string()));
        assert!(app.is_loading());
    }

    #[test]
    fn exam_archive_has_no_selected_topic() {
        let mut app = controller();
        app.dispatch(ViewCommand::SelectLevel(Level::Baccalaureate));
        app.dispatch(ViewCommand::ShowExamArchive);
        assert_eq!(app.view().mode, ViewMode::ExamArchive);
        assert!(app.selected_topic().is_none());
        assert!(app.session().is_none());
    }

    #[test]
    fn lessons_have_no_session() {
        let mut app = controller();
        app.dispatch(ViewCommand::SelectLevel(Level::ThirdYear));
        let lesson_id = app
            .catalog()
            .filtered_topics(Level::ThirdYear, TopicFilter::LessonsOnly, "")[0]
            .id
            .clone();
        app.dispatch(ViewCommand::SelectTopic(lesson_id.clone()));

        assert_eq!(app.selected_topic().map(|t| t.id.as_str()), Some(lesson_id.as_str()));
        assert!(app.session().is_none());
    }

    #[test]
    fn tabs_follow_the_selected_topic() {
        let mut app = controller();
        app.dispatch(ViewCommand::SelectLevel(Level::ThirdYear));
        assert!(app.tabs().is_none());

        let topics = app.catalog().topics(Level::ThirdYear);
        let (first, second) = (topics[0].id.clone(), topics[1].id.clone());

        app.dispatch(ViewCommand::SelectTopic(first.clone()));
        assert!(app.tabs().unwrap().is_active(&first));
        assert!(!app.select_tab("inconnu"));

        app.dispatch(ViewCommand::SelectTopic(second.clone()));
        assert_eq!(app.tabs().unwrap().tabs(), [second.clone()]);
        assert!(app.select_tab(&second));

        app.dispatch(ViewCommand::ShowExamArchive);
        assert!(app.tabs().is_none());
    }

    #[test]
    fn theme_and_account_start_from_the_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set("theme", "dark").unwrap();
        store
            .set(
                crate::client::auth_service::SESSION_KEY,
                r#"{"id":"user_1","email":"amira@example.tn"}"#,
            )
            .unwrap();

        let catalog = Arc::new(Catalog::load_embedded().unwrap());
        let mut app =
            AppController::with_store(catalog, Arc::new(Unreachable), store.clone(), false);
        assert_eq!(app.theme(), Theme::Dark);
        assert_eq!(app.current_user().unwrap().email, "amira@example.tn");

        assert_eq!(app.toggle_theme().unwrap(), Theme::Light);
        assert_eq!(store.get("theme").as_deref(), Some("light"));

        app.logout().unwrap();
        assert!(app.current_user().is_none());
    }

    #[tokio::test]
    async fn failed_generation_surfaces_the_message() {
        let mut app = controller();
        app.dispatch(ViewCommand::SelectLevel(Level::ThirdYear));

        assert!(app.generate_exercise().await);
        assert!(!app.is_loading());
        assert_eq!(
            app.error(),
            Some("La connexion au serveur a échoué. Veuillez vérifier votre connexion et réessayer.")
        );
        assert!(app.selected_topic().is_none());

        app.dispatch(Command::DismissError);
        assert_eq!(app.error(), None);
    }
}
