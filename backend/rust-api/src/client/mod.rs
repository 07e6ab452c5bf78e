//! State objects of the learning app front end: grading, navigation,
//! the AI generation request flow and local persistence.

pub mod answer_checker;
pub mod app;
pub mod auth_service;
pub mod exercise_session;
pub mod generation_client;
pub mod storage;
pub mod tabs;
pub mod theme;
pub mod view_state;

pub use answer_checker::{is_correct, normalize};
pub use app::{ActiveSession, AppController, Command, GenerationTicket};
pub use auth_service::{AuthError, AuthService};
pub use exercise_session::{
    ExerciseSession, ListeningSession, QuestionFeedback, SessionError, SessionState,
    SubmissionResult,
};
pub use generation_client::{ExerciseGenerator, GenerationClient, GenerationError};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use tabs::TabSet;
pub use theme::{Theme, ThemePreference};
pub use view_state::{ViewCommand, ViewMode, ViewState, EXAM_ARCHIVE_ID, GENERATED_TOPIC_ID};
