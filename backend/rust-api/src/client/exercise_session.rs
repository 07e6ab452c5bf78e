use std::collections::HashMap;
use thiserror::Error;

use super::answer_checker::is_correct;
use crate::models::{ExerciseDefinition, ListeningExerciseData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unsubmitted,
    Submitted,
}

/// Score of one submission, recomputed from scratch on every submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionResult {
    pub correct_count: usize,
    pub total: usize,
}

impl SubmissionResult {
    /// `round(100 * correct / total)`, 0 for an empty exercise.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((100.0 * self.correct_count as f64) / self.total as f64).round() as u32
    }
}

/// Per-question outcome shown once the session is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFeedback {
    pub correct: bool,
    pub expected: String,
    pub explanation: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("answers are locked until the exercise is retried")]
    AlreadySubmitted,
    #[error("unknown question: {0}")]
    UnknownQuestion(String),
}

/// Live answer and grading state of one exercise.
#[derive(Debug, Clone)]
pub struct ExerciseSession {
    exercise: ExerciseDefinition,
    answers: HashMap<String, String>,
    result: Option<SubmissionResult>,
}

impl ExerciseSession {
    pub fn new(exercise: ExerciseDefinition) -> Self {
        Self {
            exercise,
            answers: HashMap::new(),
            result: None,
        }
    }

    pub fn exercise(&self) -> &ExerciseDefinition {
        &self.exercise
    }

    pub fn state(&self) -> SessionState {
        if self.result.is_some() {
            SessionState::Submitted
        } else {
            SessionState::Unsubmitted
        }
    }

    pub fn result(&self) -> Option<SubmissionResult> {
        self.result
    }

    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn set_answer(
        &mut self,
        question_id: &str,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        if self.result.is_some() {
            return Err(SessionError::AlreadySubmitted);
        }
        if self.exercise.question(question_id).is_none() {
            return Err(SessionError::UnknownQuestion(question_id.to_string()));
        }
        self.answers.insert(question_id.to_string(), value.into());
        Ok(())
    }

    /// Grades every question. Calling it again while submitted returns the
    /// existing result unchanged.
    pub fn submit(&mut self) -> SubmissionResult {
        if let Some(result) = self.result {
            return result;
        }

        let correct_count = self
            .exercise
            .questions
            .iter()
            .filter(|q| is_correct(q, self.answer(&q.id)))
            .count();

        let result = SubmissionResult {
            correct_count,
            total: self.exercise.questions.len(),
        };
        tracing::debug!(
            "Exercise '{}' submitted: {}/{}",
            self.exercise.title,
            result.correct_count,
            result.total
        );
        self.result = Some(result);
        result
    }

    pub fn retry(&mut self) {
        self.answers.clear();
        self.result = None;
    }

    /// Swaps in another exercise; answers never carry over.
    pub fn replace_exercise(&mut self, exercise: ExerciseDefinition) {
        self.exercise = exercise;
        self.retry();
    }

    pub fn feedback(&self, question_id: &str) -> Option<QuestionFeedback> {
        if self.result.is_none() {
            return None;
        }
        let question = self.exercise.question(question_id)?;
        Some(QuestionFeedback {
            correct: is_correct(question, self.answer(question_id)),
            expected: question.correct_answer.display(),
            explanation: question.explanation.clone(),
        })
    }
}

/// Exercise session of a listening activity, with its transcription toggle.
#[derive(Debug, Clone)]
pub struct ListeningSession {
    data: ListeningExerciseData,
    session: ExerciseSession,
    show_transcription: bool,
}

impl ListeningSession {
    pub fn new(data: ListeningExerciseData) -> Self {
        let session = ExerciseSession::new(data.exercise());
        Self {
            data,
            session,
            show_transcription: false,
        }
    }

    pub fn data(&self) -> &ListeningExerciseData {
        &self.data
    }

    pub fn session(&self) -> &ExerciseSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ExerciseSession {
        &mut self.session
    }

    pub fn transcription_visible(&self) -> bool {
        self.show_transcription
    }

    /// Returns the transcription text while it is toggled on.
    pub fn transcription(&self) -> Option<&str> {
        self.show_transcription
            .then(|| self.data.transcription.trim())
    }

    pub fn toggle_transcription(&mut self) {
        self.show_transcription = !self.show_transcription;
    }

    pub fn replace_data(&mut self, data: ListeningExerciseData) {
        self.session.replace_exercise(data.exercise());
        self.data = data;
        self.show_transcription = false;
    }
}
