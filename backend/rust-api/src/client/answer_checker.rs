use crate::models::Question;

/// Lower-cased, whitespace-trimmed form both sides are compared in.
pub fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Exact match after normalization against any accepted answer.
/// An unanswered question is simply wrong.
pub fn is_correct(question: &Question, raw_answer: Option<&str>) -> bool {
    let Some(raw_answer) = raw_answer else {
        return false;
    };

    let given = normalize(raw_answer);
    question
        .correct_answer
        .accepted()
        .into_iter()
        .any(|accepted| normalize(accepted) == given)
}
