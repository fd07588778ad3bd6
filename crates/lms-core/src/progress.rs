//! Progress and grading arithmetic.
//!
//! Both course progress and assessment scores are whole percentages rounded
//! half up. The math is done in integers so `1/2 → 50` and `2/3 → 67` hold
//! exactly.

use std::collections::BTreeMap;

use crate::entities::Question;
use crate::enums::AttemptStatus;

/// `round(part / whole * 100)`, halves rounding up. Returns 0 when `whole`
/// is 0; `part` is clamped to `whole`.
#[must_use]
pub fn percentage(part: u64, whole: u64) -> i64 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole);
    let pct = (part * 200 + whole) / (whole * 2);
    i64::try_from(pct).unwrap_or(100)
}

/// Course progress from lesson counts.
#[must_use]
pub fn course_progress(completed_lessons: u64, total_lessons: u64) -> i64 {
    percentage(completed_lessons, total_lessons)
}

/// Trimmed, case-insensitive comparison of a given answer with the key.
#[must_use]
pub fn answer_matches(given: &str, expected: &str) -> bool {
    given.trim().to_lowercase() == expected.trim().to_lowercase()
}

/// Outcome of grading one set of answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub earned: u64,
    pub possible: u64,
    pub score: i64,
}

/// Grade `answers` (question id → answer) against `questions`.
///
/// Only questions with a correct answer count towards `possible`.
#[must_use]
pub fn grade(questions: &[Question], answers: &BTreeMap<String, String>) -> Grade {
    let mut earned = 0u64;
    let mut possible = 0u64;

    for question in questions {
        let Some(expected) = question.correct_answer.as_deref() else {
            continue;
        };
        let points = u64::try_from(question.points).unwrap_or(0);
        possible += points;

        let correct = answers
            .get(&question.id.to_string())
            .is_some_and(|given| answer_matches(given, expected));
        if correct {
            earned += points;
        }
    }

    Grade {
        earned,
        possible,
        score: percentage(earned, possible),
    }
}

/// Final attempt status for a score.
#[must_use]
pub fn attempt_status(score: i64, passing_score: Option<i64>) -> AttemptStatus {
    match passing_score {
        Some(required) if score >= required => AttemptStatus::Passed,
        Some(_) => AttemptStatus::Failed,
        None => AttemptStatus::Completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::QuestionType;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 0)]
    #[case(0, 4, 0)]
    #[case(1, 2, 50)]
    #[case(1, 3, 33)]
    #[case(2, 3, 67)]
    #[case(1, 8, 13)]
    #[case(4, 4, 100)]
    #[case(9, 4, 100)]
    fn rounds_half_up(#[case] part: u64, #[case] whole: u64, #[case] expected: i64) {
        assert_eq!(percentage(part, whole), expected);
    }

    fn question(id: i64, answer: Option<&str>, points: i64) -> Question {
        Question {
            id,
            assessment_id: 1,
            question_text: format!("q{id}"),
            question_type: QuestionType::ShortAnswer,
            options: serde_json::json!([]),
            correct_answer: answer.map(str::to_string),
            explanation: None,
            points,
            position: id,
        }
    }

    #[test]
    fn grades_by_points_ignoring_ungradable() {
        let questions = vec![
            question(1, Some("Paris"), 2),
            question(2, Some("true"), 1),
            question(3, None, 5),
        ];
        let answers = BTreeMap::from([
            ("1".to_string(), "  paris ".to_string()),
            ("2".to_string(), "false".to_string()),
            ("3".to_string(), "anything".to_string()),
        ]);

        let grade = grade(&questions, &answers);
        assert_eq!(
            grade,
            Grade {
                earned: 2,
                possible: 3,
                score: 67
            }
        );
    }

    #[test]
    fn nothing_gradable_scores_zero() {
        let grade = grade(&[question(1, None, 1)], &BTreeMap::new());
        assert_eq!(grade.score, 0);
        assert_eq!(grade.possible, 0);
    }

    #[rstest]
    #[case(80, Some(80), AttemptStatus::Passed)]
    #[case(79, Some(80), AttemptStatus::Failed)]
    #[case(0, None, AttemptStatus::Completed)]
    fn status_from_score(
        #[case] score: i64,
        #[case] passing: Option<i64>,
        #[case] expected: AttemptStatus,
    ) {
        assert_eq!(attempt_status(score, passing), expected);
    }
}
