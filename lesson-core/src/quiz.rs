//! Multiple-choice quiz rendering, answer tracking and grading

use crate::error::QuizError;
use crate::models::{OptionLabel, QuizQuestion, Track};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;

/// Three-tier qualitative grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeTier {
    Excellent,
    Good,
    KeepLearning,
}

impl GradeTier {
    pub fn from_correct(correct: usize) -> Self {
        match correct {
            0 | 1 => GradeTier::KeepLearning,
            2 => GradeTier::Good,
            _ => GradeTier::Excellent,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GradeTier::Excellent => "🏆 优秀 (Excellent!)",
            GradeTier::Good => "👍 良好 (Good!)",
            GradeTier::KeepLearning => "📖 需要加油 (Keep Learning!)",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            GradeTier::Excellent => "grade-excellent",
            GradeTier::Good => "grade-good",
            GradeTier::KeepLearning => "grade-fail",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionMark {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub label: OptionLabel,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub number: usize,
    pub text: String,
    pub options: Vec<OptionView>,
}

/// Freshly rendered quiz: no answers, submit enabled, result hidden
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizView {
    pub track: Track,
    pub questions: Vec<QuestionView>,
    pub submit_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkedOption {
    pub label: OptionLabel,
    pub mark: Option<OptionMark>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionOutcome {
    pub chosen: Option<OptionLabel>,
    pub correct_answer: OptionLabel,
    pub is_correct: bool,
    pub options: Vec<MarkedOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    pub track: Track,
    pub correct: usize,
    pub total: usize,
    pub tier: GradeTier,
    pub score_text: String,
    pub grade_label: &'static str,
    pub grade_class: &'static str,
    pub questions: Vec<QuestionOutcome>,
}

/// Lifecycle of one quiz, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
    Unrendered,
    Rendered,
    Answering,
    Graded,
}

/// Builds the view for a question list. Options beyond D are dropped.
pub fn quiz_view(track: Track, questions: &[QuizQuestion]) -> QuizView {
    QuizView {
        track,
        questions: questions
            .iter()
            .enumerate()
            .map(|(index, q)| QuestionView {
                number: index + 1,
                text: q.question.clone(),
                options: OptionLabel::ALL
                    .into_iter()
                    .zip(&q.options)
                    .map(|(label, text)| OptionView {
                        label,
                        text: text.clone(),
                    })
                    .collect(),
            })
            .collect(),
        submit_enabled: true,
    }
}

/// Grades recorded answers against the key. Pure: same inputs, same result.
///
/// The correct option is always marked correct. The learner's option is
/// marked incorrect only when it differs from the key. Everything else is
/// left unmarked.
pub fn grade(
    track: Track,
    questions: &[QuizQuestion],
    answers: &BTreeMap<usize, OptionLabel>,
) -> QuizResult {
    let outcomes: Vec<QuestionOutcome> = questions
        .iter()
        .enumerate()
        .map(|(index, q)| {
            let chosen = answers.get(&index).copied();
            let key = q.correct_answer;
            let options = OptionLabel::ALL
                .into_iter()
                .take(q.options.len())
                .map(|label| {
                    let mark = if label == key {
                        Some(OptionMark::Correct)
                    } else if Some(label) == chosen {
                        Some(OptionMark::Incorrect)
                    } else {
                        None
                    };
                    MarkedOption { label, mark }
                })
                .collect();
            QuestionOutcome {
                chosen,
                correct_answer: key,
                is_correct: chosen == Some(key),
                options,
            }
        })
        .collect();

    let correct = outcomes.iter().filter(|o| o.is_correct).count();
    let total = questions.len();
    let tier = GradeTier::from_correct(correct);

    QuizResult {
        track,
        correct,
        total,
        tier,
        score_text: format!("答对 {} / {} 题", correct, total),
        grade_label: tier.label(),
        grade_class: tier.css_class(),
        questions: outcomes,
    }
}

/// Answer state for one quiz track
#[derive(Debug, Clone)]
pub struct QuizState {
    track: Track,
    question_count: Option<usize>,
    answers: BTreeMap<usize, OptionLabel>,
    result: Option<QuizResult>,
}

impl QuizState {
    pub fn new(track: Track) -> Self {
        Self {
            track,
            question_count: None,
            answers: BTreeMap::new(),
            result: None,
        }
    }

    pub fn phase(&self) -> QuizPhase {
        match (self.question_count, &self.result) {
            (None, _) => QuizPhase::Unrendered,
            (Some(_), Some(_)) => QuizPhase::Graded,
            (Some(_), None) if self.answers.is_empty() => QuizPhase::Rendered,
            (Some(_), None) => QuizPhase::Answering,
        }
    }

    pub fn answers(&self) -> &BTreeMap<usize, OptionLabel> {
        &self.answers
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    /// Resets to a fresh quiz, whatever state it was in. An empty question
    /// list hides the quiz and returns `None`.
    pub fn render(&mut self, questions: &[QuizQuestion]) -> Option<QuizView> {
        self.answers.clear();
        self.result = None;
        if questions.is_empty() {
            self.question_count = None;
            return None;
        }
        self.question_count = Some(questions.len());
        Some(quiz_view(self.track, questions))
    }

    /// Records or overwrites the answer for one question
    pub fn select(&mut self, question: usize, label: OptionLabel) -> Result<(), QuizError> {
        let count = self.question_count.ok_or(QuizError::NotRendered)?;
        if self.result.is_some() {
            return Err(QuizError::AlreadySubmitted);
        }
        if question >= count {
            return Err(QuizError::UnknownQuestion(question));
        }
        self.answers.insert(question, label);
        Ok(())
    }

    /// Grades once. Further submissions fail until the quiz is rendered again.
    pub fn submit(&mut self, questions: &[QuizQuestion]) -> Result<&QuizResult, QuizError> {
        if self.question_count.is_none() {
            return Err(QuizError::NotRendered);
        }
        if self.result.is_some() {
            return Err(QuizError::AlreadySubmitted);
        }
        let result = grade(self.track, questions, &self.answers);
        info!(
            "[quiz] {} quiz graded: {}/{}",
            self.track, result.correct, result.total
        );
        Ok(self.result.insert(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(key: OptionLabel) -> QuizQuestion {
        QuizQuestion {
            question: "Where did the cat sleep?".to_string(),
            options: vec![
                "On the mat".to_string(),
                "In the box".to_string(),
                "Under the bed".to_string(),
                "On the roof".to_string(),
            ],
            correct_answer: key,
        }
    }

    fn three_questions() -> Vec<QuizQuestion> {
        vec![
            question(OptionLabel::A),
            question(OptionLabel::B),
            question(OptionLabel::C),
        ]
    }

    fn answered(picks: &[(usize, OptionLabel)]) -> BTreeMap<usize, OptionLabel> {
        picks.iter().copied().collect()
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(GradeTier::from_correct(3), GradeTier::Excellent);
        assert_eq!(GradeTier::from_correct(2), GradeTier::Good);
        assert_eq!(GradeTier::from_correct(1), GradeTier::KeepLearning);
        assert_eq!(GradeTier::from_correct(0), GradeTier::KeepLearning);
    }

    #[test]
    fn test_grade_all_correct() {
        let questions = three_questions();
        let answers = answered(&[(0, OptionLabel::A), (1, OptionLabel::B), (2, OptionLabel::C)]);
        let result = grade(Track::Simple, &questions, &answers);
        assert_eq!(result.correct, 3);
        assert_eq!(result.total, 3);
        assert_eq!(result.tier, GradeTier::Excellent);
        assert_eq!(result.score_text, "答对 3 / 3 题");
        assert_eq!(result.grade_class, "grade-excellent");
    }

    #[test]
    fn test_grade_two_and_one_correct() {
        let questions = three_questions();
        let two = grade(
            Track::Simple,
            &questions,
            &answered(&[(0, OptionLabel::A), (1, OptionLabel::B), (2, OptionLabel::D)]),
        );
        assert_eq!(two.correct, 2);
        assert_eq!(two.tier, GradeTier::Good);

        let one = grade(
            Track::Simple,
            &questions,
            &answered(&[(0, OptionLabel::A), (1, OptionLabel::A)]),
        );
        assert_eq!(one.correct, 1);
        assert_eq!(one.tier, GradeTier::KeepLearning);
    }

    #[test]
    fn test_marks_correct_and_incorrect_options() {
        let questions = three_questions();
        let result = grade(
            Track::Complex,
            &questions,
            &answered(&[(0, OptionLabel::A), (1, OptionLabel::D)]),
        );

        let marks = |q: usize| -> Vec<Option<OptionMark>> {
            result.questions[q].options.iter().map(|o| o.mark).collect()
        };
        // chosen and correct: only the correct mark
        assert_eq!(marks(0), vec![Some(OptionMark::Correct), None, None, None]);
        // chosen wrong
        assert_eq!(
            marks(1),
            vec![None, Some(OptionMark::Correct), None, Some(OptionMark::Incorrect)]
        );
        // unanswered: key still shown, nothing else marked
        assert_eq!(marks(2), vec![None, None, Some(OptionMark::Correct), None]);
        assert_eq!(result.questions[2].chosen, None);
        assert!(!result.questions[2].is_correct);
    }

    #[test]
    fn test_grade_is_pure() {
        let questions = three_questions();
        let answers = answered(&[(1, OptionLabel::B)]);
        assert_eq!(
            grade(Track::Simple, &questions, &answers),
            grade(Track::Simple, &questions, &answers)
        );
    }

    #[test]
    fn test_state_lifecycle() {
        let questions = three_questions();
        let mut state = QuizState::new(Track::Simple);
        assert_eq!(state.phase(), QuizPhase::Unrendered);
        assert_eq!(state.select(0, OptionLabel::A), Err(QuizError::NotRendered));

        let view = state.render(&questions).unwrap();
        assert_eq!(view.questions.len(), 3);
        assert!(view.submit_enabled);
        assert_eq!(state.phase(), QuizPhase::Rendered);

        state.select(0, OptionLabel::C).unwrap();
        state.select(0, OptionLabel::A).unwrap();
        assert_eq!(state.phase(), QuizPhase::Answering);
        assert_eq!(state.answers().get(&0), Some(&OptionLabel::A));

        let result = state.submit(&questions).unwrap();
        assert_eq!(result.correct, 1);
        assert_eq!(state.phase(), QuizPhase::Graded);
    }

    #[test]
    fn test_second_submit_is_rejected() {
        let questions = three_questions();
        let mut state = QuizState::new(Track::Complex);
        state.render(&questions);
        state.submit(&questions).unwrap();
        assert_eq!(state.submit(&questions).unwrap_err(), QuizError::AlreadySubmitted);
        assert_eq!(
            state.select(1, OptionLabel::B),
            Err(QuizError::AlreadySubmitted)
        );
    }

    #[test]
    fn test_render_resets_answers_and_result() {
        let questions = three_questions();
        let mut state = QuizState::new(Track::Simple);
        state.render(&questions);
        state.select(2, OptionLabel::C).unwrap();
        state.submit(&questions).unwrap();

        state.render(&questions);
        assert!(state.answers().is_empty());
        assert!(state.result().is_none());
        assert_eq!(state.phase(), QuizPhase::Rendered);
        assert!(state.submit(&questions).is_ok());
    }

    #[test]
    fn test_empty_quiz_is_hidden() {
        let mut state = QuizState::new(Track::Simple);
        state.render(&three_questions());
        assert!(state.render(&[]).is_none());
        assert_eq!(state.phase(), QuizPhase::Unrendered);
    }

    #[test]
    fn test_unknown_question_index() {
        let mut state = QuizState::new(Track::Simple);
        state.render(&three_questions());
        assert_eq!(
            state.select(3, OptionLabel::A),
            Err(QuizError::UnknownQuestion(3))
        );
    }

    #[test]
    fn test_view_labels_at_most_four_options() {
        let mut q = question(OptionLabel::A);
        q.options.push("Fifth".to_string());
        let view = quiz_view(Track::Simple, &[q]);
        let labels: Vec<OptionLabel> = view.questions[0].options.iter().map(|o| o.label).collect();
        assert_eq!(labels, OptionLabel::ALL.to_vec());
        assert_eq!(view.questions[0].number, 1);
    }
}
