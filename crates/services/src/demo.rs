//! Built-in quiz about the tool itself, for trying it out without any course content.

use recall_core::model::{CourseId, EmptyCourseId, NewQuiz, QuestionDraft, QuizCreation};

use crate::error::QuizServiceError;
use crate::quiz_service::QuizService;

pub const DEMO_COURSE_ID: &str = "total-recall-demo";

/// # Errors
///
/// Never fails for the built-in id; the `Result` mirrors `CourseId::new`.
pub fn demo_course_id() -> Result<CourseId, EmptyCourseId> {
    CourseId::new(DEMO_COURSE_ID)
}

#[must_use]
pub fn demo_questions() -> Vec<QuestionDraft> {
    vec![
        QuestionDraft::multiple_choice(
            "When does a question stop showing up in a quiz?",
            &[
                "After it has been answered once",
                "After it has been answered correctly",
                "After three wrong answers",
                "Never",
            ],
            "After it has been answered correctly",
            Some(
                "Wrong answers are logged, but the question stays pending until you get it right.",
            ),
        ),
        QuestionDraft::multiple_choice(
            "Which key ends a quiz early?",
            &["q", "n", "Enter", "Space"],
            "q",
            Some("Esc and Ctrl+C work too. Answers given so far are kept."),
        ),
        QuestionDraft::multiple_choice(
            "Where are your answers stored?",
            &[
                "In a local SQLite database",
                "In a remote API",
                "Only in memory",
                "In a CSV file",
            ],
            "In a local SQLite database",
            None,
        ),
        QuestionDraft::multiple_choice(
            "What does the stats command report?",
            &[
                "Question count, total answers, correct answers and correctness",
                "Only the last answer",
                "Time spent per question",
                "Nothing until the quiz is finished",
            ],
            "Question count, total answers, correct answers and correctness",
            None,
        ),
        QuestionDraft::multiple_choice(
            "How do you pick the second choice directly?",
            &["Press 2", "Press Tab twice", "Type the answer", "Press n"],
            "Press 2",
            Some("Arrow keys or j and k move the cursor; Enter confirms it."),
        ),
    ]
}

/// Store the demo quiz unless it already exists.
///
/// # Errors
///
/// Returns `QuizServiceError` if the quiz cannot be stored.
pub async fn seed_demo_quiz(quizzes: &QuizService) -> Result<QuizCreation, QuizServiceError> {
    let course_id = demo_course_id()?;
    quizzes
        .create_quiz(NewQuiz {
            course_id,
            questions: demo_questions(),
        })
        .await
}
