use recall_core::model::{Correctness, QuizStats};

#[must_use]
pub fn correctness_text(stats: &QuizStats) -> String {
    match stats.correctness() {
        Correctness::NoData => "no answers yet".to_owned(),
        Correctness::Rate(rate) => format!("{rate:.1}%"),
    }
}

/// Stats for one course as label/value lines.
#[must_use]
pub fn stats_lines(stats: &QuizStats) -> Vec<String> {
    vec![
        format!("Course:          {}", stats.course_id()),
        format!("Questions:       {}", stats.question_count()),
        format!("Total answers:   {}", stats.total_answers()),
        format!("Correct answers: {}", stats.correct_answers()),
        format!("Correctness:     {}", correctness_text(stats)),
    ]
}

/// One row per quiz, with a header, for the all-quiz report.
#[must_use]
pub fn stats_table(all: &[QuizStats]) -> Vec<String> {
    let width = all
        .iter()
        .map(|stats| stats.course_id().as_str().len())
        .max()
        .unwrap_or(0)
        .max("COURSE".len());

    let mut lines = Vec::with_capacity(all.len() + 1);
    lines.push(format!(
        "{:<width$}  {:>9}  {:>7}  {:>7}  {:>14}",
        "COURSE", "QUESTIONS", "ANSWERS", "CORRECT", "CORRECTNESS"
    ));
    for stats in all {
        lines.push(format!(
            "{:<width$}  {:>9}  {:>7}  {:>7}  {:>14}",
            stats.course_id().as_str(),
            stats.question_count(),
            stats.total_answers(),
            stats.correct_answers(),
            correctness_text(stats)
        ));
    }
    lines
}
