use std::io::{self, Write};
use std::sync::Arc;

use recall_core::model::{CourseId, QuestionDraft, QuizCreation};
use services::demo::{demo_course_id, seed_demo_quiz};
use services::generator::GeneratorConfig;
use services::{
    AppServices, ChatQuestionGenerator, Completion, HttpContentSource, SessionController,
};
use storage::sqlite::SqliteRepository;
use tracing::info;
use ui::views::{stats_lines, stats_table};

use crate::prompt::{QuizEntry, choose_quiz, confirm};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

const NOTHING_TO_DO: &str = "Nothing to do...";

/// Interactive quiz for `course`, or for a quiz picked from the local list.
pub async fn quiz(services: &AppServices, course: Option<CourseId>) -> CommandResult {
    let course = match course {
        Some(course) => course,
        None => match pick_course(services).await? {
            Some(course) => course,
            None => {
                println!("{NOTHING_TO_DO}");
                return Ok(());
            }
        },
    };

    let Some(controller) =
        SessionController::start(&course, services.quiz_service(), services.stats_service())
            .await?
    else {
        println!("{NOTHING_TO_DO}");
        return Ok(());
    };

    let completion = ui::run_quiz(controller).await?;
    match completion {
        Completion::Summary(stats) => {
            println!("Quiz completed! Great job!");
            println!();
            for line in stats_lines(&stats) {
                println!("  {line}");
            }
        }
        Completion::Quit => println!("Quiz ended."),
    }
    Ok(())
}

async fn pick_course(
    services: &AppServices,
) -> Result<Option<CourseId>, Box<dyn std::error::Error>> {
    let quizzes = services.quiz_service();
    let all = services.stats_service().all_stats().await?;

    if all.is_empty() {
        println!("No quizzes found.");
        let wants_demo = confirm(
            "Take the built-in demo quiz?",
            &mut io::stdin().lock(),
            &mut io::stdout(),
        )?;
        if !wants_demo {
            return Ok(None);
        }
        seed_demo_quiz(&quizzes).await?;
        return Ok(Some(demo_course_id()?));
    }

    let mut entries = Vec::with_capacity(all.len());
    for stats in all {
        let pending = quizzes
            .load_pending_quiz(stats.course_id())
            .await?
            .map_or(0, |quiz| quiz.len());
        entries.push(QuizEntry {
            course: stats.course_id().clone(),
            questions: stats.question_count(),
            pending,
        });
    }

    let picked = choose_quiz(&entries, &mut io::stdin().lock(), &mut io::stdout())?;
    Ok(picked
        .and_then(|index| entries.get(index))
        .map(|entry| entry.course.clone()))
}

/// Stats for one course, or a table of every quiz.
pub async fn stats(services: &AppServices, course: Option<CourseId>) -> CommandResult {
    let stats = services.stats_service();
    match course {
        Some(course) => {
            for line in stats_lines(&stats.compute_stats(&course).await?) {
                println!("{line}");
            }
        }
        None => {
            let all = stats.all_stats().await?;
            if all.is_empty() {
                println!("No quizzes yet. Try `recall seed` or `recall generate --course <id>`.");
                return Ok(());
            }
            for line in stats_table(&all) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// Download a course, generate questions and store them.
pub async fn generate(services: &AppServices, course: &CourseId, count: usize) -> CommandResult {
    let Some(config) = GeneratorConfig::from_env() else {
        return Err("question generation needs RECALL_AI_API_KEY to be set".into());
    };

    let generation = services.generation_service(
        Arc::new(HttpContentSource::from_env()),
        Arc::new(ChatQuestionGenerator::new(config)),
    );
    eprintln!("Generating {count} questions for {course}...");
    let generated = generation.generate_quiz(course, count).await?;

    match generated.creation {
        QuizCreation::AlreadyExists(id) => {
            println!("A quiz for {course} already exists (quiz {id}); nothing was generated.");
        }
        QuizCreation::Created(id) => {
            println!(
                "Created quiz {id} for {course} ({}) with {} questions.",
                generated.title,
                generated.questions.len()
            );
            if generated.failed_lessons > 0 {
                println!("{} lessons could not be downloaded.", generated.failed_lessons);
            }
            println!();
            let mut out = io::stdout();
            write_questions(&mut out, &generated.questions)?;
        }
    }
    Ok(())
}

/// Print drafts with the correct choice marked.
pub fn write_questions<W: Write>(out: &mut W, questions: &[QuestionDraft]) -> io::Result<()> {
    for (index, question) in questions.iter().enumerate() {
        writeln!(out, "{}. {}", index + 1, question.text)?;
        for choice in question.choices.as_slice() {
            let mark = if recall_core::model::answers_match(choice, &question.correct_answer) {
                "x"
            } else {
                " "
            };
            writeln!(out, "   [{mark}] {choice}")?;
        }
        if let Some(explanation) = &question.explanation {
            writeln!(out, "   {explanation}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub async fn seed(services: &AppServices) -> CommandResult {
    let course = demo_course_id()?;
    match seed_demo_quiz(&services.quiz_service()).await? {
        QuizCreation::Created(id) => println!("Created demo quiz {id} for course {course}."),
        QuizCreation::AlreadyExists(id) => {
            println!("Demo quiz {id} for course {course} already exists.");
        }
    }
    Ok(())
}

pub async fn db_init(db_url: &str) -> CommandResult {
    let repo = SqliteRepository::open(db_url).await?;
    repo.close().await;
    info!(db_url, "schema ready");
    println!("Database ready at {db_url}");
    Ok(())
}

pub async fn db_reset(db_url: &str) -> CommandResult {
    let repo = SqliteRepository::open(db_url).await?;
    let result = repo.reset().await;
    repo.close().await;
    result?;
    println!("Database reset at {db_url}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_questions_mark_the_correct_choice() {
        let drafts = vec![
            QuestionDraft::multiple_choice("2+2?", &["3", "4"], " 4", Some("math")),
            QuestionDraft::multiple_choice("Sky?", &["blue", "green"], "blue", None),
        ];
        let mut out = Vec::new();
        write_questions(&mut out, &drafts).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "1. 2+2?\n   [ ] 3\n   [x] 4\n   math\n\n2. Sky?\n   [x] blue\n   [ ] green\n\n"
        );
    }
}
