use recall_core::model::{
    AnswerEvent, CourseId, NewQuiz, QuestionDraft, QuestionId, QuestionType, QuizCreation,
};
use recall_core::time::fixed_now;
use storage::repository::{
    AnswerLogRepository, QuestionRecord, QuizRepository, StatsRepository, StorageError,
};
use storage::sqlite::SqliteRepository;

async fn open(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn course(id: &str) -> CourseId {
    CourseId::new(id).unwrap()
}

fn quiz_with(course_id: &str, count: usize) -> NewQuiz {
    NewQuiz {
        course_id: course(course_id),
        questions: (1..=count)
            .map(|i| {
                QuestionDraft::multiple_choice(
                    format!("Question {i}?"),
                    &["alpha", "beta", "gamma"],
                    "beta",
                    Some("beta is always right"),
                )
            })
            .collect(),
    }
}

#[tokio::test]
async fn pending_questions_come_back_in_id_order() {
    let repo = open("memdb_pending_order").await;
    repo.create_quiz(&quiz_with("C1", 3)).await.unwrap();

    let pending = repo.pending_questions(&course("C1")).await.unwrap();
    assert_eq!(pending.len(), 3);
    assert!(pending.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(pending[0].text, "Question 1?");

    let question = pending[0].clone().into_question().unwrap();
    assert_eq!(question.kind(), QuestionType::MultipleChoice);
    assert_eq!(question.choices().as_slice(), ["alpha", "beta", "gamma"]);
    assert_eq!(question.explanation(), Some("beta is always right"));
}

#[tokio::test]
async fn correct_answer_excludes_question_but_wrong_answer_does_not() {
    let repo = open("memdb_pending_filter").await;
    repo.create_quiz(&quiz_with("C1", 3)).await.unwrap();
    let pending = repo.pending_questions(&course("C1")).await.unwrap();
    let (q1, q2, q3) = (pending[0].id, pending[1].id, pending[2].id);

    repo.append_answer(&AnswerEvent::new(q1, "beta", true, fixed_now()))
        .await
        .unwrap();
    repo.append_answer(&AnswerEvent::new(q2, "alpha", false, fixed_now()))
        .await
        .unwrap();

    let ids: Vec<QuestionId> = repo
        .pending_questions(&course("C1"))
        .await
        .unwrap()
        .into_iter()
        .map(|q| q.id)
        .collect();
    assert_eq!(ids, vec![q2, q3]);
}

#[tokio::test]
async fn retry_until_correct_is_reflected_in_stats() {
    let repo = open("memdb_stats_retry").await;
    repo.create_quiz(&quiz_with("C1", 3)).await.unwrap();
    let q2 = repo.pending_questions(&course("C1")).await.unwrap()[1].id;

    repo.append_answer(&AnswerEvent::new(q2, "gamma", false, fixed_now()))
        .await
        .unwrap();
    repo.append_answer(&AnswerEvent::new(q2, "beta", true, fixed_now()))
        .await
        .unwrap();

    let stats = repo.course_stats(&course("C1")).await.unwrap().unwrap();
    assert_eq!(stats.question_count, 3);
    assert_eq!(stats.total_answers, 2);
    assert_eq!(stats.correct_answers, 1);

    let log = repo.answers_for_question(q2).await.unwrap();
    assert_eq!(log.len(), 2);
    assert!(!log[0].event.is_correct);
    assert!(log[1].event.is_correct);
    assert_eq!(log[1].event.submitted, "beta");
    assert_eq!(log[1].event.answered_at, fixed_now());
}

#[tokio::test]
async fn course_without_questions_has_nothing_pending() {
    let repo = open("memdb_empty_course").await;
    repo.create_quiz(&quiz_with("C2", 0)).await.unwrap();

    assert!(repo.pending_questions(&course("C2")).await.unwrap().is_empty());
    assert!(repo.pending_questions(&course("unknown")).await.unwrap().is_empty());

    let stats = repo.course_stats(&course("C2")).await.unwrap().unwrap();
    assert_eq!(stats.question_count, 0);
    assert_eq!(stats.total_answers, 0);
    assert_eq!(stats.correct_answers, 0);
    assert!(repo.course_stats(&course("unknown")).await.unwrap().is_none());
}

#[tokio::test]
async fn creating_a_quiz_twice_is_a_no_op() {
    let repo = open("memdb_duplicate_quiz").await;
    let first = repo.create_quiz(&quiz_with("C1", 2)).await.unwrap();
    let second = repo.create_quiz(&quiz_with("C1", 5)).await.unwrap();

    assert!(first.was_created());
    assert_eq!(second, QuizCreation::AlreadyExists(first.quiz_id()));
    let stats = repo.course_stats(&course("C1")).await.unwrap().unwrap();
    assert_eq!(stats.question_count, 2);
    assert_eq!(
        repo.quiz_id_for_course(&course("C1")).await.unwrap(),
        Some(first.quiz_id())
    );
}

#[tokio::test]
async fn reserved_question_types_are_stored_but_never_pending() {
    let repo = open("memdb_reserved_types").await;
    let quiz = NewQuiz {
        course_id: course("C3"),
        questions: vec![
            QuestionDraft::multiple_choice("Pick one", &["x", "y"], "x", None),
            QuestionDraft {
                kind: QuestionType::FreeText,
                text: "Explain borrowing".into(),
                explanation: None,
                choices: Default::default(),
                correct_answer: "References without ownership".into(),
            },
        ],
    };
    repo.create_quiz(&quiz).await.unwrap();

    let stats = repo.course_stats(&course("C3")).await.unwrap().unwrap();
    assert_eq!(stats.question_count, 2);

    let pending = repo.pending_questions(&course("C3")).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].text, "Pick one");
}

#[tokio::test]
async fn corrupt_choices_are_returned_raw_for_the_caller_to_judge() {
    let repo = open("memdb_corrupt_choices").await;
    let created = repo.create_quiz(&quiz_with("C4", 1)).await.unwrap();
    repo.insert_raw_question(&QuestionRecord {
        id: QuestionId::new(500),
        quiz_id: created.quiz_id(),
        question_type: "multiple_choice".into(),
        text: "Broken".into(),
        explanation: None,
        answer_choices: "{oops".into(),
        correct_answer: "a".into(),
    })
    .await
    .unwrap();

    let pending = repo.pending_questions(&course("C4")).await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[1].answer_choices, "{oops");
    assert!(pending[1].clone().into_question().is_err());
}

#[tokio::test]
async fn answer_for_missing_question_is_a_conflict() {
    let repo = open("memdb_missing_question").await;
    let err = repo
        .append_answer(&AnswerEvent::new(QuestionId::new(77), "x", true, fixed_now()))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn all_stats_lists_every_quiz_by_course() {
    let repo = open("memdb_all_stats").await;
    repo.create_quiz(&quiz_with("b-course", 1)).await.unwrap();
    repo.create_quiz(&quiz_with("a-course", 2)).await.unwrap();

    let stats = repo.all_stats().await.unwrap();
    let courses: Vec<_> = stats.iter().map(|s| s.course_id.as_str()).collect();
    assert_eq!(courses, vec!["a-course", "b-course"]);
    assert_eq!(stats[0].question_count, 2);
}

#[tokio::test]
async fn reset_drops_all_data_and_reseeds_types() {
    let repo = open("memdb_reset").await;
    repo.create_quiz(&quiz_with("C1", 2)).await.unwrap();

    repo.reset().await.unwrap();

    assert!(repo.all_stats().await.unwrap().is_empty());
    // Question types are seeded again, so creation still works.
    let created = repo.create_quiz(&quiz_with("C1", 1)).await.unwrap();
    assert!(created.was_created());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = open("memdb_migrate_twice").await;
    repo.migrate().await.unwrap();
    repo.create_quiz(&quiz_with("C1", 1)).await.unwrap();
    assert_eq!(repo.pending_questions(&course("C1")).await.unwrap().len(), 1);
}
