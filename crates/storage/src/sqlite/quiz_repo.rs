use chrono::Utc;
use recall_core::model::{CourseId, NewQuiz, QuestionType, QuizCreation, QuizId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_question_row, quiz_id_from_i64, ser};
use crate::repository::{QuestionRecord, QuizRepository, StorageError};

const QUESTION_COLUMNS: &str = r"
    SELECT
        q.id, q.quiz_id, qt.name AS question_type, q.question_text,
        q.explanation, q.answer_choices, q.correct_answer
    FROM questions q
    JOIN quizzes qz ON q.quiz_id = qz.id
    JOIN question_types qt ON q.question_type_id = qt.id
";

#[async_trait::async_trait]
impl QuizRepository for SqliteRepository {
    async fn create_quiz(&self, quiz: &NewQuiz) -> Result<QuizCreation, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let inserted = sqlx::query(
            r"
                INSERT INTO quizzes (course_uuid, created_at)
                VALUES (?1, ?2)
                ON CONFLICT(course_uuid) DO NOTHING
            ",
        )
        .bind(quiz.course_id.as_str())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        if inserted.rows_affected() == 0 {
            let existing: i64 = sqlx::query("SELECT id FROM quizzes WHERE course_uuid = ?1")
                .bind(quiz.course_id.as_str())
                .fetch_one(&mut *tx)
                .await
                .map_err(conn)?
                .try_get("id")
                .map_err(ser)?;
            tx.rollback().await.map_err(conn)?;
            return Ok(QuizCreation::AlreadyExists(quiz_id_from_i64(existing)?));
        }

        let quiz_id = inserted.last_insert_rowid();

        for draft in &quiz.questions {
            sqlx::query(
                r"
                    INSERT INTO questions (
                        quiz_id, question_type_id, question_text,
                        explanation, answer_choices, correct_answer
                    )
                    VALUES (
                        ?1,
                        (SELECT id FROM question_types WHERE name = ?2),
                        ?3, ?4, ?5, ?6
                    )
                ",
            )
            .bind(quiz_id)
            .bind(draft.kind.as_str())
            .bind(&draft.text)
            .bind(draft.explanation.as_deref())
            .bind(draft.choices.to_json())
            .bind(&draft.correct_answer)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(QuizCreation::Created(quiz_id_from_i64(quiz_id)?))
    }

    async fn quiz_id_for_course(&self, course: &CourseId) -> Result<Option<QuizId>, StorageError> {
        let row = sqlx::query("SELECT id FROM quizzes WHERE course_uuid = ?1")
            .bind(course.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|row| quiz_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?))
            .transpose()
    }

    async fn pending_questions(
        &self,
        course: &CourseId,
    ) -> Result<Vec<QuestionRecord>, StorageError> {
        let playable: Vec<&str> = QuestionType::ALL
            .into_iter()
            .filter(|kind| kind.is_playable())
            .map(QuestionType::as_str)
            .collect();
        let placeholders = (0..playable.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r"{QUESTION_COLUMNS}
                WHERE qz.course_uuid = ?1
                  AND qt.name IN ({placeholders})
                  AND NOT EXISTS (
                      SELECT 1 FROM user_answers ua
                      WHERE ua.question_id = q.id AND ua.is_correct = 1
                  )
                ORDER BY q.id ASC
            "
        );

        let mut query = sqlx::query(&sql).bind(course.as_str());
        for name in playable {
            query = query.bind(name);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;

        rows.iter().map(map_question_row).collect()
    }
}

impl SqliteRepository {
    /// Insert a question row verbatim, skipping every domain check.
    ///
    /// Only for tests that need rows a damaged database could contain.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the insert fails.
    #[doc(hidden)]
    pub async fn insert_raw_question(&self, record: &QuestionRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO questions (
                    id, quiz_id, question_type_id, question_text,
                    explanation, answer_choices, correct_answer
                )
                VALUES (
                    ?1, ?2,
                    (SELECT id FROM question_types WHERE name = ?3),
                    ?4, ?5, ?6, ?7
                )
            ",
        )
        .bind(id_i64("question_id", record.id.value())?)
        .bind(id_i64("quiz_id", record.quiz_id.value())?)
        .bind(&record.question_type)
        .bind(&record.text)
        .bind(record.explanation.as_deref())
        .bind(&record.answer_choices)
        .bind(&record.correct_answer)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
