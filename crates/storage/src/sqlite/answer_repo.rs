use recall_core::model::{AnswerEvent, QuestionId};

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_answer_row};
use crate::repository::{AnswerLogRepository, AnswerLogRow, StorageError};

#[async_trait::async_trait]
impl AnswerLogRepository for SqliteRepository {
    async fn append_answer(&self, event: &AnswerEvent) -> Result<i64, StorageError> {
        let question_id = id_i64("question_id", event.question_id.value())?;

        let res = sqlx::query(
            r"
                INSERT INTO user_answers (question_id, user_answer, is_correct, answered_at)
                VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(question_id)
        .bind(&event.submitted)
        .bind(i64::from(event.is_correct))
        .bind(event.answered_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StorageError::Conflict,
            other => conn(other),
        })?;

        Ok(res.last_insert_rowid())
    }

    async fn answers_for_question(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<AnswerLogRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, question_id, user_answer, is_correct, answered_at
                FROM user_answers
                WHERE question_id = ?1
                ORDER BY id ASC
            ",
        )
        .bind(id_i64("question_id", question_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_answer_row(&row)?);
        }
        Ok(out)
    }
}
