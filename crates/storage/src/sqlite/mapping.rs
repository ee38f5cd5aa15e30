use recall_core::model::{AnswerEvent, CourseId, QuestionId, QuizId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{AnswerLogRow, QuestionRecord, StatsRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn quiz_id_from_i64(v: i64) -> Result<QuizId, StorageError> {
    Ok(QuizId::new(i64_to_u64("quiz_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<QuestionRecord, StorageError> {
    Ok(QuestionRecord {
        id: question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        quiz_id: quiz_id_from_i64(row.try_get::<i64, _>("quiz_id").map_err(ser)?)?,
        question_type: row.try_get("question_type").map_err(ser)?,
        text: row.try_get("question_text").map_err(ser)?,
        explanation: row.try_get("explanation").map_err(ser)?,
        answer_choices: row.try_get("answer_choices").map_err(ser)?,
        correct_answer: row.try_get("correct_answer").map_err(ser)?,
    })
}

pub(crate) fn map_answer_row(row: &SqliteRow) -> Result<AnswerLogRow, StorageError> {
    let question_id = question_id_from_i64(row.try_get::<i64, _>("question_id").map_err(ser)?)?;
    Ok(AnswerLogRow {
        id: row.try_get("id").map_err(ser)?,
        event: AnswerEvent {
            question_id,
            submitted: row.try_get("user_answer").map_err(ser)?,
            is_correct: row.try_get::<i64, _>("is_correct").map_err(ser)? != 0,
            answered_at: row.try_get("answered_at").map_err(ser)?,
        },
    })
}

pub(crate) fn map_stats_row(row: &SqliteRow) -> Result<StatsRecord, StorageError> {
    let course_id = CourseId::new(row.try_get::<String, _>("course_uuid").map_err(ser)?)
        .map_err(ser)?;
    Ok(StatsRecord {
        course_id,
        question_count: u32_from_i64(
            "question_count",
            row.try_get::<i64, _>("question_count").map_err(ser)?,
        )?,
        total_answers: u32_from_i64(
            "total_answers",
            row.try_get::<i64, _>("total_answers").map_err(ser)?,
        )?,
        correct_answers: u32_from_i64(
            "correct_answers",
            row.try_get::<i64, _>("correct_answers").map_err(ser)?,
        )?,
    })
}
