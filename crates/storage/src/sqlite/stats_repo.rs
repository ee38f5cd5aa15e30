use recall_core::model::CourseId;

use super::SqliteRepository;
use super::mapping::{conn, map_stats_row};
use crate::repository::{StatsRecord, StatsRepository, StorageError};

// Answers are counted per question row, so the DISTINCT on question ids keeps
// the question count honest across the answer join fan-out.
const STATS_SELECT: &str = r"
    SELECT
        qz.course_uuid,
        COUNT(DISTINCT q.id) AS question_count,
        COUNT(ua.id) AS total_answers,
        COALESCE(SUM(CASE WHEN ua.is_correct = 1 THEN 1 ELSE 0 END), 0) AS correct_answers
    FROM quizzes qz
    LEFT JOIN questions q ON qz.id = q.quiz_id
    LEFT JOIN user_answers ua ON q.id = ua.question_id
";

#[async_trait::async_trait]
impl StatsRepository for SqliteRepository {
    async fn course_stats(&self, course: &CourseId) -> Result<Option<StatsRecord>, StorageError> {
        let sql = format!(
            "{STATS_SELECT}
             WHERE qz.course_uuid = ?1
             GROUP BY qz.course_uuid"
        );

        let row = sqlx::query(&sql)
            .bind(course.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_stats_row).transpose()
    }

    async fn all_stats(&self) -> Result<Vec<StatsRecord>, StorageError> {
        let sql = format!(
            "{STATS_SELECT}
             GROUP BY qz.course_uuid
             ORDER BY qz.course_uuid"
        );

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_stats_row).collect()
    }
}
