use std::sync::Arc;

use recall_core::model::{CourseId, QuizStats};
use storage::repository::StatsRepository;

use crate::error::StatsError;

/// Read-only correctness statistics, recomputed from the answer log on every call.
#[derive(Clone)]
pub struct StatsService {
    stats: Arc<dyn StatsRepository>,
}

impl StatsService {
    #[must_use]
    pub fn new(stats: Arc<dyn StatsRepository>) -> Self {
        Self { stats }
    }

    /// Stats for one course. A course without a quiz reports zero counts.
    ///
    /// # Errors
    ///
    /// Returns `StatsError` if the query fails or the counts are inconsistent.
    pub async fn compute_stats(&self, course: &CourseId) -> Result<QuizStats, StatsError> {
        match self.stats.course_stats(course).await? {
            Some(record) => Ok(record.into_stats()?),
            None => Ok(QuizStats::empty(course.clone())),
        }
    }

    /// Stats for every stored quiz, ordered by course id.
    ///
    /// # Errors
    ///
    /// Returns `StatsError` if the query fails or any counts are inconsistent.
    pub async fn all_stats(&self) -> Result<Vec<QuizStats>, StatsError> {
        let records = self.stats.all_stats().await?;
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            out.push(record.into_stats()?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::model::{AnswerEvent, Correctness, NewQuiz, QuestionDraft};
    use recall_core::time::fixed_now;
    use storage::repository::{AnswerLogRepository, InMemoryRepository, QuizRepository};

    #[tokio::test]
    async fn unknown_course_is_no_data() {
        let svc = StatsService::new(Arc::new(InMemoryRepository::new()));
        let stats = svc
            .compute_stats(&CourseId::new("missing").unwrap())
            .await
            .unwrap();
        assert_eq!(stats.question_count(), 0);
        assert_eq!(stats.correctness(), Correctness::NoData);
    }

    #[tokio::test]
    async fn stats_follow_the_answer_log() {
        let repo = InMemoryRepository::new();
        let course = CourseId::new("C1").unwrap();
        repo.create_quiz(&NewQuiz {
            course_id: course.clone(),
            questions: vec![
                QuestionDraft::multiple_choice("Q1", &["a", "b"], "a", None),
                QuestionDraft::multiple_choice("Q2", &["a", "b"], "b", None),
            ],
        })
        .await
        .unwrap();
        let svc = StatsService::new(Arc::new(repo.clone()));

        let before = svc.compute_stats(&course).await.unwrap();
        assert_eq!(before.correctness(), Correctness::NoData);

        let q = repo.pending_questions(&course).await.unwrap()[0].id;
        for correct in [false, false, true, false] {
            repo.append_answer(&AnswerEvent::new(q, "x", correct, fixed_now()))
                .await
                .unwrap();
        }

        let after = svc.compute_stats(&course).await.unwrap();
        assert_eq!(after.question_count(), 2);
        assert_eq!(after.total_answers(), 4);
        assert_eq!(after.correct_answers(), 1);
        assert_eq!(after.correctness(), Correctness::Rate(25.0));
        assert_eq!(svc.all_stats().await.unwrap(), vec![after]);
    }
}
