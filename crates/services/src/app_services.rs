use std::sync::Arc;

use storage::repository::Storage;
use storage::sqlite::SqliteRepository;
use tracing::debug;

use crate::Clock;
use crate::content::ContentSource;
use crate::error::AppServicesError;
use crate::generation::GenerationService;
use crate::generator::QuestionGenerator;
use crate::quiz_service::QuizService;
use crate::stats_service::StatsService;

/// Assembles app-facing services over one explicitly opened storage handle.
///
/// The owner must call `close` on every exit path so the pool is shut down.
pub struct AppServices {
    sqlite: Option<SqliteRepository>,
    quizzes: QuizService,
    stats: StatsService,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, migrating the schema first.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if connecting or migrating fails.
    pub async fn open_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let sqlite = SqliteRepository::open(db_url).await?;
        debug!(db_url, "opened sqlite storage");
        let mut services = Self::from_storage(&sqlite.storage(), clock);
        services.sqlite = Some(sqlite);
        Ok(services)
    }

    /// Build services over an already assembled `Storage`.
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        Self {
            sqlite: None,
            quizzes: QuizService::new(
                clock,
                Arc::clone(&storage.quizzes),
                Arc::clone(&storage.answers),
            ),
            stats: StatsService::new(Arc::clone(&storage.stats)),
        }
    }

    #[must_use]
    pub fn quiz_service(&self) -> QuizService {
        self.quizzes.clone()
    }

    #[must_use]
    pub fn stats_service(&self) -> StatsService {
        self.stats.clone()
    }

    #[must_use]
    pub fn generation_service(
        &self,
        content: Arc<dyn ContentSource>,
        generator: Arc<dyn QuestionGenerator>,
    ) -> GenerationService {
        GenerationService::new(content, generator, self.quizzes.clone())
    }

    /// Close the underlying pool, if any.
    pub async fn close(self) {
        if let Some(sqlite) = self.sqlite {
            sqlite.close().await;
            debug!("closed sqlite storage");
        }
    }
}
