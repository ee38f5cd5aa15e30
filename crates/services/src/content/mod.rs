//! Course material used as the input for question generation.

mod http;

use std::sync::Arc;

use async_trait::async_trait;
use recall_core::model::CourseId;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::ContentError;

pub use http::{HttpContentConfig, HttpContentSource};

/// Upper bound on concurrent lesson downloads.
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 8;

/// Lesson as listed in a course outline, before its body is downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Chapter {
    pub lessons: Vec<LessonRef>,
}

/// Course metadata and lesson list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseOutline {
    pub course_id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub chapters: Vec<Chapter>,
}

impl CourseOutline {
    /// Lessons of every chapter, in course order.
    pub fn lessons(&self) -> impl Iterator<Item = &LessonRef> {
        self.chapters.iter().flat_map(|chapter| chapter.lessons.iter())
    }
}

/// A downloaded lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub body: String,
}

/// A lesson that could not be downloaded; the rest of the course is still usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonFailure {
    pub lesson_id: String,
    pub reason: String,
}

/// Course outline plus every lesson body that could be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseBundle {
    pub course_id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub lessons: Vec<Lesson>,
    pub failures: Vec<LessonFailure>,
}

impl CourseBundle {
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.lessons.is_empty()
    }
}

/// Where course outlines and lesson bodies come from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the outline of a course.
    async fn fetch_course(&self, course: &CourseId) -> Result<CourseOutline, ContentError>;

    /// Fetch the markdown body of a single lesson.
    async fn fetch_lesson(&self, lesson_id: &str) -> Result<String, ContentError>;
}

/// Download a course and its lesson bodies.
///
/// Lessons are fetched through a pool of at most `concurrency` in-flight
/// requests and joined before returning. Lessons that fail are reported in
/// `CourseBundle::failures`; the rest keep their outline order.
///
/// # Errors
///
/// Returns `ContentError` if the outline cannot be fetched or a download task
/// panics.
pub async fn assemble_course(
    source: Arc<dyn ContentSource>,
    course: &CourseId,
    concurrency: usize,
) -> Result<CourseBundle, ContentError> {
    let outline = source.fetch_course(course).await?;
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (position, lesson) in outline.lessons().cloned().enumerate() {
        let source = Arc::clone(&source);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let body = match semaphore.acquire_owned().await {
                Ok(_permit) => source.fetch_lesson(&lesson.id).await,
                Err(_) => Err(ContentError::Join("download pool closed".into())),
            };
            (position, lesson, body)
        });
    }

    let mut lessons = Vec::new();
    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (position, lesson, body) = joined.map_err(|err| ContentError::Join(err.to_string()))?;
        match body {
            Ok(body) => lessons.push((
                position,
                Lesson {
                    id: lesson.id,
                    title: lesson.title,
                    body,
                },
            )),
            Err(err) => {
                warn!(%course, lesson = %lesson.id, error = %err, "lesson download failed");
                failures.push(LessonFailure {
                    lesson_id: lesson.id,
                    reason: err.to_string(),
                });
            }
        }
    }
    lessons.sort_by_key(|(position, _)| *position);
    failures.sort_by(|a, b| a.lesson_id.cmp(&b.lesson_id));

    debug!(
        %course,
        lessons = lessons.len(),
        failed = failures.len(),
        "assembled course content"
    );

    Ok(CourseBundle {
        course_id: outline.course_id,
        title: outline.title,
        description: outline.description,
        lessons: lessons.into_iter().map(|(_, lesson)| lesson).collect(),
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        lessons: usize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeSource {
        fn new(lessons: usize) -> Self {
            Self {
                lessons,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContentSource for FakeSource {
        async fn fetch_course(&self, course: &CourseId) -> Result<CourseOutline, ContentError> {
            let lessons = (0..self.lessons)
                .map(|i| LessonRef {
                    id: format!("L{i:02}"),
                    title: format!("Lesson {i}"),
                })
                .collect::<Vec<_>>();
            let (first, second) = lessons.split_at(self.lessons / 2);
            Ok(CourseOutline {
                course_id: course.clone(),
                title: "Learn Things".into(),
                description: None,
                chapters: vec![
                    Chapter {
                        lessons: first.to_vec(),
                    },
                    Chapter {
                        lessons: second.to_vec(),
                    },
                ],
            })
        }

        async fn fetch_lesson(&self, lesson_id: &str) -> Result<String, ContentError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if lesson_id.ends_with('3') {
                Err(ContentError::EmptyLesson(lesson_id.to_owned()))
            } else {
                Ok(format!("# {lesson_id}"))
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn failed_lessons_do_not_sink_the_course() {
        let source = Arc::new(FakeSource::new(10));
        let bundle = assemble_course(source.clone(), &CourseId::new("C1").unwrap(), 3)
            .await
            .unwrap();

        assert_eq!(bundle.title, "Learn Things");
        assert_eq!(bundle.lessons.len(), 9);
        assert!(bundle.has_content());
        let ids: Vec<_> = bundle.lessons.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(
            ids,
            ["L00", "L01", "L02", "L04", "L05", "L06", "L07", "L08", "L09"]
        );
        assert_eq!(bundle.lessons[0].body, "# L00");

        assert_eq!(bundle.failures.len(), 1);
        assert_eq!(bundle.failures[0].lesson_id, "L03");
        assert!(source.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn zero_concurrency_still_makes_progress() {
        let source = Arc::new(FakeSource::new(2));
        let bundle = assemble_course(source, &CourseId::new("C1").unwrap(), 0)
            .await
            .unwrap();
        assert_eq!(bundle.lessons.len(), 2);
    }
}
