use std::env;

use async_trait::async_trait;
use recall_core::model::CourseId;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{Chapter, ContentSource, CourseOutline, LessonRef};
use crate::error::ContentError;

#[derive(Clone, Debug)]
pub struct HttpContentConfig {
    pub base_url: String,
    pub token: Option<String>,
}

impl HttpContentConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env::var("RECALL_API_BASE_URL").unwrap_or_else(|_| "https://api.boot.dev".into());
        let token = env::var("RECALL_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        Self { base_url, token }
    }
}

/// Fetches courses and lessons from the learning platform's JSON API.
#[derive(Clone)]
pub struct HttpContentSource {
    client: Client,
    config: HttpContentConfig,
}

impl HttpContentSource {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(HttpContentConfig::from_env())
    }

    #[must_use]
    pub fn new(config: HttpContentConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ContentError> {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let mut request = self.client.get(url);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ContentError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch_course(&self, course: &CourseId) -> Result<CourseOutline, ContentError> {
        let body: CourseResponse = self.get_json(&format!("/v1/courses/{course}")).await?;
        Ok(body.into_outline(course.clone()))
    }

    async fn fetch_lesson(&self, lesson_id: &str) -> Result<String, ContentError> {
        let body: LessonResponse = self
            .get_json(&format!("/v1/static/lessons/{lesson_id}"))
            .await?;
        body.lesson
            .readme()
            .map(ToOwned::to_owned)
            .ok_or_else(|| ContentError::EmptyLesson(lesson_id.to_owned()))
    }
}

#[derive(Debug, Deserialize)]
struct CourseResponse {
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "ShortDescription", default)]
    description: Option<String>,
    #[serde(rename = "Chapters", default)]
    chapters: Vec<ChapterResponse>,
}

impl CourseResponse {
    fn into_outline(self, course_id: CourseId) -> CourseOutline {
        CourseOutline {
            course_id,
            title: self.title,
            description: self.description.filter(|d| !d.trim().is_empty()),
            chapters: self
                .chapters
                .into_iter()
                .map(|chapter| Chapter {
                    lessons: chapter
                        .lessons
                        .into_iter()
                        .map(|lesson| LessonRef {
                            id: lesson.uuid,
                            title: lesson.title,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChapterResponse {
    #[serde(rename = "Lessons", default)]
    lessons: Vec<LessonRefResponse>,
}

#[derive(Debug, Deserialize)]
struct LessonRefResponse {
    #[serde(rename = "UUID")]
    uuid: String,
    #[serde(rename = "Title", default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct LessonResponse {
    #[serde(rename = "Lesson")]
    lesson: LessonBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LessonBody {
    #[serde(default)]
    lesson_data_code_completion: Option<LessonData>,
    #[serde(default)]
    lesson_data_multiple_choice: Option<LessonData>,
    #[serde(default)]
    lesson_data_code_tests: Option<LessonData>,
    #[serde(rename = "LessonDataCLI", default)]
    lesson_data_cli: Option<LessonData>,
    #[serde(default)]
    lesson_data_text_input: Option<LessonData>,
    #[serde(default)]
    lesson_data_manual: Option<LessonData>,
}

#[derive(Debug, Default, Deserialize)]
struct LessonData {
    #[serde(rename = "Readme", default)]
    readme: String,
}

impl LessonBody {
    /// First non-empty readme, checked in a fixed variant order.
    fn readme(&self) -> Option<&str> {
        [
            &self.lesson_data_code_completion,
            &self.lesson_data_multiple_choice,
            &self.lesson_data_code_tests,
            &self.lesson_data_cli,
            &self.lesson_data_text_input,
            &self.lesson_data_manual,
        ]
        .into_iter()
        .flatten()
        .map(|data| data.readme.as_str())
        .find(|readme| !readme.trim().is_empty())
    }
}
