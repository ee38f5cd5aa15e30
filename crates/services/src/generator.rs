use std::env;
use std::fmt::Write as _;

use async_trait::async_trait;
use recall_core::model::{QuestionDraft, QuestionType};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::content::CourseBundle;
use crate::error::GeneratorError;

/// Lesson text beyond this many characters is left out of the prompt.
pub const MAX_PROMPT_CONTENT_CHARS: usize = 48_000;

/// Turns course material into candidate questions.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(
        &self,
        course: &CourseBundle,
        count: usize,
    ) -> Result<Vec<QuestionDraft>, GeneratorError>;
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl GeneratorConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("RECALL_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("RECALL_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("RECALL_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Generator backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct ChatQuestionGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl ChatQuestionGenerator {
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn complete(&self, prompt: String) -> Result<String, GeneratorError> {
        let config = &self.config;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeneratorError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GeneratorError::EmptyResponse)
    }
}

#[async_trait]
impl QuestionGenerator for ChatQuestionGenerator {
    async fn generate(
        &self,
        course: &CourseBundle,
        count: usize,
    ) -> Result<Vec<QuestionDraft>, GeneratorError> {
        let prompt = build_prompt(course, count);
        debug!(course = %course.course_id, prompt_len = prompt.len(), "requesting questions");
        let content = self.complete(prompt).await?;
        let mut drafts = parse_questions(&content)?;
        drafts.truncate(count);
        Ok(drafts)
    }
}

/// Build the generation prompt from the course title, description and lessons.
#[must_use]
pub fn build_prompt(course: &CourseBundle, count: usize) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Write {count} multiple choice quiz questions that test understanding of the course below."
    );
    prompt.push_str(
        "Reply with only a JSON array. Each element must be an object with the keys \
         \"question_type\" (always \"multiple_choice\"), \"question_text\", \"explanation\", \
         \"answer_choices\" (an array of 4 strings) and \"correct_answer\" (exactly one of the \
         answer choices).\n\n",
    );
    let _ = writeln!(prompt, "Course: {}", course.title);
    if let Some(description) = &course.description {
        let _ = writeln!(prompt, "Description: {description}");
    }

    let mut budget = MAX_PROMPT_CONTENT_CHARS;
    for lesson in &course.lessons {
        if budget == 0 {
            break;
        }
        let body: String = lesson.body.chars().take(budget).collect();
        budget = budget.saturating_sub(body.chars().count());
        let _ = write!(prompt, "\n## {}\n\n{}\n", lesson.title, body.trim());
    }
    prompt
}

/// Parse a model reply into validated drafts.
///
/// Accepts a bare JSON array or one wrapped in a fenced code block. Elements
/// that do not decode, fail validation, or are not multiple choice are logged
/// and dropped.
///
/// # Errors
///
/// Returns `GeneratorError::Parse` when the reply is not a JSON array and
/// `GeneratorError::NoQuestions` when no element survives.
pub fn parse_questions(raw: &str) -> Result<Vec<QuestionDraft>, GeneratorError> {
    let json = strip_code_fence(raw);
    let items: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|err| GeneratorError::Parse(err.to_string()))?;

    let mut drafts = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let draft = match serde_json::from_value::<QuestionDraft>(item) {
            Ok(draft) => draft,
            Err(err) => {
                warn!(index, error = %err, "dropping undecodable generated question");
                continue;
            }
        };
        if draft.kind != QuestionType::MultipleChoice {
            warn!(index, kind = %draft.kind, "dropping generated question of unsupported type");
            continue;
        }
        match draft.validate() {
            Ok(draft) => drafts.push(draft),
            Err(err) => warn!(index, error = %err, "dropping invalid generated question"),
        }
    }

    if drafts.is_empty() {
        return Err(GeneratorError::NoQuestions);
    }
    Ok(drafts)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string, e.g. ```json
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
