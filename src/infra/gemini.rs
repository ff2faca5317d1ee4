use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::pull_request::GeneratedSummary;
use crate::error::{AppError, AppResult};
use crate::services::LanguageModelService;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Diffs are cut to this many characters before prompting; larger diffs blow
/// past the model context budget without improving the summary.
const DIFF_CHAR_BUDGET: usize = 8000;

pub struct GeminiClient {
    http: Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            model,
        }
    }

    fn api_key(&self) -> AppResult<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AppError::Configuration("Gemini API key not configured".to_string()))
    }

    fn endpoint(&self, api_key: &str) -> String {
        format!(
            "{API_BASE}/models/{}:generateContent?key={api_key}",
            self.model
        )
    }
}

#[async_trait]
impl LanguageModelService for GeminiClient {
    async fn summarize_diff(
        &self,
        diff: &str,
        original_title: &str,
    ) -> AppResult<GeneratedSummary> {
        let api_key = self.api_key()?;
        let prompt = build_prompt(diff, original_title);
        let request = GenerateContentRequest::single_turn(prompt);

        let response = self
            .http
            .post(self.endpoint(api_key))
            .json(&request)
            .send()
            .await
            .map_err(|err| AppError::LanguageModel(format!("failed to call Gemini: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::LanguageModel(format!(
                "Gemini responded with {status}: {body}"
            )));
        }

        let payload: GenerateContentResponse = response.json().await.map_err(|err| {
            AppError::LanguageModel(format!("failed to parse Gemini response: {err}"))
        })?;

        let text = payload.text().ok_or_else(|| {
            AppError::LanguageModel("Gemini returned no candidates".to_string())
        })?;

        parse_reply(&text)
    }
}

/// Build the single-turn prompt, truncating the diff to the context budget.
fn build_prompt(diff: &str, original_title: &str) -> String {
    let diff = truncate_chars(diff, DIFF_CHAR_BUDGET);
    format!(
        "You are a code reviewer assistant.\n\
         Given the following pull request diff, produce:\n\n\
         1) A short, meaningful, professional title for the PR.\n\
         2) A concise summary explaining the change in 2-3 sentences.\n\n\
         Output EXACTLY in this format:\n\n\
         TITLE: <generated title>\n\
         SUMMARY: <generated summary>\n\n\
         For reference, the original title was: {original_title}\n\n\
         DIFF:\n{diff}"
    )
}

fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// Pull the `TITLE:` and `SUMMARY:` lines out of the model reply.
fn parse_reply(text: &str) -> AppResult<GeneratedSummary> {
    let mut generated = GeneratedSummary::default();
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("TITLE:") {
            generated.title = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("SUMMARY:") {
            generated.summary = rest.trim().to_string();
        }
    }

    if generated.is_empty() {
        return Err(AppError::LanguageModel(format!(
            "could not parse TITLE/SUMMARY from model reply: {}",
            truncate_chars(text, 200)
        )));
    }
    Ok(generated)
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

impl GenerateContentRequest {
    fn single_turn(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let part = candidate.content?.parts.into_iter().next()?;
        Some(part.text)
    }
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}
