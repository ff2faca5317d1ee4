use async_trait::async_trait;

use crate::domain::pull_request::GeneratedSummary;
use crate::error::AppResult;

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    /// Produce a synthetic title and summary for a pull request diff.
    async fn summarize_diff(
        &self,
        diff: &str,
        original_title: &str,
    ) -> AppResult<GeneratedSummary>;
}
