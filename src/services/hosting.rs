use async_trait::async_trait;

use crate::domain::pull_request::MergedPullRequest;
use crate::domain::repo::RepoRef;
use crate::error::AppResult;

#[async_trait]
pub trait HostingService: Send + Sync {
    /// List up to `count` merged pull requests, most recently merged first.
    /// Returns fewer when the repository has fewer merged PRs.
    async fn list_merged_prs(
        &self,
        repo: &RepoRef,
        count: usize,
    ) -> AppResult<Vec<MergedPullRequest>>;

    /// Fetch the unified diff text for one pull request.
    async fn fetch_diff(&self, repo: &RepoRef, number: u64) -> AppResult<String>;
}
