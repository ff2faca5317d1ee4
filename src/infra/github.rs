use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
};
use serde::Deserialize;

use crate::domain::pull_request::MergedPullRequest;
use crate::domain::repo::RepoRef;
use crate::error::{AppError, AppResult};
use crate::services::HostingService;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT_VALUE: &str = concat!("prsum/", env!("CARGO_PKG_VERSION"));
const PAGE_SIZE: usize = 100;

pub struct GitHubClient {
    http: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE.to_string())
    }

    pub fn with_api_base(token: Option<String>, api_base: String) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn token(&self) -> AppResult<&str> {
        self.token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Configuration("GitHub token not configured".to_string()))
    }

    fn pulls_endpoint(&self, repo: &RepoRef) -> String {
        format!("{}/repos/{}/{}/pulls", self.api_base, repo.owner, repo.name)
    }

    async fn status_error(repo: &RepoRef, response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                AppError::Auth(format!("GitHub rejected the token ({status}): {body}"))
            }
            StatusCode::NOT_FOUND => AppError::NotFound(repo.slug()),
            _ => AppError::Hosting(format!("GitHub responded with {status}: {body}")),
        }
    }
}

#[async_trait]
impl HostingService for GitHubClient {
    async fn list_merged_prs(
        &self,
        repo: &RepoRef,
        count: usize,
    ) -> AppResult<Vec<MergedPullRequest>> {
        let token = self.token()?;
        let endpoint = self.pulls_endpoint(repo);

        let mut merged = Vec::with_capacity(count);
        let mut page = 1u32;

        while merged.len() < count {
            let per_page = PAGE_SIZE.to_string();
            let page_param = page.to_string();
            let response = self
                .http
                .get(&endpoint)
                .query(&[
                    ("state", "closed"),
                    ("sort", "updated"),
                    ("direction", "desc"),
                    ("per_page", per_page.as_str()),
                    ("page", page_param.as_str()),
                ])
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .header(ACCEPT, "application/vnd.github+json")
                .header(USER_AGENT, USER_AGENT_VALUE)
                .send()
                .await
                .map_err(|err| AppError::Hosting(format!("failed to call GitHub: {err}")))?;

            if !response.status().is_success() {
                return Err(Self::status_error(repo, response).await);
            }

            let batch: Vec<PullListEntry> = response.json().await.map_err(|err| {
                AppError::Hosting(format!("failed to parse GitHub response: {err}"))
            })?;
            if batch.is_empty() {
                break;
            }

            collect_merged(batch, count, &mut merged);
            page += 1;
        }

        Ok(merged)
    }

    async fn fetch_diff(&self, repo: &RepoRef, number: u64) -> AppResult<String> {
        let token = self.token()?;
        let url = format!("{}/{number}", self.pulls_endpoint(repo));

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/vnd.github.v3.diff")
            .header(USER_AGENT, USER_AGENT_VALUE)
            .send()
            .await
            .map_err(|err| AppError::Fetch(format!("PR #{number}: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!(
                "PR #{number}: GitHub responded with {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|err| AppError::Fetch(format!("PR #{number}: {err}")))
    }
}

/// Keep merged entries from one listing page, stopping at `count` total.
fn collect_merged(batch: Vec<PullListEntry>, count: usize, merged: &mut Vec<MergedPullRequest>) {
    for entry in batch {
        if merged.len() == count {
            break;
        }
        let Some(merged_at) = entry.merged_at else {
            continue;
        };
        merged.push(MergedPullRequest {
            number: entry.number,
            title: entry.title.unwrap_or_default(),
            body: entry.body.unwrap_or_default(),
            merged_at,
        });
    }
}

#[derive(Deserialize)]
struct PullListEntry {
    number: u64,
    title: Option<String>,
    body: Option<String>,
    merged_at: Option<String>,
}
