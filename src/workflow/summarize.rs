use std::path::PathBuf;

use crate::cache::SummaryCache;
use crate::context::AppContext;
use crate::domain::pull_request::{GeneratedSummary, MergedPullRequest, PrRecord};
use crate::domain::repo::RepoRef;
use crate::error::{AppError, AppResult};
use crate::report;

pub struct SummarizeOutcome {
    pub rows_written: usize,
    pub output_path: PathBuf,
}

pub async fn summarize_merged_prs(
    ctx: &AppContext,
    repo_url: Option<String>,
    count: usize,
    output_path: PathBuf,
) -> AppResult<SummarizeOutcome> {
    if count == 0 {
        return Err(AppError::Configuration(
            "PR count must be a positive integer".to_string(),
        ));
    }
    let repo_url = repo_url
        .or_else(|| ctx.config.default_repo.clone())
        .ok_or_else(|| AppError::Configuration("no repository configured".to_string()))?;
    let repo = RepoRef::parse(&repo_url)?;

    println!("Fetching last {count} merged PRs from {}...", repo.slug());
    let prs = ctx.hosting.list_merged_prs(&repo, count).await?;

    if prs.is_empty() {
        println!("No merged PRs found.");
    } else if prs.len() < count {
        println!("Only {} merged PRs found.", prs.len());
    } else {
        println!("{} merged PRs collected.", prs.len());
    }

    let mut cache = SummaryCache::load()?;
    let records = collect_records(ctx, &repo, prs, Some(&mut cache)).await;
    cache.save()?;

    report::write_report(&output_path, &records)?;

    Ok(SummarizeOutcome {
        rows_written: records.len(),
        output_path,
    })
}

/// Run the per-PR stages: fetch the diff, then ask the model for a title and
/// summary. Fetch and model failures are reported and leave the generated
/// fields empty; the row is always kept.
async fn collect_records(
    ctx: &AppContext,
    repo: &RepoRef,
    prs: Vec<MergedPullRequest>,
    mut cache: Option<&mut SummaryCache>,
) -> Vec<PrRecord> {
    let mut records = Vec::with_capacity(prs.len());

    for pr in prs {
        println!("\nProcessing PR #{}", pr.number);

        let diff = match ctx.hosting.fetch_diff(repo, pr.number).await {
            Ok(diff) => diff,
            Err(err) => {
                eprintln!("Warning: PR #{}: {err}", pr.number);
                String::new()
            }
        };
        println!("Diff size: {} characters", diff.chars().count());

        let generated = if diff.is_empty() {
            GeneratedSummary::default()
        } else {
            summarize_one(ctx, &diff, &pr.title, cache.as_deref_mut()).await
        };

        records.push(PrRecord {
            number: pr.number,
            original_title: pr.title,
            original_body: pr.body,
            generated,
        });
    }

    records
}

async fn summarize_one(
    ctx: &AppContext,
    diff: &str,
    original_title: &str,
    cache: Option<&mut SummaryCache>,
) -> GeneratedSummary {
    let key = SummaryCache::compute_key(diff, original_title, &ctx.config.gemini_model);
    if let Some(hit) = cache.as_ref().and_then(|cache| cache.get(&key)) {
        return hit;
    }

    match ctx.language_model.summarize_diff(diff, original_title).await {
        Ok(generated) => {
            if let Some(cache) = cache {
                cache.insert(key, &generated);
            }
            generated
        }
        Err(err) => {
            eprintln!("Warning: {err}");
            GeneratedSummary::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::config::{AppConfig, LlmProvider};
    use crate::domain::pull_request::MergedPullRequest;
    use crate::services::{HostingService, LanguageModelService};

    struct FakeHosting {
        prs: Vec<MergedPullRequest>,
        failing_diffs: Vec<u64>,
        auth_fails: bool,
    }

    #[async_trait]
    impl HostingService for FakeHosting {
        async fn list_merged_prs(
            &self,
            _repo: &RepoRef,
            count: usize,
        ) -> AppResult<Vec<MergedPullRequest>> {
            if self.auth_fails {
                return Err(AppError::Auth("bad token".to_string()));
            }
            Ok(self.prs.iter().take(count).cloned().collect())
        }

        async fn fetch_diff(&self, _repo: &RepoRef, number: u64) -> AppResult<String> {
            if self.failing_diffs.contains(&number) {
                return Err(AppError::Fetch(format!("PR #{number}: boom")));
            }
            Ok(format!("diff for #{number}"))
        }
    }

    struct FakeModel;

    #[async_trait]
    impl LanguageModelService for FakeModel {
        async fn summarize_diff(
            &self,
            diff: &str,
            _original_title: &str,
        ) -> AppResult<GeneratedSummary> {
            Ok(GeneratedSummary {
                title: format!("generated: {diff}"),
                summary: "summary".to_string(),
            })
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModelService for FailingModel {
        async fn summarize_diff(&self, _diff: &str, _title: &str) -> AppResult<GeneratedSummary> {
            Err(AppError::LanguageModel("model down".to_string()))
        }
    }

    fn merged_pr(number: u64) -> MergedPullRequest {
        MergedPullRequest {
            number,
            title: format!("PR {number}"),
            body: format!("body {number}"),
            merged_at: "2026-08-01T00:00:00Z".to_string(),
        }
    }

    fn test_context(hosting: FakeHosting, model: Arc<dyn LanguageModelService>) -> AppContext {
        AppContext::new(
            AppConfig {
                github_token: Some("t".to_string()),
                gemini_api_key: Some("k".to_string()),
                gemini_model: "test-model".to_string(),
                llm_provider: LlmProvider::Gemini,
                default_repo: None,
            },
            Arc::new(hosting),
            model,
        )
    }

    fn repo() -> RepoRef {
        RepoRef::parse("owner/repo").unwrap()
    }

    #[tokio::test]
    async fn produces_one_record_per_pr_in_listing_order() {
        let hosting = FakeHosting {
            prs: vec![merged_pr(9), merged_pr(7), merged_pr(5)],
            failing_diffs: vec![],
            auth_fails: false,
        };
        let ctx = test_context(hosting, Arc::new(FakeModel));

        let prs = ctx.hosting.list_merged_prs(&repo(), 3).await.unwrap();
        let records = collect_records(&ctx, &repo(), prs, None).await;

        let numbers: Vec<u64> = records.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![9, 7, 5]);
        assert!(records.iter().all(|r| !r.original_title.is_empty()));
        assert_eq!(records[0].generated.title, "generated: diff for #9");
    }

    #[tokio::test]
    async fn requesting_more_than_available_returns_all_without_error() {
        let hosting = FakeHosting {
            prs: vec![merged_pr(1), merged_pr(2)],
            failing_diffs: vec![],
            auth_fails: false,
        };
        let ctx = test_context(hosting, Arc::new(FakeModel));

        let prs = ctx.hosting.list_merged_prs(&repo(), 10).await.unwrap();
        assert_eq!(prs.len(), 2);
        let records = collect_records(&ctx, &repo(), prs, None).await;
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn failed_diff_fetch_keeps_the_row_with_empty_generated_fields() {
        let hosting = FakeHosting {
            prs: vec![merged_pr(1), merged_pr(2), merged_pr(3)],
            failing_diffs: vec![2],
            auth_fails: false,
        };
        let ctx = test_context(hosting, Arc::new(FakeModel));

        let prs = ctx.hosting.list_merged_prs(&repo(), 3).await.unwrap();
        let records = collect_records(&ctx, &repo(), prs, None).await;

        assert_eq!(records.len(), 3);
        assert!(records[1].generated.is_empty());
        assert!(!records[0].generated.is_empty());
        assert!(!records[2].generated.is_empty());
    }

    #[tokio::test]
    async fn model_failure_keeps_the_row_with_empty_generated_fields() {
        let hosting = FakeHosting {
            prs: vec![merged_pr(1)],
            failing_diffs: vec![],
            auth_fails: false,
        };
        let ctx = test_context(hosting, Arc::new(FailingModel));

        let prs = ctx.hosting.list_merged_prs(&repo(), 1).await.unwrap();
        let records = collect_records(&ctx, &repo(), prs, None).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].original_title, "PR 1");
        assert!(records[0].generated.is_empty());
    }

    #[tokio::test]
    async fn invalid_credential_aborts_before_any_record() {
        let hosting = FakeHosting {
            prs: vec![merged_pr(1)],
            failing_diffs: vec![],
            auth_fails: true,
        };
        let ctx = test_context(hosting, Arc::new(FakeModel));

        let output = std::env::temp_dir().join("prsum-auth-abort-test.csv");
        let result =
            summarize_merged_prs(&ctx, Some("owner/repo".to_string()), 1, output.clone()).await;
        assert!(matches!(result, Err(AppError::Auth(_))));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn cache_hit_bypasses_the_model() {
        let hosting = FakeHosting {
            prs: vec![merged_pr(1)],
            failing_diffs: vec![],
            auth_fails: false,
        };
        // FailingModel: any model call would leave the fields empty.
        let ctx = test_context(hosting, Arc::new(FailingModel));

        let mut cache =
            SummaryCache::open(std::env::temp_dir().join("prsum-wf-cache-missing.json")).unwrap();
        let key = SummaryCache::compute_key("diff for #1", "PR 1", "test-model");
        cache.insert(
            key,
            &GeneratedSummary {
                title: "cached title".to_string(),
                summary: "cached summary".to_string(),
            },
        );

        let prs = ctx.hosting.list_merged_prs(&repo(), 1).await.unwrap();
        let records = collect_records(&ctx, &repo(), prs, Some(&mut cache)).await;
        assert_eq!(records[0].generated.title, "cached title");
    }

    #[tokio::test]
    async fn zero_count_is_rejected_up_front() {
        let hosting = FakeHosting {
            prs: vec![],
            failing_diffs: vec![],
            auth_fails: false,
        };
        let ctx = test_context(hosting, Arc::new(FakeModel));
        let result = summarize_merged_prs(
            &ctx,
            Some("owner/repo".to_string()),
            0,
            std::env::temp_dir().join("prsum-unused.csv"),
        )
        .await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
