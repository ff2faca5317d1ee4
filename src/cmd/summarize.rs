use std::path::PathBuf;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::summarize::{SummarizeOutcome, summarize_merged_prs};

#[derive(Debug, Clone)]
pub struct SummarizeCommandArgs {
    pub repo: Option<String>,
    pub count: usize,
    pub output: PathBuf,
}

pub async fn run(ctx: &AppContext, args: SummarizeCommandArgs) -> AppResult<SummarizeOutcome> {
    summarize_merged_prs(ctx, args.repo, args.count, args.output).await
}
