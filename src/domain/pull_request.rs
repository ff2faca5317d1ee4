/// A merged pull request as listed from the hosting platform.
#[derive(Debug, Clone)]
pub struct MergedPullRequest {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub merged_at: String,
}

/// Title and summary produced by the language model for one diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedSummary {
    pub title: String,
    pub summary: String,
}

impl GeneratedSummary {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.summary.is_empty()
    }
}

/// One output row: the original PR text next to the generated text.
#[derive(Debug, Clone)]
pub struct PrRecord {
    pub number: u64,
    pub original_title: String,
    pub original_body: String,
    pub generated: GeneratedSummary,
}
