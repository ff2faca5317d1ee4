mod cache;
mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod report;
mod services;
mod workflow;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::summarize::{self, SummarizeCommandArgs};
use crate::config::{AppConfig, DEFAULT_OUTPUT_FILE, LlmProvider};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::gemini::GeminiClient;
use crate::infra::github::GitHubClient;
use crate::services::LanguageModelService;

#[derive(Parser)]
#[command(
    name = "prsum",
    author,
    version,
    about = "Summarize merged pull requests with a language model"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch recent merged PRs, generate titles and summaries, write a CSV.
    Summarize(SummarizeArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct SummarizeArgs {
    /// Repository URL, e.g. https://github.com/owner/repo.
    #[arg(short, long)]
    repo: Option<String>,
    /// Number of merged PRs to summarize.
    #[arg(short = 'n', long, default_value_t = 10)]
    count: usize,
    /// Output CSV path.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => {
            config_cmd::run(args.command)?;
            Ok(())
        }
        Commands::Summarize(args) => run_summarize(args).await,
    }
}

async fn run_summarize(args: SummarizeArgs) -> AppResult<()> {
    let config = AppConfig::load()?;

    if config.github_token.is_none() {
        eprintln!("Warning: GitHub token not configured; listing and diff fetches will fail.");
    }
    if config.gemini_api_key.is_none() {
        eprintln!("Warning: Gemini API key not configured; summarization will fail.");
    }

    let language_model: Arc<dyn LanguageModelService> = match &config.llm_provider {
        LlmProvider::Gemini => Arc::new(GeminiClient::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
        )),
        LlmProvider::Custom(provider) => {
            eprintln!(
                "Warning: custom LLM provider '{provider}' not yet implemented, using Gemini fallback."
            );
            Arc::new(GeminiClient::new(
                config.gemini_api_key.clone(),
                config.gemini_model.clone(),
            ))
        }
    };

    let hosting = Arc::new(GitHubClient::new(config.github_token.clone()));

    let context = AppContext::new(config, hosting, language_model);

    let outcome = summarize::run(
        &context,
        SummarizeCommandArgs {
            repo: args.repo,
            count: args.count,
            output: args.output,
        },
    )
    .await?;

    println!(
        "\nSaved {} rows to {}",
        outcome.rows_written,
        outcome.output_path.display()
    );

    Ok(())
}
