use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OUTPUT_FILE: &str = "results.csv";

const CONFIG_DIR_NAME: &str = "prsum";
const CONFIG_FILE_NAME: &str = "config.json";

/// Configuration persisted by `prsum config init`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    pub github_token: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub llm_provider: Option<String>,
    pub default_repo: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        let path = config_file_path()?;
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        let path = config_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to encode config: {err}")))?;
        fs::write(&path, data)?;
        Ok(())
    }
}

/// Resolved runtime configuration: stored values with environment overrides.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github_token: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub llm_provider: LlmProvider,
    pub default_repo: Option<String>,
}

#[derive(Debug, Clone)]
pub enum LlmProvider {
    Gemini,
    Custom(String),
}

impl LlmProvider {
    fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "" | "gemini" => LlmProvider::Gemini,
            other => LlmProvider::Custom(other.to_string()),
        }
    }
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;

        let github_token = env::var("GITHUB_TOKEN").ok().or(stored.github_token);
        let gemini_api_key = env::var("GEMINI_API_KEY").ok().or(stored.gemini_api_key);
        let gemini_model = stored
            .gemini_model
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let llm_provider = env::var("PRSUM_LLM_PROVIDER")
            .ok()
            .or(stored.llm_provider)
            .map(|name| LlmProvider::from_name(&name))
            .unwrap_or(LlmProvider::Gemini);

        Ok(Self {
            github_token,
            gemini_api_key,
            gemini_model,
            llm_provider,
            default_repo: stored.default_repo,
        })
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    if let Ok(dir) = env::var("XDG_CONFIG_HOME") {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir).join(CONFIG_DIR_NAME));
        }
    }
    let home = env::var("HOME")
        .map_err(|_| AppError::Configuration("HOME environment variable not set".to_string()))?;
    Ok(PathBuf::from(home).join(".config").join(CONFIG_DIR_NAME))
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}
