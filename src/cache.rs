use std::fs;
use std::path::PathBuf;

use blake3::Hasher;
use serde::{Deserialize, Serialize};

use crate::config::config_directory;
use crate::domain::pull_request::GeneratedSummary;
use crate::error::{AppError, AppResult};

const CACHE_FILE_NAME: &str = "summary_cache.json";
const CACHE_LIMIT: usize = 64;

#[derive(Default, Serialize, Deserialize)]
struct CacheFile {
    entries: Vec<CacheEntry>,
}

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    key: String,
    title: String,
    summary: String,
}

/// Cache of generated summaries keyed by diff content, so re-runs over the
/// same PRs skip the model call.
pub struct SummaryCache {
    file_path: PathBuf,
    file: CacheFile,
}

impl SummaryCache {
    pub fn load() -> AppResult<Self> {
        let path = config_directory()?.join(CACHE_FILE_NAME);
        Self::open(path)
    }

    pub fn open(path: PathBuf) -> AppResult<Self> {
        let file = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<CacheFile>(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid cache file: {err}")))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => CacheFile::default(),
            Err(err) => return Err(AppError::Io(err)),
        };

        Ok(Self {
            file_path: path,
            file,
        })
    }

    pub fn get(&self, key: &str) -> Option<GeneratedSummary> {
        self.file
            .entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| GeneratedSummary {
                title: entry.title.clone(),
                summary: entry.summary.clone(),
            })
    }

    pub fn insert(&mut self, key: String, generated: &GeneratedSummary) {
        self.file.entries.retain(|entry| entry.key != key);
        self.file.entries.push(CacheEntry {
            key,
            title: generated.title.clone(),
            summary: generated.summary.clone(),
        });

        if self.file.entries.len() > CACHE_LIMIT {
            let overflow = self.file.entries.len() - CACHE_LIMIT;
            self.file.entries.drain(0..overflow);
        }
    }

    pub fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.file)
            .map_err(|err| AppError::Configuration(format!("failed to write cache: {err}")))?;
        fs::write(&self.file_path, data)?;
        Ok(())
    }

    pub fn compute_key(diff: &str, original_title: &str, model: &str) -> String {
        let mut hasher = Hasher::new();
        hasher.update(diff.as_bytes());
        hasher.update(original_title.as_bytes());
        hasher.update(model.as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}
