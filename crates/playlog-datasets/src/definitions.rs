//! Definition lookups against the Free Dictionary API.
//!
//! Lookups are rate limited and resumable: progress (completed words and
//! failures with their status) is persisted as JSON so an interrupted run
//! picks up where it left off instead of re-hitting the API.

use crate::dictionary::WordList;
use crate::error::Result;
use playlog_core::config::DatasetConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// How often progress is flushed to disk during a run.
const PROGRESS_SAVE_INTERVAL: usize = 50;

/// A fetched definition/etymology pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub definition: String,
    pub etymology: String,
}

/// Resumable fetch progress, keyed by word-file name.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FetchProgress {
    #[serde(default)]
    pub completed: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub failed: BTreeMap<String, BTreeMap<String, String>>,
}

impl FetchProgress {
    /// Load progress from disk; a missing file starts fresh.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Whether a word was already processed (successfully or not).
    pub fn is_done(&self, file_key: &str, word: &str) -> bool {
        self.completed
            .get(file_key)
            .is_some_and(|words| words.iter().any(|w| w == word))
            || self
                .failed
                .get(file_key)
                .is_some_and(|words| words.contains_key(word))
    }

    pub fn record_success(&mut self, file_key: &str, word: &str) {
        self.completed
            .entry(file_key.to_string())
            .or_default()
            .push(word.to_string());
    }

    pub fn record_failure(&mut self, file_key: &str, word: &str, status: impl Into<String>) {
        self.failed
            .entry(file_key.to_string())
            .or_default()
            .insert(word.to_string(), status.into());
    }
}

/// Counts from one fill pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillOutcome {
    pub fetched: usize,
    pub failed: usize,
}

/// Rate-limited client for the Free Dictionary API.
pub struct DefinitionFetcher {
    client: reqwest::Client,
    api_base: String,
    delay: Duration,
}

impl DefinitionFetcher {
    pub fn new(config: &DatasetConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_default();
        let delay = Duration::from_secs_f64(1.0 / config.requests_per_second.max(0.1));
        Self {
            client,
            api_base: config.definition_api_base.trim_end_matches('/').to_string(),
            delay,
        }
    }

    /// One lookup. `Ok(None)` when the API has no entry for the word.
    pub async fn fetch_definition(&self, word: &str) -> Result<Option<Definition>> {
        let url = format!("{}/{}", self.api_base, word.to_lowercase());
        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let entries: Vec<ApiEntry> = response.error_for_status()?.json().await?;
        Ok(parse_api_response(&entries))
    }

    /// Fill in missing definitions for one word list, updating it in place.
    ///
    /// Words that already have a definition, reference a base word, or were
    /// processed in an earlier run are skipped. Individual lookup failures
    /// are recorded in the progress file and do not abort the pass.
    pub async fn fill_missing(
        &self,
        words: &mut WordList,
        file_key: &str,
        progress: &mut FetchProgress,
        progress_path: &Path,
    ) -> Result<FillOutcome> {
        let pending = words_needing_definitions(words, file_key, progress);
        tracing::info!("{}: {} words need definitions", file_key, pending.len());

        let mut outcome = FillOutcome::default();
        for (i, word) in pending.iter().enumerate() {
            match self.fetch_definition(word).await {
                Ok(Some(found)) => {
                    if let Some(entry) = words.get_mut(word) {
                        entry.definition = found.definition;
                        entry.etymology = found.etymology;
                    }
                    progress.record_success(file_key, word);
                    outcome.fetched += 1;
                }
                Ok(None) => {
                    progress.record_failure(file_key, word, "not_found");
                    outcome.failed += 1;
                }
                Err(e) => {
                    tracing::warn!("lookup for {} failed: {}", word, e);
                    progress.record_failure(file_key, word, format!("error: {}", e));
                    outcome.failed += 1;
                }
            }

            if (i + 1) % PROGRESS_SAVE_INTERVAL == 0 {
                progress.save(progress_path)?;
                tracing::debug!(
                    "{}: {}/{} processed, {} fetched",
                    file_key,
                    i + 1,
                    pending.len(),
                    outcome.fetched
                );
            }

            tokio::time::sleep(self.delay).await;
        }

        progress.save(progress_path)?;
        tracing::info!(
            "{}: {} definitions added, {} failed",
            file_key,
            outcome.fetched,
            outcome.failed
        );
        Ok(outcome)
    }
}

/// Words that still need a definition lookup.
fn words_needing_definitions(
    words: &WordList,
    file_key: &str,
    progress: &FetchProgress,
) -> Vec<String> {
    words
        .iter()
        .filter(|(word, info)| {
            info.definition.is_empty() && info.base.is_none() && !progress.is_done(file_key, word)
        })
        .map(|(word, _)| word.clone())
        .collect()
}

#[derive(Debug, Deserialize)]
struct ApiEntry {
    #[serde(default)]
    meanings: Vec<ApiMeaning>,
    origin: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMeaning {
    #[serde(rename = "partOfSpeech")]
    part_of_speech: Option<String>,
    #[serde(default)]
    definitions: Vec<ApiDefinition>,
}

#[derive(Debug, Deserialize)]
struct ApiDefinition {
    definition: Option<String>,
}

/// First usable definition (prefixed with its part of speech) and the entry
/// origin as etymology. `None` when the response carries neither.
fn parse_api_response(entries: &[ApiEntry]) -> Option<Definition> {
    let entry = entries.first()?;

    let mut definition = String::new();
    for meaning in &entry.meanings {
        let first = meaning
            .definitions
            .first()
            .and_then(|d| d.definition.as_deref())
            .filter(|d| !d.is_empty());
        if let Some(text) = first {
            definition = match meaning.part_of_speech.as_deref() {
                Some(pos) if !pos.is_empty() => format!("({}) {}", pos, text),
                _ => text.to_string(),
            };
            break;
        }
    }

    let etymology = entry.origin.clone().unwrap_or_default();
    if definition.is_empty() && etymology.is_empty() {
        None
    } else {
        Some(Definition {
            definition,
            etymology,
        })
    }
}
