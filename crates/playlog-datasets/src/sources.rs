//! Dataset sources and the downloader.
//!
//! Datasets arrive three ways: a plain file over HTTP, a gzipped tarball
//! unpacked into a directory, or a git repository cloned locally. Downloads
//! retry with exponential backoff.

use crate::error::{DatasetError, Result};
use futures::StreamExt;
use playlog_core::config::DatasetConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DatasetSource {
    /// A single file fetched over HTTP.
    Http { url: String },
    /// A `.tar.gz` archive fetched over HTTP and unpacked.
    Archive { url: String },
    /// A git repository cloned into the datasets directory.
    Git { repo: String },
}

/// A named third-party dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    #[serde(flatten)]
    pub source: DatasetSource,
}

/// The built-in dataset set: the master word list and a trivia question bank.
pub fn default_datasets(config: &DatasetConfig) -> Vec<Dataset> {
    vec![
        Dataset {
            name: "word-list".into(),
            source: DatasetSource::Http {
                url: config.word_list_url.clone(),
            },
        },
        Dataset {
            name: "trivia-questions".into(),
            source: DatasetSource::Git {
                repo: "https://github.com/uberspot/OpenTriviaQA.git".into(),
            },
        },
    ]
}

/// Downloads datasets with bounded retries.
pub struct DatasetFetcher {
    client: reqwest::Client,
    max_retries: u32,
}

impl DatasetFetcher {
    pub fn new(config: &DatasetConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .unwrap_or_default();
        Self {
            client,
            max_retries: config.max_retries,
        }
    }

    /// Fetch a dataset into `dest_dir`, returning the path it landed at.
    pub async fn fetch(&self, dataset: &Dataset, dest_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dest_dir).await?;
        match &dataset.source {
            DatasetSource::Http { url } => {
                let dest = dest_dir.join(remote_file_name(url)?);
                self.fetch_file(url, &dest).await?;
                Ok(dest)
            }
            DatasetSource::Archive { url } => {
                let dest = dest_dir.join(&dataset.name);
                let bytes = self.get_with_retry(url).await?.bytes().await?;
                unpack_tar_gz(&bytes, &dest)?;
                tracing::info!("unpacked {} into {:?}", dataset.name, dest);
                Ok(dest)
            }
            DatasetSource::Git { repo } => {
                let dest = dest_dir.join(&dataset.name);
                self.fetch_git(repo, &dest)?;
                Ok(dest)
            }
        }
    }

    /// Download the master word list: alphabetic words only, uppercased.
    pub async fn download_word_list(&self, url: &str) -> Result<BTreeSet<String>> {
        tracing::info!("downloading word list from {}", url);
        let body = self.get_with_retry(url).await?.text().await?;
        let words = parse_word_list(&body);
        tracing::info!("downloaded {} words", words.len());
        Ok(words)
    }

    async fn fetch_file(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self.get_with_retry(url).await?;
        let mut stream = response.bytes_stream();
        let mut file = tokio::fs::File::create(dest).await?;
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        tracing::info!("downloaded {} to {:?}", url, dest);
        Ok(())
    }

    fn fetch_git(&self, repo: &str, dest: &Path) -> Result<()> {
        // An existing checkout is left as-is; we never pull over local state.
        if dest.join(".git").exists() {
            tracing::info!("{:?} already cloned, skipping", dest);
            return Ok(());
        }
        tracing::info!("cloning {} into {:?}", repo, dest);
        git2::Repository::clone(repo, dest)?;
        Ok(())
    }

    async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let mut delay = Duration::from_secs(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self
                .client
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status());
            match result {
                Ok(response) => return Ok(response),
                Err(e) if attempt <= self.max_retries => {
                    tracing::warn!("GET {} failed (attempt {}): {}", url, attempt, e);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Keep alphabetic words, uppercase them.
fn parse_word_list(body: &str) -> BTreeSet<String> {
    body.lines()
        .map(str::trim)
        .filter(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_alphabetic()))
        .map(|w| w.to_ascii_uppercase())
        .collect()
}

/// Unpack a gzipped tarball into `dest`.
fn unpack_tar_gz(bytes: &[u8], dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)?;
    let decoder = flate2::read::GzDecoder::new(bytes);
    let mut archive = tar::Archive::new(decoder);
    archive.unpack(dest)?;
    Ok(())
}

/// File name for an HTTP dataset, taken from the last URL path segment.
fn remote_file_name(raw_url: &str) -> Result<String> {
    let url = Url::parse(raw_url)?;
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
        .ok_or_else(|| DatasetError::Download(format!("URL has no file name: {}", raw_url)))
}
