//! Post publishing to GitHub.
//!
//! Uploads generated markdown posts to the `_posts/` directory of a Jekyll
//! repository through the GitHub contents API: an existing file is updated
//! with its blob SHA, a new one is created. Per-file failures are logged and
//! skipped so one bad upload never sinks the batch.

use crate::{config::GeneratorConfig, log};
use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::Deserialize;
use serde_json::json;
use std::{fs, path::PathBuf, time::Duration};
use thiserror::Error;

const API_BASE: &str = "https://api.github.com";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Publishing errors
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("`github_repo` is not configured (expected \"owner/name\")")]
    MissingRepo,

    #[error("`github_token_path` is not configured")]
    MissingToken,

    #[error("failed to read token file")]
    TokenFile(#[source] std::io::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {path}")]
    Api {
        status: reqwest::StatusCode,
        path: String,
    },
}

#[derive(Deserialize)]
struct ExistingFile {
    sha: String,
}

/// Authenticated client for one target repository.
pub struct GithubPublisher {
    http: reqwest::blocking::Client,
    repo: String,
    branch: String,
    token: String,
}

impl GithubPublisher {
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, PublishError> {
        if config.github_repo.is_empty() {
            return Err(PublishError::MissingRepo);
        }
        let token_path = config
            .github_token_path
            .as_ref()
            .ok_or(PublishError::MissingToken)?;
        let token = fs::read_to_string(token_path)
            .map_err(PublishError::TokenFile)?
            .trim()
            .to_owned();

        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("karang/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            repo: config.github_repo.clone(),
            branch: config.github_branch.clone(),
            token,
        })
    }

    /// Create or update one file in the repository.
    ///
    /// Returns `true` when the file was created, `false` when updated.
    pub fn upload_file(&self, remote_path: &str, content: &[u8]) -> Result<bool, PublishError> {
        let url = format!("{API_BASE}/repos/{}/contents/{remote_path}", self.repo);
        let existing_sha = self.fetch_sha(&url, remote_path)?;

        let name = remote_path.rsplit('/').next().unwrap_or(remote_path);
        let message = match &existing_sha {
            Some(_) => format!("Update article: {name}"),
            None => format!("Add new article: {name}"),
        };

        let mut body = json!({
            "message": message,
            "content": BASE64.encode(content),
            "branch": self.branch,
        });
        if let Some(sha) = &existing_sha {
            body["sha"] = json!(sha);
        }

        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&body)
            .send()?;

        if !response.status().is_success() {
            return Err(PublishError::Api {
                status: response.status(),
                path: remote_path.to_owned(),
            });
        }
        Ok(existing_sha.is_none())
    }

    /// Blob SHA of an existing file, or `None` when it does not exist yet.
    fn fetch_sha(&self, url: &str, remote_path: &str) -> Result<Option<String>, PublishError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .query(&[("ref", self.branch.as_str())])
            .send()?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(PublishError::Api {
                status: response.status(),
                path: remote_path.to_owned(),
            });
        }

        let existing: ExistingFile = response.json()?;
        Ok(Some(existing.sha))
    }
}

/// Upload every markdown post in the output directory.
///
/// Returns the number of successfully uploaded files.
pub fn publish_posts(config: &GeneratorConfig) -> Result<usize> {
    let publisher = GithubPublisher::from_config(config)?;
    let posts = collect_posts(config)?;
    if posts.is_empty() {
        log!("publish"; "nothing to publish in {}", config.output_dir.display());
        return Ok(0);
    }

    log!("publish"; "uploading {} post(s) to {}", posts.len(), config.github_repo);

    let mut uploaded = 0usize;
    for path in posts {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(err) => {
                log!("error"; "{name}: {err}");
                continue;
            }
        };

        match publisher.upload_file(&format!("_posts/{name}"), &content) {
            Ok(true) => {
                uploaded += 1;
                log!("publish"; "created {name}");
            }
            Ok(false) => {
                uploaded += 1;
                log!("publish"; "updated {name}");
            }
            Err(err) => log!("error"; "{name}: {err}"),
        }
    }

    log!("publish"; "done - {uploaded} uploaded");
    Ok(uploaded)
}

/// Markdown files in the output directory, sorted by name (oldest date first).
fn collect_posts(config: &GeneratorConfig) -> Result<Vec<PathBuf>> {
    if !config.output_dir.exists() {
        return Ok(Vec::new());
    }
    let mut posts: Vec<PathBuf> = fs::read_dir(&config.output_dir)
        .with_context(|| format!("Failed to read {}", config.output_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    posts.sort();
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_repo() {
        let config = GeneratorConfig::default();
        assert!(matches!(
            GithubPublisher::from_config(&config),
            Err(PublishError::MissingRepo)
        ));
    }

    #[test]
    fn test_from_config_requires_token_path() {
        let mut config = GeneratorConfig::default();
        config.github_repo = "alice/blog".into();
        assert!(matches!(
            GithubPublisher::from_config(&config),
            Err(PublishError::MissingToken)
        ));
    }

    #[test]
    fn test_from_config_requires_readable_token() {
        let mut config = GeneratorConfig::default();
        config.github_repo = "alice/blog".into();
        config.github_token_path = Some("/nonexistent/token".into());
        assert!(matches!(
            GithubPublisher::from_config(&config),
            Err(PublishError::TokenFile(_))
        ));
    }

    #[test]
    fn test_from_config_trims_token() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token");
        fs::write(&token_path, "ghp_secret\n").unwrap();

        let mut config = GeneratorConfig::default();
        config.github_repo = "alice/blog".into();
        config.github_token_path = Some(token_path);

        let publisher = GithubPublisher::from_config(&config).unwrap();
        assert_eq!(publisher.token, "ghp_secret");
    }

    #[test]
    fn test_collect_posts_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GeneratorConfig::default();
        config.output_dir = dir.path().to_path_buf();

        fs::write(dir.path().join("2026-08-02-b.md"), "b").unwrap();
        fs::write(dir.path().join("2026-08-01-a.md"), "a").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip").unwrap();

        let posts = collect_posts(&config).unwrap();
        let names: Vec<_> = posts
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["2026-08-01-a.md", "2026-08-02-b.md"]);
    }

    #[test]
    fn test_collect_posts_missing_dir_is_empty() {
        let mut config = GeneratorConfig::default();
        config.output_dir = "/nonexistent/_posts".into();
        assert!(collect_posts(&config).unwrap().is_empty());
    }
}
