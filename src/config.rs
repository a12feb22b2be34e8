//! Generator configuration management.
//!
//! Handles loading and validating the flat `key=value` configuration file
//! (`karang.conf`). Every key has a static default; missing files, unknown
//! keys and malformed values never abort a run - they fall back to the
//! defaults so a half-edited config still produces articles.

use anyhow::{Result, bail};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default values for every configuration key
pub mod config_defaults {
    use std::path::PathBuf;

    pub fn domain() -> String {
        "example.com".into()
    }
    pub fn articles_per_run() -> usize {
        2
    }
    pub fn min_word_count() -> u32 {
        5000
    }
    pub fn max_word_count() -> u32 {
        8000
    }
    pub fn h2_min_words() -> u32 {
        400
    }
    pub fn h2_max_words() -> u32 {
        600
    }
    pub fn target_headings() -> u32 {
        20
    }
    pub fn language() -> String {
        "English".into()
    }
    pub fn base_categories() -> Vec<String> {
        ["Bisnis", "Keuangan", "Teknologi", "Marketing"]
            .map(String::from)
            .to_vec()
    }
    pub fn author_name() -> String {
        "Admin".into()
    }
    pub fn enable_auto_images() -> bool {
        true
    }
    pub fn images_per_article() -> usize {
        5
    }
    pub fn fallback_image_offset() -> usize {
        10
    }
    pub fn subjects_file() -> PathBuf {
        "subjects.txt".into()
    }
    pub fn credentials_file() -> PathBuf {
        "apikey.txt".into()
    }
    pub fn output_dir() -> PathBuf {
        "_posts".into()
    }
    pub fn links_file() -> PathBuf {
        "article_links.json".into()
    }
    pub fn processed_file() -> PathBuf {
        "processed_subjects.json".into()
    }
    pub fn github_branch() -> String {
        "main".into()
    }
    pub fn schedule_interval_minutes() -> u64 {
        60
    }
}

/// Typed view of the flat `key=value` configuration file.
///
/// Paths are stored as written in the file and resolved against the project
/// root with [`GeneratorConfig::apply_root`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Site domain the generated posts are published under
    pub domain: String,

    /// Number of articles produced per run
    pub articles_per_run: usize,

    /// Article length bounds passed to the generation prompt
    pub min_word_count: u32,
    pub max_word_count: u32,

    /// Per-H2-section word bounds passed to the generation prompt
    pub h2_min_words: u32,
    pub h2_max_words: u32,

    /// Heading count target passed to the generation prompt
    pub target_headings: u32,

    /// Prompt language: "English" or "Indonesian"
    pub language: String,

    /// Category pool for post categorization
    pub base_categories: Vec<String>,

    /// Frontmatter author
    pub author_name: String,

    /// Image annotator toggle and insertion cap
    pub enable_auto_images: bool,
    pub images_per_article: usize,

    /// Line offset for the forced featured image when no heading qualified.
    /// A positional heuristic carried over from the original pipeline.
    pub fallback_image_offset: usize,

    /// Input/state/output file locations (relative to project root)
    pub subjects_file: PathBuf,
    pub credentials_file: PathBuf,
    pub output_dir: PathBuf,
    pub links_file: PathBuf,
    pub processed_file: PathBuf,

    /// Publish target: "owner/name", branch, and a token file path
    pub github_repo: String,
    pub github_branch: String,
    pub github_token_path: Option<PathBuf>,

    /// Periodic run interval for `karang schedule`
    pub schedule_interval_minutes: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            domain: config_defaults::domain(),
            articles_per_run: config_defaults::articles_per_run(),
            min_word_count: config_defaults::min_word_count(),
            max_word_count: config_defaults::max_word_count(),
            h2_min_words: config_defaults::h2_min_words(),
            h2_max_words: config_defaults::h2_max_words(),
            target_headings: config_defaults::target_headings(),
            language: config_defaults::language(),
            base_categories: config_defaults::base_categories(),
            author_name: config_defaults::author_name(),
            enable_auto_images: config_defaults::enable_auto_images(),
            images_per_article: config_defaults::images_per_article(),
            fallback_image_offset: config_defaults::fallback_image_offset(),
            subjects_file: config_defaults::subjects_file(),
            credentials_file: config_defaults::credentials_file(),
            output_dir: config_defaults::output_dir(),
            links_file: config_defaults::links_file(),
            processed_file: config_defaults::processed_file(),
            github_repo: String::new(),
            github_branch: config_defaults::github_branch(),
            github_token_path: None,
            schedule_interval_minutes: config_defaults::schedule_interval_minutes(),
        }
    }
}

impl GeneratorConfig {
    /// Parse configuration from the flat `key=value` format.
    ///
    /// Lines that are blank or start with `#` are skipped. Unknown keys are
    /// ignored; malformed values keep the key's default.
    pub fn from_str(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            config.set(key.trim(), value.trim());
        }

        config
    }

    /// Load configuration from a file path.
    ///
    /// A missing file yields the full default configuration.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Ok(Self::from_str(&content))
    }

    /// Apply one key/value pair, keeping the default on parse failure.
    fn set(&mut self, key: &str, value: &str) {
        match key {
            "domain" => self.domain = value.to_owned(),
            "articles_per_run" => set_parsed(&mut self.articles_per_run, value),
            "min_word_count" => set_parsed(&mut self.min_word_count, value),
            "max_word_count" => set_parsed(&mut self.max_word_count, value),
            "h2_min_words" => set_parsed(&mut self.h2_min_words, value),
            "h2_max_words" => set_parsed(&mut self.h2_max_words, value),
            "target_headings" => set_parsed(&mut self.target_headings, value),
            "language" => self.language = value.to_owned(),
            "base_categories" => {
                let categories: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(String::from)
                    .collect();
                if !categories.is_empty() {
                    self.base_categories = categories;
                }
            }
            "author_name" => self.author_name = value.to_owned(),
            "enable_auto_images" => self.enable_auto_images = parse_bool(value),
            "images_per_article" => set_parsed(&mut self.images_per_article, value),
            "fallback_image_offset" => set_parsed(&mut self.fallback_image_offset, value),
            "subjects_file" => self.subjects_file = value.into(),
            "credentials_file" => self.credentials_file = value.into(),
            "output_dir" => self.output_dir = value.into(),
            "links_file" => self.links_file = value.into(),
            "processed_file" => self.processed_file = value.into(),
            "github_repo" => self.github_repo = value.to_owned(),
            "github_branch" => self.github_branch = value.to_owned(),
            "github_token_path" => self.github_token_path = Some(value.into()),
            "schedule_interval_minutes" => set_parsed(&mut self.schedule_interval_minutes, value),
            _ => {} // unknown keys are ignored
        }
    }

    /// Resolve all relative paths against the project root.
    pub fn apply_root(&mut self, root: &Path) {
        for path in [
            &mut self.subjects_file,
            &mut self.credentials_file,
            &mut self.output_dir,
            &mut self.links_file,
            &mut self.processed_file,
        ] {
            if path.is_relative() {
                let resolved = root.join(path.as_path());
                *path = resolved;
            }
        }
        if let Some(token_path) = &self.github_token_path
            && token_path.is_relative()
        {
            self.github_token_path = Some(root.join(token_path));
        }
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<()> {
        if self.articles_per_run == 0 {
            bail!(ConfigError::Validation(
                "`articles_per_run` must be at least 1".into()
            ));
        }
        if self.min_word_count > self.max_word_count {
            bail!(ConfigError::Validation(format!(
                "`min_word_count` ({}) exceeds `max_word_count` ({})",
                self.min_word_count, self.max_word_count
            )));
        }
        if self.base_categories.is_empty() {
            bail!(ConfigError::Validation(
                "`base_categories` must not be empty".into()
            ));
        }
        if self.schedule_interval_minutes == 0 {
            bail!(ConfigError::Validation(
                "`schedule_interval_minutes` must be at least 1".into()
            ));
        }
        Ok(())
    }
}

/// Parse a value into the target, keeping the current value on failure.
fn set_parsed<T: FromStr>(target: &mut T, value: &str) {
    if let Ok(parsed) = value.parse() {
        *target = parsed;
    }
}

/// Parse a boolean the lenient way: true/1/yes/on (any case) are true.
fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[test]
fn test_defaults_for_every_key() {
    let config = GeneratorConfig::from_str("");

    assert_eq!(config.domain, "example.com");
    assert_eq!(config.articles_per_run, 2);
    assert_eq!(config.min_word_count, 5000);
    assert_eq!(config.max_word_count, 8000);
    assert_eq!(config.target_headings, 20);
    assert_eq!(config.language, "English");
    assert_eq!(config.base_categories.len(), 4);
    assert_eq!(config.author_name, "Admin");
    assert!(config.enable_auto_images);
    assert_eq!(config.images_per_article, 5);
    assert_eq!(config.fallback_image_offset, 10);
    assert_eq!(config.subjects_file, PathBuf::from("subjects.txt"));
    assert_eq!(config.output_dir, PathBuf::from("_posts"));
    assert_eq!(config.github_branch, "main");
    assert_eq!(config.schedule_interval_minutes, 60);
}

#[test]
fn test_parse_known_keys() {
    let config = GeneratorConfig::from_str(
        "domain = myblog.id\n\
         articles_per_run = 5\n\
         language = Indonesian\n\
         base_categories = Tech, Finance\n\
         enable_auto_images = no\n\
         github_repo = alice/alice.github.io\n",
    );

    assert_eq!(config.domain, "myblog.id");
    assert_eq!(config.articles_per_run, 5);
    assert_eq!(config.language, "Indonesian");
    assert_eq!(config.base_categories, vec!["Tech", "Finance"]);
    assert!(!config.enable_auto_images);
    assert_eq!(config.github_repo, "alice/alice.github.io");
}

#[test]
fn test_comments_and_unknown_keys_ignored() {
    let config = GeneratorConfig::from_str(
        "# a comment\n\
         \n\
         not_a_real_key = whatever\n\
         domain = real.com\n",
    );

    assert_eq!(config.domain, "real.com");
}

#[test]
fn test_malformed_value_keeps_default() {
    let config = GeneratorConfig::from_str("articles_per_run = banana\n");
    assert_eq!(config.articles_per_run, 2);
}

#[test]
fn test_parse_bool_variants() {
    for truthy in ["true", "1", "yes", "on", "TRUE", "Yes"] {
        assert!(parse_bool(truthy), "{truthy} should parse as true");
    }
    for falsy in ["false", "0", "off", "", "maybe"] {
        assert!(!parse_bool(falsy), "{falsy} should parse as false");
    }
}

#[test]
fn test_apply_root_resolves_relative_paths() {
    let mut config = GeneratorConfig::default();
    config.apply_root(Path::new("/srv/blog"));

    assert_eq!(config.subjects_file, PathBuf::from("/srv/blog/subjects.txt"));
    assert_eq!(config.output_dir, PathBuf::from("/srv/blog/_posts"));
}

#[test]
fn test_apply_root_keeps_absolute_paths() {
    let mut config = GeneratorConfig::from_str("subjects_file = /etc/karang/subjects.txt\n");
    config.apply_root(Path::new("/srv/blog"));

    assert_eq!(
        config.subjects_file,
        PathBuf::from("/etc/karang/subjects.txt")
    );
}

#[test]
fn test_validate_rejects_zero_batch() {
    let config = GeneratorConfig::from_str("articles_per_run = 0\n");
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_inverted_word_bounds() {
    let config = GeneratorConfig::from_str("min_word_count = 9000\nmax_word_count = 100\n");
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_accepts_defaults() {
    assert!(GeneratorConfig::default().validate().is_ok());
}

#[test]
fn test_from_path_missing_file_is_defaults() {
    let config = GeneratorConfig::from_path(Path::new("/nonexistent/karang.conf")).unwrap();
    assert_eq!(config.domain, "example.com");
}
