//! Article generation orchestration.
//!
//! Runs the full per-subject pipeline:
//!
//! ```text
//! run()
//!   │
//!   ├── load subjects, subtract processed log -> pending batch
//!   │
//!   └── per subject (errors isolated, loop continues):
//!         prompt -> gemini -> formatter -> images -> related links
//!                -> assemble post -> write file -> record link -> mark done
//! ```
//!
//! A fixed delay separates articles so the generation endpoint and GitHub
//! are never hammered in a tight loop.

use crate::{
    config::GeneratorConfig,
    credentials::KeyRing,
    formatter::Formatter,
    gemini::GeminiClient,
    images, log, post, prompt,
    links::ArticleIndex,
    store::{self, ProcessedLog},
};
use anyhow::{Context, Result, bail};
use chrono::Utc;
use std::{fs, thread, time::Duration};

/// Pause between articles within a batch
const INTER_ARTICLE_DELAY: Duration = Duration::from_secs(2);

/// Owns every collaborator a generation batch needs.
///
/// Everything is passed in explicitly - no globals - so tests can point the
/// generator at temporary state files.
pub struct Generator {
    config: GeneratorConfig,
    client: GeminiClient,
    index: ArticleIndex,
    processed: ProcessedLog,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let keys = KeyRing::from_path(&config.credentials_file)?;
        if keys.is_empty() {
            bail!(
                "No valid API keys found in {}",
                config.credentials_file.display()
            );
        }
        let client = GeminiClient::new(keys)?;
        let index = ArticleIndex::load(&config.links_file);
        let processed = ProcessedLog::load(&config.processed_file);

        Ok(Self {
            config,
            client,
            index,
            processed,
        })
    }

    /// Run one generation batch. Returns the number of articles produced.
    ///
    /// Per-subject failures are logged and skipped; nothing short of a
    /// missing output directory aborts the batch.
    pub fn run(&mut self, count_override: Option<usize>) -> Result<usize> {
        let subjects = store::load_subjects(&self.config.subjects_file)?;
        if subjects.is_empty() {
            log!("generate"; "no subjects in {}", self.config.subjects_file.display());
            return Ok(0);
        }

        let pending: Vec<String> = self
            .processed
            .pending(&subjects)
            .into_iter()
            .cloned()
            .collect();
        if pending.is_empty() {
            log!("generate"; "all {} subjects already processed", subjects.len());
            return Ok(0);
        }

        let batch_size = count_override.unwrap_or(self.config.articles_per_run);
        log!("generate"; "{} pending, batch size {batch_size}", pending.len());

        fs::create_dir_all(&self.config.output_dir).with_context(|| {
            format!(
                "Failed to create output directory {}",
                self.config.output_dir.display()
            )
        })?;

        let mut generated = 0usize;
        for (i, subject) in pending.iter().take(batch_size).enumerate() {
            if i > 0 {
                thread::sleep(INTER_ARTICLE_DELAY);
            }
            log!("generate"; "writing article for: {subject}");

            match self.process_subject(subject) {
                Ok(filename) => {
                    generated += 1;
                    log!("generate"; "created {filename}");
                }
                Err(err) => log!("error"; "{subject}: {err:#}"),
            }
        }

        log!("generate"; "done - {generated} article(s) created");
        Ok(generated)
    }

    /// The full pipeline for one subject.
    fn process_subject(&mut self, subject: &str) -> Result<String> {
        let prompt_text = prompt::build_prompt(subject, &self.config);
        let raw = self.client.generate(&prompt_text)?;

        let formatted = Formatter::new(subject).format(&raw);
        let annotated = images::annotate(&formatted, subject, &self.config);
        let categories = post::derive_categories(subject, &self.config);
        let content = self.index.insert_related(&annotated, subject, &categories);

        let title = post::extract_title(&content, subject);
        let assembled = post::assemble(&title, &content, subject, &self.config, Utc::now())?;

        let path = self.config.output_dir.join(&assembled.filename);
        fs::write(&path, &assembled.document)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        self.index
            .record_article(subject, &title, &assembled.slug, &assembled.categories)?;
        self.processed.mark(subject)?;

        Ok(assembled.filename)
    }
}

/// Print subject/processed/pending counts for `karang status`.
pub fn status(config: &GeneratorConfig) -> Result<()> {
    let subjects = store::load_subjects(&config.subjects_file)?;
    let processed = ProcessedLog::load(&config.processed_file);
    let pending = processed.pending(&subjects).len();

    log!("status"; "{} subjects, {} processed, {pending} pending", subjects.len(), processed.len());
    for subject in processed.recent(5) {
        log!("status"; "recently processed: {subject}");
    }
    Ok(())
}
