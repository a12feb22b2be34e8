//! Internal-link index.
//!
//! Tracks every generated article so later articles can cross-link to
//! related ones. The index is a subject-keyed map persisted as a single JSON
//! file: loaded fully at startup, rewritten fully after each article. At
//! this scale (hundreds of posts) the simplicity beats incremental updates.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Fixed vocabulary matched as substrings against lowercased subjects.
const KEYWORD_VOCABULARY: [&str; 15] = [
    "bisnis",
    "marketing",
    "strategi",
    "keuangan",
    "investasi",
    "startup",
    "teknologi",
    "digital",
    "online",
    "e-commerce",
    "seo",
    "content",
    "social media",
    "fintech",
    "umkm",
];

/// Maximum number of related articles surfaced per post
const MAX_RELATED: usize = 3;

/// Heading of the spliced-in related-articles section
pub const RELATED_SECTION_HEADING: &str = "### Artikel Terkait yang Mungkin Menarik";

/// Extract the keyword set for a subject by vocabulary substring matching.
pub fn extract_keywords(subject: &str) -> Vec<String> {
    let lower = subject.to_lowercase();
    KEYWORD_VOCABULARY
        .iter()
        .filter(|term| lower.contains(*term))
        .map(|term| (*term).to_owned())
        .collect()
}

/// One stored article. `seq` is the insertion sequence number used as the
/// explicit tie-break when relevance scores are equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub slug: String,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub seq: u64,
}

/// A relatedness hit for the current subject.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedArticle {
    pub title: String,
    pub slug: String,
    /// Size of the keyword-set intersection with the query subject
    pub relevance: usize,
    seq: u64,
}

/// Subject-keyed article map with full-file persistence.
#[derive(Debug)]
pub struct ArticleIndex {
    path: PathBuf,
    records: BTreeMap<String, ArticleRecord>,
}

impl ArticleIndex {
    /// Load the index from disk. Missing or malformed files yield an empty
    /// index rather than an error.
    pub fn load(path: &Path) -> Self {
        let records = fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Store (or overwrite) the record for a subject and persist the map.
    ///
    /// Re-recording a subject keeps its original sequence number so the
    /// relatedness tie-break stays stable across regenerations.
    pub fn record_article(
        &mut self,
        subject: &str,
        title: &str,
        slug: &str,
        categories: &[String],
    ) -> Result<()> {
        let seq = self
            .records
            .get(subject)
            .map(|existing| existing.seq)
            .unwrap_or_else(|| self.next_seq());

        let record = ArticleRecord {
            title: title.to_owned(),
            slug: slug.to_owned(),
            categories: categories.to_vec(),
            keywords: extract_keywords(subject),
            seq,
        };
        self.records.insert(subject.to_owned(), record);
        self.save()
    }

    fn next_seq(&self) -> u64 {
        self.records
            .values()
            .map(|record| record.seq)
            .max()
            .map_or(0, |max| max + 1)
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Find up to [`MAX_RELATED`] stored articles related to a subject.
    ///
    /// A candidate qualifies when any stored category appears in the query
    /// categories or any stored keyword appears in the query's extracted
    /// keywords. Results sort by relevance descending, then by insertion
    /// sequence ascending.
    pub fn find_related(&self, subject: &str, categories: &[String]) -> Vec<RelatedArticle> {
        let current_keywords = extract_keywords(subject);
        let mut related: Vec<RelatedArticle> = self
            .records
            .iter()
            .filter(|(stored_subject, _)| stored_subject.as_str() != subject)
            .filter_map(|(_, record)| {
                let category_match = record
                    .categories
                    .iter()
                    .any(|c| categories.contains(c));
                let keyword_match = record
                    .keywords
                    .iter()
                    .any(|k| current_keywords.contains(k));
                if !category_match && !keyword_match {
                    return None;
                }
                let relevance = record
                    .keywords
                    .iter()
                    .filter(|k| current_keywords.contains(*k))
                    .count();
                Some(RelatedArticle {
                    title: record.title.clone(),
                    slug: record.slug.clone(),
                    relevance,
                    seq: record.seq,
                })
            })
            .collect();

        related.sort_by(|a, b| b.relevance.cmp(&a.relevance).then(a.seq.cmp(&b.seq)));
        related.truncate(MAX_RELATED);
        related
    }

    /// Splice a related-articles section into a document, immediately before
    /// the second H2 heading. Documents without related matches or without a
    /// second H2 pass through unchanged.
    pub fn insert_related(&self, content: &str, subject: &str, categories: &[String]) -> String {
        let related = self.find_related(subject, categories);
        if related.is_empty() {
            return content.to_owned();
        }
        insert_links_section(content, &related, categories)
    }
}

fn insert_links_section(
    content: &str,
    related: &[RelatedArticle],
    categories: &[String],
) -> String {
    let lines: Vec<&str> = content.split('\n').collect();

    let mut h2_count = 0;
    let mut insert_at = None;
    for (i, line) in lines.iter().enumerate() {
        if line.starts_with("## ") {
            h2_count += 1;
            if h2_count == 2 {
                insert_at = Some(i);
                break;
            }
        }
    }
    let Some(at) = insert_at else {
        return content.to_owned();
    };

    let category = categories
        .first()
        .map(|c| c.to_lowercase())
        .unwrap_or_else(|| "artikel".to_owned());

    let mut section = vec![
        String::new(),
        RELATED_SECTION_HEADING.to_owned(),
        String::new(),
    ];
    for article in related {
        section.push(format!(
            "- [{}](/{category}/{}/)",
            article.title, article.slug
        ));
    }
    section.push(String::new());

    let mut out: Vec<String> = lines.into_iter().map(str::to_owned).collect();
    out.splice(at..at, section);
    out.join("\n")
}
