//! Post assembly.
//!
//! Builds the Jekyll frontmatter from the subject and formatted body, then
//! concatenates both into the final markdown document. Categories come from
//! the configured pool by prefix matching, tags from a fixed vocabulary
//! matched against the content, the excerpt from the first prose line.

use crate::{config::GeneratorConfig, utils::slug};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Tag vocabulary matched as substrings against the lowercased content
const TAG_VOCABULARY: [&str; 10] = [
    "bisnis",
    "teknologi",
    "keuangan",
    "marketing",
    "strategi",
    "tips",
    "panduan",
    "tutorial",
    "analisis",
    "tren",
];

const MAX_TAGS: usize = 5;
const MAX_CATEGORIES: usize = 2;

/// Excerpt length in characters, before the trailing ellipsis
const EXCERPT_CHARS: usize = 150;

/// Categories match on their first three letters, so "Teknologi" catches
/// "teknologi", "teknik" and similar subject phrasings.
const CATEGORY_PREFIX_CHARS: usize = 3;

/// Frontmatter block serialized at the top of every post.
#[derive(Debug, Clone, Serialize)]
pub struct FrontmatterMetadata {
    pub layout: String,
    pub title: String,
    pub date: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub author: String,
    pub meta_description: String,
    pub permalink: String,
    pub toc: bool,
    pub seo_optimized: bool,
}

/// A fully assembled post ready to be written to disk.
#[derive(Debug, Clone)]
pub struct AssembledPost {
    pub filename: String,
    pub document: String,
    pub slug: String,
    pub categories: Vec<String>,
}

/// Derive post categories from the subject.
///
/// A configured category matches when its three-letter prefix occurs in the
/// lowercased subject. No match falls back to the first configured category;
/// the result is capped at two.
pub fn derive_categories(subject: &str, config: &GeneratorConfig) -> Vec<String> {
    let subject_lower = subject.to_lowercase();

    let mut matched: Vec<String> = config
        .base_categories
        .iter()
        .filter(|category| {
            let prefix: String = category
                .to_lowercase()
                .chars()
                .take(CATEGORY_PREFIX_CHARS)
                .collect();
            !prefix.is_empty() && subject_lower.contains(&prefix)
        })
        .cloned()
        .collect();

    if matched.is_empty()
        && let Some(first) = config.base_categories.first()
    {
        matched.push(first.clone());
    }

    matched.truncate(MAX_CATEGORIES);
    matched
}

/// Derive tags from the content against the fixed vocabulary, capped at five.
pub fn derive_tags(content: &str) -> Vec<String> {
    let lower = content.to_lowercase();
    TAG_VOCABULARY
        .iter()
        .filter(|tag| lower.contains(*tag))
        .take(MAX_TAGS)
        .map(|tag| (*tag).to_owned())
        .collect()
}

/// First prose line of the content, capped at [`EXCERPT_CHARS`] characters.
pub fn extract_excerpt(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let snippet: String = line.chars().take(EXCERPT_CHARS).collect();
            format!("{snippet}...")
        })
        .unwrap_or_default()
}

/// Title from the document's first H1, falling back to the subject.
pub fn extract_title(content: &str, subject: &str) -> String {
    content
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_owned())
        .unwrap_or_else(|| subject.to_owned())
}

/// Assemble the final document: YAML frontmatter between `---` fences,
/// followed by the formatted body. The filename is `<ISO-date>-<slug>.md`.
pub fn assemble(
    title: &str,
    content: &str,
    subject: &str,
    config: &GeneratorConfig,
    now: DateTime<Utc>,
) -> Result<AssembledPost> {
    let slug = slug::slugify(title);
    let categories = derive_categories(subject, config);
    let primary = categories
        .first()
        .map(|c| c.to_lowercase())
        .unwrap_or_else(|| "artikel".to_owned());

    let metadata = FrontmatterMetadata {
        layout: "post".to_owned(),
        title: title.to_owned(),
        date: now.format("%Y-%m-%d %H:%M:%S +0000").to_string(),
        categories: categories.clone(),
        tags: derive_tags(content),
        author: config.author_name.clone(),
        meta_description: extract_excerpt(content),
        permalink: format!("/{primary}/{slug}/"),
        toc: true,
        seo_optimized: true,
    };

    let yaml = serde_yaml::to_string(&metadata)?;
    let document = format!("---\n{yaml}---\n\n{content}\n");
    let filename = format!("{}-{slug}.md", now.format("%Y-%m-%d"));

    Ok(AssembledPost {
        filename,
        document,
        slug,
        categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 7, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_categories_match_by_prefix() {
        let config = GeneratorConfig::default();
        // "tek" matches Teknologi, "mar" matches Marketing
        let categories = derive_categories("teknologi marketing modern", &config);
        assert_eq!(categories, ["Teknologi", "Marketing"]);
    }

    #[test]
    fn test_categories_default_to_first() {
        let config = GeneratorConfig::default();
        let categories = derive_categories("gardening at home", &config);
        assert_eq!(categories, ["Bisnis"]);
    }

    #[test]
    fn test_categories_capped_at_two() {
        let config = GeneratorConfig::default();
        // bisnis, keuangan, teknologi and marketing prefixes all occur
        let categories = derive_categories("bisnis keuangan teknologi marketing", &config);
        assert_eq!(categories.len(), 2);
    }

    #[test]
    fn test_tags_from_content_capped() {
        let content = "bisnis teknologi keuangan marketing strategi tips panduan";
        let tags = derive_tags(content);
        assert_eq!(tags.len(), MAX_TAGS);
        assert_eq!(tags[0], "bisnis");
    }

    #[test]
    fn test_tags_absent_terms_excluded() {
        assert!(derive_tags("nothing relevant here").is_empty());
    }

    #[test]
    fn test_excerpt_skips_headings() {
        let content = "# Title\n\n## Section\nThe actual opening paragraph.\nmore";
        assert_eq!(extract_excerpt(content), "The actual opening paragraph....");
    }

    #[test]
    fn test_excerpt_caps_length() {
        let long = "x".repeat(400);
        let excerpt = extract_excerpt(&long);
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS + 3);
    }

    #[test]
    fn test_excerpt_empty_content() {
        assert_eq!(extract_excerpt("# Only Headings\n## Here"), "");
    }

    #[test]
    fn test_title_from_h1() {
        assert_eq!(extract_title("# Real Title\nbody", "subject"), "Real Title");
    }

    #[test]
    fn test_title_falls_back_to_subject() {
        assert_eq!(extract_title("no heading here", "subject"), "subject");
    }

    #[test]
    fn test_assemble_document_shape() {
        let config = GeneratorConfig::default();
        let content = "# Strategi Bisnis\n\nOpening paragraph about bisnis strategy.";
        let post = assemble("Strategi Bisnis", content, "strategi bisnis", &config, now()).unwrap();

        assert!(post.document.starts_with("---\nlayout: post\n"));
        assert!(post.document.contains("title: Strategi Bisnis"));
        assert!(post.document.contains("2026-08-07 09:30:00 +0000"));
        assert!(post.document.contains("author: Admin"));
        assert!(post.document.contains("toc: true"));
        assert!(post.document.contains("seo_optimized: true"));
        assert!(post.document.contains("\n---\n\n# Strategi Bisnis\n"));
        assert!(post.document.ends_with("strategy.\n"));
    }

    #[test]
    fn test_assemble_filename_and_permalink() {
        let config = GeneratorConfig::default();
        let post = assemble("Strategi Bisnis", "body", "strategi bisnis", &config, now()).unwrap();

        assert_eq!(post.filename, "2026-08-07-strategi-bisnis.md");
        assert_eq!(post.slug, "strategi-bisnis");
        assert!(post.document.contains("permalink: /bisnis/strategi-bisnis/"));
    }

    #[test]
    fn test_assemble_categories_serialized_as_list() {
        let config = GeneratorConfig::default();
        let post = assemble("T", "body", "teknologi ai", &config, now()).unwrap();

        assert_eq!(post.categories, ["Teknologi"]);
        assert!(post.document.contains("categories:\n- Teknologi"));
    }
}
