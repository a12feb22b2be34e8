//! Generation prompt construction.
//!
//! Builds the article prompt from the subject and the configured length,
//! heading and language targets. Keyword variations (LSI terms) are derived
//! from the title with a fixed lookup table so the prompt steers the model
//! toward semantically adjacent phrases instead of repeating the subject.

use crate::config::GeneratorConfig;

/// LSI lookup: base term found in the title -> related terms worth weaving in.
const LSI_TERMS: &[(&str, &[&str])] = &[
    (
        "business",
        &["strategy", "growth", "success", "development", "management"],
    ),
    (
        "marketing",
        &["digital", "online", "social media", "content", "advertising"],
    ),
    (
        "technology",
        &["innovation", "digital transformation", "automation", "AI", "software"],
    ),
    (
        "finance",
        &["investment", "financial planning", "wealth", "money management", "economics"],
    ),
    (
        "startup",
        &["entrepreneurship", "venture capital", "scaling", "innovation", "funding"],
    ),
    (
        "seo",
        &["search optimization", "ranking", "organic traffic", "keywords", "SERP"],
    ),
    ("digital", &["online", "internet", "web", "cloud", "platform"]),
    (
        "guide",
        &["tutorial", "handbook", "manual", "instructions", "tips"],
    ),
    (
        "strategy",
        &["planning", "approach", "methodology", "framework", "tactics"],
    ),
];

/// Generic high-value terms appended to every variation list.
const GENERIC_TERMS: &[&str] = &[
    "best practices",
    "professional",
    "comprehensive guide",
    "expert tips",
];

/// Maximum number of variations returned.
const MAX_VARIATIONS: usize = 8;

/// Derive LSI keyword variations from an article title.
///
/// For each word of the lowercased title that appears in the lookup table,
/// the first three related terms are taken; generic terms pad the tail. The
/// result is capped at [`MAX_VARIATIONS`].
pub fn keyword_variations(title: &str) -> Vec<String> {
    let mut variations: Vec<String> = Vec::new();

    for word in title.to_lowercase().split_whitespace() {
        if let Some((_, related)) = LSI_TERMS.iter().find(|(base, _)| *base == word) {
            variations.extend(related.iter().take(3).map(|s| (*s).to_owned()));
        }
    }
    variations.extend(GENERIC_TERMS.iter().map(|s| (*s).to_owned()));

    variations.truncate(MAX_VARIATIONS);
    variations
}

/// Build the full article prompt for a subject.
pub fn build_prompt(title: &str, config: &GeneratorConfig) -> String {
    let variations = keyword_variations(title);
    let keywords = variations
        .iter()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    if config.language.eq_ignore_ascii_case("english") {
        english_prompt(title, &keywords, config)
    } else {
        indonesian_prompt(title, &keywords, config)
    }
}

fn english_prompt(title: &str, keywords: &str, config: &GeneratorConfig) -> String {
    format!(
        r#"Write a professional SEO article for: "{title}"

SPECIFICATIONS:
- Length: {min}-{max} words
- Headings: {headings}+ (H2, H3) structured content
- Primary keyword: {title}
- Keywords: {keywords}

STRUCTURE:
# {title}

## Understanding {title}
### Core Concepts and Fundamentals
### Key Benefits and Applications
### Industry Context

## Complete {title} Guide
### Step-by-Step Implementation
### Best Practices and Standards
### Essential Requirements

## Advanced {title} Strategies
### Professional Techniques
### Expert Methods
### Optimization Tips

## Tools and Resources
### Essential Platforms
### Recommended Solutions
### Implementation Tools

## Common Challenges
### Typical Issues and Solutions
### Problem Prevention
### Troubleshooting Guide

## Implementation Results
### Success Metrics
### Case Studies
### ROI Optimization

## Future Outlook
### Emerging Trends
### Technology Impact
### Strategic Planning

## Conclusion
[Key takeaways and action steps]

REQUIREMENTS:
- Each H2: {h2_min}-{h2_max} words with practical insights
- Each H3: 150-200 words with bullet points
- Use varied symbols (•, ◦, →, ✓) for lists
- **Bold** keywords naturally
- Professional tone with examples
- No repetitive content

Write complete article:"#,
        min = config.min_word_count,
        max = config.max_word_count,
        headings = config.target_headings,
        h2_min = config.h2_min_words,
        h2_max = config.h2_max_words,
    )
}

fn indonesian_prompt(title: &str, keywords: &str, config: &GeneratorConfig) -> String {
    format!(
        r#"Tulis artikel SEO profesional untuk: "{title}"

SPESIFIKASI:
- Panjang: {min}-{max} kata
- Heading: {headings}+ (H2, H3) terstruktur
- Keyword utama: {title}
- Keywords: {keywords}

STRUKTUR:
# {title}

## Memahami {title}
### Konsep Dasar dan Fundamental
### Manfaat Utama dan Aplikasi
### Konteks Industri

## Panduan Lengkap {title}
### Implementasi Step-by-Step
### Best Practices dan Standar
### Persyaratan Penting

## Strategi Advanced {title}
### Teknik Profesional
### Metode Expert
### Tips Optimasi

## Tools dan Resources
### Platform Essential
### Solusi Terpercaya
### Tools Implementasi

## Tantangan Umum
### Masalah Tipikal dan Solusi
### Pencegahan Masalah
### Panduan Troubleshooting

## Implementasi dan Hasil
### Metrik Kesuksesan
### Studi Kasus
### Optimasi ROI

## Outlook Masa Depan
### Tren yang Muncul
### Dampak Teknologi
### Perencanaan Strategis

## Kesimpulan
[Rangkuman dan langkah tindak lanjut]

PERSYARATAN:
- Setiap H2: {h2_min}-{h2_max} kata dengan insight praktis
- Setiap H3: 150-200 kata dengan bullet points
- Gunakan simbol bervariasi (•, ◦, →, ✓) untuk list
- **Bold** keyword secara natural
- Tone profesional dengan contoh
- Tidak ada konten repetitif

Tulis artikel lengkap:"#,
        min = config.min_word_count,
        max = config.max_word_count,
        headings = config.target_headings,
        h2_min = config.h2_min_words,
        h2_max = config.h2_max_words,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variations_from_known_words() {
        let variations = keyword_variations("business marketing guide");
        assert!(variations.contains(&"strategy".to_owned()));
        assert!(variations.contains(&"digital".to_owned()));
        assert!(variations.len() <= MAX_VARIATIONS);
    }

    #[test]
    fn test_variations_fall_back_to_generic_terms() {
        let variations = keyword_variations("quantum basket weaving");
        assert_eq!(
            variations,
            ["best practices", "professional", "comprehensive guide", "expert tips"]
        );
    }

    #[test]
    fn test_variations_capped() {
        let variations = keyword_variations("business marketing technology finance");
        assert_eq!(variations.len(), MAX_VARIATIONS);
    }

    #[test]
    fn test_prompt_language_selection() {
        let mut config = GeneratorConfig::default();
        config.language = "English".into();
        assert!(build_prompt("Topic", &config).starts_with("Write a professional"));

        config.language = "Indonesian".into();
        assert!(build_prompt("Topic", &config).starts_with("Tulis artikel"));
    }

    #[test]
    fn test_prompt_embeds_config_bounds() {
        let config = GeneratorConfig::default();
        let prompt = build_prompt("Testing", &config);
        assert!(prompt.contains("5000-8000 words"));
        assert!(prompt.contains("20+ (H2, H3)"));
        assert!(prompt.contains("400-600 words"));
    }
}
