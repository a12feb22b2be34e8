//! Content formatting pipeline.
//!
//! Takes the raw generated markdown and rewrites it line by line into a more
//! readable, visually varied document: bullet restyling inside H3 sections,
//! punctuation-spacing normalization, keyword emphasis, step numbering,
//! sentence-terminator cleanup and occasional transition phrases.
//!
//! Two invariants hold for arbitrary input:
//! - heading lines (`#`, `##`, `###`) pass through unchanged, in order
//! - every transformation is total; bad input degrades formatting, never errors
//!
//! The only nondeterminism is the transition-phrase draw, which comes from an
//! injected [`SeededRng`] so tests can fix the seed or disable it.

use crate::{links::extract_keywords, utils::rng::SeededRng};
use regex::Regex;
use std::sync::LazyLock;

/// Ordered bullet glyph palette. Selection is `bullet_index % len`, so glyph
/// choice depends only on the bullet's position within its H3 section.
pub const BULLET_PALETTE: [&str; 20] = [
    "•", "◦", "▪", "▫", "→", "✓", "★", "▷", "‣", "⋄", "►", "⚬", "◆", "◇", "⬥", "⬦", "⬧", "⬨",
    "○", "●",
];

/// Words marking step-by-step content worth numbering
const STEP_INDICATORS: [&str; 5] = ["langkah", "tahap", "fase", "step", "cara"];

/// Transition phrases injected between long prose lines
const TRANSITIONS: [&str; 7] = [
    "Selanjutnya",
    "Lebih lanjut",
    "Di samping itu",
    "Berdasarkan hal tersebut",
    "Dalam konteks ini",
    "Sebagai tambahan",
    "Yang perlu diperhatikan",
];

/// Lines already opening with one of these never get a second transition
const TRANSITION_OPENERS: [&str; 3] = ["Selanjutnya", "Lebih lanjut", "Di samping itu"];

const TRANSITION_PROBABILITY: f64 = 0.12;

/// Minimum trimmed length before the sentence-terminator rule applies
const TERMINATOR_MIN_CHARS: usize = 50;

/// Minimum line length before a transition phrase may be prepended
const TRANSITION_MIN_CHARS: usize = 60;

/// Leading `*` or `-` list marker, keeping indentation
static BULLET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)[*-]\s+").expect("bullet marker pattern"));

/// Ordered punctuation-spacing rules: collapse stray spaces around
/// `, . : ; ! ?` into the conventional single trailing space.
static PUNCTUATION_RULES: LazyLock<[(Regex, &'static str); 6]> = LazyLock::new(|| {
    let rule = |pattern| Regex::new(pattern).expect("punctuation pattern");
    [
        (rule(r"([a-zA-Z])\s*,\s*([a-zA-Z])"), "${1}, ${2}"),
        (rule(r"([a-zA-Z])\s*\.\s*([A-Z])"), "${1}. ${2}"),
        (rule(r"([a-zA-Z])\s*:\s*([a-zA-Z])"), "${1}: ${2}"),
        (rule(r"([a-zA-Z])\s*;\s*([a-zA-Z])"), "${1}; ${2}"),
        (rule(r"([a-zA-Z])\s*!\s*([A-Z])"), "${1}! ${2}"),
        (rule(r"([a-zA-Z])\s*\?\s*([A-Z])"), "${1}? ${2}"),
    ]
});

/// Phrase sets that read better in italics, applied to all matches
static EMPHASIS_RULES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    let rule = |pattern| Regex::new(pattern).expect("emphasis pattern");
    [
        rule(r"(?i)\b(sangat penting|crucial|essential|kunci utama|fundamental)\b"),
        rule(r"(?i)\b(best practice|tips terbaik|strategi efektif|solusi optimal)\b"),
        rule(r"(?i)\b(pertumbuhan bisnis|peningkatan profit|hasil maksimal)\b"),
        rule(r"(?i)\b(terbukti efektif|highly recommended|wajib diterapkan)\b"),
    ]
});

/// Line-rewriting formatter for one article.
///
/// Keyword patterns are compiled once per article; the per-line scan state
/// (H3 mode, bullet counter, current section) lives in [`Formatter::format`].
pub struct Formatter {
    keywords: Vec<String>,
    keyword_patterns: Vec<Regex>,
    transitions: Option<SeededRng>,
}

impl Formatter {
    /// Create a formatter for a subject, with clock-seeded transitions.
    pub fn new(subject: &str) -> Self {
        let keywords = extract_keywords(subject);
        let keyword_patterns = keywords
            .iter()
            .map(|kw| {
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(kw)))
                    .expect("escaped keyword pattern")
            })
            .collect();
        Self {
            keywords,
            keyword_patterns,
            transitions: Some(SeededRng::from_entropy()),
        }
    }

    /// Fix the transition draw sequence for reproducible output.
    pub fn with_transition_seed(mut self, seed: u64) -> Self {
        self.transitions = Some(SeededRng::new(seed));
        self
    }

    /// Disable transition injection entirely; output becomes deterministic.
    pub fn without_transitions(mut self) -> Self {
        self.transitions = None;
        self
    }

    /// Run the full line pipeline over a document.
    pub fn format(&mut self, content: &str) -> String {
        let lines: Vec<&str> = content.split('\n').collect();
        let mut out: Vec<String> = Vec::with_capacity(lines.len());

        let mut in_h3 = false;
        let mut bullet_index = 0usize;
        let mut _current_section = "";

        for (i, &line) in lines.iter().enumerate() {
            // Heading lines switch scan state and pass through untouched.
            if line.starts_with("### ") {
                in_h3 = true;
                bullet_index = 0;
                out.push(line.to_owned());
                continue;
            }
            if line.starts_with("## ") {
                in_h3 = false;
                _current_section = line[3..].trim();
                out.push(line.to_owned());
                continue;
            }
            if line.starts_with('#') {
                in_h3 = false;
                out.push(line.to_owned());
                continue;
            }
            if line.trim().is_empty() {
                out.push(line.to_owned());
                continue;
            }

            let stripped = line.trim();
            if in_h3 && (stripped.starts_with("* ") || stripped.starts_with("- ")) {
                out.push(self.restyle_bullet(line, &mut bullet_index));
                continue;
            }
            if in_h3 && is_step_line(stripped) {
                out.push(format!("1. {stripped}"));
                continue;
            }

            let prev = if i > 0 { lines[i - 1] } else { "" };
            out.push(self.polish_prose(line, prev, i));
        }

        out.join("\n")
    }

    /// Replace the list marker with the positional palette glyph and bold at
    /// most one of the first two subject keywords.
    fn restyle_bullet(&self, line: &str, bullet_index: &mut usize) -> String {
        let glyph = BULLET_PALETTE[*bullet_index % BULLET_PALETTE.len()];
        let mut styled = BULLET_MARKER
            .replace(line, format!("${{1}}{glyph} "))
            .into_owned();
        *bullet_index += 1;

        for (kw, pattern) in self.keywords.iter().zip(&self.keyword_patterns).take(2) {
            if styled.to_lowercase().contains(kw.as_str()) {
                styled = pattern.replace(&styled, format!("**{kw}**")).into_owned();
                break;
            }
        }
        styled
    }

    /// Punctuation spacing, keyword bolding, phrase italics, terminator
    /// normalization and the occasional transition phrase.
    fn polish_prose(&mut self, line: &str, prev_line: &str, index: usize) -> String {
        let mut text = line.to_owned();

        for (pattern, replacement) in PUNCTUATION_RULES.iter() {
            text = pattern.replace_all(&text, *replacement).into_owned();
        }

        // At most one bold wrap among the first three keywords, skipped when
        // that keyword is already bold somewhere in the line.
        for (kw, pattern) in self.keywords.iter().zip(&self.keyword_patterns).take(3) {
            if text.to_lowercase().contains(kw.as_str()) && !text.contains(&format!("**{kw}")) {
                text = pattern.replace(&text, format!("**{kw}**")).into_owned();
                break;
            }
        }

        for pattern in EMPHASIS_RULES.iter() {
            text = pattern.replace_all(&text, "*${1}*").into_owned();
        }

        text = normalize_terminator(text);

        if let Some(rng) = &mut self.transitions
            && index > 0
            && text.chars().count() > TRANSITION_MIN_CHARS
            && rng.chance(TRANSITION_PROBABILITY)
        {
            let prev = prev_line.trim();
            if !prev.is_empty()
                && !prev.starts_with('#')
                && !TRANSITION_OPENERS.iter().any(|t| text.starts_with(t))
            {
                let transition = rng.pick(&TRANSITIONS);
                text = format!("{transition}, {}", text.to_lowercase());
            }
        }

        text
    }
}

/// Step-by-step content: mentions an indicator word, is long enough to be a
/// real instruction, and is not already numbered or bullet-styled.
fn is_step_line(stripped: &str) -> bool {
    let lower = stripped.to_lowercase();
    STEP_INDICATORS.iter().any(|w| lower.contains(w))
        && stripped.chars().count() > 30
        && !["1.", "2.", "3."].iter().any(|n| stripped.starts_with(n))
        && !BULLET_PALETTE.iter().any(|g| stripped.starts_with(g))
}

/// Long prose lines must end in terminal punctuation: a trailing comma is
/// replaced with a period, anything else gains one.
fn normalize_terminator(mut text: String) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() > TERMINATOR_MIN_CHARS
        && !trimmed.ends_with(['.', '!', '?', ':', ';'])
    {
        if trimmed.ends_with(',') {
            let without = text.trim_end().trim_end_matches(',').to_owned();
            text = format!("{without}.");
        } else {
            text.push('.');
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter(subject: &str) -> Formatter {
        Formatter::new(subject).without_transitions()
    }

    fn heading_lines(text: &str) -> Vec<&str> {
        text.lines().filter(|l| l.starts_with('#')).collect()
    }

    #[test]
    fn test_headings_preserved_in_order() {
        let input = "# Title\n\n## First\nprose here\n### Sub\n* item\n## Second\nmore prose\n";
        let output = formatter("business growth").format(input);
        assert_eq!(heading_lines(input), heading_lines(&output));
    }

    #[test]
    fn test_first_bullet_gets_first_glyph() {
        let input = "### Steps\n* grow your business";
        let output = formatter("subject").format(input);
        assert!(
            output.ends_with("• grow your business"),
            "got: {output:?}"
        );
    }

    #[test]
    fn test_bullet_glyphs_cycle_by_position() {
        let bullets: String = (0..22).map(|i| format!("* item {i}\n")).collect();
        let input = format!("### List\n{bullets}");
        let output = formatter("subject").format(&input);

        let styled: Vec<&str> = output.lines().skip(1).collect();
        assert!(styled[0].starts_with("• "));
        assert!(styled[1].starts_with("◦ "));
        // palette wraps after 20 entries
        assert!(styled[20].starts_with("• "));
    }

    #[test]
    fn test_bullet_counter_resets_per_h3() {
        let input = "### A\n* one\n* two\n### B\n* one again";
        let output = formatter("subject").format(&input);
        let bullets: Vec<&str> = output
            .lines()
            .filter(|l| !l.starts_with('#'))
            .collect();
        assert!(bullets[0].starts_with("• "));
        assert!(bullets[1].starts_with("◦ "));
        assert!(bullets[2].starts_with("• "), "counter must reset: {bullets:?}");
    }

    #[test]
    fn test_bullets_outside_h3_untouched() {
        let input = "## Section\n* plain bullet stays";
        let output = formatter("subject").format(input);
        assert!(output.contains("* plain bullet stays"));
    }

    #[test]
    fn test_bullet_keyword_bolded_once() {
        let input = "### Tips\n* use seo and seo again";
        let output = formatter("seo strategi").format(input);
        assert!(output.contains("**seo** and seo again"), "got: {output:?}");
    }

    #[test]
    fn test_step_line_numbered() {
        let line = "langkah pertama adalah menyiapkan rencana bisnis anda";
        let input = format!("### How\n{line}");
        let output = formatter("subject").format(&input);
        assert!(output.contains(&format!("1. {line}")));
    }

    #[test]
    fn test_short_step_line_not_numbered() {
        let input = "### How\nlangkah satu";
        let output = formatter("subject").format(input);
        assert!(output.contains("\nlangkah satu"));
        assert!(!output.contains("1. langkah"));
    }

    #[test]
    fn test_already_numbered_step_untouched() {
        let line = "1. langkah pertama adalah menyiapkan rencana bisnis anda";
        let input = format!("### How\n{line}");
        let output = formatter("subject").format(&input);
        assert!(!output.contains("1. 1."));
    }

    #[test]
    fn test_punctuation_spacing_normalized() {
        let input = "## S\nfirst ,second .Third";
        let output = formatter("subject").format(input);
        assert!(output.contains("first, second. Third"), "got: {output:?}");
    }

    #[test]
    fn test_terminator_appended_to_long_line() {
        // 55 chars, ends in a letter
        let line = "a".repeat(55);
        let input = format!("## S\n{line}");
        let output = formatter("subject").format(&input);
        assert!(output.ends_with(&format!("{line}.")));
    }

    #[test]
    fn test_terminator_replaces_trailing_comma() {
        let line = format!("{},", "b".repeat(55));
        let input = format!("## S\n{line}");
        let output = formatter("subject").format(&input);
        assert!(output.ends_with(&format!("{}.", "b".repeat(55))));
    }

    #[test]
    fn test_exclamation_line_unchanged() {
        let line = format!("{}!", "c".repeat(55));
        let input = format!("## S\n{line}");
        let output = formatter("subject").format(&input);
        assert!(output.ends_with(&line));
    }

    #[test]
    fn test_short_line_gets_no_terminator() {
        let input = "## S\nshort line";
        let output = formatter("subject").format(input);
        assert!(output.ends_with("short line"));
    }

    #[test]
    fn test_emphasis_phrases_italicized() {
        let input = "## S\nThis is crucial and highly recommended advice";
        let output = formatter("subject").format(input);
        assert!(output.contains("*crucial*"));
        assert!(output.contains("*highly recommended*"));
    }

    #[test]
    fn test_prose_keyword_bolded_case_insensitive() {
        let input = "## S\nInvest in Marketing early";
        let output = formatter("marketing digital").format(input);
        assert!(output.contains("**marketing** early"), "got: {output:?}");
    }

    #[test]
    fn test_already_bold_keyword_skipped() {
        let input = "## S\n**marketing** is key for marketing teams";
        let output = formatter("marketing digital").format(input);
        // no double-wrapping of the existing bold span
        assert!(!output.contains("****"));
    }

    #[test]
    fn test_deterministic_without_transitions() {
        let input = "## S\nsome prose line that is fairly long and detailed overall";
        let a = formatter("business growth").format(input);
        let b = formatter("business growth").format(input);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seeded_transitions_reproducible() {
        let long_line = "kalimat yang cukup panjang untuk memenuhi ambang batas transisi ya".repeat(2);
        let input = format!("## S\nintro line\n{long_line}\n{long_line}\n{long_line}");

        let a = Formatter::new("subject").with_transition_seed(9).format(&input);
        let b = Formatter::new("subject").with_transition_seed(9).format(&input);
        assert_eq!(a, b);
    }

    #[test]
    fn test_transition_joins_with_comma_and_lowercases() {
        let long_line = format!("Perusahaan {}", "x".repeat(70));
        let input = format!("## S\nintro line\n{long_line}");

        // scan seeds until one fires to keep the test independent of the
        // draw sequence
        let fired = (0..64).find_map(|seed| {
            let out = Formatter::new("subject")
                .with_transition_seed(seed)
                .format(&input);
            let last = out.lines().last().unwrap().to_owned();
            TRANSITIONS
                .iter()
                .any(|t| last.starts_with(&format!("{t}, ")))
                .then_some(last)
        });

        let line = fired.expect("some seed should trigger a transition");
        assert!(line.contains("perusahaan"), "rest must be lowercased: {line}");
    }
}
