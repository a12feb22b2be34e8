//! Image annotation.
//!
//! Inserts stock image references after qualifying H2 headings. Images come
//! from a fixed pool of external URLs - nothing is downloaded, the hosted
//! blog loads them straight from the CDN. Closing-type headings are skipped
//! so a "Conclusion" section never opens with a stock photo.

use crate::config::GeneratorConfig;

/// External stock image pool, cycled in order.
const IMAGE_SOURCES: [&str; 8] = [
    "https://images.unsplash.com/photo-1542744173-8e7e53415bb0?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1560472355-536de3962603?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1486406146926-c627a92ad1ab?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1497215728101-856f4ea42174?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1553484771-371a605b060b?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1551434678-e076c223a692?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1460925895917-afdab827c52f?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1556742393-d75f468bfcb0?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
];

/// Headings that should not be followed by an image
const EXCLUDED_HEADINGS: [&str; 4] = ["conclusion", "kesimpulan", "action", "outlook"];

/// Insert image blocks after qualifying H2 headings.
///
/// Stops inserting once `images_per_article` is reached; the rest of the
/// document always passes through intact. If no heading qualified, one
/// featured image is force-inserted at `fallback_image_offset` - a
/// positional heuristic with no semantic anchor, kept configurable.
pub fn annotate(content: &str, subject: &str, config: &GeneratorConfig) -> String {
    if !config.enable_auto_images {
        return content.to_owned();
    }

    let max_images = config.images_per_article;
    let mut inserted = 0usize;
    let mut out: Vec<String> = Vec::new();

    for line in content.split('\n') {
        out.push(line.to_owned());

        if inserted < max_images
            && line.starts_with("## ")
            && qualifies(&line[3..])
        {
            let url = IMAGE_SOURCES[inserted % IMAGE_SOURCES.len()];
            out.push(String::new());
            out.push(format!("![{subject} - professional guide]({url})"));
            out.push(String::new());
            inserted += 1;
        }
    }

    // No heading qualified: force one featured image near the top.
    if inserted == 0 && max_images > 0 {
        let at = config.fallback_image_offset.min(out.len());
        out.splice(
            at..at,
            [
                String::new(),
                format!("![{subject} - complete guide]({})", IMAGE_SOURCES[0]),
                String::new(),
            ],
        );
    }

    out.join("\n")
}

/// An H2 heading qualifies unless it contains an excluded word.
fn qualifies(heading: &str) -> bool {
    let lower = heading.trim().to_lowercase();
    !EXCLUDED_HEADINGS.iter().any(|skip| lower.contains(skip))
}
