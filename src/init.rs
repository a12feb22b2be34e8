//! Project scaffolding for `karang init`.
//!
//! Writes a fully commented starter config plus empty subject and key files
//! so a new project documents every available key on day one.

use crate::log;
use anyhow::{Result, bail};
use std::{fs, path::Path};

const CONFIG_TEMPLATE: &str = "\
# karang configuration
# Flat key=value format; lines starting with '#' are ignored.
# Every key is optional - missing keys use the defaults shown here.

# Site domain the generated posts are published under
domain = example.com

# Articles produced per run
articles_per_run = 2

# Article length bounds (words)
min_word_count = 5000
max_word_count = 8000

# Per-H2-section length bounds (words)
h2_min_words = 400
h2_max_words = 600

# Heading count target
target_headings = 20

# Prompt language: English or Indonesian
language = English

# Category pool, comma separated
base_categories = Bisnis,Keuangan,Teknologi,Marketing

# Frontmatter author
author_name = Admin

# Image annotation
enable_auto_images = true
images_per_article = 5
fallback_image_offset = 10

# Input, state and output files (relative to the project root)
subjects_file = subjects.txt
credentials_file = apikey.txt
output_dir = _posts
links_file = article_links.json
processed_file = processed_subjects.json

# Publishing target (leave github_repo empty to disable `karang publish`)
github_repo =
github_branch = main
# github_token_path = .github-token

# Interval for `karang schedule`, in minutes
schedule_interval_minutes = 60
";

const SUBJECTS_TEMPLATE: &str = "\
# One subject per line. Each becomes one article.
# business strategy 2025
# digital marketing trends
";

const APIKEY_TEMPLATE: &str = "\
# One API key per line. Keys are rotated when requests fail.
";

/// Create the starter files. Refuses to overwrite an existing config.
pub fn init_project(root: &Path, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        bail!(
            "Config file already exists at {}. Remove it first or init elsewhere.",
            config_path.display()
        );
    }
    fs::create_dir_all(root)?;
    fs::write(config_path, CONFIG_TEMPLATE)?;

    for (name, template) in [
        ("subjects.txt", SUBJECTS_TEMPLATE),
        ("apikey.txt", APIKEY_TEMPLATE),
    ] {
        let path = root.join(name);
        if !path.exists() {
            fs::write(&path, template)?;
        }
    }

    log!("init"; "project initialized at {}", root.display());
    Ok(())
}
