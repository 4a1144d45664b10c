use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use std::path::Path;

use crate::dom::{HtmlPage, has_class, set_text_content};

pub const FOOTER_TEXT_CLASS: &str = "site-footer-text";
const FIRST_YEAR: i32 = 2019;

pub fn footer_text(year: i32) -> String {
    format!("© ToadVille Bay {FIRST_YEAR}–{year}")
}

pub fn current_year() -> i32 {
    Local::now().year()
}

/// Stamps every footer text element with the copyright line for `year`.
/// Returns how many elements were updated.
pub fn update_footer_year(page: &HtmlPage, year: i32) -> usize {
    let text = footer_text(year);
    let targets = page.find_all(|n| has_class(n, FOOTER_TEXT_CLASS));
    for node in &targets {
        set_text_content(node, &text);
    }
    targets.len()
}

/// Applies [`update_footer_year`] to an HTML file in place. The file is only
/// rewritten (and re-serialized) when it has footer text elements.
pub fn rewrite_footer_file(path: &Path, year: i32) -> Result<usize> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let page = HtmlPage::parse(&html);
    let updated = update_footer_year(&page, year);
    if updated > 0 {
        std::fs::write(path, page.to_html()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    log::info!("{}: updated {} footer element(s)", path.display(), updated);
    Ok(updated)
}
