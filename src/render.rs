use markup5ever_rcdom::Handle;

use crate::data_models::SearchResult;
use crate::dom::{
    HtmlPage, append_child, descendants, has_class, is_element, parse_fragment, prepend_child,
    set_inner_html,
};

pub const RESULTS_CONTAINER_ID: &str = "search-results";
pub const GRID_CLASS: &str = "grid";

/// Escapes the characters that could break out of text or attribute context.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn results_container_markup() -> String {
    format!(
        r#"<section id="{RESULTS_CONTAINER_ID}" class="card-grid"><h2>Search results</h2>{}</section>"#,
        grid_markup()
    )
}

fn grid_markup() -> String {
    format!(r#"<div class="{GRID_CLASS}" role="list"></div>"#)
}

pub fn no_results_markup(query: &str) -> String {
    format!(
        r#"<div class="card"><h3>No results</h3><p>No matches found for "{}".</p></div>"#,
        escape_html(query)
    )
}

pub fn result_card_markup(result: &SearchResult) -> String {
    format!(
        r#"<a class="card" href="{}"><h3>{}</h3><p>{}</p></a>"#,
        escape_html(&result.page.url),
        escape_html(&result.page.title),
        escape_html(&result.snippet)
    )
}

/// Markup for the whole grid: one card per result, or the "no results" card.
pub fn results_markup(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return no_results_markup(query);
    }
    results.iter().map(result_card_markup).collect()
}

pub fn prompt_markup() -> &'static str {
    r#"<div class="card"><p>Type a query into the search box above.</p></div>"#
}

pub fn searching_markup() -> &'static str {
    r#"<div class="card"><p>Searching…</p></div>"#
}

/// Returns the results grid, creating the results section at the top of the
/// main content area (or the body) when the page has none.
pub fn ensure_results_container(page: &HtmlPage) -> Handle {
    let container = match page.find_by_id(RESULTS_CONTAINER_ID) {
        Some(container) => container,
        None => {
            let main = page
                .find_first(|n| is_element(n, "main") && has_class(n, "page-content"))
                .unwrap_or_else(|| page.body_or_document());
            let mut nodes = parse_fragment(&results_container_markup());
            let container = nodes.remove(0);
            prepend_child(&main, container.clone());
            log::debug!("created #{RESULTS_CONTAINER_ID} container");
            container
        }
    };

    let existing_grid = descendants(&container)
        .into_iter()
        .find(|n| has_class(n, GRID_CLASS));
    match existing_grid {
        Some(grid) => grid,
        None => {
            let grid = parse_fragment(&grid_markup()).remove(0);
            append_child(&container, grid.clone());
            grid
        }
    }
}

/// Replaces whatever the results grid shows with `markup`.
pub fn show_in_grid(page: &HtmlPage, markup: &str) {
    let grid = ensure_results_container(page);
    set_inner_html(&grid, markup);
}

pub fn render_results(page: &HtmlPage, query: &str, results: &[SearchResult]) {
    show_in_grid(page, &results_markup(query, results));
}
