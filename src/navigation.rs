use anyhow::Result;
use markup5ever_rcdom::Handle;
use reqwest::Url;

use crate::data_models::Query;
use crate::dom::{attr, descendants, is_element, set_attr};
use crate::page::{PageEnv, SubmitEvent};

pub const SEARCH_PAGE: &str = "search.html";

/// Site sections that live one directory below the search page.
const SUBSECTIONS: [&str; 4] = ["English", "French", "Spanish", "Legal"];

/// Relative link from the page at `current_path` to the search page.
pub fn resolve_search_path(current_path: &str) -> &'static str {
    let path = current_path.replace('\\', "/");
    let mut segments: Vec<&str> = path.split('/').collect();
    // the last segment is the file name, only directories count
    segments.pop();
    if segments.iter().any(|s| SUBSECTIONS.contains(s)) {
        "../search.html"
    } else {
        "./search.html"
    }
}

pub fn is_search_page(path: &str) -> bool {
    path.replace('\\', "/").ends_with(&format!("/{SEARCH_PAGE}"))
}

/// Where a search for `query` submitted from `current_path` should go.
pub fn search_href(current_path: &str, query: &Query) -> String {
    format!(
        "{}?q={}",
        resolve_search_path(current_path),
        urlencoding::encode(query)
    )
}

/// The query box of a search form: an `input[type=search]`, else an
/// `input[name=q]`, else the element with id `q`.
pub fn find_query_input(form: &Handle) -> Option<Handle> {
    let nodes = descendants(form);
    let inputs = || nodes.iter().filter(|n| is_element(n, "input"));
    inputs()
        .find(|n| attr(n, "type").is_some_and(|t| t.eq_ignore_ascii_case("search")))
        .or_else(|| inputs().find(|n| attr(n, "name").as_deref() == Some("q")))
        .or_else(|| nodes.iter().find(|n| attr(n, "id").as_deref() == Some("q")))
        .cloned()
}

/// Types `value` into the form's query box. Returns false when the form has
/// none.
pub fn fill_query_input(form: &Handle, value: &str) -> bool {
    match find_query_input(form) {
        Some(input) => {
            set_attr(&input, "value", value);
            true
        }
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The browser was sent to the search page.
    Navigated(Url),
    /// The query was blank; focus went back to the input.
    Refocused,
    /// The form has no recognizable query input.
    MissingInput,
    /// No search listener is attached to the form.
    NotHooked,
}

pub fn handle_search_submit(env: &mut PageEnv, event: &mut SubmitEvent) -> Result<SubmitOutcome> {
    event.prevent_default();
    let Some(input) = find_query_input(&event.form) else {
        log::warn!("search form without a query input");
        return Ok(SubmitOutcome::MissingInput);
    };
    let query = Query::new(&attr(&input, "value").unwrap_or_default());
    if query.is_empty() {
        env.focus(input);
        return Ok(SubmitOutcome::Refocused);
    }

    let href = search_href(&env.location().pathname(), &query);
    let target = env.navigate(&href)?.clone();
    Ok(SubmitOutcome::Navigated(target))
}
