use futures::future::join_all;

use crate::analyzer::extract_visible_text;
use crate::data_models::{PageEntry, Query, SearchResult};
use crate::fetcher::PageFetcher;
use crate::snippet::{build_snippet, contains_ignore_case};

/// Fetches every catalog page at once and returns the ones whose visible
/// text contains `query`, in catalog order.
///
/// Pages that fail to load are left out. The call returns once every fetch
/// has settled.
pub async fn search_catalog<F>(query: &Query, catalog: &[PageEntry], fetcher: &F) -> Vec<SearchResult>
where
    F: PageFetcher + ?Sized,
{
    if query.is_empty() {
        return Vec::new();
    }

    // one slot per catalog entry, so completion order never leaks into the output
    let slots: Vec<Option<SearchResult>> = join_all(
        catalog
            .iter()
            .map(|page| search_page(query, page, fetcher)),
    )
    .await;

    let results: Vec<SearchResult> = slots.into_iter().flatten().collect();
    log::info!(
        "search for {:?} matched {} of {} pages",
        query.as_str(),
        results.len(),
        catalog.len()
    );
    results
}

async fn search_page<F>(query: &Query, page: &PageEntry, fetcher: &F) -> Option<SearchResult>
where
    F: PageFetcher + ?Sized,
{
    let html = match fetcher.fetch(&page.url).await {
        Ok(html) => html,
        Err(e) => {
            log::debug!("skipping {}: {}", page.url, e);
            return None;
        }
    };
    let text = extract_visible_text(&html);
    if !contains_ignore_case(&text, query) {
        return None;
    }
    Some(SearchResult {
        page: page.clone(),
        snippet: build_snippet(&text, query),
    })
}
