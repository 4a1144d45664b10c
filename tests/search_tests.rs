use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use toadsite::data_models::{PageEntry, Query, catalog};
use toadsite::fetcher::{DirFetcher, FetchError, PageFetcher};
use toadsite::searcher::search_catalog;
use toadsite::snippet::contains_ignore_case;

mod test_helpers {
    use super::*;

    pub enum FakeResponse {
        Page { html: String, delay_ms: u64 },
        Status(u16),
    }

    /// In-memory site. Urls without a response fail like an unreachable page.
    #[derive(Default)]
    pub struct FakeFetcher {
        pages: HashMap<String, FakeResponse>,
        pub calls: AtomicUsize,
    }

    impl FakeFetcher {
        pub fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                FakeResponse::Page {
                    html: format!("<html><body>{body}</body></html>"),
                    delay_ms: 0,
                },
            );
            self
        }

        pub fn slow_page(mut self, url: &str, body: &str, delay_ms: u64) -> Self {
            self.pages.insert(
                url.to_string(),
                FakeResponse::Page {
                    html: format!("<html><body>{body}</body></html>"),
                    delay_ms,
                },
            );
            self
        }

        pub fn status(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), FakeResponse::Status(status));
            self
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.pages.get(url) {
                Some(FakeResponse::Page { html, delay_ms }) => {
                    tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                    Ok(html.clone())
                }
                Some(FakeResponse::Status(status)) => Err(FetchError::Status {
                    url: url.to_string(),
                    status: *status,
                }),
                None => Err(FetchError::Io {
                    path: PathBuf::from(url),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "unreachable"),
                }),
            }
        }
    }

    pub fn small_catalog() -> Vec<PageEntry> {
        vec![
            PageEntry::new("a.html", "Alpha"),
            PageEntry::new("b.html", "Bravo"),
            PageEntry::new("c.html", "Charlie"),
        ]
    }

    pub fn fixture_site() -> DirFetcher {
        DirFetcher::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/site"))
    }

    pub fn titles(results: &[toadsite::data_models::SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.page.title.as_str()).collect()
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_failing_page_is_skipped() -> Result<()> {
    let fetcher = FakeFetcher::default()
        .page("b.html", "<p>Toads everywhere</p>")
        .page("c.html", "<p>No amphibians here</p>");

    let results = search_catalog(&Query::new("toads"), &small_catalog(), &fetcher).await;
    assert_eq!(titles(&results), vec!["Bravo"]);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    Ok(())
}

#[tokio::test]
async fn test_error_status_is_skipped() -> Result<()> {
    let fetcher = FakeFetcher::default()
        .status("a.html", 404)
        .page("b.html", "toads")
        .status("c.html", 500);

    let results = search_catalog(&Query::new("toads"), &small_catalog(), &fetcher).await;
    assert_eq!(titles(&results), vec!["Bravo"]);
    Ok(())
}

#[tokio::test]
async fn test_results_follow_catalog_order_not_completion_order() -> Result<()> {
    let fetcher = FakeFetcher::default()
        .slow_page("a.html", "bay one", 60)
        .slow_page("b.html", "bay two", 30)
        .slow_page("c.html", "bay three", 0);

    let results = search_catalog(&Query::new("bay"), &small_catalog(), &fetcher).await;
    assert_eq!(titles(&results), vec!["Alpha", "Bravo", "Charlie"]);
    Ok(())
}

/// Each fetch waits until every other fetch has started, so this only
/// finishes if all requests are in flight at the same time.
#[tokio::test]
async fn test_fetches_are_issued_concurrently() -> Result<()> {
    struct GatedFetcher {
        gate: tokio::sync::Barrier,
    }

    #[async_trait]
    impl PageFetcher for GatedFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.gate.wait().await;
            Ok(format!("<body>page {url}</body>"))
        }
    }

    let catalog = small_catalog();
    let fetcher = GatedFetcher {
        gate: tokio::sync::Barrier::new(catalog.len()),
    };
    let results = tokio::time::timeout(
        Duration::from_secs(5),
        search_catalog(&Query::new("page"), &catalog, &fetcher),
    )
    .await?;
    assert_eq!(results.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_empty_query_fetches_nothing() -> Result<()> {
    let fetcher = FakeFetcher::default().page("a.html", "anything");
    let results = search_catalog(&Query::new("   "), &small_catalog(), &fetcher).await;
    assert!(results.is_empty());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_match_is_case_insensitive_and_snippet_built() -> Result<()> {
    let fetcher = FakeFetcher::default().page("a.html", "<h1>Harbour</h1><p>The FERRY leaves at noon.</p>");
    let results = search_catalog(&Query::new("ferry"), &small_catalog(), &fetcher).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].snippet, "HarbourThe FERRY leaves at noon.");
    Ok(())
}

#[tokio::test]
async fn test_script_text_does_not_match() -> Result<()> {
    let fetcher = FakeFetcher::default()
        .page("a.html", "<p>visible</p><script>var secret = 1;</script>")
        .page("b.html", "<p>the secret garden</p>");
    let results = search_catalog(&Query::new("secret"), &small_catalog(), &fetcher).await;
    assert_eq!(titles(&results), vec!["Bravo"]);
    Ok(())
}

#[tokio::test]
async fn test_fixture_site_privacy_search() -> Result<()> {
    let fetcher = fixture_site();
    let results = search_catalog(&Query::new("privacy"), catalog(), &fetcher).await;

    assert_eq!(titles(&results), vec!["Privacy", "Terms of Service"]);
    for result in &results {
        assert!(
            contains_ignore_case(&result.snippet, "privacy"),
            "snippet without the query: {}",
            result.snippet
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_fixture_site_matches_every_page_header() -> Result<()> {
    let fetcher = fixture_site();
    let results = search_catalog(&Query::new("toadville bay"), catalog(), &fetcher).await;
    assert_eq!(results.len(), catalog().len());
    let urls: Vec<&str> = results.iter().map(|r| r.page.url.as_str()).collect();
    let expected: Vec<&str> = catalog().iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls, expected);
    Ok(())
}

#[tokio::test]
async fn test_fixture_site_missing_root_yields_nothing() -> Result<()> {
    let fetcher = DirFetcher::new("/definitely/not/a/site");
    let results = search_catalog(&Query::new("toads"), catalog(), &fetcher).await;
    assert!(results.is_empty());
    Ok(())
}
