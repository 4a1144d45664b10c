use anyhow::Result;
use markup5ever_rcdom::Handle;

use crate::data_models::{PageEntry, Query, SearchResult, catalog};
use crate::dom::is_element;
use crate::fetcher::PageFetcher;
use crate::footer::update_footer_year;
use crate::navigation::{SubmitOutcome, find_query_input, handle_search_submit, is_search_page};
use crate::page::{PageEnv, SubmitEvent};
use crate::render::{prompt_markup, render_results, searching_markup, show_in_grid};
use crate::searcher::search_catalog;

/// Where the search page ended up after its ready handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPageState {
    /// Not the search page, nothing was done.
    Idle,
    /// No `q` parameter, the visitor was asked to type one.
    NoQueryPrompt,
    Rendered { results: usize },
}

/// The site's page scripts, bound to a way of fetching the catalog pages.
pub struct Site<F> {
    fetcher: F,
    catalog: Vec<PageEntry>,
}

impl<F: PageFetcher> Site<F> {
    pub fn new(fetcher: F) -> Site<F> {
        Site::with_catalog(fetcher, catalog().to_vec())
    }

    pub fn with_catalog(fetcher: F, catalog: Vec<PageEntry>) -> Site<F> {
        Site { fetcher, catalog }
    }

    pub fn catalog(&self) -> &[PageEntry] {
        &self.catalog
    }

    /// Attaches the search submit listener to every form that has a query
    /// input. Returns the number of forms hooked.
    pub fn attach(&self, env: &mut PageEnv) -> usize {
        let forms = env
            .document()
            .find_all(|n| is_element(n, "form") && find_query_input(n).is_some());
        let hooked = forms.len();
        for form in forms {
            env.add_submit_listener(form);
        }
        log::debug!("attached search listener to {hooked} form(s)");
        hooked
    }

    /// Dispatches a submit of `form`.
    pub fn submit(&self, env: &mut PageEnv, form: &Handle) -> Result<SubmitOutcome> {
        if !env.has_submit_listener(form) {
            return Ok(SubmitOutcome::NotHooked);
        }
        let mut event = SubmitEvent::new(form.clone());
        handle_search_submit(env, &mut event)
    }

    /// The page-ready handler: stamps the footer, then runs the search page
    /// logic.
    pub async fn on_ready(&self, env: &mut PageEnv, year: i32) -> SearchPageState {
        update_footer_year(env.document(), year);
        self.run_search_page(env).await
    }

    pub async fn run_search_page(&self, env: &mut PageEnv) -> SearchPageState {
        if !is_search_page(&env.location().pathname()) {
            return SearchPageState::Idle;
        }
        let query = Query::new(&env.location().query_param("q").unwrap_or_default());
        if query.is_empty() {
            show_in_grid(env.document(), prompt_markup());
            return SearchPageState::NoQueryPrompt;
        }

        show_in_grid(env.document(), searching_markup());
        let results = self.search(&query).await;
        render_results(env.document(), &query, &results);
        SearchPageState::Rendered {
            results: results.len(),
        }
    }

    pub async fn search(&self, query: &Query) -> Vec<SearchResult> {
        search_catalog(query, &self.catalog, &self.fetcher).await
    }
}
