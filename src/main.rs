use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use toadsite::config::CONFIG;
use toadsite::data_models::Query;
use toadsite::fetcher::{DirFetcher, PageFetcher, fetcher_for};
use toadsite::footer::{current_year, rewrite_footer_file};
use toadsite::navigation::{SubmitOutcome, fill_query_input};
use toadsite::page::PageEnv;
use toadsite::site::{SearchPageState, Site};

#[derive(Parser)]
#[command(name = "toadsite", about = "Footer dating and site search for the ToadVille Bay site")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the page catalog and print the matches
    Search {
        query: String,
        /// Site root directory or http(s) url (defaults to SITE_ROOT)
        #[arg(long)]
        site_root: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Rewrite the footer copyright line of HTML files in place
    Footer {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Run the page-ready scripts against a page and print the resulting HTML
    Render {
        page: PathBuf,
        /// Absolute url the page is served from, e.g. https://host/search.html?q=toad
        #[arg(long)]
        url: String,
        #[arg(long)]
        site_root: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Submit a page's search form and print where it navigates
    Submit {
        page: PathBuf,
        #[arg(long)]
        url: String,
        #[arg(long)]
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(CONFIG.log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let res = run(cli.command).await;
    if let Err(e) = &res {
        log::error!("{:#}", e);
    }
    res
}

fn site_for(site_root: Option<String>) -> Result<Site<Box<dyn PageFetcher>>> {
    let root = site_root.unwrap_or_else(|| CONFIG.site_root.clone());
    Ok(Site::new(fetcher_for(&root)?))
}

fn load_page(page: &Path, url: &str) -> Result<PageEnv> {
    let html = std::fs::read_to_string(page)
        .with_context(|| format!("Failed to read {}", page.display()))?;
    PageEnv::load(url, &html)
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Search {
            query,
            site_root,
            json,
        } => {
            let query = Query::new(&query);
            if query.is_empty() {
                bail!("Query cannot be empty");
            }
            let site = site_for(site_root)?;
            let results = site.search(&query).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No matches found for \"{query}\".");
            } else {
                for result in &results {
                    println!("{} ({})\n    {}", result.page.title, result.page.url, result.snippet);
                }
            }
        }
        Command::Footer { files, year } => {
            let year = year.unwrap_or_else(current_year);
            for file in &files {
                rewrite_footer_file(file, year)?;
            }
        }
        Command::Render {
            page,
            url,
            site_root,
            year,
            output,
        } => {
            let mut env = load_page(&page, &url)?;
            let site = site_for(site_root)?;
            site.attach(&mut env);
            let state = site
                .on_ready(&mut env, year.unwrap_or_else(current_year))
                .await;
            match state {
                SearchPageState::Idle => log::info!("{url} is not the search page"),
                SearchPageState::NoQueryPrompt => log::info!("no query in {url}"),
                SearchPageState::Rendered { results } => log::info!("rendered {results} result(s)"),
            }
            let html = env.document().to_html()?;
            match output {
                Some(path) => std::fs::write(&path, html)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{html}"),
            }
        }
        Command::Submit { page, url, query } => {
            let mut env = load_page(&page, &url)?;
            // submitting never fetches, so SITE_ROOT is not consulted
            let site = Site::new(DirFetcher::new("."));
            if site.attach(&mut env) == 0 {
                bail!("{} has no search form", page.display());
            }
            let form = env
                .document()
                .find_first(|n| env.has_submit_listener(n))
                .context("No hooked search form")?;
            fill_query_input(&form, &query);
            match site.submit(&mut env, &form)? {
                SubmitOutcome::Navigated(target) => println!("{target}"),
                other => println!("no navigation: {other:?}"),
            }
        }
    }
    Ok(())
}
