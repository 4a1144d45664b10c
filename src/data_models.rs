use serde::Serialize;
use std::sync::OnceLock;

static CATALOG: OnceLock<Vec<PageEntry>> = OnceLock::new();

/// The pages the site search knows about, relative to the directory holding
/// `search.html`. Results are always reported in this order.
pub fn catalog() -> &'static [PageEntry] {
    CATALOG.get_or_init(|| {
        [
            ("./index.html", "Home"),
            ("English/en.html", "English – Home"),
            ("English/inm.html", "English – Immigration"),
            ("French/fr.html", "Français – Accueil"),
            ("French/inm.html", "Français – Immigration"),
            ("Spanish/es.html", "Español – Inicio"),
            ("Spanish/inm.html", "Español – Inmigración"),
            ("Legal/privacy.html", "Privacy"),
            ("Legal/termsofservice.html", "Terms of Service"),
            ("Legal/communityguidelines.html", "Community Guidelines"),
        ]
        .into_iter()
        .map(|(url, title)| PageEntry::new(url, title))
        .collect()
    })
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub url: String,
    pub title: String,
}

impl PageEntry {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> PageEntry {
        PageEntry {
            url: url.into(),
            title: title.into(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub page: PageEntry,
    pub snippet: String,
}

/// A trimmed search query. The empty query means "nothing to search for".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn new(raw: &str) -> Query {
        Query(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::ops::Deref for Query {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
