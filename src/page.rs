use anyhow::{Context, Result};
use markup5ever_rcdom::Handle;
use reqwest::Url;
use std::rc::Rc;

use crate::dom::HtmlPage;

/// Where the page was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    pub fn parse(href: &str) -> Result<Location> {
        let url = Url::parse(href).with_context(|| format!("Invalid page location {href}"))?;
        Ok(Location { url })
    }

    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    /// The path part of the location with any backslashes turned into `/`.
    pub fn pathname(&self) -> String {
        self.url.path().replace('\\', "/")
    }

    /// First value of the query parameter `name`, percent-decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Resolves a possibly relative `href` the way a link on this page would.
    pub fn resolve(&self, href: &str) -> Result<Url> {
        self.url
            .join(href)
            .with_context(|| format!("Cannot resolve {href} against {}", self.url))
    }
}

/// Everything the site scripts may touch on a loaded page: its location, its
/// document, where it navigated to, which element has focus and which forms
/// have a submit listener attached.
pub struct PageEnv {
    location: Location,
    document: HtmlPage,
    navigated_to: Option<Url>,
    focused: Option<Handle>,
    submit_listeners: Vec<Handle>,
}

impl PageEnv {
    pub fn new(location: Location, document: HtmlPage) -> PageEnv {
        PageEnv {
            location,
            document,
            navigated_to: None,
            focused: None,
            submit_listeners: Vec::new(),
        }
    }

    /// Convenience constructor from raw markup and an absolute url.
    pub fn load(href: &str, html: &str) -> Result<PageEnv> {
        Ok(PageEnv::new(Location::parse(href)?, HtmlPage::parse(html)))
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn document(&self) -> &HtmlPage {
        &self.document
    }

    pub fn navigate(&mut self, href: &str) -> Result<&Url> {
        let target = self.location.resolve(href)?;
        log::info!("navigating to {target}");
        let target = self.navigated_to.insert(target);
        Ok(&*target)
    }

    pub fn navigated_to(&self) -> Option<&Url> {
        self.navigated_to.as_ref()
    }

    pub fn focus(&mut self, node: Handle) {
        self.focused = Some(node);
    }

    pub fn focused(&self) -> Option<&Handle> {
        self.focused.as_ref()
    }

    pub fn add_submit_listener(&mut self, form: Handle) {
        if !self.has_submit_listener(&form) {
            self.submit_listeners.push(form);
        }
    }

    pub fn has_submit_listener(&self, form: &Handle) -> bool {
        self.submit_listeners.iter().any(|f| Rc::ptr_eq(f, form))
    }
}

/// A form submission as seen by a submit listener.
pub struct SubmitEvent {
    pub form: Handle,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(form: Handle) -> SubmitEvent {
        SubmitEvent {
            form,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parts() {
        let loc = Location::parse("https://toadville.example/search.html?q=toad+bay%26co&x=1").unwrap();
        assert_eq!(loc.pathname(), "/search.html");
        assert_eq!(loc.query_param("q").as_deref(), Some("toad bay&co"));
        assert_eq!(loc.query_param("missing"), None);
    }

    #[test]
    fn test_location_rejects_relative_href() {
        assert!(Location::parse("search.html").is_err());
    }

    #[test]
    fn test_navigate_resolves_relative_to_page() {
        let mut env = PageEnv::load("https://toadville.example/Legal/privacy.html", "").unwrap();
        env.navigate("../search.html?q=rules").unwrap();
        assert_eq!(
            env.navigated_to().map(Url::as_str),
            Some("https://toadville.example/search.html?q=rules")
        );
    }

    #[test]
    fn test_submit_listener_registered_once() {
        let mut env = PageEnv::load("https://toadville.example/", "<form id=f></form>").unwrap();
        let form = env.document().find_by_id("f").unwrap();
        env.add_submit_listener(form.clone());
        env.add_submit_listener(form.clone());
        assert!(env.has_submit_listener(&form));
        assert_eq!(env.submit_listeners.len(), 1);
    }
}
