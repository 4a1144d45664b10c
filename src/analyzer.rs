use markup5ever_rcdom::{Handle, NodeData};

use crate::dom::{HtmlPage, local_name};

/// Elements whose text never counts as visible page text.
fn is_hidden_element(local: &str) -> bool {
    matches!(local, "script" | "style" | "noscript")
}

/// Returns the visible text of an HTML document's body: the text nodes in
/// document order with script/style/noscript content dropped, whitespace runs
/// collapsed to one space and the ends trimmed.
///
/// The markup is only parsed, nothing embedded in it is executed.
pub fn extract_visible_text(html: &str) -> String {
    let page = HtmlPage::parse(html);
    let Some(body) = page.body() else {
        return String::new();
    };
    let mut raw = String::new();
    walk_html(&body, &mut raw);
    collapse_whitespace(&raw)
}

fn walk_html(handle: &Handle, out: &mut String) {
    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            NodeData::Element { .. } => {
                if local_name(child).is_some_and(is_hidden_element) {
                    continue;
                }
                walk_html(child, out);
            }
            _ => {}
        }
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}
