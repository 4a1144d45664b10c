use anyhow::{Context, Result};
use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{Attribute, LocalName, Namespace, QualName, parse_document};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::RefCell;
use std::rc::Rc;

/// A parsed HTML page that can be queried and mutated without a browser.
/// Scripts inside the markup are never run.
pub struct HtmlPage {
    dom: RcDom,
}

impl HtmlPage {
    pub fn parse(html: &str) -> HtmlPage {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        HtmlPage { dom }
    }

    pub fn document(&self) -> Handle {
        self.dom.document.clone()
    }

    /// The `body` child of the root `html` element. The parser always
    /// creates both, unless the page is a frameset.
    pub fn body(&self) -> Option<Handle> {
        let html = child_element(&self.dom.document, "html")?;
        child_element(&html, "body")
    }

    pub fn body_or_document(&self) -> Handle {
        self.body().unwrap_or_else(|| self.document())
    }

    pub fn find_by_id(&self, id: &str) -> Option<Handle> {
        self.find_first(|node| attr(node, "id").as_deref() == Some(id))
    }

    pub fn find_first<P>(&self, pred: P) -> Option<Handle>
    where
        P: Fn(&Handle) -> bool,
    {
        descendants(&self.dom.document).into_iter().find(|n| pred(n))
    }

    /// All nodes matching `pred`, in document order.
    pub fn find_all<P>(&self, pred: P) -> Vec<Handle>
    where
        P: Fn(&Handle) -> bool,
    {
        descendants(&self.dom.document)
            .into_iter()
            .filter(|n| pred(n))
            .collect()
    }

    pub fn to_html(&self) -> Result<String> {
        let handle: SerializableHandle = self.dom.document.clone().into();
        let mut bytes = Vec::new();
        serialize(
            &mut bytes,
            &handle,
            SerializeOpts {
                traversal_scope: TraversalScope::ChildrenOnly(None),
                ..Default::default()
            },
        )
        .context("Failed to serialize page")?;
        String::from_utf8(bytes).context("Serialized page is not valid utf-8")
    }
}

/// Every node below `root` in document order, `root` itself excluded.
pub fn descendants(root: &Handle) -> Vec<Handle> {
    let mut out = Vec::new();
    let mut stack: Vec<Handle> = root.children.borrow().iter().rev().cloned().collect();
    while let Some(node) = stack.pop() {
        stack.extend(node.children.borrow().iter().rev().cloned());
        out.push(node);
    }
    out
}

fn child_element(parent: &Handle, tag: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|child| is_element(child, tag))
        .cloned()
}

pub fn local_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub fn attr(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

pub fn set_attr(node: &Handle, name: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|a| &*a.name.local == name) {
            Some(existing) => existing.value = StrTendril::from_slice(value),
            None => attrs.push(Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
                value: StrTendril::from_slice(value),
            }),
        }
    }
}

pub fn has_class(node: &Handle, class: &str) -> bool {
    attr(node, "class").is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

pub fn is_element(node: &Handle, tag: &str) -> bool {
    local_name(node) == Some(tag)
}

pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    for child in descendants(node) {
        if let NodeData::Text { contents } = &child.data {
            text.push_str(&contents.borrow());
        }
    }
    text
}

/// Replaces all children of `node` with a single text node.
pub fn set_text_content(node: &Handle, text: &str) {
    clear_children(node);
    if !text.is_empty() {
        let text_node = Node::new(NodeData::Text {
            contents: RefCell::new(StrTendril::from_slice(text)),
        });
        append_child(node, text_node);
    }
}

/// Replaces all children of `node` with the nodes parsed from `markup`.
pub fn set_inner_html(node: &Handle, markup: &str) {
    clear_children(node);
    for child in parse_fragment(markup) {
        append_child(node, child);
    }
}

/// Parses a piece of body markup into detached nodes.
pub fn parse_fragment(markup: &str) -> Vec<Handle> {
    let page = HtmlPage::parse(markup);
    let Some(body) = page.body() else {
        return Vec::new();
    };
    let children: Vec<Handle> = body.children.borrow_mut().drain(..).collect();
    for child in &children {
        child.parent.set(None);
    }
    children
}

pub fn clear_children(node: &Handle) {
    let children: Vec<Handle> = node.children.borrow_mut().drain(..).collect();
    for child in children {
        child.parent.set(None);
    }
}

pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

pub fn prepend_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().insert(0, child);
}
