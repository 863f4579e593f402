//! Mutable HTML tree for one rendered page.
//!
//! Wraps [`scraper::Html`] and edits its `ego_tree` directly. New nodes are
//! produced by parsing a small fragment and cloning the resulting node, which
//! keeps markup construction in plain HTML.

use std::sync::LazyLock;

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Node, Selector};

use docsetgen_shared::{DocsetError, Result};

use crate::classify::HeadingLevel;

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static HEAD: LazyLock<Selector> = LazyLock::new(|| selector("head"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// A heading picked out of the document, detached from the tree borrow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub node: NodeId,
    pub level: HeadingLevel,
    /// Trimmed text content.
    pub text: String,
    pub id: Option<String>,
}

/// Owned HTML document of one page, dropped once written to disk.
pub struct RenderedDocument {
    html: Html,
}

impl RenderedDocument {
    /// Parse a full HTML document. Parsing is lenient and never fails.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Headings matching `css`, in document order.
    ///
    /// Matched elements other than `h1`–`h3` are ignored.
    pub fn headings(&self, css: &str) -> Result<Vec<Heading>> {
        let selector = Selector::parse(css)
            .map_err(|e| DocsetError::parse(format!("invalid selector `{css}`: {e}")))?;

        Ok(self
            .html
            .select(&selector)
            .filter_map(|el| {
                let level = HeadingLevel::from_tag(el.value().name())?;
                Some(Heading {
                    node: el.id(),
                    level,
                    text: el.text().collect::<String>().trim().to_string(),
                    id: el.value().attr("id").map(str::to_string),
                })
            })
            .collect())
    }

    /// Insert `markup` (a single element or comment) as the previous sibling of `node`.
    pub fn insert_before(&mut self, node: NodeId, markup: &str) -> Result<()> {
        let new_node = fragment_node(markup)?;
        let mut target = self
            .html
            .tree
            .get_mut(node)
            .ok_or_else(|| DocsetError::parse("heading node no longer in document"))?;
        target.insert_before(new_node);
        Ok(())
    }

    /// Insert the icon and stylesheet links right after `<title>`.
    ///
    /// Resulting order: title, icon, stylesheet. Without a title the links are
    /// appended to `<head>`.
    pub fn decorate_head(&mut self, icon_href: &str, stylesheet_href: &str) -> Result<()> {
        let stylesheet = fragment_node(&format!(
            r#"<link rel="stylesheet" href="{}" type="text/css">"#,
            escape_attr(stylesheet_href)
        ))?;
        let icon = fragment_node(&format!(
            r#"<link rel="shortcut icon" type="image/png" href="{}">"#,
            escape_attr(icon_href)
        ))?;

        if let Some(title) = self.first(&TITLE) {
            let mut title = self
                .html
                .tree
                .get_mut(title)
                .ok_or_else(|| DocsetError::parse("title node no longer in document"))?;
            title.insert_after(stylesheet);
            title.insert_after(icon);
            return Ok(());
        }

        let head = self
            .first(&HEAD)
            .ok_or_else(|| DocsetError::parse("rendered page has no <head>"))?;
        let mut head = self
            .html
            .tree
            .get_mut(head)
            .ok_or_else(|| DocsetError::parse("head node no longer in document"))?;
        head.append(icon);
        head.append(stylesheet);
        Ok(())
    }

    /// Make `<!-- Online page at <url> -->` the first child of `<html>`.
    pub fn insert_online_comment(&mut self, url: &str) -> Result<()> {
        let comment = fragment_node(&format!("<!-- Online page at {} -->", url.replace("--", "%2D%2D")))?;
        let root = self.html.root_element().id();
        let mut root = self
            .html
            .tree
            .get_mut(root)
            .ok_or_else(|| DocsetError::parse("document has no root element"))?;
        root.prepend(comment);
        Ok(())
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        self.html.html()
    }

    fn first(&self, selector: &Selector) -> Option<NodeId> {
        self.html.select(selector).next().map(|el: ElementRef<'_>| el.id())
    }
}

/// Parse `markup` as a fragment and return a copy of its single top-level node.
fn fragment_node(markup: &str) -> Result<Node> {
    let fragment = Html::parse_fragment(markup);
    fragment
        .root_element()
        .children()
        .next()
        .map(|child| child.value().clone())
        .ok_or_else(|| DocsetError::parse(format!("markup produced no node: {markup}")))
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
