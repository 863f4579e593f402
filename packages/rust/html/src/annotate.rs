//! Dash anchor injection and index entry extraction.

use tracing::debug;

use docsetgen_shared::{DocsetError, EntryKind, IndexEntry, Page, Result};

use crate::classify::{HeadingLevel, classify, setting_override};
use crate::document::{Heading, RenderedDocument};

/// Page titles and identified sections.
const PRIMARY_HEADINGS: &str = "h1, h2[id]";
/// Identified subsections; skipped on category pages.
const SUBSECTION_HEADINGS: &str = "h3[id]";

/// Markup of the anchor the viewer uses for its table of contents.
pub fn anchor_marker(kind: EntryKind, text: &str) -> String {
    let escaped: String = url::form_urlencoded::byte_serialize(text.as_bytes()).collect();
    format!(r#"<a name="//apple_ref/cpp/{kind}/{escaped}" class="dashAnchor"></a>"#)
}

/// Annotate `doc` in place and return the entries it yields, in document order.
///
/// Titles point at the page itself; every other selected heading gets an
/// anchor inserted before it and points at `page#id`.
pub fn annotate(doc: &mut RenderedDocument, page: &Page) -> Result<Vec<IndexEntry>> {
    let mut entries = Vec::new();

    for heading in doc.headings(PRIMARY_HEADINGS)? {
        let kind = classify(heading.level, &page.output_path);
        entries.push(index_heading(doc, page, &heading, kind)?);
    }

    if !page.is_category_page() {
        for heading in doc.headings(SUBSECTION_HEADINGS)? {
            let kind = setting_override(&page.basename, &heading.text)
                .unwrap_or_else(|| classify(heading.level, &page.output_path));
            entries.push(index_heading(doc, page, &heading, kind)?);
        }
    }

    debug!(page = %page.output_path, entries = entries.len(), "page annotated");
    Ok(entries)
}

fn index_heading(
    doc: &mut RenderedDocument,
    page: &Page,
    heading: &Heading,
    kind: EntryKind,
) -> Result<IndexEntry> {
    if heading.level == HeadingLevel::H1 {
        return Ok(IndexEntry::new(heading.text.clone(), kind, page.output_path.clone()));
    }

    let id = heading.id.as_deref().ok_or_else(|| {
        DocsetError::parse(format!(
            "heading `{}` in {} has no id",
            heading.text, page.output_path
        ))
    })?;

    doc.insert_before(heading.node, &anchor_marker(kind, &heading.text))?;
    Ok(IndexEntry::new(
        heading.text.clone(),
        kind,
        format!("{}#{id}", page.output_path),
    ))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use scraper::{ElementRef, Html, Selector};

    use super::*;

    fn page(basename: &str, output_path: &str) -> Page {
        Page {
            source: PathBuf::from(format!("pages/{basename}.adoc")),
            basename: basename.into(),
            output_path: output_path.into(),
        }
    }

    fn wrap(body: &str) -> String {
        format!("<!DOCTYPE html><html><head><title>T</title></head><body>{body}</body></html>")
    }

    /// Id of the element right after the anchor named `name`, if that anchor exists.
    fn anchored_id(html: &str, name: &str) -> Option<String> {
        let parsed = Html::parse_document(html);
        let anchors = Selector::parse("a.dashAnchor").unwrap();
        let anchor = parsed
            .select(&anchors)
            .find(|a| a.value().attr("name") == Some(name))?;
        let next = anchor.next_siblings().find_map(ElementRef::wrap)?;
        next.value().attr("id").map(str::to_string)
    }

    #[test]
    fn anchor_text_is_form_encoded() {
        assert_eq!(
            anchor_marker(EntryKind::Section, "Cache Path & Pruning"),
            r#"<a name="//apple_ref/cpp/Section/Cache+Path+%26+Pruning" class="dashAnchor"></a>"#
        );
    }

    #[test]
    fn configuration_page_settings() {
        let mut doc = RenderedDocument::parse(&wrap(
            r#"<h1>Configuration</h1><h3 id="enabled">Enabled</h3><h3 id="other">Other</h3>"#,
        ));
        let entries = annotate(&mut doc, &page("configuration", "configuration.html")).unwrap();

        assert_eq!(
            entries,
            vec![
                IndexEntry::new("Configuration", EntryKind::Guide, "configuration.html"),
                IndexEntry::new("Enabled", EntryKind::Setting, "configuration.html#enabled"),
                IndexEntry::new("Other", EntryKind::Section, "configuration.html#other"),
            ]
        );
        let html = doc.to_html();
        assert_eq!(
            anchored_id(&html, "//apple_ref/cpp/Setting/Enabled").as_deref(),
            Some("enabled")
        );
        assert_eq!(
            anchored_id(&html, "//apple_ref/cpp/Section/Other").as_deref(),
            Some("other")
        );
    }

    #[test]
    fn category_page_tests_and_no_title_anchor() {
        let mut doc = RenderedDocument::parse(&wrap(
            r#"<h1>Style</h1><h2 id="line-length">Line Length</h2><h3 id="examples">Examples</h3>"#,
        ));
        let entries = annotate(&mut doc, &page("cops_style", "cops_style.html")).unwrap();

        assert_eq!(
            entries,
            vec![
                IndexEntry::new("Style", EntryKind::Category, "cops_style.html"),
                IndexEntry::new("Line Length", EntryKind::Test, "cops_style.html#line-length"),
            ]
        );
        let html = doc.to_html();
        assert!(html.contains("<body><h1>Style</h1>"));
        assert_eq!(
            anchored_id(&html, "//apple_ref/cpp/Test/Line+Length").as_deref(),
            Some("line-length")
        );
        assert_eq!(html.matches("dashAnchor").count(), 1);
    }

    #[test]
    fn headings_without_id_are_skipped() {
        let mut doc = RenderedDocument::parse(&wrap(
            r#"<h1>Usage</h1><h2>Plain</h2><h3>Also plain</h3><h2 id="run">Run</h2>"#,
        ));
        let entries = annotate(&mut doc, &page("basic_usage", "usage/basic_usage.html")).unwrap();

        assert_eq!(
            entries,
            vec![
                IndexEntry::new("Usage", EntryKind::Guide, "usage/basic_usage.html"),
                IndexEntry::new("Run", EntryKind::Section, "usage/basic_usage.html#run"),
            ]
        );
        assert_eq!(doc.to_html().matches("dashAnchor").count(), 1);
    }

    #[test]
    fn override_only_on_listed_page() {
        let mut doc = RenderedDocument::parse(&wrap(r#"<h3 id="enabled">Enabled</h3>"#));
        let entries = annotate(&mut doc, &page("versioning", "versioning.html")).unwrap();
        assert_eq!(entries[0].kind, EntryKind::Section);
    }

    #[test]
    fn section_heading_without_id_is_parse_error() {
        let mut doc = RenderedDocument::parse(&wrap("<h1>Usage</h1><h2>Plain</h2>"));
        let heading = doc.headings("h2").unwrap().remove(0);
        assert_eq!(heading.id, None);

        let err = index_heading(
            &mut doc,
            &page("basic_usage", "usage/basic_usage.html"),
            &heading,
            EntryKind::Section,
        )
        .unwrap_err();
        assert!(matches!(err, DocsetError::Parse { .. }));
        assert!(err.to_string().contains("Plain"));
        assert_eq!(doc.to_html().matches("dashAnchor").count(), 0);
    }
}
