//! Rendering and annotation of documentation pages.
//!
//! A page goes through three steps here:
//! 1. a [`Renderer`] converts its source to a standalone HTML document
//! 2. [`RenderedDocument`] decorates `<head>` and records the online location
//! 3. [`annotate`] injects Dash anchors and returns the page's index entries

pub mod annotate;
pub mod classify;
pub mod document;
pub mod renderer;

pub use annotate::{anchor_marker, annotate};
pub use classify::{HeadingLevel, SETTING_OVERRIDES, classify, setting_override};
pub use document::{Heading, RenderedDocument};
pub use renderer::{Asciidoctor, HtmlPassthrough, Renderer};
