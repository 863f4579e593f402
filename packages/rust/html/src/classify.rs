//! Heading classification.

use docsetgen_shared::{CATEGORY_PAGE_PREFIX, EntryKind};

/// Heading levels the annotator indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(Self::H1),
            "h2" => Some(Self::H2),
            "h3" => Some(Self::H3),
            _ => None,
        }
    }

    pub fn is_title(self) -> bool {
        self == Self::H1
    }
}

/// Pages whose level-3 headings name settings, keyed by page basename.
pub const SETTING_OVERRIDES: &[(&str, &[&str])] = &[(
    "configuration",
    &["Enabled", "Severity", "Details", "AutoCorrect"],
)];

/// Kind of the entry produced by a heading at `level` on the page at `output_path`.
pub fn classify(level: HeadingLevel, output_path: &str) -> EntryKind {
    let file_name = output_path.rsplit('/').next().unwrap_or(output_path);

    match (file_name.starts_with(CATEGORY_PAGE_PREFIX), level.is_title()) {
        (true, true) => EntryKind::Category,
        (true, false) => EntryKind::Test,
        (false, true) => EntryKind::Guide,
        (false, false) => EntryKind::Section,
    }
}

/// `Setting` when `text` is a listed heading of the page named `basename`.
pub fn setting_override(basename: &str, text: &str) -> Option<EntryKind> {
    SETTING_OVERRIDES
        .iter()
        .find(|(page, _)| *page == basename)
        .filter(|(_, names)| names.contains(&text))
        .map(|_| EntryKind::Setting)
}
