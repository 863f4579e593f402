//! Build configuration for docsetgen.
//!
//! Settings live in `docsetgen.toml` in the working directory (or a file given
//! with `--config`). Missing sections fall back to the defaults below, which
//! describe the RuboCop docset.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DocsetError, Result};
use crate::types::{CatalogAuthor, DocsetMeta};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "docsetgen.toml";

// ---------------------------------------------------------------------------
// Config structs (matching docsetgen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub docset: DocsetConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub renderer: RendererConfig,

    #[serde(default)]
    pub links: LinksConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// `[docset]` section: bundle identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsetConfig {
    /// Bundle name; also names the `.docset` directory.
    #[serde(default = "default_name")]
    pub name: String,

    /// Title written to `meta.json`.
    #[serde(default = "default_name")]
    pub title: String,

    /// `CFBundleIdentifier` in `Info.plist`.
    #[serde(default = "default_bundle_id")]
    pub bundle_id: String,

    /// `DocSetPlatformFamily` in `Info.plist` (the viewer's search keyword).
    #[serde(default = "default_bundle_id")]
    pub platform_family: String,

    /// Landing page, relative to `Documents/`.
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// File name of the packaged archive.
    #[serde(default = "default_archive")]
    pub archive: String,
}

impl Default for DocsetConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            title: default_name(),
            bundle_id: default_bundle_id(),
            platform_family: default_bundle_id(),
            index_file: default_index_file(),
            archive: default_archive(),
        }
    }
}

fn default_name() -> String {
    "RuboCop".into()
}
fn default_bundle_id() -> String {
    "rubocop".into()
}
fn default_index_file() -> String {
    "index.html".into()
}
fn default_archive() -> String {
    "RuboCop.tgz".into()
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Unpacked upstream release.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Page tree, relative to `source_dir`.
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    /// Directory the `.docset` bundle is built in.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Distribution checkout receiving the archive and `docset.json`.
    #[serde(default = "default_dash_root")]
    pub dash_root: String,

    /// Logo used for the bundle icons, relative to `source_dir`.
    #[serde(default = "default_logo")]
    pub logo: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            pages_dir: default_pages_dir(),
            output_dir: default_output_dir(),
            dash_root: default_dash_root(),
            logo: default_logo(),
        }
    }
}

fn default_source_dir() -> String {
    "_output/source".into()
}
fn default_pages_dir() -> String {
    "docs/modules/ROOT/pages".into()
}
fn default_output_dir() -> String {
    "_output".into()
}
fn default_dash_root() -> String {
    "Dash-User-Contributions/docsets/RuboCop".into()
}
fn default_logo() -> String {
    "logo/rubo-logo-symbol.png".into()
}

/// `[renderer]` section: the external AsciiDoc converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    #[serde(default = "default_renderer_command")]
    pub command: String,

    /// Arguments; the command must read the page from stdin and write HTML to stdout.
    #[serde(default = "default_renderer_args")]
    pub args: Vec<String>,

    /// Source page extension, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command: default_renderer_command(),
            args: default_renderer_args(),
            extension: default_extension(),
        }
    }
}

fn default_renderer_command() -> String {
    "asciidoctor".into()
}
fn default_renderer_args() -> Vec<String> {
    [
        "-a",
        "source-highlighter=rouge",
        "-a",
        "stylesheet!",
        "-a",
        "idprefix=",
        "-o",
        "-",
        "-",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_extension() -> String {
    "adoc".into()
}

/// `[links]` section: hrefs written into every page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Online location of a page; `{version}` and `{path}` are substituted.
    #[serde(default = "default_online_url")]
    pub online_url: String,

    /// Icon href, relative to the page inside `Documents/`.
    #[serde(default = "default_icon_href")]
    pub icon_href: String,

    /// Stylesheet href, relative to the page inside `Documents/`.
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            online_url: default_online_url(),
            icon_href: default_icon_href(),
            stylesheet: default_stylesheet(),
        }
    }
}

fn default_online_url() -> String {
    "https://docs.rubocop.org/rubocop/{version}/{path}".into()
}
fn default_icon_href() -> String {
    "../../../icon.png".into()
}
fn default_stylesheet() -> String {
    "theme.css".into()
}

/// `[catalog]` section: static fields of `docset.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_author_link")]
    pub author_link: String,

    #[serde(default = "default_aliases")]
    pub aliases: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            author_name: default_author_name(),
            author_link: default_author_link(),
            aliases: default_aliases(),
        }
    }
}

fn default_author_name() -> String {
    "Étienne Deparis".into()
}
fn default_author_link() -> String {
    "https://etienne.depar.is".into()
}
fn default_aliases() -> Vec<String> {
    vec!["Rubocop".into(), "rubocop".into()]
}

// ---------------------------------------------------------------------------
// Build context (runtime, merged from config + CLI arguments)
// ---------------------------------------------------------------------------

/// Everything one build run needs, resolved up front and passed explicitly.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Release identifier without a leading `v` (e.g. `1.2.0`).
    pub version: String,
    /// Version segment used in online URLs (`1.2.0` → `1.2`).
    pub online_version: String,
    pub docset: DocsetConfig,
    pub links: LinksConfig,
    pub catalog: CatalogConfig,
    /// Root of the page tree.
    pub pages_root: PathBuf,
    pub source_extension: String,
    pub logo: PathBuf,
    pub output_dir: PathBuf,
    pub dash_root: PathBuf,
    /// Remove a previous bundle before building.
    pub clean: bool,
}

impl BuildContext {
    /// Resolve the runtime context for `release` from the loaded config.
    pub fn new(config: &AppConfig, release: &str, clean: bool) -> Result<Self> {
        let version = normalize_release(release)?;
        let online_version = online_version(&version).to_string();
        let source_dir = PathBuf::from(&config.paths.source_dir);

        Ok(Self {
            online_version,
            version,
            docset: config.docset.clone(),
            links: config.links.clone(),
            catalog: config.catalog.clone(),
            pages_root: source_dir.join(&config.paths.pages_dir),
            source_extension: config.renderer.extension.clone(),
            logo: source_dir.join(&config.paths.logo),
            output_dir: PathBuf::from(&config.paths.output_dir),
            dash_root: PathBuf::from(&config.paths.dash_root),
            clean,
        })
    }

    /// `<output_dir>/<Name>.docset`
    pub fn bundle_dir(&self) -> PathBuf {
        self.output_dir.join(self.bundle_dir_name())
    }

    /// `<Name>.docset`
    pub fn bundle_dir_name(&self) -> String {
        format!("{}.docset", self.docset.name)
    }

    /// `<bundle>/Contents`
    pub fn contents_dir(&self) -> PathBuf {
        self.bundle_dir().join("Contents")
    }

    /// `<bundle>/Contents/Resources/Documents`
    pub fn documents_dir(&self) -> PathBuf {
        self.contents_dir().join("Resources").join("Documents")
    }

    /// `<bundle>/Contents/Resources/docSet.dsidx`
    pub fn index_path(&self) -> PathBuf {
        self.contents_dir().join("Resources").join("docSet.dsidx")
    }

    /// Online URL of the page at `output_path`.
    pub fn online_url(&self, output_path: &str) -> String {
        self.links
            .online_url
            .replace("{version}", &self.online_version)
            .replace("{path}", output_path)
    }

    /// Content of `meta.json`.
    pub fn meta(&self) -> DocsetMeta {
        DocsetMeta {
            name: self.docset.name.clone(),
            version: self.version.clone(),
            title: self.docset.title.clone(),
        }
    }

    /// Catalog author block.
    pub fn author(&self) -> CatalogAuthor {
        CatalogAuthor {
            name: self.catalog.author_name.clone(),
            link: self.catalog.author_link.clone(),
        }
    }
}

/// Strip a leading `v` and check the release looks like a version number.
pub fn normalize_release(release: &str) -> Result<String> {
    static RELEASE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^v?(\d+(?:\.\d+)*(?:[.-][0-9A-Za-z]+)*)$").expect("valid regex")
    });

    RELEASE_RE
        .captures(release.trim())
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| {
            DocsetError::validation(format!(
                "`{release}` is not a release identifier (expected e.g. v1.2.3)"
            ))
        })
}

/// Online documentation drops one trailing `.0` from the version.
pub fn online_version(version: &str) -> &str {
    version.strip_suffix(".0").unwrap_or(version)
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the configuration.
///
/// With an explicit path the file must exist. Otherwise `docsetgen.toml` in the
/// working directory is used when present, and built-in defaults when not.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(DocsetError::missing(path, "configuration file"));
        }
        return load_config_from(path);
    }

    let path = Path::new(CONFIG_FILE_NAME);
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(path)
}

/// Load the configuration from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocsetError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocsetError::config(format!("failed to parse {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("pages_dir"));
        assert!(toml_str.contains("asciidoctor"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[docset]
name = "Example"
archive = "Example.tgz"

[paths]
source_dir = "/tmp/example-src"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.docset.name, "Example");
        assert_eq!(config.docset.title, "RuboCop");
        assert_eq!(config.paths.pages_dir, "docs/modules/ROOT/pages");
        assert_eq!(config.renderer.extension, "adoc");
    }

    #[test]
    fn release_normalization() {
        assert_eq!(normalize_release("v1.2.3").unwrap(), "1.2.3");
        assert_eq!(normalize_release("1.2.3").unwrap(), "1.2.3");
        assert_eq!(normalize_release("1.0.0-rc1").unwrap(), "1.0.0-rc1");
        assert!(normalize_release("").is_err());
        assert!(normalize_release("latest").is_err());
        assert!(normalize_release("1.2/../x").is_err());
    }

    #[test]
    fn online_version_drops_one_trailing_zero() {
        assert_eq!(online_version("1.2.0"), "1.2");
        assert_eq!(online_version("1.0.0"), "1.0");
        assert_eq!(online_version("1.10"), "1.10");
        assert_eq!(online_version("1.2.3"), "1.2.3");
    }

    #[test]
    fn build_context_paths() {
        let ctx = BuildContext::new(&AppConfig::default(), "v1.2.0", false).expect("context");
        assert_eq!(ctx.version, "1.2.0");
        assert_eq!(ctx.bundle_dir(), PathBuf::from("_output/RuboCop.docset"));
        assert_eq!(
            ctx.documents_dir(),
            PathBuf::from("_output/RuboCop.docset/Contents/Resources/Documents")
        );
        assert_eq!(
            ctx.index_path(),
            PathBuf::from("_output/RuboCop.docset/Contents/Resources/docSet.dsidx")
        );
        assert_eq!(
            ctx.pages_root,
            PathBuf::from("_output/source/docs/modules/ROOT/pages")
        );
        assert_eq!(
            ctx.online_url("usage/caching.html"),
            "https://docs.rubocop.org/rubocop/1.2/usage/caching.html"
        );
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, DocsetError::MissingInput { .. }));

        let path = dir.path().join("docsetgen.toml");
        std::fs::write(&path, "[docset]\nname = \"Other\"\n").unwrap();
        let config = load_config(Some(&path)).expect("load");
        assert_eq!(config.docset.name, "Other");
    }

    #[test]
    fn malformed_config_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docsetgen.toml");
        std::fs::write(&path, "[docset\nname = ").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }
}
