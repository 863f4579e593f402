//! Static bundle files: stylesheet, `Info.plist`, `meta.json`, icons.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info, instrument, warn};

use docsetgen_shared::{BuildContext, DocsetError, Result};

use crate::write_json;

/// Stylesheet linked from every page.
pub const THEME_CSS: &str = include_str!("../assets/theme.css");

/// Icon file names and the square size each is rasterized to.
pub const ICONS: [(&str, u32); 2] = [("icon.png", 16), ("icon@2x.png", 32)];

const RASTERIZER: &str = "convert";

/// Write the stylesheet, `Info.plist` and `meta.json` into the bundle.
#[instrument(skip_all, fields(bundle = %ctx.bundle_dir().display()))]
pub fn write_bundle_assets(ctx: &BuildContext) -> Result<()> {
    let documents = ctx.documents_dir();
    std::fs::create_dir_all(&documents).map_err(|e| DocsetError::io(&documents, e))?;

    let stylesheet = documents.join(&ctx.links.stylesheet);
    write_file(&stylesheet, THEME_CSS)?;

    let plist = ctx.contents_dir().join("Info.plist");
    write_file(&plist, &info_plist(ctx))?;

    write_json(&ctx.bundle_dir().join("meta.json"), &ctx.meta())?;

    info!("bundle assets written");
    Ok(())
}

/// Property list identifying the bundle to the viewer.
pub fn info_plist(ctx: &BuildContext) -> String {
    let docset = &ctx.docset;
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>CFBundleIdentifier</key>
  <string>{}</string>
  <key>CFBundleName</key>
  <string>{}</string>
  <key>DocSetPlatformFamily</key>
  <string>{}</string>
  <key>isDashDocset</key>
  <true/>
  <key>DashDocSetFamily</key>
  <string>dashtoc</string>
  <key>dashIndexFilePath</key>
  <string>{}</string>
</dict>
</plist>
"#,
        xml_escape(&docset.bundle_id),
        xml_escape(&docset.name),
        xml_escape(&docset.platform_family),
        xml_escape(&docset.index_file),
    )
}

/// Make sure the bundle and the distribution root both carry the icons.
///
/// Icons already in the distribution root are reused; missing ones are
/// rasterized from the logo. Failures are logged and never abort the build.
#[instrument(skip_all)]
pub fn install_icons(ctx: &BuildContext) {
    let bundle = ctx.bundle_dir();
    for (name, size) in ICONS {
        let published = ctx.dash_root.join(name);
        let local = bundle.join(name);

        let result = if published.is_file() {
            debug!(icon = name, "reusing published icon");
            copy_file(&published, &local)
        } else {
            rasterize(&ctx.logo, size, &local).and_then(|()| copy_file(&local, &published))
        };

        if let Err(e) = result {
            warn!(icon = name, error = %e, "icon not installed");
        }
    }
}

fn rasterize(logo: &Path, size: u32, target: &Path) -> Result<()> {
    if !logo.is_file() {
        return Err(DocsetError::missing(logo, "logo"));
    }

    let geometry = format!("{size}x{size}");
    let output = Command::new(RASTERIZER)
        .arg(logo)
        .args(["-resize", geometry.as_str()])
        .arg(target)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| DocsetError::command(RASTERIZER, e.to_string()))?;

    if !output.status.success() {
        return Err(DocsetError::command(
            RASTERIZER,
            format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        ));
    }
    Ok(())
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    std::fs::copy(from, to).map_err(|e| DocsetError::io(to, e))?;
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DocsetError::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| DocsetError::io(path, e))?;
    debug!(path = %path.display(), "wrote file");
    Ok(())
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use docsetgen_shared::{AppConfig, DocsetMeta};

    use super::*;

    fn context(root: &Path) -> BuildContext {
        let mut config = AppConfig::default();
        config.paths.output_dir = root.join("out").display().to_string();
        config.paths.dash_root = root.join("dash").display().to_string();
        config.paths.source_dir = root.join("src").display().to_string();
        BuildContext::new(&config, "v1.2.0", false).unwrap()
    }

    #[test]
    fn assets_land_in_bundle_layout() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        write_bundle_assets(&ctx).unwrap();

        let css = std::fs::read_to_string(ctx.documents_dir().join("theme.css")).unwrap();
        assert!(css.contains(".highlight"));

        let plist = std::fs::read_to_string(ctx.contents_dir().join("Info.plist")).unwrap();
        assert!(plist.contains("<string>rubocop</string>"));
        assert!(plist.contains("<string>dashtoc</string>"));
        assert!(plist.contains("<key>dashIndexFilePath</key>\n  <string>index.html</string>"));

        let meta: DocsetMeta = serde_json::from_str(
            &std::fs::read_to_string(ctx.bundle_dir().join("meta.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(
            meta,
            DocsetMeta {
                name: "RuboCop".into(),
                version: "1.2.0".into(),
                title: "RuboCop".into(),
            }
        );
    }

    #[test]
    fn published_icons_are_reused() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        std::fs::create_dir_all(&ctx.dash_root).unwrap();
        std::fs::create_dir_all(ctx.bundle_dir()).unwrap();
        std::fs::write(ctx.dash_root.join("icon.png"), b"small").unwrap();
        std::fs::write(ctx.dash_root.join("icon@2x.png"), b"large").unwrap();

        install_icons(&ctx);
        assert_eq!(std::fs::read(ctx.bundle_dir().join("icon.png")).unwrap(), b"small");
        assert_eq!(std::fs::read(ctx.bundle_dir().join("icon@2x.png")).unwrap(), b"large");
    }

    #[test]
    fn missing_logo_does_not_fail() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        std::fs::create_dir_all(&ctx.dash_root).unwrap();
        std::fs::create_dir_all(ctx.bundle_dir()).unwrap();

        install_icons(&ctx);
        assert!(!ctx.dash_root.join("icon.png").exists());
    }
}
