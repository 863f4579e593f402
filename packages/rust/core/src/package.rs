//! Archive packaging of the finished bundle.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{info, instrument};

use docsetgen_shared::{BuildContext, DocsetError, Result};

use crate::catalog::versioned_archive;

/// Produces the distributable archive of a bundle.
pub trait Packager {
    /// Archive `bundle_name` (a directory inside `parent`) into `archive`.
    fn package(&self, parent: &Path, bundle_name: &str, archive: &Path) -> Result<()>;
}

/// Gzipped tarball via the system `tar`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarPackager;

impl Packager for TarPackager {
    fn package(&self, parent: &Path, bundle_name: &str, archive: &Path) -> Result<()> {
        let output = Command::new("tar")
            .arg("-C")
            .arg(parent)
            .args(["--exclude", ".DS_Store", "-czf"])
            .arg(archive)
            .arg(bundle_name)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| DocsetError::command("tar", e.to_string()))?;

        if !output.status.success() {
            return Err(DocsetError::command(
                "tar",
                format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(())
    }
}

/// Archive the bundle into the distribution root and file a copy under
/// `versions/<version>/`. Returns the versioned copy's path.
#[instrument(skip_all, fields(version = %ctx.version))]
pub fn publish_archive(ctx: &BuildContext, packager: &dyn Packager) -> Result<PathBuf> {
    let archive = ctx.dash_root.join(&ctx.docset.archive);
    packager.package(&ctx.output_dir, &ctx.bundle_dir_name(), &archive)?;

    let versioned = ctx
        .dash_root
        .join(versioned_archive(&ctx.version, &ctx.docset.archive));
    if let Some(parent) = versioned.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DocsetError::io(parent, e))?;
    }
    std::fs::copy(&archive, &versioned).map_err(|e| DocsetError::io(&versioned, e))?;

    info!(archive = %archive.display(), copy = %versioned.display(), "archive published");
    Ok(versioned)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use docsetgen_shared::AppConfig;

    use super::*;

    /// Records calls and writes a placeholder archive.
    #[derive(Default)]
    struct FakePackager {
        calls: RefCell<Vec<(PathBuf, String, PathBuf)>>,
    }

    impl Packager for FakePackager {
        fn package(&self, parent: &Path, bundle_name: &str, archive: &Path) -> Result<()> {
            std::fs::write(archive, b"tgz").map_err(|e| DocsetError::io(archive, e))?;
            self.calls
                .borrow_mut()
                .push((parent.to_path_buf(), bundle_name.to_string(), archive.to_path_buf()));
            Ok(())
        }
    }

    #[test]
    fn archive_is_copied_into_versions() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.paths.output_dir = dir.path().join("out").display().to_string();
        config.paths.dash_root = dir.path().join("dash").display().to_string();
        let ctx = BuildContext::new(&config, "1.1.0", false).unwrap();
        std::fs::create_dir_all(&ctx.dash_root).unwrap();

        let packager = FakePackager::default();
        let copy = publish_archive(&ctx, &packager).unwrap();

        assert_eq!(copy, ctx.dash_root.join("versions/1.1.0/RuboCop.tgz"));
        assert_eq!(std::fs::read(&copy).unwrap(), b"tgz");
        let calls = packager.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "RuboCop.docset");
        assert_eq!(calls[0].2, ctx.dash_root.join("RuboCop.tgz"));
    }

    #[cfg(unix)]
    #[test]
    fn tar_packager_creates_archive() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("Demo.docset");
        std::fs::create_dir_all(&bundle).unwrap();
        std::fs::write(bundle.join("meta.json"), "{}").unwrap();

        let archive = dir.path().join("Demo.tgz");
        TarPackager.package(dir.path(), "Demo.docset", &archive).unwrap();
        assert!(archive.metadata().unwrap().len() > 0);
    }

    #[cfg(unix)]
    #[test]
    fn tar_failure_is_command_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TarPackager
            .package(dir.path(), "Absent.docset", &dir.path().join("x.tgz"))
            .unwrap_err();
        assert!(matches!(err, DocsetError::Command { .. }));
    }
}
