//! File Attribute Preservation
//!
//! Copies filesystem-level attributes from a source file onto a freshly
//! written destination: access/modification times, permission bits, and
//! extended attributes on unix. Embedded image metadata is not touched here.
//!
//! Timestamps are applied last; anything that writes to `dst` afterwards
//! would reset the modification time.

use std::io;
use std::path::Path;

/// Copy stat attributes from `src` to `dst`.
///
/// Fails when the source metadata cannot be read or the times cannot be set.
/// Permission and xattr copies are best-effort and only logged.
pub fn copy_file_attributes(src: &Path, dst: &Path) -> io::Result<()> {
    let metadata = std::fs::metadata(src)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = metadata.permissions().mode();
        if let Err(e) = std::fs::set_permissions(dst, std::fs::Permissions::from_mode(mode)) {
            tracing::warn!(path = %dst.display(), error = %e, "Failed to copy permissions");
        }
        copy_xattrs(src, dst);
    }

    #[cfg(not(unix))]
    {
        let readonly = metadata.permissions().readonly();
        if let Ok(dst_meta) = std::fs::metadata(dst) {
            let mut perms = dst_meta.permissions();
            perms.set_readonly(readonly);
            let _ = std::fs::set_permissions(dst, perms);
        }
    }

    apply_file_timestamps(&metadata, dst)
}

fn apply_file_timestamps(src_meta: &std::fs::Metadata, dst: &Path) -> io::Result<()> {
    let atime = filetime::FileTime::from_last_access_time(src_meta);
    let mtime = filetime::FileTime::from_last_modification_time(src_meta);
    filetime::set_file_times(dst, atime, mtime)
}

#[cfg(unix)]
fn copy_xattrs(src: &Path, dst: &Path) {
    let Ok(names) = xattr::list(src) else {
        return;
    };
    for name in names {
        match xattr::get(src, &name) {
            Ok(Some(value)) => {
                if let Err(e) = xattr::set(dst, &name, &value) {
                    tracing::warn!(
                        path = %dst.display(),
                        attr = %name.to_string_lossy(),
                        error = %e,
                        "Failed to copy extended attribute"
                    );
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(attr = %name.to_string_lossy(), error = %e, "Unreadable xattr");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_attributes_copies_times() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.png");
        let dst = temp.path().join("dst.webp");
        fs::write(&src, b"source").unwrap();
        fs::write(&dst, b"dest").unwrap();

        let old = FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_times(&src, old, old).unwrap();

        copy_file_attributes(&src, &dst).unwrap();

        let dst_meta = fs::metadata(&dst).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&dst_meta), old);
        assert_eq!(FileTime::from_last_access_time(&dst_meta), old);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_file_attributes_copies_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.png");
        let dst = temp.path().join("dst.webp");
        fs::write(&src, b"source").unwrap();
        fs::write(&dst, b"dest").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o640)).unwrap();

        copy_file_attributes(&src, &dst).unwrap();

        let mode = fs::metadata(&dst).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn test_copy_file_attributes_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let dst = temp.path().join("dst.webp");
        fs::write(&dst, b"dest").unwrap();

        assert!(copy_file_attributes(&temp.path().join("nope.png"), &dst).is_err());
    }
}
