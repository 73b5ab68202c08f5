/// Candidate enumeration
///
/// Walks the source root on every call (nothing is cached) and keeps the
/// files whose extension is allowed and whose size is within the limit.

use log::{debug, warn};
use std::io;
use std::path::{Component, Path};
use walkdir::WalkDir;

use super::SelectOptions;
use crate::error::Result;

/// List every eligible file under `source_root`, as `/`-separated paths
/// relative to the root, in file-name order.
///
/// Unreadable directories and a missing root are errors. Broken symlinks,
/// symlink loops and names that aren't valid UTF-8 are skipped with a warning.
pub fn enumerate(source_root: &Path, options: &SelectOptions) -> Result<Vec<String>> {
    let extensions = options.normalized_extensions();
    let mut candidates = Vec::new();
    let mut skipped_too_large = 0usize;

    for entry in WalkDir::new(source_root)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if is_dangling_link(&err) => {
                warn!("⚠️  Skipping unreachable entry: {}", err);
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        // Only process files (not directories)
        if !entry.file_type().is_file() {
            continue;
        }

        // Check the extension against the allow-list
        let path = entry.path();
        match path.extension() {
            Some(extension) => {
                let ext = extension.to_string_lossy().to_lowercase();
                if !extensions.contains(&ext) {
                    continue;
                }
            }
            None => continue,
        }

        if entry.metadata()?.len() > options.max_byte_size {
            skipped_too_large += 1;
            continue;
        }

        // A root that is itself a file has no relative reference
        if let Ok(relative) = path.strip_prefix(source_root) {
            match file_reference(relative) {
                Some(reference) if !reference.is_empty() => candidates.push(reference),
                Some(_) => {}
                None => warn!("⚠️  Skipping file with a non UTF-8 name: {}", path.display()),
            }
        }
    }

    debug!(
        "🔍 {} candidates under {} ({} over the size limit)",
        candidates.len(),
        source_root.display(),
        skipped_too_large
    );

    Ok(candidates)
}

/// Symlinks pointing nowhere or back up the tree. The root itself is never
/// treated this way, so a missing root still fails the walk.
fn is_dangling_link(err: &walkdir::Error) -> bool {
    if err.loop_ancestor().is_some() {
        return true;
    }
    err.depth() > 0
        && err
            .io_error()
            .map_or(false, |e| e.kind() == io::ErrorKind::NotFound)
}

/// Join the components of a relative path with `/` on every platform.
/// None if any component isn't valid UTF-8.
fn file_reference(relative: &Path) -> Option<String> {
    let parts = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_str()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, bytes: usize) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; bytes]).unwrap();
    }

    #[test]
    fn test_filters_by_extension_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.png", 10);
        write(dir.path(), "B.JPG", 10);
        write(dir.path(), "notes.txt", 10);
        write(dir.path(), "README", 10);

        let found = enumerate(dir.path(), &SelectOptions::default()).unwrap();
        assert_eq!(found, vec!["B.JPG".to_string(), "a.png".to_string()]);
    }

    #[test]
    fn test_recurses_and_normalizes_separators() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "stable/east/arabian.gif", 10);
        write(dir.path(), "top.bmp", 10);

        let found = enumerate(dir.path(), &SelectOptions::default()).unwrap();
        assert_eq!(found, vec!["stable/east/arabian.gif".to_string(), "top.bmp".to_string()]);
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "exact.png", 100);
        write(dir.path(), "over.png", 101);

        let options = SelectOptions { max_byte_size: 100, ..SelectOptions::default() };
        let found = enumerate(dir.path(), &options).unwrap();
        assert_eq!(found, vec!["exact.png".to_string()]);
    }

    #[test]
    fn test_custom_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.png", 1);
        write(dir.path(), "b.webp", 1);

        let options = SelectOptions {
            file_extensions: vec![".WEBP".to_string()],
            ..SelectOptions::default()
        };
        assert_eq!(enumerate(dir.path(), &options).unwrap(), vec!["b.webp".to_string()]);
    }

    #[test]
    fn test_empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(enumerate(dir.path(), &SelectOptions::default()).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_links_and_loops_are_skipped() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.png", 10);
        symlink(dir.path().join("gone.png"), dir.path().join("link.png")).unwrap();
        symlink(dir.path().join("gone.txt"), dir.path().join("notes.txt")).unwrap();
        symlink(dir.path(), dir.path().join("loop")).unwrap();

        let found = enumerate(dir.path(), &SelectOptions::default()).unwrap();
        assert_eq!(found, vec!["a.png".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_still_fails() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "locked/a.png", 10);
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root bypasses permission bits, so only check when they apply
        let readable = fs::read_dir(&locked).is_ok();
        let result = enumerate(dir.path(), &SelectOptions::default());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert!(matches!(result, Err(crate::error::DressageError::Io(_))));
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.png", 10);
        fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff.png")), b"x").unwrap();

        let found = enumerate(dir.path(), &SelectOptions::default()).unwrap();
        assert_eq!(found, vec!["a.png".to_string()]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = enumerate(&dir.path().join("gone"), &SelectOptions::default());
        assert!(matches!(result, Err(crate::error::DressageError::Io(_))));
    }
}
