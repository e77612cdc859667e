//! Depth-first traversal of store-base directories through a [`FileSystem`].

use std::path::Path;

use lls_fs::{FileSystem, FsError, BACKUP_PREFIX};
use tracing::debug;

/// Call `visit` for every regular file beneath `root`.
///
/// Rewrite backups are not stored payloads and are passed over. A root that
/// does not exist yet holds no files. Any listing failure below the root
/// aborts the walk.
pub fn walk_files<E>(
    fs: &dyn FileSystem,
    root: &Path,
    visit: &mut dyn FnMut(&Path) -> Result<(), E>,
) -> Result<(), E>
where
    E: From<FsError>,
{
    if !fs.exists(root) {
        debug!(root = %root.display(), "store base does not exist; nothing to walk");
        return Ok(());
    }
    walk_dir(fs, root, visit)
}

fn walk_dir<E>(
    fs: &dyn FileSystem,
    dir: &Path,
    visit: &mut dyn FnMut(&Path) -> Result<(), E>,
) -> Result<(), E>
where
    E: From<FsError>,
{
    for name in fs.list(dir)? {
        let path = dir.join(&name);
        if fs.is_directory(&path) {
            walk_dir(fs, &path, visit)?;
        } else if name.starts_with(BACKUP_PREFIX) {
            debug!(path = %path.display(), "skipping rewrite backup");
        } else {
            visit(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lls_fs::{content_from, GenericFileSystem};
    use std::path::PathBuf;

    #[test]
    fn visits_nested_files_and_skips_backups() {
        let dir = tempfile::tempdir().unwrap();
        let fs = GenericFileSystem::new();
        fs.write(&dir.path().join("a/b/demo_1"), content_from("1")).unwrap();
        fs.write(&dir.path().join("demo_2"), content_from("2")).unwrap();
        fs.write(&dir.path().join("a/~bak.demo_3"), content_from("3")).unwrap();
        fs.write(&dir.path().join("a/demo_4.bak"), content_from("4")).unwrap();

        let mut seen = Vec::new();
        walk_files::<FsError>(&fs, dir.path(), &mut |p| {
            seen.push(p.to_path_buf());
            Ok(())
        })
        .unwrap();

        seen.sort();
        let mut expected = vec![
            dir.path().join("a/b/demo_1"),
            dir.path().join("a/demo_4.bak"),
            dir.path().join("demo_2"),
        ];
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn missing_root_is_empty() {
        let fs = GenericFileSystem::new();
        let mut count = 0;
        walk_files::<FsError>(&fs, &PathBuf::from("/definitely/not/here"), &mut |_| {
            count += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(count, 0);
    }
}
