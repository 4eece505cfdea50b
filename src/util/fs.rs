//! Filesystem utilities.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path.
///
/// Removes `.` components and folds `..` into the preceding component
/// without touching the filesystem. Leading `..` components of a relative
/// path are kept, and `..` never climbs above a root. An empty result
/// becomes `.`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }

    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Return the first `dir/file_name` that exists, searching `dirs` in order.
pub fn find_in_dirs<P: AsRef<Path>>(file_name: &str, dirs: &[P]) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.as_ref().join(file_name))
        .find(|candidate| candidate.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_parent_dirs() {
        assert_eq!(
            normalize_path(Path::new("/opt/vs/Common7/Tools/../../VC")),
            PathBuf::from("/opt/vs/VC")
        );
        assert_eq!(
            normalize_path(Path::new("inc/./sub/../x")),
            PathBuf::from("inc/x")
        );
    }

    #[test]
    fn test_normalize_keeps_leading_parent_dirs() {
        assert_eq!(normalize_path(Path::new("../a/b")), PathBuf::from("../a/b"));
        assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_path(Path::new("")), PathBuf::from("."));
        assert_eq!(normalize_path(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn test_find_in_dirs_prefers_earlier_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let first = tmp.path().join("first");
        let second = tmp.path().join("second");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();
        std::fs::write(first.join("z.lib"), "").unwrap();
        std::fs::write(second.join("z.lib"), "").unwrap();

        let found = find_in_dirs("z.lib", &[&first, &second]);
        assert_eq!(found, Some(first.join("z.lib")));
        assert_eq!(find_in_dirs("missing.lib", &[&first, &second]), None);
    }
}
