use crate::config::Order;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

fn list_children(dir: &Path, order: Order) -> Result<Vec<DirEntry>> {
    let mut walker = WalkDir::new(dir).min_depth(1).max_depth(1);
    if order == Order::Sorted {
        walker = walker.sort_by_file_name();
    }

    walker
        .into_iter()
        .map(|entry| entry.with_context(|| format!("Failed to read {}", dir.display())))
        .collect()
}

/// Immediate subdirectories of the posts root, one per post.
pub fn find_post_dirs(root: &Path, order: Order) -> Result<Vec<PathBuf>> {
    fs::metadata(root)
        .with_context(|| format!("Posts directory {} is not accessible", root.display()))?;

    Ok(list_children(root, order)?
        .into_iter()
        .map(DirEntry::into_path)
        .filter(|path| is_dir(path))
        .collect())
}

/// Entries directly inside `post_dir` whose name ends in `.md`, in visiting order.
///
/// Anything that is not a directory counts, so a dangling `.md` link is
/// returned and fails at copy time. Dangling links with other names are
/// never looked at.
pub fn find_markdown_files(post_dir: &Path, order: Order) -> Result<Vec<PathBuf>> {
    Ok(list_children(post_dir, order)?
        .into_iter()
        .map(DirEntry::into_path)
        .filter(|path| is_markdown_name(path) && !is_dir(path))
        .collect())
}

// Follows symlinks; a dangling link is not a directory.
fn is_dir(path: &Path) -> bool {
    fs::metadata(path).map_or(false, |meta| meta.is_dir())
}

// Byte suffix match on the whole name, so a bare ".md" counts too.
fn is_markdown_name(path: &Path) -> bool {
    path.file_name()
        .map_or(false, |name| name.as_encoded_bytes().ends_with(b".md"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn post_dirs_are_first_level_directories_only() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("posts");
        touch(&root.join("beta/index.md"));
        touch(&root.join("alpha/nested/deep.md"));
        touch(&root.join("stray.md"));

        let dirs = find_post_dirs(&root, Order::Sorted).unwrap();
        assert_eq!(names(&dirs), vec!["alpha", "beta"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = find_post_dirs(&tmp.path().join("posts"), Order::Sorted).unwrap_err();
        let io = err.root_cause().downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn markdown_files_are_filtered_by_suffix() {
        let tmp = TempDir::new().unwrap();
        let post = tmp.path().join("gamma");
        touch(&post.join("b.md"));
        touch(&post.join("a.md"));
        touch(&post.join("cover.png"));
        touch(&post.join("SHOUT.MD"));
        touch(&post.join("notes.mdx"));
        touch(&post.join(".md"));
        fs::create_dir_all(post.join("drafts.md")).unwrap();

        let files = find_markdown_files(&post, Order::Sorted).unwrap();
        assert_eq!(names(&files), vec![".md", "a.md", "b.md"]);
    }

    #[test]
    fn markdown_search_does_not_recurse() {
        let tmp = TempDir::new().unwrap();
        let post = tmp.path().join("delta");
        touch(&post.join("assets/readme.md"));

        assert!(find_markdown_files(&post, Order::Filesystem).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_links_without_md_suffix_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("posts");
        touch(&root.join("alpha/notes.md"));
        std::os::unix::fs::symlink("/nonexistent/cover.png", root.join("alpha/cover.png"))
            .unwrap();
        std::os::unix::fs::symlink("/nonexistent/post", root.join("ghost")).unwrap();

        let dirs = find_post_dirs(&root, Order::Sorted).unwrap();
        assert_eq!(names(&dirs), vec!["alpha"]);

        let files = find_markdown_files(&root.join("alpha"), Order::Sorted).unwrap();
        assert_eq!(names(&files), vec!["notes.md"]);
    }

    #[cfg(unix)]
    #[test]
    fn linked_post_directories_are_followed() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("posts");
        touch(&tmp.path().join("elsewhere/index.md"));
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("elsewhere"), root.join("linked")).unwrap();

        let dirs = find_post_dirs(&root, Order::Sorted).unwrap();
        assert_eq!(names(&dirs), vec!["linked"]);
        let files = find_markdown_files(&dirs[0], Order::Sorted).unwrap();
        assert_eq!(names(&files), vec!["index.md"]);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_match_on_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        let post = tmp.path().join("alpha");
        fs::create_dir_all(&post).unwrap();
        let name = OsStr::from_bytes(b"caf\xff.md");
        fs::write(post.join(name), "hello").unwrap();
        fs::write(post.join(OsStr::from_bytes(b"caf\xff.txt")), "nope").unwrap();

        let files = find_markdown_files(&post, Order::Sorted).unwrap();
        assert_eq!(files, vec![post.join(name)]);
    }
}
