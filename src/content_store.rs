use std::path::{Component, Path, PathBuf};

use anyhow::Context as _;
use async_trait::async_trait;
use tokio::fs;
use walkdir::WalkDir;

/// Directory names under the content root that hold shared assets or build
/// output rather than stories.
pub const EXCLUDED_DIRS: [&str; 2] = ["static", "build"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// Read access to the content tree. All paths are relative to the store root.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn stat(&self, rel: &Path) -> std::io::Result<EntryKind>;
    async fn read(&self, rel: &Path) -> std::io::Result<Vec<u8>>;

    /// Every directory below the root, excluded subtrees pruned, sorted.
    async fn story_dirs(&self) -> anyhow::Result<Vec<PathBuf>>;
}

#[derive(Debug, Clone)]
pub struct LocalFsContentStore {
    root: PathBuf,
}

impl LocalFsContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn abs(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }
}

#[async_trait]
impl ContentStore for LocalFsContentStore {
    async fn stat(&self, rel: &Path) -> std::io::Result<EntryKind> {
        let meta = fs::metadata(self.abs(rel)).await?;
        Ok(if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        })
    }

    async fn read(&self, rel: &Path) -> std::io::Result<Vec<u8>> {
        fs::read(self.abs(rel)).await
    }

    async fn story_dirs(&self) -> anyhow::Result<Vec<PathBuf>> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || walk_story_dirs(&root))
            .await
            .context("join directory walk")?
    }
}

fn walk_story_dirs(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let meta = std::fs::metadata(root)
        .with_context(|| format!("read content root: {}", root.display()))?;
    if !meta.is_dir() {
        anyhow::bail!("content root is not a directory: {}", root.display());
    }

    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !(entry.file_type().is_dir() && is_excluded(entry.file_name())));

    let mut dirs = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable entry under content root");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("strip content root: {}", entry.path().display()))?;
        dirs.push(rel.to_path_buf());
    }
    dirs.sort();
    Ok(dirs)
}

fn is_excluded(name: &std::ffi::OsStr) -> bool {
    EXCLUDED_DIRS.iter().any(|excluded| name == *excluded)
}

/// Joins request-supplied segments onto a base. Returns `None` when any
/// segment carries a traversal marker or would make the path absolute.
pub fn join_guarded(base: &Path, segments: &[&str]) -> Option<PathBuf> {
    let mut path = base.to_path_buf();
    for segment in segments {
        if segment.contains("..") {
            return None;
        }
        for component in Path::new(segment).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir | Component::RootDir => {}
                Component::ParentDir | Component::Prefix(_) => return None,
            }
        }
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_guarded_rejects_traversal_markers() {
        let base = Path::new("alpha");
        assert_eq!(join_guarded(base, &["..", "etc"]), None);
        assert_eq!(join_guarded(base, &["img/../../x.png"]), None);
        assert_eq!(join_guarded(base, &["a..b.png"]), None);
    }

    #[test]
    fn join_guarded_keeps_paths_under_base() {
        assert_eq!(
            join_guarded(Path::new("static"), &["/js/app.js"]),
            Some(PathBuf::from("static/js/app.js"))
        );
        assert_eq!(
            join_guarded(Path::new(""), &["alpha", "./img/a.png"]),
            Some(PathBuf::from("alpha/img/a.png"))
        );
    }

    #[tokio::test]
    async fn story_dirs_prunes_excluded_subtrees() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::create_dir_all(temp.path().join("alpha").join("img"))?;
        std::fs::create_dir_all(temp.path().join("beta"))?;
        std::fs::create_dir_all(temp.path().join("static").join("js"))?;
        std::fs::create_dir_all(temp.path().join("build").join("out"))?;
        std::fs::write(temp.path().join("index.html"), "<html></html>")?;

        let store = LocalFsContentStore::new(temp.path());
        let dirs = store.story_dirs().await?;
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("alpha"),
                PathBuf::from("alpha/img"),
                PathBuf::from("beta"),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn story_dirs_fails_for_missing_root() {
        let store = LocalFsContentStore::new("/nonexistent/bookrenderer-root");
        let err = store.story_dirs().await.unwrap_err();
        assert!(format!("{err:#}").contains("read content root"));
    }

    #[tokio::test]
    async fn stat_distinguishes_files_and_dirs() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::create_dir_all(temp.path().join("alpha"))?;
        std::fs::write(temp.path().join("alpha").join("1.html"), "A")?;

        let store = LocalFsContentStore::new(temp.path());
        assert_eq!(store.stat(Path::new("alpha")).await?, EntryKind::Dir);
        assert_eq!(
            store.stat(Path::new("alpha/1.html")).await?,
            EntryKind::File
        );
        let err = store.stat(Path::new("alpha/2.html")).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        assert_eq!(store.read(Path::new("alpha/1.html")).await?, b"A");
        Ok(())
    }
}
