//! Startup scan of the content tree.
//!
//! Every directory under the content root (except the shared `static` and
//! `build` trees) is a story. A story's chapters are found by probing
//! `1.html`/`1.dat`, `2.html`/`2.dat`, ... until the first number that is
//! missing or unusable.

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::cli::IndexArgs;
use crate::content_store::{ContentStore, LocalFsContentStore};
use crate::index::{ChapterIndex, ChapterKey, ChapterRecord, StorySummary};

/// `<n>.dat` is a flat JSON object of strings. `null` counts as empty.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct ChapterMeta(BTreeMap<String, Option<String>>);

impl ChapterMeta {
    fn take(&mut self, key: &str) -> String {
        self.0.remove(key).flatten().unwrap_or_default()
    }
}

/// Why probing a chapter number did not yield a chapter.
#[derive(Debug)]
pub enum StopReason {
    /// `<n>.html` does not exist: the story ends here.
    End,
    /// A chapter file exists but could not be read or parsed.
    Broken { file: String, reason: String },
}

pub enum Probe {
    Found(ChapterRecord),
    Stop(StopReason),
}

#[derive(Debug, Serialize)]
pub struct IndexReport {
    pub content_root: String,
    pub chapters: usize,
    pub stories: Vec<StorySummary>,
}

/// Indexes the content root and prints the result as JSON on stdout.
pub async fn run(args: IndexArgs) -> anyhow::Result<()> {
    let store = LocalFsContentStore::new(&args.content_root);
    let index = build_index(&store).await?;

    let report = IndexReport {
        content_root: store.root().display().to_string(),
        chapters: index.len(),
        stories: index.stories(),
    };
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &report).context("serialize index report")?;
    out.write_all(b"\n").context("write index report")?;
    Ok(())
}

/// Builds the chapter index. Discovery problems end the affected story and
/// are logged; they never fail the build.
pub async fn build_index(store: &dyn ContentStore) -> anyhow::Result<ChapterIndex> {
    let mut index = ChapterIndex::new();
    for dir in store.story_dirs().await? {
        let discovered = discover_story(store, &dir, &mut index).await;
        if discovered > 0 {
            tracing::info!(story = %story_name(&dir), chapters = discovered, "indexed story");
        }
    }
    Ok(index)
}

/// Inserts the chapters of one story and returns how many were found.
pub async fn discover_story(
    store: &dyn ContentStore,
    dir: &Path,
    index: &mut ChapterIndex,
) -> u32 {
    let story = story_name(dir);
    let mut number = 1;
    let mut prev: Option<ChapterKey> = None;

    let reason = loop {
        match probe_chapter(store, dir, number).await {
            Probe::Found(record) => {
                let key = ChapterKey::new(story.clone(), number);
                index.insert(key.clone(), record);
                prev = Some(key);
                number += 1;
            }
            Probe::Stop(reason) => break reason,
        }
    };

    if let Some(last) = &prev {
        index.close_story(last);
    }

    match reason {
        StopReason::End => {
            tracing::debug!(story = %story, chapter = number, "no more chapters");
        }
        StopReason::Broken { file, reason } => {
            tracing::warn!(story = %story, %file, %reason, "chapter discovery stopped early");
        }
    }

    number - 1
}

pub async fn probe_chapter(store: &dyn ContentStore, dir: &Path, number: u32) -> Probe {
    let html_path = dir.join(format!("{number}.html"));
    let dat_path = dir.join(format!("{number}.dat"));

    let broken = |path: &Path, reason: String| {
        Probe::Stop(StopReason::Broken {
            file: path.display().to_string(),
            reason,
        })
    };

    match store.stat(&html_path).await {
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Probe::Stop(StopReason::End);
        }
        Err(err) => return broken(&html_path, err.to_string()),
    }

    let body = match store.read(&html_path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => return broken(&html_path, err.to_string()),
    };
    let meta_bytes = match store.read(&dat_path).await {
        Ok(bytes) => bytes,
        Err(err) => return broken(&dat_path, err.to_string()),
    };
    let mut meta: ChapterMeta = match serde_json::from_slice(&meta_bytes) {
        Ok(meta) => meta,
        Err(err) => return broken(&dat_path, format!("parse metadata: {err}")),
    };

    Probe::Found(ChapterRecord {
        title: meta.take("title"),
        description: meta.take("description"),
        body,
        has_prev: number != 1,
        has_next: true,
    })
}

fn story_name(dir: &Path) -> String {
    dir.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
