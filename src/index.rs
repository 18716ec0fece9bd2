use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::ServeError;

/// Identity of one chapter: the story's path under the content root plus the
/// chapter number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChapterKey {
    pub story: String,
    pub number: u32,
}

impl ChapterKey {
    pub fn new(story: impl Into<String>, number: u32) -> Self {
        Self {
            story: story.into(),
            number,
        }
    }
}

impl fmt::Display for ChapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}.html", self.story, self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRecord {
    pub title: String,
    pub description: String,
    #[serde(rename = "data")]
    pub body: String,
    pub has_prev: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorySummary {
    pub name: String,
    pub chapters: u32,
}

/// Chapters discovered at startup. Filled by the indexer, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterIndex {
    chapters: BTreeMap<ChapterKey, ChapterRecord>,
}

impl ChapterIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn get(&self, key: &ChapterKey) -> Option<&ChapterRecord> {
        self.chapters.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChapterKey, &ChapterRecord)> {
        self.chapters.iter()
    }

    pub(crate) fn insert(&mut self, key: ChapterKey, record: ChapterRecord) {
        self.chapters.insert(key, record);
    }

    /// Marks `last` as the final chapter of its story.
    pub(crate) fn close_story(&mut self, last: &ChapterKey) {
        if let Some(record) = self.chapters.get_mut(last) {
            record.has_next = false;
        }
    }

    pub fn stories(&self) -> Vec<StorySummary> {
        let mut stories: Vec<StorySummary> = Vec::new();
        for key in self.chapters.keys() {
            match stories.last_mut() {
                Some(last) if last.name == key.story => last.chapters += 1,
                _ => stories.push(StorySummary {
                    name: key.story.clone(),
                    chapters: 1,
                }),
            }
        }
        stories
    }

    /// Looks up a chapter by the raw identifiers taken from a request.
    pub fn resolve(&self, story: &str, chapter: &str) -> Result<&ChapterRecord, ServeError> {
        if story.contains("..") || chapter.contains("..") {
            return Err(ServeError::InvalidPath(format!("{story}/{chapter}.html")));
        }

        let not_found = || ServeError::NotFound(format!("{story}/{chapter}.html"));
        let number = parse_chapter_number(chapter).ok_or_else(not_found)?;
        self.get(&ChapterKey::new(story, number))
            .ok_or_else(not_found)
    }
}

/// Accepts only the canonical decimal spelling, so `01` or `+1` never alias
/// chapter 1.
fn parse_chapter_number(raw: &str) -> Option<u32> {
    let number: u32 = raw.parse().ok()?;
    (number >= 1 && number.to_string() == raw).then_some(number)
}
