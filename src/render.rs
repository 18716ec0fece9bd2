use crate::index::ChapterRecord;

/// Page template at the content root.
pub const PAGE_TEMPLATE: &str = "index.html";

const PAGE_TITLE_TOKEN: &str = "XXX_PAGE_TITLE_XXX";
const URL_TOKEN: &str = "XXX_URL_XXX";
const TITLE_TOKEN: &str = "XXX_TITLE_XXX";
const DESCRIPTION_TOKEN: &str = "XXX_DESCRIPTION_XXX";

pub fn story_page(template: &str, story: &str) -> String {
    template.replace(PAGE_TITLE_TOKEN, story)
}

pub fn chapter_page(template: &str, story: &str, url: &str, chapter: &ChapterRecord) -> String {
    story_page(template, story)
        .replace(URL_TOKEN, url)
        .replace(TITLE_TOKEN, &chapter.title)
        .replace(DESCRIPTION_TOKEN, &chapter.description)
}
