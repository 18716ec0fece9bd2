use axum::http::header::{self, HeaderMap, HeaderValue};

/// How a file extension is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentKind {
    pub content_type: Option<&'static str>,
    pub no_cache: bool,
}

pub fn content_kind(path: &str) -> ContentKind {
    let (content_type, no_cache) = if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        (Some("image/jpeg"), false)
    } else if path.ends_with(".png") {
        (Some("image/png"), false)
    } else if path.ends_with(".html") {
        (Some("text/html"), true)
    } else if path.ends_with(".js") {
        (Some("text/javascript"), true)
    } else if path.ends_with(".css") {
        (Some("text/css"), false)
    } else if path.ends_with(".json") {
        (Some("application/json"), false)
    } else {
        (None, false)
    };
    ContentKind {
        content_type,
        no_cache,
    }
}

pub fn insert_no_cache(headers: &mut HeaderMap) {
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
}

/// Response headers for a file served from the content tree.
pub fn headers_for(path: &str) -> HeaderMap {
    let kind = content_kind(path);
    let mut headers = HeaderMap::new();
    if let Some(content_type) = kind.content_type {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    if kind.no_cache {
        insert_no_cache(&mut headers);
    }
    headers
}
