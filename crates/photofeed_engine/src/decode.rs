use serde::Deserialize;
use serde_json::Value;

use crate::{PostRecord, PostsPage};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid posts response at line {line}, column {column}: {message}")]
    InvalidJson {
        line: usize,
        column: usize,
        message: String,
    },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::InvalidJson {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    posts: Vec<WirePost>,
    #[serde(default)]
    meta: WireMeta,
}

#[derive(Debug, Default, Deserialize)]
struct WireMeta {
    #[serde(default)]
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WirePost {
    #[serde(rename = "ID")]
    id: u64,
    #[serde(default)]
    date: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    excerpt: String,
    #[serde(rename = "URL", default)]
    url: String,
    /// Keyed by attachment id; an empty list when the post has none.
    #[serde(default)]
    attachments: Value,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
    #[serde(default)]
    message: String,
}

/// Decodes a `/sites/{site}/posts` response body.
pub fn decode_posts_page(bytes: &[u8]) -> Result<PostsPage, DecodeError> {
    let response: PostsResponse = serde_json::from_slice(bytes)?;
    let posts = response
        .posts
        .into_iter()
        .map(|post| PostRecord {
            image_url: first_attachment_url(&post.attachments),
            id: post.id,
            date: post.date,
            title: post.title,
            excerpt: post.excerpt,
            url: post.url,
        })
        .collect();
    Ok(PostsPage {
        posts,
        next_page: response.meta.next_page,
    })
}

/// Extracts `error: message` from an API error body, if it is one.
pub(crate) fn api_error_message(bytes: &[u8]) -> Option<String> {
    let body: ApiErrorBody = serde_json::from_slice(bytes).ok()?;
    if body.message.is_empty() {
        Some(body.error)
    } else {
        Some(format!("{}: {}", body.error, body.message))
    }
}

// Relies on serde_json's `preserve_order` so "first" means first in the document.
fn first_attachment_url(attachments: &Value) -> Option<String> {
    let first = match attachments {
        Value::Object(map) => map.values().next(),
        Value::Array(items) => items.first(),
        _ => None,
    }?;
    first
        .get("URL")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_posts_and_first_attachment() {
        let body = br#"{
            "found": 2,
            "posts": [
                {
                    "ID": 11,
                    "date": "2021-05-01T10:00:00+00:00",
                    "title": "Harbour",
                    "excerpt": "<p>Boats</p>",
                    "URL": "https://a.b/harbour/",
                    "attachments": {
                        "907": { "ID": 907, "URL": "https://a.b/z.jpg?w=200" },
                        "101": { "ID": 101, "URL": "https://a.b/a.png" }
                    }
                },
                {
                    "ID": 12,
                    "date": "2021-04-30T09:00:00+00:00",
                    "title": "Text only",
                    "excerpt": "",
                    "URL": "https://a.b/text/",
                    "attachments": {}
                }
            ],
            "meta": { "next_page": "value=2021-04-30&id=12" }
        }"#;

        let page = decode_posts_page(body).unwrap();

        assert_eq!(page.next_page.as_deref(), Some("value=2021-04-30&id=12"));
        assert_eq!(
            page.posts[0],
            PostRecord {
                id: 11,
                date: "2021-05-01T10:00:00+00:00".to_string(),
                title: "Harbour".to_string(),
                excerpt: "<p>Boats</p>".to_string(),
                url: "https://a.b/harbour/".to_string(),
                image_url: Some("https://a.b/z.jpg?w=200".to_string()),
            }
        );
        assert_eq!(page.posts[1].image_url, None);
    }

    #[test]
    fn narrow_projection_decodes_without_optional_fields() {
        let body = br#"{ "posts": [ { "ID": 3, "date": "t3" } ], "meta": {} }"#;

        let page = decode_posts_page(body).unwrap();

        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.posts[0].date, "t3");
        assert_eq!(page.posts[0].image_url, None);
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn missing_meta_means_no_more_pages() {
        let page = decode_posts_page(br#"{ "posts": [] }"#).unwrap();
        assert_eq!(page, PostsPage::default());
    }

    #[test]
    fn malformed_body_is_an_error() {
        let err = decode_posts_page(b"<html>nope</html>").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidJson { line: 1, .. }));
    }

    #[test]
    fn reads_api_error_bodies() {
        let body = br#"{"error":"unknown_blog","message":"Unknown blog"}"#;
        assert_eq!(
            api_error_message(body).as_deref(),
            Some("unknown_blog: Unknown blog")
        );
        assert_eq!(api_error_message(b"not json"), None);
    }
}
