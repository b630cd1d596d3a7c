use std::time::Duration;

use feed_logging::{feed_debug, feed_warn};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::decode::{api_error_message, decode_posts_page};
use crate::{FailureKind, FetchError, PageQuery, PostsPage};

pub const DEFAULT_API_BASE: &str = "https://public-api.wordpress.com/rest/v1.1/";

/// Projection requested through the `fields` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum FieldSet {
    /// Everything the feed displays.
    #[default]
    Full,
    /// Identifiers and dates only.
    IdOnly,
}

impl FieldSet {
    pub fn as_param(self) -> &'static str {
        match self {
            FieldSet::Full => "ID,date,title,excerpt,URL,attachments",
            FieldSet::IdOnly => "ID,date",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub api_base: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub fields: FieldSet,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default api base is a valid url"),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
            fields: FieldSet::Full,
        }
    }
}

#[async_trait::async_trait]
pub trait PostsFetcher: Send + Sync {
    async fn fetch_page(&self, query: &PageQuery) -> Result<PostsPage, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestPostsFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestPostsFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    /// Builds `{api_base}/sites/{site}/posts?number=..&fields=..[&page_handle=..]`.
    pub fn page_url(&self, query: &PageQuery) -> Result<Url, FetchError> {
        if query.site.trim().is_empty() {
            return Err(FetchError::new(FailureKind::InvalidRequest, "empty site"));
        }
        let mut url = self.settings.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                FetchError::new(FailureKind::InvalidRequest, "api base cannot be a base url")
            })?
            .pop_if_empty()
            .extend(["sites", query.site.as_str(), "posts"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("number", &query.per_page.to_string())
                .append_pair("fields", self.settings.fields.as_param());
            if let Some(handle) = &query.page_handle {
                pairs.append_pair("page_handle", handle);
            }
        }
        Ok(url)
    }

    fn is_content_type_allowed(content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        ct.eq_ignore_ascii_case("application/json") || ct.eq_ignore_ascii_case("text/json")
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl PostsFetcher for ReqwestPostsFetcher {
    async fn fetch_page(&self, query: &PageQuery) -> Result<PostsPage, FetchError> {
        let url = self.page_url(query)?;
        feed_debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = self.read_body(response).await.unwrap_or_default();
            let message = api_error_message(&body).unwrap_or_else(|| status.to_string());
            feed_warn!("posts request for {} failed: {}", query.site, message);
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        if let Some(ct) = content_type.as_deref() {
            if !Self::is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let bytes = self.read_body(response).await?;
        let page = decode_posts_page(&bytes)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
        feed_debug!(
            "site={} posts={} next_page={:?}",
            query.site,
            page.posts.len(),
            page.next_page
        );
        Ok(page)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return FetchError::new(FailureKind::InvalidRequest, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
