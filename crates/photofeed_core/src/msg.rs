use crate::{PostEntry, RequestId, ScrollPosition};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The location changed; carries a page URL or a bare hash fragment.
    UrlChanged(String),
    /// Start the feed for a site directly, bypassing hash parsing.
    SiteSelected(String),
    /// The host asked for the next page.
    NextPageRequested,
    /// The host scrolled; loads more when close to the bottom.
    Scrolled(ScrollPosition),
    /// A page fetch finished.
    PageLoaded {
        request_id: RequestId,
        result: Result<FetchedPage, FetchFailure>,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}

/// One decoded page of the posts listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchedPage {
    pub entries: Vec<PostEntry>,
    /// Continuation token; `None` ends pagination.
    pub next_page: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub reason: String,
}

impl FetchFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
