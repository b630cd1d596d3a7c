use std::collections::HashSet;

use crate::route::DEFAULT_SITE;
use crate::view_model::FeedViewModel;
use crate::{Effect, FetchFailure, FetchedPage, PageRequest, Post, Route};

/// Monotonic tag attached to every page fetch.
pub type RequestId = u64;

/// Page size requested from the remote API.
pub const DEFAULT_PER_PAGE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub per_page: u32,
    pub default_site: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            default_site: DEFAULT_SITE.to_string(),
        }
    }
}

/// Where the next fetch continues from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cursor {
    /// No page has loaded for the current site yet.
    #[default]
    First,
    /// Continuation token returned by the last loaded page.
    Next(String),
    /// The last loaded page carried no token.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedState {
    config: FeedConfig,
    route: Route,
    cursor: Cursor,
    /// Accumulated posts in merge order.
    posts: Vec<Post>,
    /// `created_at` keys present in `posts`.
    keys: HashSet<String>,
    /// The only request whose completion will be applied.
    in_flight: Option<RequestId>,
    last_request_id: RequestId,
    pages_loaded: usize,
    last_failure: Option<FetchFailure>,
    stale_discarded: usize,
    dirty: bool,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FeedConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Continuation token for the next fetch, if one is stored.
    pub fn next_page(&self) -> Option<&str> {
        match &self.cursor {
            Cursor::Next(token) => Some(token.as_str()),
            Cursor::First | Cursor::Exhausted => None,
        }
    }

    /// Accumulated posts in merge order (oldest merge first).
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn post(&self, created_at: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.created_at == created_at)
    }

    pub fn is_network_active(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn has_more(&self) -> bool {
        self.route.site().is_some() && self.cursor != Cursor::Exhausted
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    pub fn last_failure(&self) -> Option<&FetchFailure> {
        self.last_failure.as_ref()
    }

    pub fn stale_responses_discarded(&self) -> usize {
        self.stale_discarded
    }

    /// Rendering projection: posts newest merge first.
    pub fn view(&self) -> FeedViewModel {
        FeedViewModel {
            route: self.route.clone(),
            posts: self.posts.iter().rev().cloned().collect(),
            post_count: self.posts.len(),
            is_loading: self.is_network_active(),
            has_more: self.has_more(),
            pages_loaded: self.pages_loaded,
            last_failure: self.last_failure.as_ref().map(|f| f.reason.clone()),
            stale_discarded: self.stale_discarded,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Resets the feed for `site` and describes the first page fetch.
    ///
    /// An outstanding request for a previous site is orphaned: its response
    /// no longer matches and will be discarded.
    pub(crate) fn start(&mut self, site: String) -> Effect {
        self.reset(Route::Site(site.clone()));
        self.issue_fetch(site, None)
    }

    /// Enters `NoSiteGiven` or `SiteNotFound`.
    pub(crate) fn stop_at(&mut self, route: Route) {
        self.reset(route);
    }

    pub(crate) fn request_next_page(&mut self) -> Option<Effect> {
        if self.in_flight.is_some() {
            return None;
        }
        let site = self.route.site()?.to_string();
        let page_handle = match &self.cursor {
            Cursor::First => None,
            Cursor::Next(token) => Some(token.clone()),
            Cursor::Exhausted => return None,
        };
        Some(self.issue_fetch(site, page_handle))
    }

    pub(crate) fn complete(
        &mut self,
        request_id: RequestId,
        result: Result<FetchedPage, FetchFailure>,
    ) {
        if self.in_flight != Some(request_id) {
            self.stale_discarded += 1;
            return;
        }
        self.in_flight = None;
        self.dirty = true;

        match result {
            Ok(page) => {
                self.merge(page.entries.into_iter().filter_map(Post::from_entry));
                self.cursor = match page.next_page {
                    Some(token) => Cursor::Next(token),
                    None => Cursor::Exhausted,
                };
                self.pages_loaded += 1;
                self.last_failure = None;
            }
            Err(failure) => {
                self.last_failure = Some(failure);
            }
        }
    }

    /// Appends posts whose key is new; an already stored key keeps its post.
    fn merge(&mut self, incoming: impl IntoIterator<Item = Post>) {
        for post in incoming {
            if self.keys.insert(post.created_at.clone()) {
                self.posts.push(post);
            }
        }
    }

    fn issue_fetch(&mut self, site: String, page_handle: Option<String>) -> Effect {
        self.last_request_id += 1;
        let request_id = self.last_request_id;
        self.in_flight = Some(request_id);
        self.dirty = true;
        Effect::FetchPage(PageRequest {
            request_id,
            site,
            per_page: self.config.per_page,
            page_handle,
        })
    }

    fn reset(&mut self, route: Route) {
        self.route = route;
        self.cursor = Cursor::First;
        self.posts.clear();
        self.keys.clear();
        self.in_flight = None;
        self.pages_loaded = 0;
        self.last_failure = None;
        self.dirty = true;
    }
}
