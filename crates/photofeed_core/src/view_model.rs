use crate::{Post, Route};

/// Everything a renderer needs, detached from the state it came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedViewModel {
    pub route: Route,
    /// Reverse merge order: the most recently merged post comes first.
    /// This approximates newest-first because pages arrive newest-first;
    /// no sort by `created_at` takes place.
    pub posts: Vec<Post>,
    pub post_count: usize,
    /// A fetch is outstanding.
    pub is_loading: bool,
    /// Another page may exist.
    pub has_more: bool,
    pub pages_loaded: usize,
    pub last_failure: Option<String>,
    /// Completions dropped because they answered a superseded request.
    pub stale_discarded: usize,
}
