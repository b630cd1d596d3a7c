//! Photo feed engine: remote API client and effect execution.
mod decode;
mod engine;
mod fetch;
mod types;

pub use decode::{decode_posts_page, DecodeError};
pub use engine::{ChannelEventSink, EngineHandle, EventSink};
pub use fetch::{FetchSettings, FieldSet, PostsFetcher, ReqwestPostsFetcher, DEFAULT_API_BASE};
pub use types::{
    EngineError, EngineEvent, FailureKind, FetchError, PageQuery, PostRecord, PostsPage, RequestId,
};
