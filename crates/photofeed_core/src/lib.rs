//! Photo feed core: pure pagination state machine and view-model helpers.
mod effect;
mod msg;
mod post;
mod route;
mod scroll;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, PageRequest};
pub use msg::{FetchFailure, FetchedPage, Msg};
pub use post::{is_displayable_image, Post, PostEntry, PostId, IMAGE_EXTENSIONS};
pub use route::{resolve_hash, resolve_location, Route, DEFAULT_SITE};
pub use scroll::{ScrollPosition, LOAD_MORE_THRESHOLD};
pub use state::{Cursor, FeedConfig, FeedState, RequestId, DEFAULT_PER_PAGE};
pub use update::update;
pub use view_model::FeedViewModel;
