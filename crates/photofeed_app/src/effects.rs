use std::sync::{mpsc, Arc};

use feed_logging::{feed_info, feed_warn};
use photofeed_core::{Effect, FetchFailure, FetchedPage, Msg, PostEntry};
use photofeed_engine::{
    EngineError, EngineEvent, EngineHandle, EventSink, FetchSettings, PageQuery, PostRecord,
    PostsPage,
};
#[cfg(test)]
use photofeed_engine::PostsFetcher;

use crate::app::AppEvent;

/// Executes core effects on the engine and feeds completions back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: FetchSettings, tx: mpsc::Sender<AppEvent>) -> Result<Self, EngineError> {
        let engine = EngineHandle::new(settings, Arc::new(MsgSink { tx }))?;
        Ok(Self { engine })
    }

    #[cfg(test)]
    pub(crate) fn with_fetcher(
        fetcher: Arc<dyn PostsFetcher>,
        tx: mpsc::Sender<AppEvent>,
    ) -> Result<Self, EngineError> {
        let engine = EngineHandle::with_fetcher(fetcher, Arc::new(MsgSink { tx }))?;
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchPage(request) => {
                    feed_info!(
                        "FetchPage request_id={} site={} per_page={} page_handle={:?}",
                        request.request_id,
                        request.site,
                        request.per_page,
                        request.page_handle
                    );
                    self.engine.request_page(
                        request.request_id,
                        PageQuery {
                            site: request.site,
                            per_page: request.per_page,
                            page_handle: request.page_handle,
                        },
                    );
                }
            }
        }
    }
}

struct MsgSink {
    tx: mpsc::Sender<AppEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(AppEvent::Feed(map_event(event)));
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::PageFetched { request_id, result } => Msg::PageLoaded {
            request_id,
            result: match result {
                Ok(page) => Ok(map_page(page)),
                Err(err) => {
                    feed_warn!("Page request {} failed: {}", request_id, err);
                    Err(FetchFailure::new(err.to_string()))
                }
            },
        },
    }
}

fn map_page(page: PostsPage) -> FetchedPage {
    FetchedPage {
        entries: page.posts.into_iter().map(map_post).collect(),
        next_page: page.next_page,
    }
}

fn map_post(record: PostRecord) -> PostEntry {
    PostEntry {
        id: record.id,
        created_at: record.date,
        title: record.title,
        content: record.excerpt,
        url: record.url,
        image_url: record.image_url,
    }
}
