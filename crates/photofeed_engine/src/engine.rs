use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use feed_logging::{feed_debug, feed_info};

use crate::fetch::{FetchSettings, PostsFetcher, ReqwestPostsFetcher};
use crate::{EngineError, EngineEvent, PageQuery, RequestId};

/// Receives engine events from the runtime threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    FetchPage {
        request_id: RequestId,
        query: PageQuery,
    },
}

/// Runs page fetches on a background tokio runtime.
///
/// Dropping the handle closes the command channel; the worker thread then
/// gives outstanding fetches a grace period before shutting the runtime down.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: FetchSettings, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let fetcher = ReqwestPostsFetcher::new(settings)?;
        Self::with_fetcher(Arc::new(fetcher), sink)
    }

    pub fn with_fetcher(
        fetcher: Arc<dyn PostsFetcher>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("photofeed-engine")
            .build()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let fetcher = fetcher.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    handle_command(fetcher.as_ref(), command, sink.as_ref()).await;
                });
            }
            feed_info!("engine command channel closed");
            runtime.shutdown_timeout(Duration::from_secs(5));
        });

        Ok(Self { cmd_tx })
    }

    pub fn request_page(&self, request_id: RequestId, query: PageQuery) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::FetchPage { request_id, query });
    }
}

async fn handle_command(fetcher: &dyn PostsFetcher, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::FetchPage { request_id, query } => {
            feed_debug!(
                "request_id={} site={} page_handle={:?}",
                request_id,
                query.site,
                query.page_handle
            );
            let result = fetcher.fetch_page(&query).await;
            if let Err(err) = &result {
                feed_info!("request_id={} failed: {}", request_id, err);
            }
            sink.emit(EngineEvent::PageFetched { request_id, result });
        }
    }
}
