use std::sync::{mpsc, Arc};
use std::time::Duration;

use photofeed_engine::{
    ChannelEventSink, EngineEvent, EngineHandle, FailureKind, FetchSettings, PageQuery,
    PostsFetcher, PostsPage, ReqwestPostsFetcher,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> FetchSettings {
    FetchSettings {
        api_base: Url::parse(&server.uri()).unwrap(),
        ..FetchSettings::default()
    }
}

fn query(site: &str, page_handle: Option<&str>) -> PageQuery {
    PageQuery {
        site: site.to_string(),
        per_page: 20,
        page_handle: page_handle.map(ToOwned::to_owned),
    }
}

fn first_page_body() -> serde_json::Value {
    json!({
        "found": 3,
        "posts": [
            {
                "ID": 1,
                "date": "t1",
                "title": "One",
                "excerpt": "<p>one</p>",
                "URL": "https://a.b/one/",
                "attachments": { "55": { "URL": "https://a.b/one.jpg?w=300" } }
            },
            {
                "ID": 2,
                "date": "t2",
                "title": "Two",
                "excerpt": "",
                "URL": "https://a.b/two/",
                "attachments": {}
            }
        ],
        "meta": { "next_page": "value=t2&id=2" }
    })
}

#[tokio::test]
async fn fetcher_requests_first_page_and_decodes_it() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/a.b/posts"))
        .and(query_param("number", "20"))
        .and(query_param("fields", "ID,date,title,excerpt,URL,attachments"))
        .and(query_param_is_missing("page_handle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(first_page_body()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ReqwestPostsFetcher::new(settings_for(&server)).unwrap();
    let page = fetcher.fetch_page(&query("a.b", None)).await.expect("fetch ok");

    assert_eq!(page.posts.len(), 2);
    assert_eq!(
        page.posts[0].image_url.as_deref(),
        Some("https://a.b/one.jpg?w=300")
    );
    assert_eq!(page.posts[1].image_url, None);
    assert_eq!(page.next_page.as_deref(), Some("value=t2&id=2"));
}

#[tokio::test]
async fn fetcher_echoes_page_handle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/a.b/posts"))
        .and(query_param("page_handle", "value=t2&id=2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [],
            "meta": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ReqwestPostsFetcher::new(settings_for(&server)).unwrap();
    let page = fetcher
        .fetch_page(&query("a.b", Some("value=t2&id=2")))
        .await
        .expect("fetch ok");

    assert!(page.posts.is_empty());
    assert_eq!(page.next_page, None);
}

#[tokio::test]
async fn fetcher_surfaces_api_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/missing.example/posts"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "unknown_blog",
            "message": "Unknown blog"
        })))
        .mount(&server)
        .await;

    let fetcher = ReqwestPostsFetcher::new(settings_for(&server)).unwrap();
    let err = fetcher
        .fetch_page(&query("missing.example", None))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert_eq!(err.message, "unknown_blog: Unknown blog");
}

#[tokio::test]
async fn fetcher_rejects_non_json_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/a.b/posts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>login</html>", "text/html"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestPostsFetcher::new(settings_for(&server)).unwrap();
    let err = fetcher.fetch_page(&query("a.b", None)).await.unwrap_err();

    assert_eq!(
        err.kind,
        FailureKind::UnsupportedContentType {
            content_type: "text/html".to_string()
        }
    );
}

#[tokio::test]
async fn fetcher_reports_malformed_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/a.b/posts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{\"posts\": [", "application/json"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestPostsFetcher::new(settings_for(&server)).unwrap();
    let err = fetcher.fetch_page(&query("a.b", None)).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/a.b/posts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "posts": [] })),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..settings_for(&server)
    };
    let fetcher = ReqwestPostsFetcher::new(settings).unwrap();
    let err = fetcher.fetch_page(&query("a.b", None)).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/a.b/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(first_page_body()))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 16,
        ..settings_for(&server)
    };
    let fetcher = ReqwestPostsFetcher::new(settings).unwrap();
    let err = fetcher.fetch_page(&query("a.b", None)).await.unwrap_err();

    assert!(matches!(
        err.kind,
        FailureKind::TooLarge { max_bytes: 16, .. }
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn engine_reports_completion_with_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/a.b/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(first_page_body()))
        .mount(&server)
        .await;

    let (tx, rx) = mpsc::channel();
    let engine =
        EngineHandle::new(settings_for(&server), Arc::new(ChannelEventSink::new(tx))).unwrap();
    engine.request_page(7, query("a.b", None));

    let event = wait_for_event(&rx).await;
    let EngineEvent::PageFetched { request_id, result } = event;
    assert_eq!(request_id, 7);
    assert_eq!(result.expect("page").posts.len(), 2);
}

struct CannedFetcher;

#[async_trait::async_trait]
impl PostsFetcher for CannedFetcher {
    async fn fetch_page(&self, query: &PageQuery) -> Result<PostsPage, photofeed_engine::FetchError> {
        Ok(PostsPage {
            posts: Vec::new(),
            next_page: query.page_handle.clone().map(|handle| format!("{handle}+1")),
        })
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn engine_runs_custom_fetcher() {
    let (tx, rx) = mpsc::channel();
    let engine =
        EngineHandle::with_fetcher(Arc::new(CannedFetcher), Arc::new(ChannelEventSink::new(tx)))
            .unwrap();
    engine.request_page(3, query("a.b", Some("p1")));

    let EngineEvent::PageFetched { request_id, result } = wait_for_event(&rx).await;
    assert_eq!(request_id, 3);
    assert_eq!(result.unwrap().next_page.as_deref(), Some("p1+1"));
}

async fn wait_for_event(rx: &mpsc::Receiver<EngineEvent>) -> EngineEvent {
    for _ in 0..300 {
        if let Ok(event) = rx.try_recv() {
            return event;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no engine event within timeout");
}
