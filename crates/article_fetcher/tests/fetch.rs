use std::time::Duration;

use article_fetcher::{FailureKind, FetchSettings, PageFetcher, ReqwestFetcher};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(route: &str, response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

async fn failure(settings: FetchSettings, server: &MockServer, route: &str) -> FailureKind {
    let fetcher = ReqwestFetcher::new(settings).unwrap();
    fetcher
        .fetch(&format!("{}{route}", server.uri()))
        .await
        .unwrap_err()
        .kind
}

#[tokio::test]
async fn html_page_comes_back_with_metadata() {
    let server = serve(
        "/a/ginger",
        ResponseTemplate::new(200).set_body_raw("<p>ginger</p>", "text/html; charset=utf-8"),
    )
    .await;
    let url = format!("{}/a/ginger", server.uri());

    let output = ReqwestFetcher::new(FetchSettings::default())
        .unwrap()
        .fetch(&url)
        .await
        .unwrap();

    assert_eq!(output.bytes, b"<p>ginger</p>");
    assert_eq!(output.metadata.requested_url, url);
    assert!(!output.metadata.redirected());
    assert_eq!(output.metadata.byte_len, 13);
    assert_eq!(
        output.metadata.content_type.as_deref(),
        Some("text/html; charset=utf-8")
    );
}

#[tokio::test]
async fn redirect_target_becomes_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>moved</p>", "text/html"))
        .mount(&server)
        .await;

    let output = ReqwestFetcher::new(FetchSettings::default())
        .unwrap()
        .fetch(&format!("{}/old", server.uri()))
        .await
        .unwrap();

    assert!(output.metadata.redirected());
    assert_eq!(output.metadata.final_url, format!("{}/new", server.uri()));
}

#[tokio::test]
async fn redirect_loops_hit_the_limit() {
    let server = serve(
        "/loop",
        ResponseTemplate::new(302).insert_header("Location", "/loop"),
    )
    .await;
    let settings = FetchSettings {
        redirect_limit: 2,
        ..FetchSettings::default()
    };

    assert_eq!(
        failure(settings, &server, "/loop").await,
        FailureKind::RedirectLimitExceeded
    );
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = serve("/gone", ResponseTemplate::new(404)).await;
    assert_eq!(
        failure(FetchSettings::default(), &server, "/gone").await,
        FailureKind::HttpStatus(404)
    );
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = serve(
        "/slow",
        ResponseTemplate::new(200)
            .set_delay(Duration::from_millis(250))
            .set_body_raw("slow", "text/html"),
    )
    .await;
    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };

    assert_eq!(failure(settings, &server, "/slow").await, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = serve(
        "/big",
        ResponseTemplate::new(200).set_body_raw("01234567890", "text/html"),
    )
    .await;
    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };

    assert_eq!(
        failure(settings, &server, "/big").await,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn images_are_not_pages() {
    let server = serve(
        "/herb.png",
        ResponseTemplate::new(200).set_body_raw(vec![0x89u8, b'P', b'N', b'G'], "image/png"),
    )
    .await;

    assert_eq!(
        failure(FetchSettings::default(), &server, "/herb.png").await,
        FailureKind::UnsupportedContentType {
            content_type: "image/png".to_string()
        }
    );
}

#[tokio::test]
async fn garbage_url_is_rejected_before_any_request() {
    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let err = fetcher.fetch("wikip dot co").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
