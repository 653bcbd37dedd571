use std::collections::HashMap;

use herbpost_app::{run, AppConfig, Cli};
use publish_driver::testing::{FakeConnector, FakeDevice};
use publish_driver::{AtxConnector, DriverError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"
<html><body>
  <h1 class="article-title"><span>Healing Herb</span></h1>
  <h2 id="Healing-Properties">Healing Properties</h2>
  <h3>Benefits</h3>
  <p>Reduces inflammation.</p>
  <section class="footnotes"><ol><li>Smith 2019</li></ol></section>
</body></html>
"#;

const BODY: &str = "Healing herb has a long record for calming inflammation.";

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

/// Content site and chat endpoint on one mock server.
async fn upstreams() -> MockServer {
    pipeline_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/categories/natural-healing/"))
        .respond_with(html(
            r#"<html><body><a class="timeline-article-title" href="/a/healing-herb">Healing Herb</a></body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a/healing-herb"))
        .respond_with(html(ARTICLE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": BODY } }]
        })))
        .mount(&server)
        .await;
    server
}

fn config(server: &MockServer, extra: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("HERBPOST_SITE_URL".to_string(), server.uri()),
        ("LMSTUDIO_BASE_URL".to_string(), format!("{}/v1", server.uri())),
        ("LMSTUDIO_MODEL".to_string(), "local-model".to_string()),
    ]);
    vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

#[tokio::test]
async fn dry_run_prints_article_and_post_without_touching_a_device() {
    let server = upstreams().await;
    let config = config(&server, &[("GALAXY_IP", "10.0.0.5")]);
    let cli = Cli {
        dry_run: true,
        ..Cli::default()
    };
    let connector = FakeConnector::new(FakeDevice::new());
    let mut out = Vec::new();

    run(&config, &cli, connector.clone(), &mut out).await.unwrap();

    let printed = String::from_utf8(out).unwrap();
    let article_url = format!("{}/a/healing-herb", server.uri());
    let final_text = format!("{BODY}\n\n{article_url}");
    assert!(printed.contains("DRY RUN MODE - Web Scraped Content"));
    assert!(printed.contains("Title: Healing Herb"));
    assert!(printed.contains(&format!("Article URL: {article_url}")));
    assert!(printed.contains("Image URL: None"));
    assert!(printed.contains("Benefits\nReduces inflammation."));
    assert!(!printed.contains("Smith 2019"));
    assert!(printed.contains(&format!("Final Post (length: {}):\n{final_text}", final_text.chars().count())));
    assert!(printed.contains("[DRY RUN] Skipping Android posting"));
    assert_eq!(connector.connects(), 0);
}

#[tokio::test]
async fn missing_device_address_fails_after_scrape_and_compose() {
    let server = upstreams().await;
    let config = config(&server, &[]);
    let connector = AtxConnector::new(config.device_address.clone());
    let mut out = Vec::new();

    let err = run(&config, &Cli::default(), connector, &mut out)
        .await
        .unwrap_err();

    assert_eq!(err.downcast_ref::<DriverError>(), Some(&DriverError::MissingDeviceConfig));
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("--- Post preview ---"));
    assert!(printed.contains(BODY));
    assert!(!printed.contains("Done."));
}

#[tokio::test]
async fn missing_model_config_stops_before_posting() {
    let server = upstreams().await;
    let mut config = config(&server, &[]);
    config.llm_model = None;
    let connector = FakeConnector::new(FakeDevice::new());

    let err = run(&config, &Cli::default(), connector.clone(), &mut Vec::<u8>::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("LMSTUDIO_MODEL"), "{err}");
    assert_eq!(connector.connects(), 0);
}
