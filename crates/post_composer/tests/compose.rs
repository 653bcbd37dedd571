use post_composer::{
    CharacterBudget, ComposeError, ComposerSettings, PostComposer, TRUNCATION_MARKER,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SOURCE_URL: &str = "https://wikip.co/a/healing-herb";

fn settings(server: &MockServer) -> ComposerSettings {
    ComposerSettings {
        endpoint: Some(format!("{}/v1", server.uri())),
        model: Some("local-model".to_string()),
        ..ComposerSettings::default()
    }
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [
            { "message": { "role": "assistant", "content": content } },
            { "message": { "role": "assistant", "content": "second choice is ignored" } }
        ],
        "usage": { "prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150 }
    }))
}

#[tokio::test]
async fn sends_persona_and_sampling_settings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer lm-studio"))
        .and(body_partial_json(json!({
            "model": "local-model",
            "temperature": 0.7,
            "max_tokens": 160
        })))
        .respond_with(completion("  Ginger has been used for nausea for centuries.  \n"))
        .expect(1)
        .mount(&server)
        .await;

    let composer = PostComposer::new(settings(&server)).unwrap();
    let body = composer
        .generate_post(Some("Ginger"), "Benefits\nCalms nausea.", SOURCE_URL)
        .await
        .unwrap();

    assert_eq!(body, "Ginger has been used for nausea for centuries.");

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["messages"][0]["role"], "system");
    assert!(sent["messages"][0]["content"]
        .as_str()
        .unwrap()
        .contains("Never use hashtags"));
    let user = sent["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("Article title: Ginger"));
    assert!(user.contains("Benefits\nCalms nausea."));
    assert!(user.contains("under 243 characters"));
}

#[tokio::test]
async fn over_budget_completion_is_truncated() {
    let server = MockServer::start().await;
    let long = "word ".repeat(100);
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(&long))
        .mount(&server)
        .await;

    let composer = PostComposer::new(ComposerSettings {
        budget: CharacterBudget::Fixed(50),
        ..settings(&server)
    })
    .unwrap();
    let body = composer.generate_post(None, "x", SOURCE_URL).await.unwrap();
    assert_eq!(body.chars().count(), 50);
}

#[tokio::test]
async fn compose_appends_source_and_caps_length() {
    let server = MockServer::start().await;
    let long = "a".repeat(400);
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(&long))
        .mount(&server)
        .await;

    // A generous fixed budget lets the body overflow the final ceiling.
    let composer = PostComposer::new(ComposerSettings {
        budget: CharacterBudget::Fixed(1000),
        ..settings(&server)
    })
    .unwrap();
    let post = composer.compose(Some("Ginger"), "x", SOURCE_URL).await.unwrap();
    assert_eq!(post.body.chars().count(), 400);
    assert_eq!(post.char_count(), 280);
    assert!(post.text.ends_with(TRUNCATION_MARKER));
    assert_eq!(post.source_url.as_deref(), Some(SOURCE_URL));
}

#[tokio::test]
async fn compose_keeps_short_post_intact() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion("Turmeric pairs well with black pepper."))
        .mount(&server)
        .await;

    let composer = PostComposer::new(settings(&server)).unwrap();
    let post = composer.compose(None, "x", SOURCE_URL).await.unwrap();
    assert_eq!(
        post.text,
        format!("Turmeric pairs well with black pepper.\n\n{SOURCE_URL}")
    );
}

#[tokio::test]
async fn partial_usage_report_does_not_block_the_post() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "Ginger calms nausea." } }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
        })))
        .mount(&server)
        .await;

    let composer = PostComposer::new(settings(&server)).unwrap();
    let body = composer
        .generate_post(Some("Ginger"), "Benefits\nCalms nausea.", SOURCE_URL)
        .await
        .unwrap();

    assert_eq!(body, "Ginger calms nausea.");
}

#[tokio::test]
async fn api_error_surfaces_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let composer = PostComposer::new(settings(&server)).unwrap();
    let err = composer.generate_post(None, "x", SOURCE_URL).await.unwrap_err();
    match err {
        ComposeError::Api { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "model not loaded");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_choices_are_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let composer = PostComposer::new(settings(&server)).unwrap();
    let err = composer.generate_post(None, "x", SOURCE_URL).await.unwrap_err();
    assert!(matches!(err, ComposeError::EmptyCompletion), "{err:?}");
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let composer = PostComposer::new(settings(&server)).unwrap();
    let err = composer.generate_post(None, "x", SOURCE_URL).await.unwrap_err();
    assert!(matches!(err, ComposeError::Parse(_)), "{err:?}");
}

#[test]
fn missing_endpoint_or_model_fails_fast() {
    let no_endpoint = ComposerSettings {
        model: Some("m".to_string()),
        ..ComposerSettings::default()
    };
    assert!(matches!(
        PostComposer::new(no_endpoint),
        Err(ComposeError::Config(msg)) if msg.contains("LMSTUDIO_BASE_URL")
    ));

    let blank_model = ComposerSettings {
        endpoint: Some("http://localhost:1234/v1".to_string()),
        model: Some("   ".to_string()),
        ..ComposerSettings::default()
    };
    assert!(matches!(
        PostComposer::new(blank_model),
        Err(ComposeError::Config(msg)) if msg.contains("LMSTUDIO_MODEL")
    ));
}
