use pretty_assertions::assert_eq;
use publish_driver::{AtxConnector, Device, DeviceConnector, DeviceError, DriverError, Selector};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

async fn agent() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jsonrpc/0"))
        .and(body_partial_json(json!({ "method": "deviceInfo" })))
        .respond_with(rpc_result(json!({ "displayWidth": 1080, "displayHeight": 2340 })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn connect_probes_the_display() {
    let server = agent().await;

    let device = AtxConnector::new(Some(server.uri())).connect().await.unwrap();

    assert_eq!(device.window_size().await.unwrap(), (1080, 2340));
}

#[tokio::test]
async fn missing_address_fails_before_any_request() {
    let err = AtxConnector::new(Some("  ".to_string())).connect().await.unwrap_err();
    assert_eq!(err, DriverError::MissingDeviceConfig);

    let err = AtxConnector::new(None).connect().await.unwrap_err();
    assert_eq!(err, DriverError::MissingDeviceConfig);
}

#[tokio::test]
async fn selector_queries_go_over_json_rpc() {
    let server = agent().await;
    Mock::given(method("POST"))
        .and(path("/jsonrpc/0"))
        .and(body_partial_json(json!({ "method": "exist" })))
        .respond_with(rpc_result(json!(true)))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/jsonrpc/0"))
        .and(body_partial_json(json!({ "method": "setText" })))
        .respond_with(rpc_result(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    let device = AtxConnector::new(Some(server.uri())).connect().await.unwrap();
    let field = Selector::resource_id("com.twitter.android:id/tweet_text");

    assert!(device.exists(&field).await.unwrap());
    assert!(device.set_text(&field, "hello").await.unwrap());
}

#[tokio::test]
async fn rpc_errors_carry_method_and_code() {
    let server = agent().await;
    Mock::given(method("POST"))
        .and(path("/jsonrpc/0"))
        .and(body_partial_json(json!({ "method": "objInfoOfAllInstances" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32002, "message": "UiObjectNotFoundException" }
        })))
        .mount(&server)
        .await;

    let device = AtxConnector::new(Some(server.uri())).connect().await.unwrap();
    let err = device
        .all_element_info(&Selector::class_name("android.widget.ImageView"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DeviceError::Rpc {
            method: "objInfoOfAllInstances".to_string(),
            code: -32002,
            message: "UiObjectNotFoundException".to_string(),
        }
    );
}

#[tokio::test]
async fn app_control_uses_the_shell_endpoint() {
    let server = agent().await;
    Mock::given(method("GET"))
        .and(path("/shell"))
        .and(query_param("command", "am force-stop 'com.twitter.android'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": "", "error": null })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shell"))
        .and(query_param("command", "dumpsys window windows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": "  mCurrentFocus=Window{1f u0 com.twitter.android/com.twitter.android.StartActivity}\n",
            "error": null
        })))
        .mount(&server)
        .await;

    let device = AtxConnector::new(Some(server.uri())).connect().await.unwrap();
    device.app_stop("com.twitter.android").await.unwrap();

    assert_eq!(
        device.app_current().await.unwrap().as_deref(),
        Some("com.twitter.android")
    );
}

#[tokio::test]
async fn unreachable_agent_is_a_transport_error() {
    let err = AtxConnector::new(Some("127.0.0.1:1".to_string()))
        .connect()
        .await
        .unwrap_err();
    assert!(matches!(err, DriverError::Device(DeviceError::Transport(_))), "{err:?}");
}
