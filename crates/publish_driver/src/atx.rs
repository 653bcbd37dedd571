//! Device control through the on-device uiautomator agent.
//!
//! The agent exposes the uiautomator JSON-RPC service at `/jsonrpc/0` and a
//! shell endpoint at `/shell`; both are plain HTTP on the device's address.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use pipeline_logging::{pipeline_debug, pipeline_info, pipeline_trace};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::{Device, DeviceConnector, DeviceError, DriverError, ElementInfo, Key, Selector};

pub const DEFAULT_AGENT_PORT: u16 = 7912;

// MotionEvent actions for injectInputEvent.
const ACTION_DOWN: i32 = 0;
const ACTION_UP: i32 = 1;

#[derive(Debug)]
pub struct AtxDevice {
    http: reqwest::Client,
    base: Url,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ShellResponse {
    #[serde(default)]
    output: String,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceInfo {
    display_width: u32,
    display_height: u32,
}

impl AtxDevice {
    /// `address` is `host`, `host:port` or a full `http://` URL.
    pub fn new(address: &str, timeout: Duration) -> Result<Self, DeviceError> {
        let base = agent_base_url(address)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeviceError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    async fn rpc<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, DeviceError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        pipeline_trace!("rpc #{} {} {}", id, method, params);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });

        let endpoint = self.endpoint("jsonrpc/0")?;
        let response = self
            .http
            .post(endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeviceError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Transport(format!("{method}: http {status}")));
        }
        let reply: RpcResponse = response
            .json()
            .await
            .map_err(|e| DeviceError::Parse(format!("{method}: {e}")))?;

        if let Some(error) = reply.error {
            return Err(DeviceError::Rpc {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            });
        }
        serde_json::from_value(reply.result.unwrap_or(Value::Null))
            .map_err(|e| DeviceError::Parse(format!("{method}: {e}")))
    }

    async fn shell(&self, command: &str) -> Result<String, DeviceError> {
        let mut endpoint = self.endpoint("shell")?;
        endpoint.query_pairs_mut().append_pair("command", command);
        pipeline_debug!("shell: {}", command);

        let response = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(|e| DeviceError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(DeviceError::Shell(format!("{command}: http {}", response.status())));
        }
        let reply: ShellResponse = response
            .json()
            .await
            .map_err(|e| DeviceError::Parse(format!("shell: {e}")))?;
        match reply.error {
            Some(error) if !error.is_empty() => Err(DeviceError::Shell(format!("{command}: {error}"))),
            _ => Ok(reply.output),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, DeviceError> {
        self.base
            .join(path)
            .map_err(|e| DeviceError::Transport(format!("bad agent url: {e}")))
    }

    async fn touch(&self, action: i32, x: i32, y: i32) -> Result<(), DeviceError> {
        let _: Value = self.rpc("injectInputEvent", json!([action, x, y, 0])).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Device for AtxDevice {
    async fn app_stop(&self, package: &str) -> Result<(), DeviceError> {
        self.shell(&format!("am force-stop {}", shell_quote(package))).await?;
        Ok(())
    }

    async fn app_start(&self, package: &str) -> Result<(), DeviceError> {
        self.shell(&format!(
            "monkey -p {} -c android.intent.category.LAUNCHER 1",
            shell_quote(package)
        ))
        .await?;
        Ok(())
    }

    async fn app_current(&self) -> Result<Option<String>, DeviceError> {
        let dump = self.shell("dumpsys window windows").await?;
        Ok(parse_focused_package(&dump))
    }

    async fn screen_on(&self) -> Result<(), DeviceError> {
        let _: Value = self.rpc("wakeUp", json!([])).await?;
        Ok(())
    }

    async fn press(&self, key: Key) -> Result<(), DeviceError> {
        let _: Value = self.rpc("pressKey", json!([key.as_str()])).await?;
        Ok(())
    }

    async fn exists(&self, selector: &Selector) -> Result<bool, DeviceError> {
        self.rpc("exist", json!([selector.to_rpc()])).await
    }

    async fn click(&self, selector: &Selector) -> Result<bool, DeviceError> {
        if !self.exists(selector).await? {
            return Ok(false);
        }
        self.rpc("click", json!([selector.to_rpc()])).await
    }

    async fn click_at(&self, x: i32, y: i32) -> Result<(), DeviceError> {
        let _: Value = self.rpc("click", json!([x, y])).await?;
        Ok(())
    }

    async fn set_text(&self, selector: &Selector, text: &str) -> Result<bool, DeviceError> {
        if !self.exists(selector).await? {
            return Ok(false);
        }
        self.rpc("setText", json!([selector.to_rpc(), text])).await
    }

    async fn element_info(&self, selector: &Selector) -> Result<Option<ElementInfo>, DeviceError> {
        if !self.exists(selector).await? {
            return Ok(None);
        }
        self.rpc("objInfo", json!([selector.to_rpc()])).await.map(Some)
    }

    async fn all_element_info(&self, selector: &Selector) -> Result<Vec<ElementInfo>, DeviceError> {
        self.rpc("objInfoOfAllInstances", json!([selector.to_rpc()]))
            .await
    }

    async fn long_click_at(&self, x: i32, y: i32, hold: Duration) -> Result<(), DeviceError> {
        self.touch(ACTION_DOWN, x, y).await?;
        tokio::time::sleep(hold).await;
        self.touch(ACTION_UP, x, y).await
    }

    async fn window_size(&self) -> Result<(u32, u32), DeviceError> {
        let info: DeviceInfo = self.rpc("deviceInfo", json!([])).await?;
        Ok((info.display_width, info.display_height))
    }

    async fn open_url(&self, url: &str, package: &str) -> Result<(), DeviceError> {
        self.shell(&format!(
            "am start -a android.intent.action.VIEW -d {} -p {}",
            shell_quote(url),
            shell_quote(package)
        ))
        .await?;
        Ok(())
    }
}

/// Connects to the agent at a configured address.
#[derive(Debug, Clone)]
pub struct AtxConnector {
    address: Option<String>,
    timeout: Duration,
}

impl AtxConnector {
    pub fn new(address: Option<String>) -> Self {
        Self {
            address,
            timeout: Duration::from_secs(20),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl DeviceConnector for AtxConnector {
    type Device = AtxDevice;

    /// Fails with `MissingDeviceConfig` before any network activity when no
    /// address is set; otherwise probes the agent once.
    async fn connect(&self) -> Result<AtxDevice, DriverError> {
        let address = self
            .address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or(DriverError::MissingDeviceConfig)?;
        let device = AtxDevice::new(address, self.timeout)?;
        let (width, height) = device.window_size().await?;
        pipeline_info!("Connected to {} ({}x{})", device.base_url(), width, height);
        Ok(device)
    }
}

fn agent_base_url(address: &str) -> Result<Url, DeviceError> {
    let address = address.trim().trim_end_matches('/');
    let raw = if address.starts_with("http://") || address.starts_with("https://") {
        format!("{address}/")
    } else if address.contains(':') {
        format!("http://{address}/")
    } else {
        format!("http://{address}:{DEFAULT_AGENT_PORT}/")
    };
    Url::parse(&raw).map_err(|e| DeviceError::Transport(format!("bad device address {address}: {e}")))
}

/// Package of the focused window from `dumpsys window` output.
fn parse_focused_package(dump: &str) -> Option<String> {
    let line = dump
        .lines()
        .find(|line| line.trim_start().starts_with("mCurrentFocus="))?;
    let component = line
        .split_whitespace()
        .find(|token| token.contains('/'))?;
    let package = component.split('/').next()?.trim_start_matches('{');
    (!package.is_empty()).then(|| package.to_string())
}

fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}
