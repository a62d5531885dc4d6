//! Kasa cloud client
//!
//! Speaks the JSON-RPC style API behind `wap.tplinkcloud.com`: every call is a
//! POST of `{"method": ..., "params": ...}` answered by
//! `{"error_code": 0, "result": ...}`. Authenticated calls carry the session
//! token as a `token` query parameter.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::CloudConfig;
use crate::models::Device;

/// Cloud error code for an expired or revoked session token
pub const TOKEN_EXPIRED: i64 = -20651;

const USER_AGENT: &str = "Dalvik/2.1.0 (Linux; U; Android 6.0.1; A0001 Build/M4B30X)";

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Http(u16),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("response for '{0}' has no result")]
    MissingResult(&'static str),
}

#[derive(Debug, Serialize)]
struct CloudRequest<'a, P: Serialize> {
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<P>,
}

#[derive(Debug, Deserialize)]
struct CloudResponse<T> {
    error_code: i64,
    msg: Option<String>,
    result: Option<T>,
}

impl<T> CloudResponse<T> {
    fn into_result(self, method: &'static str) -> Result<T, CloudError> {
        if self.error_code != 0 {
            return Err(CloudError::Api {
                code: self.error_code,
                message: self.msg.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        self.result.ok_or(CloudError::MissingResult(method))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginParams<'a> {
    app_type: &'a str,
    cloud_user_name: &'a str,
    cloud_password: &'a str,
    #[serde(rename = "terminalUUID")]
    terminal_uuid: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResult {
    token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceListResult {
    #[serde(default)]
    device_list: Vec<Value>,
}

pub struct KasaCloudClient {
    config: CloudConfig,
    terminal_uuid: String,
    token: RwLock<Option<String>>,
    http_client: Client,
}

impl KasaCloudClient {
    pub fn new(config: CloudConfig) -> Result<Self, CloudError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            config,
            terminal_uuid: uuid::Uuid::new_v4().to_string(),
            token: RwLock::new(None),
            http_client,
        })
    }

    async fn call<P, T>(
        &self,
        method: &'static str,
        params: Option<P>,
        token: Option<&str>,
    ) -> Result<T, CloudError>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let mut request = self
            .http_client
            .post(&self.config.base_url)
            .json(&CloudRequest { method, params });

        if let Some(token) = token {
            request = request.query(&[("token", token)]);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CloudError::Http(status.as_u16()));
        }

        let body = resp.text().await?;
        let envelope: CloudResponse<T> = serde_json::from_str(&body)?;
        envelope.into_result(method)
    }

    async fn login(&self) -> Result<String, CloudError> {
        let params = LoginParams {
            app_type: &self.config.app_type,
            cloud_user_name: &self.config.username,
            cloud_password: &self.config.password,
            terminal_uuid: &self.terminal_uuid,
        };

        let result: LoginResult = self.call("login", Some(params), None).await?;
        tracing::info!("[Kasa] Logged in to {}", self.config.base_url);
        Ok(result.token)
    }

    async fn ensure_token(&self) -> Result<String, CloudError> {
        {
            let token = self.token.read().await;
            if let Some(ref t) = *token {
                return Ok(t.clone());
            }
        }

        let mut token = self.token.write().await;
        // Another request may have logged in while we waited for the lock
        if let Some(ref t) = *token {
            return Ok(t.clone());
        }

        let fresh = self.login().await?;
        *token = Some(fresh.clone());
        Ok(fresh)
    }

    async fn invalidate_token(&self) {
        let mut token = self.token.write().await;
        *token = None;
    }

    async fn fetch_device_list(&self, token: &str) -> Result<Vec<Device>, CloudError> {
        let result: DeviceListResult = self
            .call("getDeviceList", None::<()>, Some(token))
            .await?;
        Ok(decode_device_list(result.device_list))
    }

    /// Fetch the account's device list, logging in again once if the token expired
    pub async fn get_device_list(&self) -> Result<Vec<Device>, CloudError> {
        let token = self.ensure_token().await?;

        match self.fetch_device_list(&token).await {
            Err(CloudError::Api { code, .. }) if code == TOKEN_EXPIRED => {
                tracing::info!("[Kasa] Token expired, logging in again");
                self.invalidate_token().await;
                let token = self.ensure_token().await?;
                self.fetch_device_list(&token).await
            }
            other => other,
        }
    }
}

/// Decode each `deviceList` entry on its own; a malformed record is logged and skipped
fn decode_device_list(records: Vec<Value>) -> Vec<Device> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| match Device::from_cloud_record(record) {
            Ok(device) => Some(device),
            Err(e) => {
                tracing::warn!("[Kasa] Skipping malformed device record #{}: {}", i, e);
                None
            }
        })
        .collect()
}
