//! HTTP client for the dashboard backend's internal guild-config API.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use nova_gate::{ConfigService, FetchError, GuildConfig};

const INTERNAL_KEY_HEADER: &str = "x-internal-api-key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Deserialize)]
struct DeleteResponse {
    success: bool,
}

#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build backend http client: {e}"))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
        })
    }

    /// Build a client from `BACKEND_URL` / `INTERNAL_API_KEY`, or `None` when
    /// no backend URL is configured.
    pub fn from_env_optional() -> anyhow::Result<Option<Self>> {
        let base_url = env::var("BACKEND_URL")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let Some(base_url) = base_url else {
            return Ok(None);
        };

        let api_key = env::var("INTERNAL_API_KEY").unwrap_or_default();
        Ok(Some(Self::new(base_url, api_key)?))
    }

    fn guild_url(&self, guild_id: u64) -> String {
        format!("{}/api/guilds/internal/{guild_id}", self.base_url)
    }

    async fn request<T: DeserializeOwned>(&self, method: Method, url: &str) -> Result<T, FetchError> {
        let response = self
            .http
            .request(method, url)
            .header(INTERNAL_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(REQUEST_TIMEOUT)
                } else {
                    FetchError::Backend(format!("failed to connect to backend: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ErrorBody>().await.ok();
            return Err(FetchError::Backend(error_message(status, body)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    pub async fn get_guild_config(&self, guild_id: u64) -> Result<GuildConfig, FetchError> {
        self.request(Method::GET, &self.guild_url(guild_id)).await
    }

    pub async fn create_guild_config(&self, guild_id: u64) -> Result<GuildConfig, FetchError> {
        self.request(Method::POST, &self.guild_url(guild_id)).await
    }

    pub async fn delete_guild_config(&self, guild_id: u64) -> Result<bool, FetchError> {
        let response: DeleteResponse = self
            .request(Method::DELETE, &self.guild_url(guild_id))
            .await?;
        Ok(response.success)
    }
}

fn error_message(status: StatusCode, body: Option<ErrorBody>) -> String {
    body.and_then(|body| body.error)
        .filter(|error| !error.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

#[async_trait]
impl ConfigService for BackendClient {
    async fn fetch(&self, guild_id: u64) -> Result<GuildConfig, FetchError> {
        self.get_guild_config(guild_id).await
    }
}
