//! HTTPS implementation of [`ServerCreator`].

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ServerscomConfig;

use super::types::ErrorBody;
use super::{
    ApiError, ApiFuture, DedicatedServer, DedicatedServerCreateInput, SbmServer,
    SbmServerCreateInput, ServerCreator,
};

const DEDICATED_SERVER_CREATE_PATH: &str = "/hosts/dedicated_servers";
const SBM_SERVER_CREATE_PATH: &str = "/hosts/sbm_servers";
const UNKNOWN_ERROR_CODE: &str = "UNKNOWN";

/// Thin servers.com API client covering the batch create endpoints.
#[derive(Clone, Debug)]
pub struct ServerscomClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ServerscomClient {
    /// Builds a client from validated configuration. The configured request
    /// timeout bounds every call, so a hung upstream surfaces as
    /// [`ApiError::Transport`] instead of stalling a batch.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: &ServerscomConfig) -> Result<Self, ApiError> {
        config
            .validate()
            .map_err(|err| ApiError::Config(err.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|err| ApiError::Config(err.to_string()))?;
        Ok(Self::from_parts(
            http,
            &config.api_url,
            config.api_token.clone(),
        ))
    }

    pub(crate) fn from_parts(
        http: reqwest::Client,
        base_url: &str,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.into(),
        }
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let bytes = response.bytes().await?;

        if status.as_u16() < 400 {
            return serde_json::from_slice(&bytes).map_err(|err| ApiError::Parse {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
                message: err.to_string(),
            });
        }

        Err(error_from_body(status, &content_type, &bytes))
    }
}

fn error_from_body(status: StatusCode, content_type: &str, bytes: &[u8]) -> ApiError {
    let body = String::from_utf8_lossy(bytes).into_owned();
    if !content_type.starts_with("application/json") {
        return ApiError::from_status(status.as_u16(), UNKNOWN_ERROR_CODE.to_owned(), body);
    }

    match serde_json::from_slice::<ErrorBody>(bytes) {
        Ok(parsed) => ApiError::from_status(status.as_u16(), parsed.code, parsed.message),
        Err(err) => ApiError::Parse {
            status: status.as_u16(),
            body,
            message: err.to_string(),
        },
    }
}

impl ServerCreator for ServerscomClient {
    fn create_dedicated_servers<'a>(
        &'a self,
        input: &'a DedicatedServerCreateInput,
    ) -> ApiFuture<'a, Vec<DedicatedServer>> {
        Box::pin(self.post_json(DEDICATED_SERVER_CREATE_PATH, input))
    }

    fn create_sbm_servers<'a>(
        &'a self,
        input: &'a SbmServerCreateInput,
    ) -> ApiFuture<'a, Vec<SbmServer>> {
        Box::pin(self.post_json(SBM_SERVER_CREATE_PATH, input))
    }
}
