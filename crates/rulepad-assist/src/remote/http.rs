use super::{HintRequest, HintTransport};
use crate::types::*;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// HTTP transport for plugin hint endpoints
///
/// Issues `GET <base>/<endpoint>?protocol=..&value=..[&sep=..]` and returns
/// the JSON body.
#[derive(Debug, Clone)]
pub struct HttpHintTransport {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpHintTransport {
    pub fn new(base_url: &str) -> AssistResult<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> AssistResult<Self> {
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)
            .map_err(|e| AssistError::ConfigError(format!("Invalid hint base URL {}: {}", base_url, e)))?;
        Ok(Self { base_url, client })
    }

    /// Full request URL for a hint request
    pub fn request_url(&self, request: &HintRequest) -> AssistResult<Url> {
        let mut url = self
            .base_url
            .join(request.endpoint.trim_start_matches('/'))
            .map_err(|e| AssistError::Transport(format!("Invalid hint endpoint {}: {}", request.endpoint, e)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("protocol", &request.protocol);
            query.append_pair("value", &request.value);
            if let Some(sep) = request.sep {
                query.append_pair("sep", sep.as_str());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl HintTransport for HttpHintTransport {
    async fn fetch_hints(&self, request: &HintRequest) -> AssistResult<Value> {
        let url = self.request_url(request)?;
        debug!("Fetching hints from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AssistError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistError::Transport(format!("Hint endpoint returned {}", status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AssistError::InvalidResponse(e.to_string()))
    }
}
