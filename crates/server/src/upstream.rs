use fleetboard::prelude::*;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::error;

/// Reads buses and companies from the record service over HTTP.
#[derive(Clone)]
pub struct HttpUpstream {
    client: Client,
    base_url: String,
}

impl HttpUpstream {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ErrorInfo> {
        let invalid = |reason: String| {
            error!("Invalid upstream url {}: {reason}", self.base_url);
            ErrorInfo::new(ErrorCode::Unavailable, reason)
        };
        let mut url = Url::parse(&self.base_url).map_err(|err| invalid(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("url cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, segments: &[&str]) -> Result<Response, ErrorInfo> {
        let url = self.url(segments)?;
        self.client.get(url.clone()).send().await.map_err(|err| {
            error!("Failed to fetch {url}: {err}");
            ErrorInfo::new(ErrorCode::Unavailable, err.to_string())
        })
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ErrorInfo> {
    let status = response.status();
    if !status.is_success() {
        let body: Value = response.json().await.unwrap_or(Value::Null);
        error!("Upstream responded with {status}: {body}");
        let wrapped = json!({ "status": status.as_u16(), "body": body });
        return Err(ErrorInfo::from_value(ErrorCode::Upstream, &wrapped));
    }
    response.json().await.map_err(|err| {
        error!("Failed to decode upstream response: {err}");
        ErrorInfo::new(ErrorCode::Decode, err.to_string())
    })
}

impl BusSource for HttpUpstream {
    async fn fetch(&self, company_id: &str) -> Result<Vec<BusRecord>, ErrorInfo> {
        let response = self.get(&["companies", company_id, "buses"]).await?;
        read_json(response).await
    }
}

impl CompanyDirectory for HttpUpstream {
    async fn company(&self, company_id: &str) -> Result<Option<Company>, ErrorInfo> {
        let response = self.get(&["companies", company_id]).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(response).await.map(Some)
    }
}

#[cfg(test)]
#[path = "tests/upstream_tests.rs"]
mod tests;
