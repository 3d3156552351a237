//! Control API client (panel → chatdraw server).

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::{RerollResponse, StartGiveaway, StatusResponse, SuccessResponse};

/// Typed HTTP client for the control API.
#[derive(Debug, Clone)]
pub struct ControlClient {
    http: Client,
    base_url: Url,
}

impl ControlClient {
    /// Create a new `ControlClient` for the server at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /api/start` – open a new giveaway, wiping the roster.
    pub async fn start(&self, body: &StartGiveaway) -> Result<SuccessResponse, ClientError> {
        let url = self.base_url.join("/api/start")?;
        let resp = self.http.post(url).json(body).send().await?;
        parse_response(resp).await
    }

    /// `POST /api/stop` – close the giveaway, keeping the roster.
    pub async fn stop(&self) -> Result<SuccessResponse, ClientError> {
        self.post_empty("/api/stop").await
    }

    /// `POST /api/reroll` – draw a winner; `None` if nobody entered.
    pub async fn reroll(&self) -> Result<Option<String>, ClientError> {
        let resp: RerollResponse = self.post_empty("/api/reroll").await?;
        Ok(resp.winner)
    }

    /// `POST /api/clear` – wipe the roster and spam counters.
    pub async fn clear(&self) -> Result<SuccessResponse, ClientError> {
        self.post_empty("/api/clear").await
    }

    /// `GET /api/status` – current giveaway state.
    pub async fn status(&self) -> Result<StatusResponse, ClientError> {
        let url = self.base_url.join("/api/status")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    async fn post_empty<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        let url = self.base_url.join(path)?;
        let resp = self.http.post(url).send().await?;
        parse_response(resp).await
    }
}
