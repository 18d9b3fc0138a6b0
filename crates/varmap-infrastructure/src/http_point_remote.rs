//! HTTP implementation of the remote point service.
//!
//! `GET {base}/points` returns the full collection, `POST {base}/points` with a
//! JSON array upserts a batch and returns the resulting collection.

use crate::dto::PointDto;
use async_trait::async_trait;
use reqwest::{Client, Response, Url, header};
use varmap_core::config::SyncSettings;
use varmap_core::error::{Result, VarmapError};
use varmap_core::point::{Point, PointRemote};

#[derive(Clone)]
pub struct HttpPointRemote {
    client: Client,
    points_url: Url,
}

impl HttpPointRemote {
    /// Builds a client for `settings.base_url` with the configured connect and
    /// request timeout.
    pub fn new(settings: &SyncSettings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(settings.request_timeout())
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| VarmapError::config(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_client(client, &settings.base_url)
    }

    /// Uses a preconfigured client.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let points_url = points_url(base_url)?;
        tracing::info!("[PointRemote] Using endpoint {}", points_url);
        Ok(Self { client, points_url })
    }

    pub fn points_url(&self) -> &Url {
        &self.points_url
    }

    async fn decode(response: Response) -> Result<Vec<Point>> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VarmapError::http_status(
                status.as_u16(),
                format!("Remote answered {}: {}", status, body.trim()),
            ));
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        let dtos: Vec<PointDto> = serde_json::from_slice(&bytes)?;
        Ok(dtos.into_iter().map(Point::from).collect())
    }
}

#[async_trait]
impl PointRemote for HttpPointRemote {
    async fn fetch_all(&self) -> Result<Vec<Point>> {
        tracing::debug!("[PointRemote] GET {}", self.points_url);
        let response = self
            .client
            .get(self.points_url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let points = Self::decode(response).await?;
        tracing::debug!("[PointRemote] Fetched {} points", points.len());
        Ok(points)
    }

    async fn upsert_all(&self, points: Vec<Point>) -> Result<Vec<Point>> {
        let batch: Vec<PointDto> = points.into_iter().map(PointDto::from).collect();
        tracing::debug!(
            "[PointRemote] POST {} ({} points)",
            self.points_url,
            batch.len()
        );

        let response = self
            .client
            .post(self.points_url.clone())
            .header(header::ACCEPT, "application/json")
            .json(&batch)
            .send()
            .await
            .map_err(transport_error)?;

        Self::decode(response).await
    }
}

/// Resolves `points` against the base URL, tolerating a missing trailing slash.
fn points_url(base_url: &str) -> Result<Url> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|url| url.join("points"))
        .map_err(|e| VarmapError::config(format!("Invalid base URL {:?}: {}", base_url, e)))
}

fn transport_error(err: reqwest::Error) -> VarmapError {
    if err.is_decode() {
        VarmapError::decode(err.to_string())
    } else if let Some(status) = err.status() {
        VarmapError::http_status(status.as_u16(), err.to_string())
    } else if err.is_timeout() {
        VarmapError::network(format!("Request timed out: {}", err))
    } else {
        VarmapError::network(err.to_string())
    }
}
