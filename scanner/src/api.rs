//! HTTP access to the kehadiran server.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::ScannerConfig;

/// Shown when a failure carries no message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "QR Code tidak valid atau sudah kedaluwarsa";

/// A directory entry as returned by `GET /jemaat`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JemaatSummary {
    pub id: String,
    pub nama: String,
    pub nomor_induk: String,
    #[serde(default)]
    pub foto_url: Option<String>,
}

/// Body of `POST /kehadiran/scan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub kode_qr: String,
    pub jemaat_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx answer. `message` is the server's `message` field, if any.
    #[error("request rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Text to put in front of the operator.
    ///
    /// The server's own message when it sent one, otherwise
    /// [`FALLBACK_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected {
                message: Some(m), ..
            } => m.clone(),
            _ => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

#[async_trait]
pub trait KehadiranApi: Send + Sync {
    async fn search_jemaat(&self, query: &str) -> Result<Vec<JemaatSummary>, ApiError>;

    /// Returns the server's confirmation message.
    async fn submit_scan(&self, request: &ScanRequest) -> Result<String, ApiError>;
}

/// The directory may answer with a bare array or wrapped in the standard
/// `{ success, data, message }` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum DirectoryBody {
    Bare(Vec<JemaatSummary>),
    Envelope { data: Vec<JemaatSummary> },
}

#[derive(Deserialize, Default)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpKehadiranApi {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpKehadiranApi {
    pub fn new(config: &ScannerConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self::with_client(http, config.api_url.clone()))
    }

    /// `base_url` is treated as a directory: `http://host/api` and
    /// `http://host/api/` both resolve `jemaat` to `http://host/api/jemaat`.
    pub fn with_client(http: reqwest::Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    async fn rejection(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let message = response
            .json::<MessageBody>()
            .await
            .unwrap_or_default()
            .message
            .filter(|m| !m.trim().is_empty());
        ApiError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl KehadiranApi for HttpKehadiranApi {
    async fn search_jemaat(&self, query: &str) -> Result<Vec<JemaatSummary>, ApiError> {
        let url = self.endpoint("jemaat")?;
        debug!(%url, query, "searching jemaat");

        let response = self
            .http
            .get(url)
            .query(&[("search", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        Ok(match response.json::<DirectoryBody>().await? {
            DirectoryBody::Bare(list) | DirectoryBody::Envelope { data: list } => list,
        })
    }

    async fn submit_scan(&self, request: &ScanRequest) -> Result<String, ApiError> {
        let url = self.endpoint("kehadiran/scan")?;
        debug!(%url, jemaat_id = %request.jemaat_id, "submitting scan");

        let response = self.http.post(url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: MessageBody = if status == StatusCode::NO_CONTENT {
            MessageBody::default()
        } else {
            response.json().await?
        };
        Ok(body
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Kehadiran berhasil dicatat".to_string()))
    }
}
