use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::{ApiError, DataFiles, FailureKind, SubmitRequest, TaskId, TaskStatus};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_download_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_download_bytes: 50 * 1024 * 1024,
        }
    }
}

/// The backend's HTTP surface, one method per endpoint.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    /// `POST /api/{kind}`; returns the assigned task id.
    async fn submit(&self, request: &SubmitRequest) -> Result<TaskId, ApiError>;

    /// `GET /api/task_status/{id}`.
    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError>;

    /// `GET /api/data_files`.
    async fn data_files(&self) -> Result<DataFiles, ApiError>;

    /// `GET /api/analysis_result/{filename}`; returns the `data` payload.
    async fn analysis_result(&self, filename: &str) -> Result<Value, ApiError>;

    /// `GET /download/{filename}`; returns the raw bytes.
    async fn download(&self, filename: &str) -> Result<Vec<u8>, ApiError>;
}

#[derive(Debug, Deserialize)]
struct SubmitReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    task_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Deserialize)]
struct AnalysisBody {
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Appends percent-encoded path segments to the base url.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::new(FailureKind::InvalidUrl, self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn submit(&self, request: &SubmitRequest) -> Result<TaskId, ApiError> {
        let url = self.endpoint(&["api", request.kind().endpoint()])?;
        let body = serde_json::to_vec(request)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let reply: SubmitReply = read_json(response).await?;

        match (reply.success, reply.task_id) {
            (true, Some(task_id)) if !task_id.is_empty() => Ok(task_id),
            (true, _) => Err(ApiError::new(
                FailureKind::Decode,
                "submission accepted without a task id",
            )),
            (false, _) => Err(ApiError::new(
                FailureKind::Rejected,
                reply.error.unwrap_or_else(|| "submission rejected".to_string()),
            )),
        }
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError> {
        let url = self.endpoint(&["api", "task_status", task_id])?;
        self.get_json(url).await
    }

    async fn data_files(&self) -> Result<DataFiles, ApiError> {
        let url = self.endpoint(&["api", "data_files"])?;
        let reply: Envelope<DataFiles> = self.get_json(url).await?;
        if !reply.success {
            return Err(rejected(reply.error));
        }
        Ok(reply.body)
    }

    async fn analysis_result(&self, filename: &str) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "analysis_result", filename])?;
        let reply: Envelope<AnalysisBody> = self.get_json(url).await?;
        if !reply.success {
            return Err(rejected(reply.error));
        }
        reply
            .body
            .data
            .ok_or_else(|| ApiError::new(FailureKind::Decode, "analysis result without data"))
    }

    async fn download(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&["download", filename])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_download_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

/// Decodes a JSON body. A parseable body wins over the status code, since the
/// backend reports rejections as HTTP 500 with a JSON explanation.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    match serde_json::from_slice::<T>(&body) {
        Ok(value) => Ok(value),
        Err(err) if status.is_success() => Err(ApiError::new(FailureKind::Decode, err.to_string())),
        Err(_) => Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        )),
    }
}

fn rejected(error: Option<String>) -> ApiError {
    ApiError::new(
        FailureKind::Rejected,
        error.unwrap_or_else(|| "request rejected".to_string()),
    )
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> ApiError {
    ApiError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
