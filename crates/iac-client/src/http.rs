//! `reqwest` implementation of [`AnalysisBackend`].

use iac_model::{
    AiAnalysisRequest, AiAnalysisResult, ArtifactReference, AuthenticityReport, KnownHashes,
    Metadata, SimulationRequest, SimulationResult, UploadResult, VerificationRequest,
};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use crate::backend::AnalysisBackend;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// User agent string for backend requests.
const USER_AGENT_VALUE: &str = concat!("iac/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the analysis backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpBackend {
    /// Creates a new client from the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        tracing::debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send().await?;
        decode(response).await
    }
}

/// Checks the status and parses the JSON body.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = check_status(response).await?;
    Ok(response.json().await?)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

impl AnalysisBackend for HttpBackend {
    async fn upload(
        &self,
        artifact: &ArtifactReference,
        known: &KnownHashes,
    ) -> Result<UploadResult> {
        let url = self.config.endpoint("/upload");
        let part = Part::bytes(artifact.bytes().to_vec()).file_name(artifact.name().to_string());
        let mut form = Form::new().part("file", part);
        if let Some(sha256) = known.sha256() {
            form = form.text("known_sha256", sha256.to_string());
        }
        if let Some(md5) = known.md5() {
            form = form.text("known_md5", md5.to_string());
        }

        tracing::debug!(
            file_name = artifact.name(),
            bytes = artifact.len(),
            "POST {}",
            url
        );
        let response = self.client.post(&url).multipart(form).send().await?;
        decode(response).await
    }

    async fn analyze_metadata(&self, metadata: &Metadata) -> Result<AiAnalysisResult> {
        self.post_json("/ai-analyze-metadata", &AiAnalysisRequest { metadata })
            .await
    }

    async fn verify_authenticity(&self, file_name: &str) -> Result<AuthenticityReport> {
        self.post_json("/verify-authenticity", &VerificationRequest { file_name })
            .await
    }

    async fn simulate_metadata(
        &self,
        file_name: &str,
        edits: &Metadata,
    ) -> Result<SimulationResult> {
        self.post_json("/simulate-metadata", &SimulationRequest { file_name, edits })
            .await
    }

    async fn fetch_ela_asset(&self, ela_filename: &str) -> Result<Vec<u8>> {
        let url = self.config.ela_asset_url(ela_filename);
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
