use super::images::origin;
use crate::config::{PayloadShape, RemoteConfig};
use crate::error::UploadError;
use crate::scrapers::sites::USER_AGENT;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, REFERER};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const API_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_SIZE: u32 = 100;

/// Media item accepted by the remote site
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedMedia {
    pub id: u64,
    #[serde(rename = "source_url")]
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct DownloadedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Remote content API used by the uploader
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// One page of existing records; empty once past the last page
    async fn list_records(&self, page: u32) -> Result<Vec<Value>, UploadError>;

    async fn upload_media(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedMedia, UploadError>;

    /// Create a record, returning its id when the response carries one
    async fn create_record(
        &self,
        shape: PayloadShape,
        payload: &Value,
    ) -> Result<Option<u64>, UploadError>;
}

/// Source of the image bytes referenced by the dataset
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn download(&self, url: &str) -> Result<DownloadedImage, UploadError>;
}

async fn api_error(response: Response) -> UploadError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    UploadError::Api {
        status,
        message: message.chars().take(200).collect(),
    }
}

/// REST client for the remote site, authenticated with an application password
pub struct WordPressClient {
    client: Client,
    remote: RemoteConfig,
}

impl WordPressClient {
    pub fn new(remote: RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .context("Failed to create API client")?;

        Ok(Self { client, remote })
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(&self.remote.username, Some(&self.remote.app_password))
    }
}

#[async_trait]
impl ContentApi for WordPressClient {
    async fn list_records(&self, page: u32) -> Result<Vec<Value>, UploadError> {
        let response = self
            .authed(self.client.get(self.remote.records_url()))
            .query(&[("per_page", PAGE_SIZE), ("page", page)])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(api_error(response).await);
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))
    }

    async fn upload_media(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedMedia, UploadError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        let response = self
            .authed(self.client.post(self.remote.media_url()))
            .multipart(form)
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(api_error(response).await);
        }

        response
            .json::<UploadedMedia>()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))
    }

    async fn create_record(
        &self,
        shape: PayloadShape,
        payload: &Value,
    ) -> Result<Option<u64>, UploadError> {
        let (url, expected) = match shape {
            PayloadShape::Core => (self.remote.records_url(), StatusCode::CREATED),
            PayloadShape::Custom => (self.remote.import_url(), StatusCode::OK),
        };
        debug!(url = %url, "Creating record");

        let response = self.authed(self.client.post(&url)).json(payload).send().await?;
        if response.status() != expected {
            return Err(api_error(response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
        Ok(body.get("id").and_then(Value::as_u64))
    }
}

/// Downloads images the way a browser would request them
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(API_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create image client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn download(&self, url: &str) -> Result<DownloadedImage, UploadError> {
        let mut request = self.client.get(url).header(ACCEPT, "image/*");
        if let Some(referer) = origin(url) {
            request = request.header(REFERER, referer);
        }

        let response = request.send().await?;
        if response.status() != StatusCode::OK {
            return Err(UploadError::Api {
                status: response.status().as_u16(),
                message: format!("download failed for {url}"),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        Ok(DownloadedImage { bytes, content_type })
    }
}
