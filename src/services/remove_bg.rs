/// Hosted background removal (remove.bg).
use bytes::Bytes;
use image::ImageFormat;
use reqwest::multipart::{Form, Part};
use reqwest::Client as HttpClient;
use tracing::debug;

use crate::config::RemoveBgConfig;
use crate::error::CollaboratorError;
use crate::upload::sniff_mime;

const SERVICE: &str = "remove.bg";

#[derive(Debug, Clone)]
pub struct RemoveBgClient {
    http: HttpClient,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoveBgClient {
    pub fn new(http: HttpClient, config: &RemoveBgConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Returns the image with its background removed (PNG with alpha)
    pub async fn remove_background(&self, bytes: Bytes) -> Result<Bytes, CollaboratorError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CollaboratorError::unavailable(SERVICE, "REMOVEBG_API_KEY not set"))?;

        let mime = sniff_mime(&bytes).unwrap_or("image/jpeg");
        let extension = ImageFormat::from_mime_type(mime)
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("jpg");

        let part = Part::bytes(bytes.to_vec())
            .file_name(format!("image.{extension}"))
            .mime_str(mime)
            .map_err(|e| CollaboratorError::unavailable(SERVICE, e.to_string()))?;
        let form = Form::new().text("size", "auto").part("image_file", part);

        debug!(bytes = bytes.len(), mime, "requesting background removal");

        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Api-Key", api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CollaboratorError::unavailable(SERVICE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::rejected(SERVICE, status.as_u16(), detail));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CollaboratorError::unavailable(SERVICE, e.to_string()))?;

        if sniff_mime(&body).is_none() {
            return Err(CollaboratorError::unparseable(
                SERVICE,
                "response body is not an image",
            ));
        }
        Ok(body)
    }
}
