/// External collaborators
///
/// This module handles:
/// - The enhance collaborator: optional background removal followed by the
///   local brightness/contrast adjustment
/// - The validate collaborator: a listing review from a vision model
///
/// The processing layer only sees the two traits below, so tests and other
/// front ends can swap in their own implementations.
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigError, StudioConfig};
use crate::error::CollaboratorError;

pub mod adjust;
pub mod remove_bg;
pub mod vision;

pub use remove_bg::RemoveBgClient;
pub use vision::VisionClient;

#[async_trait]
pub trait Enhancer: Send + Sync {
    /// Produce enhanced image bytes from the source bytes
    async fn enhance(&self, bytes: Bytes, remove_background: bool) -> Result<Bytes, CollaboratorError>;
}

#[async_trait]
pub trait Validator: Send + Sync {
    /// Produce a natural-language compliance description
    async fn validate(&self, bytes: Bytes) -> Result<String, CollaboratorError>;
}

/// The pair of collaborators an operation can call
#[derive(Clone)]
pub struct Collaborators {
    pub enhancer: Arc<dyn Enhancer>,
    pub validator: Arc<dyn Validator>,
}

impl Collaborators {
    pub fn new(enhancer: Arc<dyn Enhancer>, validator: Arc<dyn Validator>) -> Self {
        Self {
            enhancer,
            validator,
        }
    }

    /// Wire the hosted services from settings, sharing one HTTP client
    pub fn from_config(config: &StudioConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(ConfigError::HttpClient)?;

        let enhancer = StudioEnhancer::new(RemoveBgClient::new(http.clone(), &config.remove_bg));
        let validator = VisionClient::new(http, &config.vision);
        Ok(Self::new(Arc::new(enhancer), Arc::new(validator)))
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Background removal (when asked for) then the listing adjustment
#[derive(Debug, Clone)]
pub struct StudioEnhancer {
    remove_bg: RemoveBgClient,
}

impl StudioEnhancer {
    pub fn new(remove_bg: RemoveBgClient) -> Self {
        Self { remove_bg }
    }
}

#[async_trait]
impl Enhancer for StudioEnhancer {
    async fn enhance(&self, bytes: Bytes, remove_background: bool) -> Result<Bytes, CollaboratorError> {
        let input = if remove_background {
            self.remove_bg.remove_background(bytes).await?
        } else {
            bytes
        };
        adjust::enhance(input).await
    }
}

#[async_trait]
impl Validator for VisionClient {
    async fn validate(&self, bytes: Bytes) -> Result<String, CollaboratorError> {
        self.review(bytes).await
    }
}
