use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Product, ProductId},
    error::{ApiError, ApiException},
    protocol::{ProductResponse, ServiceHealth},
};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

pub mod config;
pub mod controller;
pub mod view;

pub use config::{ResponseOrdering, Settings, SettingsError};
pub use controller::{
    DisplayState, ImagePanel, ImageSource, LookupController, LookupPhase, LookupTicket,
    ProductDisplay,
};
pub use view::{render, DisplayField, RenderedView, Region};

/// Banner text for every failure that is not a rejection carrying its own message.
pub const GENERIC_ERROR_MESSAGE: &str = "Error fetching product details";

#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("product id must not be empty")]
    EmptyProductId,
    #[error("product service rejected lookup with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response body: {0}")]
    MalformedBody(String),
    #[error("invalid server url: {0}")]
    InvalidServerUrl(String),
}

impl LookupError {
    /// Text shown in the error banner. Only rejections surface their own message.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Rejected { message, .. } => message,
            _ => GENERIC_ERROR_MESSAGE,
        }
    }
}

impl From<ApiException> for LookupError {
    fn from(value: ApiException) -> Self {
        Self::Rejected {
            status: value.status,
            message: value.message,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedBody(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// The remote lookup: maps an identifier to a product or a failure reason.
#[async_trait]
pub trait ProductApi: Send + Sync {
    async fn fetch_product(&self, product_id: &ProductId) -> Result<Product, LookupError>;
}

#[derive(Debug, Clone)]
pub struct ProductClient {
    http: Client,
    server_url: Url,
}

impl ProductClient {
    pub fn new(server_url: &str) -> Result<Self, LookupError> {
        Self::with_http(Client::new(), server_url)
    }

    pub fn with_http(http: Client, server_url: &str) -> Result<Self, LookupError> {
        let server_url = Url::parse(server_url.trim())
            .map_err(|err| LookupError::InvalidServerUrl(format!("{server_url}: {err}")))?;
        if server_url.cannot_be_a_base() {
            return Err(LookupError::InvalidServerUrl(format!(
                "{server_url} cannot be used as a base url"
            )));
        }
        Ok(Self { http, server_url })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// `{server}/api/products/{id}` with the id encoded as a single path segment.
    pub fn product_url(&self, product_id: &ProductId) -> Result<Url, LookupError> {
        self.endpoint(&["api", "products", product_id.as_str()])
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, LookupError> {
        let mut url = self.server_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                LookupError::InvalidServerUrl(format!(
                    "{} cannot be used as a base url",
                    self.server_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn health(&self) -> Result<ServiceHealth, LookupError> {
        let url = self.endpoint(&["health"])?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(rejection(status.as_u16(), response).await.into());
        }
        let health: ServiceHealth = response.json().await?;
        info!(status = %health.status, "product service health");
        Ok(health)
    }

    /// Raw bytes of a product image. Callers treat failures as image load failures.
    pub async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>, LookupError> {
        let url = Url::parse(image_url)
            .map_err(|err| LookupError::Transport(format!("invalid image url: {err}")))?;
        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        debug!(len = bytes.len(), "fetched product image");
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ProductApi for ProductClient {
    async fn fetch_product(&self, product_id: &ProductId) -> Result<Product, LookupError> {
        let url = self.product_url(product_id)?;
        debug!(product_id = %product_id, %url, "requesting product");

        let response = self.http.get(url).send().await.map_err(|err| {
            warn!(product_id = %product_id, "product request failed: {err}");
            LookupError::from(err)
        })?;

        let status = response.status();
        if !status.is_success() {
            let rejection = rejection(status.as_u16(), response).await;
            warn!(
                product_id = %product_id,
                status = rejection.status,
                "product lookup rejected: {}",
                rejection.message
            );
            return Err(rejection.into());
        }

        let body = response.bytes().await?;
        let envelope: ProductResponse = serde_json::from_slice(&body).map_err(|err| {
            warn!(product_id = %product_id, "malformed product payload: {err}");
            LookupError::MalformedBody(err.to_string())
        })?;
        info!(product_id = %product_id, name = %envelope.data.name, "product retrieved");
        Ok(envelope.data)
    }
}

// Non-2xx is an error regardless of body shape; the body only supplies the message.
async fn rejection(status: u16, response: reqwest::Response) -> ApiException {
    let message = match response.json::<ApiError>().await {
        Ok(body) => body.user_message().map(str::to_owned),
        Err(err) => {
            debug!(status, "unreadable error body: {err}");
            None
        }
    };
    ApiException::new(
        status,
        message.unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
    )
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
