//! Product catalog client.
//!
//! Fetches product display data from the catalog service with `reqwest` and
//! caches it with `moka` (5-minute TTL by default). This is the production
//! [`ProductLookup`] behind the cart.
//!
//! # Response format
//!
//! `GET {base_url}/api/products/{id}` returns
//!
//! ```json
//! { "id": "sku-1", "name": "Widget", "price": 10.00, "images": ["/img/widget.png"] }
//! ```
//!
//! and `404` when the product does not exist.

use std::str::FromStr;
use std::sync::Arc;

use mercato_core::ProductId;
use mercato_core::cart::ProductSnapshot;
use moka::future::Cache;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::cart::{LookupError, ProductLookup};
use crate::config::CatalogConfig;

/// Errors that can occur when talking to the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Product does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the catalog.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Non-success status other than 404 or 429.
    #[error("Catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response parsed but is not a usable product.
    #[error("Invalid product data: {0}")]
    InvalidProduct(String),

    /// The base URL cannot have path segments appended.
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),
}

/// Product as returned by the catalog service.
#[derive(Debug, Deserialize)]
struct CatalogProduct {
    name: String,
    /// A JSON number or a decimal string.
    price: serde_json::Value,
    #[serde(default)]
    images: Option<Vec<String>>,
}

impl CatalogProduct {
    fn into_snapshot(self) -> Result<ProductSnapshot, CatalogError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(CatalogError::InvalidProduct("empty name".to_string()));
        }

        let unit_price = match &self.price {
            serde_json::Value::Number(number) => parse_price(&number.to_string())?,
            serde_json::Value::String(text) => parse_price(text)?,
            other => {
                return Err(CatalogError::InvalidProduct(format!(
                    "price is not a number: {other}"
                )));
            }
        };

        let image_ref = self
            .images
            .and_then(|images| images.into_iter().next())
            .unwrap_or_default();

        Ok(ProductSnapshot {
            name,
            unit_price,
            image_ref,
        })
    }
}

fn parse_price(text: &str) -> Result<Decimal, CatalogError> {
    let text = text.trim();
    let price = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| CatalogError::InvalidProduct(format!("price '{text}': {e}")))?;
    if price.is_sign_negative() {
        return Err(CatalogError::InvalidProduct(format!(
            "negative price: {price}"
        )));
    }
    Ok(price)
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the product catalog service.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    cache: Cache<String, ProductSnapshot>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
                cache,
            }),
        }
    }

    /// URL of a single product: `{base_url}/api/products/{id}`.
    fn product_url(&self, product_id: &ProductId) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "products", product_id.as_str()]);
        Ok(url)
    }

    /// Get a product's display data.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown products, or an error if the request
    /// fails or the response is not a usable product.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(
        &self,
        product_id: &ProductId,
    ) -> Result<ProductSnapshot, CatalogError> {
        if let Some(product) = self.inner.cache.get(product_id.as_str()).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let mut request = self
            .inner
            .client
            .get(self.product_url(product_id)?)
            .header("Accept", "application/json");
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(product_id.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        // Body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Catalog returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        let product: CatalogProduct = match serde_json::from_str(&response_text) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse catalog product"
                );
                return Err(CatalogError::Parse(e));
            }
        };

        let snapshot = product.into_snapshot()?;

        self.inner
            .cache
            .insert(product_id.as_str().to_owned(), snapshot.clone())
            .await;

        Ok(snapshot)
    }
}

impl ProductLookup for CatalogClient {
    async fn lookup(&self, product_id: &ProductId) -> Result<ProductSnapshot, LookupError> {
        self.get_product(product_id).await.map_err(|e| match e {
            CatalogError::NotFound(_) => LookupError::NotFound(product_id.clone()),
            other => LookupError::Unavailable(other.to_string()),
        })
    }
}
