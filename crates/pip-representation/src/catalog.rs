//! Product catalog
//!
//! [`ProductsApi`] is the backend seam. [`HttpProductsApi`] talks to the
//! real service:
//! - `GET {base}/apps/{app}/products` returns the product list
//! - `GET {base}/apps/{app}/texts` returns the app's text bundle
//!
//! [`ProductCatalog`] is the barcode lookup built from one product list. It
//! is rebuilt wholesale on every load, never patched.

use crate::error::CatalogError;
use indexmap::IndexMap;
use pip_core::{AppTexts, BarcodeValue, Product};
use serde::de::DeserializeOwned;

/// Products backend
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProductsApi: Send + Sync {
    /// All products of an app
    async fn products(&self, app_id: &str) -> Result<Vec<Product>, CatalogError>;

    /// The app's display texts
    async fn texts(&self, app_id: &str) -> Result<AppTexts, CatalogError>;
}

/// Products API over HTTP
#[derive(Debug, Clone)]
pub struct HttpProductsApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProductsApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, app_id: &str, resource: &str) -> String {
        format!("{}/apps/{}/{}", self.base_url, app_id, resource)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, CatalogError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ProductsApi for HttpProductsApi {
    async fn products(&self, app_id: &str) -> Result<Vec<Product>, CatalogError> {
        self.get_json(self.url(app_id, "products")).await
    }

    async fn texts(&self, app_id: &str) -> Result<AppTexts, CatalogError> {
        self.get_json(self.url(app_id, "texts")).await
    }
}

/// Barcode to product lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductCatalog {
    products: IndexMap<String, Product>,
}

impl ProductCatalog {
    /// Build the lookup from one product list
    ///
    /// When two products share a barcode the later one wins.
    #[must_use]
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut lookup = IndexMap::new();
        for product in products {
            let key = product.barcode_key();
            if key.is_empty() {
                tracing::warn!("skipping product {} without barcode", product.name);
                continue;
            }
            if let Some(previous) = lookup.insert(key.clone(), product) {
                tracing::warn!(
                    "barcode {} assigned twice, replacing {}",
                    key,
                    previous.name
                );
            }
        }
        tracing::debug!("catalog built with {} products", lookup.len());
        Self { products: lookup }
    }

    /// Product for a decoded barcode
    #[must_use]
    pub fn lookup(&self, code: &BarcodeValue) -> Option<&Product> {
        self.products.get(&code.key())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }
}
