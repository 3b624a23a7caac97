//! In-memory backend

use parking_lot::Mutex;
use pip_core::{AppTexts, Product};
use pip_representation::{CatalogError, DependencyLoader, LoadError, ProductsApi};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Products API serving a fixed product list and text bundle
#[derive(Debug, Default)]
pub struct InMemoryProductsApi {
    products: Mutex<Vec<Product>>,
    texts: Mutex<AppTexts>,
    outage: Mutex<Option<String>>,
    requests: AtomicUsize,
}

impl InMemoryProductsApi {
    #[must_use]
    pub fn new(products: Vec<Product>, texts: AppTexts) -> Self {
        Self {
            products: Mutex::new(products),
            texts: Mutex::new(texts),
            outage: Mutex::new(None),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn set_products(&self, products: Vec<Product>) {
        *self.products.lock() = products;
    }

    /// Fail every request with `reason` until cleared with `None`
    pub fn set_outage(&self, reason: Option<&str>) {
        *self.outage.lock() = reason.map(str::to_string);
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), CatalogError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.outage.lock().as_ref() {
            Some(reason) => Err(CatalogError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ProductsApi for InMemoryProductsApi {
    async fn products(&self, app_id: &str) -> Result<Vec<Product>, CatalogError> {
        self.check()?;
        tracing::debug!("serving products for {}", app_id);
        Ok(self.products.lock().clone())
    }

    async fn texts(&self, _app_id: &str) -> Result<AppTexts, CatalogError> {
        self.check()?;
        Ok(self.texts.lock().clone())
    }
}

/// Dependency that is ready immediately, or never
#[derive(Debug)]
pub struct InstantLoader {
    name: String,
    failure: Option<String>,
    loads: AtomicUsize,
}

impl InstantLoader {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure: None,
            loads: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DependencyLoader for InstantLoader {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<(), LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(LoadError::new(&self.name, message)),
            None => Ok(()),
        }
    }
}
