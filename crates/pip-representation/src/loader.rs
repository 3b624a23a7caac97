//! Startup preconditions
//!
//! Nothing is created before the catalog, the texts and every runtime
//! dependency (decoder runtime, 3D runtime, ...) are in. They load
//! concurrently and the first failure aborts the whole join.

use crate::catalog::{ProductCatalog, ProductsApi};
use crate::error::{LoadError, RepresentationError};
use futures::future::try_join_all;
use pip_core::AppTexts;
use std::sync::Arc;

/// A runtime dependency that must be ready before the flow starts
#[async_trait::async_trait]
pub trait DependencyLoader: Send + Sync {
    fn name(&self) -> &str;

    async fn load(&self) -> Result<(), LoadError>;
}

/// Everything startup waited for
#[derive(Debug, Clone, Default)]
pub struct Preconditions {
    pub catalog: ProductCatalog,
    pub texts: AppTexts,
}

/// Load catalog, texts and dependencies concurrently
///
/// # Errors
/// Returns the first catalog or dependency failure.
pub async fn await_preconditions(
    api: &dyn ProductsApi,
    app_id: &str,
    loaders: &[Arc<dyn DependencyLoader>],
) -> Result<Preconditions, RepresentationError> {
    let products = async {
        let products = api.products(app_id).await?;
        tracing::debug!("received {} products for {}", products.len(), app_id);
        Ok::<_, RepresentationError>(products)
    };
    let texts = async { Ok::<_, RepresentationError>(api.texts(app_id).await?) };
    let dependencies = try_join_all(loaders.iter().map(|loader| async move {
        tracing::debug!("loading dependency {}", loader.name());
        loader.load().await?;
        Ok::<_, RepresentationError>(())
    }));

    let (products, texts, loaded) = futures::try_join!(products, texts, dependencies)?;
    tracing::info!(
        "preconditions met: {} products, {} dependencies",
        products.len(),
        loaded.len()
    );

    Ok(Preconditions {
        catalog: ProductCatalog::from_products(products),
        texts,
    })
}
