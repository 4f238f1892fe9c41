/// Hot-reload catalog registry using ArcSwap
///
/// Provides lock-free, atomic updates to the catalog snapshot. A reload swaps the whole
/// pointer, so handlers that already hold a snapshot keep a consistent view.

use crate::api::CatalogSource;
use crate::catalog::lookup::Catalog;
use crate::error::Result;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Lock-free catalog registry
#[derive(Debug)]
pub struct CatalogRegistry {
    catalog: ArcSwap<Catalog>,
}

impl Default for CatalogRegistry {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

impl CatalogRegistry {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: ArcSwap::new(Arc::new(catalog)),
        }
    }

    /// Current catalog snapshot (lock-free read)
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.catalog.load_full()
    }

    /// Replace the catalog atomically
    pub fn store(&self, catalog: Catalog) {
        self.catalog.store(Arc::new(catalog));
    }

    /// Reload apps and devices from a source
    ///
    /// Both lists are fetched before anything is swapped; a failure keeps the previous
    /// catalog in place.
    pub async fn reload(&self, source: &dyn CatalogSource) -> Result<()> {
        let apps = source.list_apps().await?;
        let devices = source.list_devices().await?;

        let catalog = Catalog::new(apps, devices);
        tracing::info!(
            "📚 Loaded catalog with {} apps and {} devices",
            catalog.apps().len(),
            catalog.devices().len()
        );
        self.store(catalog);

        Ok(())
    }
}
