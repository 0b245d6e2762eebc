//! Lazily filled lookup data for forms.

use dashmap::DashMap;
use futures::future::join_all;
use std::sync::Arc;

use crate::domain::{ApiError, PageRequest};
use crate::infrastructure::http::ApiClient;
use crate::models::producto::{Producto, ProductoUnidad};
use crate::models::proveedor::Proveedor;
use crate::models::requerimiento::{Estado, Requerimiento};
use crate::models::{Productos, Proveedores, Requerimientos};
use crate::services::entity_manager::{EntityManager, LOOKUP_LIMIT};

/// Units allowed per product, fetched on first use and shared.
pub struct UnitCache {
    client: Arc<ApiClient>,
    units: DashMap<i64, Vec<ProductoUnidad>>,
}

impl UnitCache {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            units: DashMap::new(),
        }
    }

    pub fn cached(&self, producto_id: i64) -> Option<Vec<ProductoUnidad>> {
        self.units.get(&producto_id).map(|units| units.value().clone())
    }

    pub async fn units_for(&self, producto_id: i64) -> Result<Vec<ProductoUnidad>, ApiError> {
        if let Some(units) = self.cached(producto_id) {
            return Ok(units);
        }

        let units: Vec<ProductoUnidad> = self
            .client
            .get_json(&format!("/productos/{}/unidades", producto_id), &[])
            .await?;
        // An empty answer is not cached so the next reference asks again
        if !units.is_empty() {
            self.units.insert(producto_id, units.clone());
        }
        Ok(units)
    }

    /// Base unit of the product, or its first unit when none is marked base.
    pub async fn default_unit(&self, producto_id: i64) -> Result<Option<ProductoUnidad>, ApiError> {
        let units = self.units_for(producto_id).await?;
        Ok(units
            .iter()
            .find(|u| u.es_unidad_base)
            .or_else(|| units.first())
            .cloned())
    }

    /// Load every product not cached yet, concurrently. Individual failures
    /// are logged and skipped. Returns how many products were loaded.
    pub async fn prefetch(&self, producto_ids: impl IntoIterator<Item = i64>) -> usize {
        let mut missing: Vec<i64> = producto_ids
            .into_iter()
            .filter(|id| *id > 0 && !self.units.contains_key(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();

        let results = join_all(missing.iter().map(|id| self.units_for(*id))).await;

        results
            .into_iter()
            .zip(&missing)
            .filter(|(result, id)| match result {
                Ok(units) => !units.is_empty(),
                Err(e) => {
                    tracing::warn!("Could not load units for product {}: {}", id, e);
                    false
                }
            })
            .count()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn clear(&self) {
        self.units.clear();
    }
}

/// Everything the intake form offers in its selects.
#[derive(Debug, Clone, Default)]
pub struct FormLookups {
    pub productos: Vec<Producto>,
    pub proveedores: Vec<Proveedor>,
    /// Approved requisitions, the only ones an intake can be created from
    pub requerimientos: Vec<Requerimiento>,
}

/// Fetch the three lookups concurrently; any failure fails the whole load.
pub async fn load_form_lookups(client: &Arc<ApiClient>) -> Result<FormLookups, ApiError> {
    let productos = EntityManager::<Productos>::new(client.clone());
    let proveedores = EntityManager::<Proveedores>::new(client.clone());
    let requerimientos = EntityManager::<Requerimientos>::new(client.clone());
    let approved =
        PageRequest::new(1, LOOKUP_LIMIT).with_filter("estado", Estado::Aprobado.as_str());

    let (productos, proveedores, requerimientos) = futures::try_join!(
        productos.all(),
        proveedores.all(),
        requerimientos.list(&approved),
    )?;

    tracing::debug!(
        "Form lookups: {} products, {} suppliers, {} approved requisitions",
        productos.len(),
        proveedores.len(),
        requerimientos.data.len()
    );

    Ok(FormLookups {
        productos,
        proveedores,
        requerimientos: requerimientos.data,
    })
}
