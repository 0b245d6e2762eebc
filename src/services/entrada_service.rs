//! Inventory intake at the central warehouse (`/entradas-central`).

use std::sync::Arc;

use crate::domain::{ApiError, PageRequest, Paginated};
use crate::infrastructure::http::ApiClient;
use crate::models::Entradas;
use crate::models::entrada::{CrearEntradaDto, EntradaCentral};
use crate::models::requerimiento::{Estado, RequerimientoCompleto};
use crate::services::entity_manager::EntityManager;
use crate::services::lookups::UnitCache;
use crate::services::session::Session;

pub struct EntradaService {
    manager: EntityManager<Entradas>,
    units: Arc<UnitCache>,
}

impl EntradaService {
    pub fn new(client: Arc<ApiClient>, session: Arc<Session>, units: Arc<UnitCache>) -> Self {
        Self {
            manager: EntityManager::new(client).with_session(session),
            units,
        }
    }

    pub async fn list(&self, request: &PageRequest) -> Result<Paginated<EntradaCentral>, ApiError> {
        self.manager.list(request).await
    }

    pub async fn get(&self, id: i64) -> Result<EntradaCentral, ApiError> {
        self.manager.get(id).await
    }

    pub async fn create(&self, dto: &CrearEntradaDto) -> Result<EntradaCentral, ApiError> {
        let mut dto = dto.clone();
        for item in &mut dto.items {
            item.recompute_total();
        }
        self.manager.create(&dto).await
    }

    /// Intakes are voided, not edited; the backend keeps the record.
    pub async fn anular(&self, id: i64) -> Result<(), ApiError> {
        self.manager.delete(id).await
    }

    /// Intake draft from an approved requisition. Units of every product in it
    /// are loaded in parallel so the draft can be shown with unit names.
    pub async fn draft_from_requisition(
        &self,
        req: &RequerimientoCompleto,
    ) -> Result<CrearEntradaDto, ApiError> {
        if req.requerimiento.estado != Estado::Aprobado {
            return Err(ApiError::validation(format!(
                "El requerimiento {} no está aprobado",
                req.requerimiento.codigo
            )));
        }

        let loaded = self
            .units
            .prefetch(req.items.iter().map(|i| i.producto_id))
            .await;
        tracing::debug!(
            "Intake draft from {}: {} item(s), {} product unit list(s) loaded",
            req.requerimiento.codigo,
            req.items.len(),
            loaded
        );

        Ok(CrearEntradaDto::from_requisition(req))
    }
}
