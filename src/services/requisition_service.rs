//! Purchase requisition workflow
//!
//! The client only decides which actions to *offer* for a requisition. Whether
//! a transition is legal is decided by the backend, whose rejections are
//! surfaced unchanged.

use std::fmt;
use std::sync::Arc;

use crate::domain::permissions::REQUERIMIENTOS_APROBAR;
use crate::domain::{ApiError, PageRequest, Paginated};
use crate::infrastructure::auth::Claims;
use crate::infrastructure::http::ApiClient;
use crate::models::Requerimientos;
use crate::models::requerimiento::{
    AccionRevision, CrearRequerimientoDto, EditarRequerimientoDto, Estado, Requerimiento,
    RequerimientoCompleto, RequerimientoItemDto, RevisarRequerimientoDto, validate_items,
};
use crate::services::entity_manager::EntityManager;
use crate::services::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequisitionAction {
    Edit,
    Delete,
    SendToReview,
    /// Save amendments during review without deciding
    SaveReview,
    Approve,
    Reject,
}

impl RequisitionAction {
    pub fn label(&self) -> &'static str {
        match self {
            RequisitionAction::Edit => "Editar",
            RequisitionAction::Delete => "Eliminar",
            RequisitionAction::SendToReview => "Enviar a revisión",
            RequisitionAction::SaveReview => "Guardar cambios",
            RequisitionAction::Approve => "Aprobar",
            RequisitionAction::Reject => "Rechazar",
        }
    }

    fn review_verb(&self) -> Option<AccionRevision> {
        match self {
            RequisitionAction::SaveReview => Some(AccionRevision::Guardar),
            RequisitionAction::Approve => Some(AccionRevision::Aprobar),
            RequisitionAction::Reject => Some(AccionRevision::Rechazar),
            _ => None,
        }
    }
}

impl fmt::Display for RequisitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Draft,
    Review,
    ReadOnly,
}

/// Actions offered to `claims` for `req`.
///
/// - `borrador`: edit, delete and send to review, for any operator; the
///   backend decides who may act on someone else's draft
/// - `revision`: save, approve and reject, only with `requerimientos.aprobar`
/// - anything else: nothing
pub fn available_actions(
    req: &Requerimiento,
    claims: Option<&Claims>,
    owner_role: &str,
) -> Vec<RequisitionAction> {
    let Some(claims) = claims else {
        return Vec::new();
    };

    match req.estado {
        Estado::Borrador => vec![
            RequisitionAction::Edit,
            RequisitionAction::Delete,
            RequisitionAction::SendToReview,
        ],
        Estado::Revision if claims.allows(REQUERIMIENTOS_APROBAR, owner_role) => vec![
            RequisitionAction::SaveReview,
            RequisitionAction::Approve,
            RequisitionAction::Reject,
        ],
        _ => Vec::new(),
    }
}

pub fn view_mode(req: &Requerimiento, claims: Option<&Claims>, owner_role: &str) -> ViewMode {
    let actions = available_actions(req, claims, owner_role);
    if actions.contains(&RequisitionAction::SendToReview) {
        ViewMode::Draft
    } else if actions.contains(&RequisitionAction::Approve) {
        ViewMode::Review
    } else {
        ViewMode::ReadOnly
    }
}

/// Header and items sent along with an edit or a review decision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequisitionInput {
    pub observaciones: Option<String>,
    pub items: Option<Vec<RequerimientoItemDto>>,
}

pub struct RequisitionService {
    client: Arc<ApiClient>,
    manager: EntityManager<Requerimientos>,
    session: Arc<Session>,
}

impl RequisitionService {
    pub fn new(client: Arc<ApiClient>, session: Arc<Session>) -> Self {
        Self {
            manager: EntityManager::new(client.clone()).with_session(session.clone()),
            client,
            session,
        }
    }

    pub async fn list(&self, request: &PageRequest) -> Result<Paginated<Requerimiento>, ApiError> {
        self.manager.list(request).await
    }

    pub async fn list_by_estado(
        &self,
        estado: &Estado,
        request: PageRequest,
    ) -> Result<Paginated<Requerimiento>, ApiError> {
        let request = request.with_filter("estado", estado.as_str());
        self.manager.list(&request).await
    }

    pub async fn get(&self, id: i64) -> Result<RequerimientoCompleto, ApiError> {
        self.client
            .get_json(&format!("/requerimientos/{}", id), &[])
            .await
    }

    pub async fn create(&self, dto: &CrearRequerimientoDto) -> Result<Requerimiento, ApiError> {
        self.manager.create(dto).await
    }

    pub fn available_actions(&self, req: &Requerimiento) -> Vec<RequisitionAction> {
        available_actions(req, self.session.claims().as_ref(), self.session.owner_role())
    }

    pub fn view_mode(&self, req: &Requerimiento) -> ViewMode {
        view_mode(req, self.session.claims().as_ref(), self.session.owner_role())
    }

    fn ensure_offered(&self, req: &Requerimiento, action: RequisitionAction) -> Result<(), ApiError> {
        if self.available_actions(req).contains(&action) {
            return Ok(());
        }
        tracing::warn!(
            "Refusing '{}' on {} (estado {})",
            action.label(),
            req.codigo,
            req.estado
        );
        Err(ApiError::ActionUnavailable(format!(
            "La acción '{}' no está disponible para {} en estado {}",
            action.label(),
            req.codigo,
            req.estado
        )))
    }

    /// Run `action` on `req`. Actions not offered to the current operator are
    /// refused locally without a request.
    pub async fn apply(
        &self,
        req: &Requerimiento,
        action: RequisitionAction,
        input: RequisitionInput,
    ) -> Result<(), ApiError> {
        self.ensure_offered(req, action)?;

        match action {
            RequisitionAction::Edit => {
                let dto = EditarRequerimientoDto {
                    observaciones: input.observaciones,
                    items: input.items,
                };
                self.manager.update(req.id, &dto).await?;
            }
            RequisitionAction::Delete => self.manager.delete(req.id).await?,
            RequisitionAction::SendToReview => {
                let _: serde_json::Value = self
                    .client
                    .post_empty(&format!("/requerimientos/{}/enviar-revision", req.id))
                    .await?;
            }
            RequisitionAction::SaveReview | RequisitionAction::Approve | RequisitionAction::Reject => {
                if let Some(items) = &input.items {
                    validate_items(items)?;
                }
                let Some(accion) = action.review_verb() else {
                    return Err(ApiError::ActionUnavailable(action.label().to_string()));
                };
                let dto = RevisarRequerimientoDto {
                    accion,
                    observaciones: input.observaciones,
                    items: input.items,
                };
                let _: serde_json::Value = self
                    .client
                    .patch_json(&format!("/requerimientos/{}/revisar", req.id), &dto)
                    .await?;
            }
        }

        tracing::info!("{} applied to {}", action.label(), req.codigo);
        Ok(())
    }

    pub async fn send_to_review(&self, req: &Requerimiento) -> Result<(), ApiError> {
        self.apply(req, RequisitionAction::SendToReview, RequisitionInput::default())
            .await
    }

    pub async fn review(
        &self,
        req: &Requerimiento,
        accion: AccionRevision,
        input: RequisitionInput,
    ) -> Result<(), ApiError> {
        let action = match accion {
            AccionRevision::Aprobar => RequisitionAction::Approve,
            AccionRevision::Rechazar => RequisitionAction::Reject,
            AccionRevision::Guardar => RequisitionAction::SaveReview,
        };
        self.apply(req, action, input).await
    }

    pub async fn edit(&self, req: &Requerimiento, input: RequisitionInput) -> Result<(), ApiError> {
        self.apply(req, RequisitionAction::Edit, input).await
    }

    pub async fn delete(&self, req: &Requerimiento) -> Result<(), ApiError> {
        self.apply(req, RequisitionAction::Delete, RequisitionInput::default())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(estado: Estado, creado_por: i64) -> Requerimiento {
        Requerimiento {
            id: 5,
            codigo: "REQ-0005".into(),
            tipo: "compra".into(),
            estado,
            observaciones: None,
            observaciones_aprobador: None,
            creado_por,
            creado_en: "2024-05-01T10:00:00Z".into(),
            actualizado_en: String::new(),
        }
    }

    fn claims(sub: i64, rol: &str, permisos: &[&str]) -> Claims {
        Claims {
            sub,
            email: "x@demo.pe".into(),
            empresa_id: 1,
            schema: "t".into(),
            rol: rol.into(),
            locales: vec![],
            permisos: permisos.iter().map(|p| p.to_string()).collect(),
            iat: None,
            exp: None,
        }
    }

    #[test]
    fn review_needs_the_approve_permission() {
        let r = req(Estado::Revision, 1);
        let approver = claims(2, "Jefe de compras", &["requerimientos.aprobar"]);
        let clerk = claims(3, "Almacenero", &["requerimientos.ver"]);

        assert_eq!(
            available_actions(&r, Some(&approver), "Dueño"),
            vec![
                RequisitionAction::SaveReview,
                RequisitionAction::Approve,
                RequisitionAction::Reject
            ]
        );
        assert_eq!(view_mode(&r, Some(&approver), "Dueño"), ViewMode::Review);
        assert!(available_actions(&r, Some(&clerk), "Dueño").is_empty());
        assert_eq!(view_mode(&r, Some(&clerk), "Dueño"), ViewMode::ReadOnly);

        let owner = claims(9, "Dueño", &[]);
        assert_eq!(view_mode(&r, Some(&owner), "Dueño"), ViewMode::Review);
    }

    #[test]
    fn drafts_are_offered_to_every_operator() {
        let r = req(Estado::Borrador, 3);
        for who in [
            claims(3, "Almacenero", &[]),
            claims(4, "Almacenero", &[]),
            claims(9, "Dueño", &[]),
        ] {
            assert_eq!(view_mode(&r, Some(&who), "Dueño"), ViewMode::Draft);
            assert_eq!(
                available_actions(&r, Some(&who), "Dueño"),
                vec![
                    RequisitionAction::Edit,
                    RequisitionAction::Delete,
                    RequisitionAction::SendToReview
                ]
            );
        }
    }

    #[test]
    fn terminal_and_unknown_states_are_read_only() {
        let owner = claims(9, "Dueño", &[]);
        for estado in [
            Estado::Aprobado,
            Estado::Rechazado,
            Estado::Comprado,
            Estado::Eliminado,
            Estado::Otro("en_transito".into()),
        ] {
            assert!(available_actions(&req(estado, 9), Some(&owner), "Dueño").is_empty());
        }
        assert!(available_actions(&req(Estado::Borrador, 1), None, "Dueño").is_empty());
    }
}
