use std::sync::Arc;

use crate::domain::ApiError;
use crate::domain::pagination::ListEnvelope;
use crate::infrastructure::http::ApiClient;
use crate::models::usuario::{AsignarLocalesDto, LocalOption, RolOption};

/// User administration beyond plain CRUD: store assignment and the options
/// the user form needs.
pub struct UsuarioService {
    client: Arc<ApiClient>,
}

impl UsuarioService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Replace the stores a user may operate in.
    pub async fn assign_locales(&self, usuario_id: i64, locales_ids: Vec<i64>) -> Result<(), ApiError> {
        let count = locales_ids.len();
        let dto = AsignarLocalesDto { locales_ids };
        let _: serde_json::Value = self
            .client
            .post_json(&format!("/usuarios/{}/locales", usuario_id), &dto)
            .await?;
        tracing::info!("User {} assigned to {} store(s)", usuario_id, count);
        Ok(())
    }

    pub async fn role_options(&self) -> Result<Vec<RolOption>, ApiError> {
        let envelope: ListEnvelope<RolOption> = self.client.get_json("/roles", &[]).await?;
        Ok(envelope.into_items())
    }

    pub async fn local_options(&self) -> Result<Vec<LocalOption>, ApiError> {
        let envelope: ListEnvelope<LocalOption> = self.client.get_json("/locales", &[]).await?;
        Ok(envelope.into_items())
    }

    /// Roles and stores for the user form, fetched together.
    pub async fn form_options(&self) -> Result<(Vec<RolOption>, Vec<LocalOption>), ApiError> {
        futures::try_join!(self.role_options(), self.local_options())
    }
}
