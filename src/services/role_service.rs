//! Roles, the permission catalogue and per-role menu visibility.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::ApiError;
use crate::domain::pagination::ListEnvelope;
use crate::infrastructure::http::ApiClient;
use crate::models::Roles;
use crate::models::auth::MenuItem;
use crate::models::permiso::Permiso;
use crate::models::rol::{AsignarPermisosDto, CreateRolDto, Rol};
use crate::services::entity_manager::EntityManager;

/// One row of the role/menu matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuAccess {
    pub id: i64,
    pub titulo: String,
    /// Nesting level, 0 for top-level entries
    pub depth: usize,
    pub permiso: Option<String>,
    pub visible: bool,
}

impl MenuAccess {
    pub fn is_public(&self) -> bool {
        self.permiso.is_none()
    }
}

/// Flatten `menus` depth-first and mark what a role holding `granted` sees.
/// Public entries are always visible.
pub fn menu_matrix(granted: &BTreeSet<String>, menus: &[MenuItem]) -> Vec<MenuAccess> {
    fn walk(granted: &BTreeSet<String>, items: &[MenuItem], depth: usize, out: &mut Vec<MenuAccess>) {
        let mut ordered: Vec<&MenuItem> = items.iter().collect();
        ordered.sort_by_key(|m| m.orden.unwrap_or(i64::MAX));
        for item in ordered {
            out.push(MenuAccess {
                id: item.id,
                titulo: item.titulo.clone(),
                depth,
                permiso: item.permiso_requerido.clone(),
                visible: item
                    .permiso_requerido
                    .as_ref()
                    .is_none_or(|p| granted.contains(p)),
            });
            walk(granted, &item.hijos, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    walk(granted, menus, 0, &mut out);
    out
}

pub struct RoleService {
    client: Arc<ApiClient>,
    roles: EntityManager<Roles>,
}

impl RoleService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            roles: EntityManager::new(client.clone()),
            client,
        }
    }

    pub async fn list_roles(&self) -> Result<Vec<Rol>, ApiError> {
        self.roles.all().await
    }

    /// `/roles` has no detail endpoint; the role is picked from the full list.
    pub async fn find_rol(&self, id: i64) -> Result<Rol, ApiError> {
        self.list_roles()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("El rol {} no existe", id)))
    }

    pub async fn create_rol(&self, nombre: &str) -> Result<Rol, ApiError> {
        self.roles
            .create(&CreateRolDto {
                nombre: nombre.trim().to_string(),
            })
            .await
    }

    pub async fn list_permisos(&self) -> Result<Vec<Permiso>, ApiError> {
        let envelope: ListEnvelope<Permiso> = self.client.get_json("/permisos", &[]).await?;
        Ok(envelope.into_items())
    }

    /// Replace the role's permission set.
    pub async fn assign_permissions(
        &self,
        rol_id: i64,
        permisos_ids: impl IntoIterator<Item = i64>,
    ) -> Result<Rol, ApiError> {
        let ids: BTreeSet<i64> = permisos_ids.into_iter().collect();
        let dto = AsignarPermisosDto {
            permisos_ids: ids.into_iter().collect(),
        };
        let rol: Rol = self
            .client
            .post_json(&format!("/roles/{}/permisos", rol_id), &dto)
            .await?;
        tracing::info!(
            "Role {} now has {} permission(s)",
            rol.nombre,
            dto.permisos_ids.len()
        );
        Ok(rol)
    }

    /// Same as [`Self::assign_permissions`] but by `modulo.accion` code.
    pub async fn assign_permission_codes(&self, rol_id: i64, codes: &[String]) -> Result<Rol, ApiError> {
        let catalogue = self.list_permisos().await?;
        let ids = codes_to_ids(&catalogue, codes)?;
        self.assign_permissions(rol_id, ids).await
    }

    /// The caller's menu tree, unfiltered on this side. The backend trims it
    /// to what the caller may see, so it is the whole configured tree only
    /// when the owner role asks.
    pub async fn caller_menu_tree(&self) -> Result<Vec<MenuItem>, ApiError> {
        self.client.get_json("/auth/me/menu", &[]).await
    }

    /// Visibility of each entry of [`Self::caller_menu_tree`] for `rol_id`.
    /// Entries hidden from the caller are missing from the result.
    pub async fn role_menu_matrix(&self, rol_id: i64) -> Result<Vec<MenuAccess>, ApiError> {
        let (rol, menus) = futures::try_join!(self.find_rol(rol_id), self.caller_menu_tree())?;
        Ok(menu_matrix(&rol.active_permission_codes(), &menus))
    }
}

fn codes_to_ids(catalogue: &[Permiso], codes: &[String]) -> Result<Vec<i64>, ApiError> {
    let mut unknown = Vec::new();
    let mut ids = Vec::new();
    for code in codes {
        match catalogue.iter().find(|p| p.codigo == *code) {
            Some(p) => ids.push(p.id),
            None => unknown.push(code.clone()),
        }
    }
    if !unknown.is_empty() {
        return Err(ApiError::validation(format!(
            "Permisos desconocidos: {}",
            unknown.join(", ")
        )));
    }
    Ok(ids)
}
