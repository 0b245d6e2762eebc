use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::permiso::Permiso;
use crate::domain::resource::contains_ci;
use crate::domain::{ApiError, Capabilities, Listing, Resource, Validator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolPermiso {
    pub activo: bool,
    pub permiso: Permiso,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rol {
    pub id: i64,
    pub nombre: String,
    /// System roles cannot be edited
    #[serde(default)]
    pub es_sistema: bool,
    #[serde(default)]
    pub empresa_id: i64,
    #[serde(default)]
    pub rol_permisos: Vec<RolPermiso>,
}

impl Rol {
    pub fn active_permission_ids(&self) -> BTreeSet<i64> {
        self.rol_permisos
            .iter()
            .filter(|rp| rp.activo)
            .map(|rp| rp.permiso.id)
            .collect()
    }

    pub fn active_permission_codes(&self) -> BTreeSet<String> {
        self.rol_permisos
            .iter()
            .filter(|rp| rp.activo)
            .map(|rp| rp.permiso.codigo.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateRolDto {
    pub nombre: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsignarPermisosDto {
    pub permisos_ids: Vec<i64>,
}

pub struct Roles;

impl Resource for Roles {
    type Model = Rol;
    type Create = CreateRolDto;
    type Update = CreateRolDto;

    const PATH: &'static str = "/roles";
    const LABEL: &'static str = "rol";
    const LISTING: Listing = Listing::Full;
    const CAPABILITIES: Capabilities = Capabilities::CREATE_ONLY;

    fn id(model: &Rol) -> i64 {
        model.id
    }

    fn matches(model: &Rol, search: &str) -> bool {
        contains_ci(&model.nombre, search)
    }

    fn validate_create(dto: &CreateRolDto) -> Result<(), ApiError> {
        Validator::new()
            .required(&dto.nombre, "El nombre del rol es obligatorio.")
            .finish()
    }
}
