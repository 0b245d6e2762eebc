use serde::{Deserialize, Serialize};

use crate::domain::resource::contains_ci;
use crate::domain::{ApiError, Capabilities, Listing, Resource, Validator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRef {
    pub id: i64,
    pub nombre: String,
}

/// A back-office user as listed by `/usuarios`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: i64,
    pub email: String,
    pub nombre_completo: String,
    /// Role name
    pub rol: String,
    pub rol_id: i64,
    pub activo: bool,
    pub telefono: Option<String>,
    #[serde(default)]
    pub locales: Vec<LocalRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolOption {
    pub id: i64,
    pub nombre: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalOption {
    pub id: i64,
    pub nombre: String,
    pub codigo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUsuarioDto {
    pub email: String,
    pub password: String,
    pub nombre_completo: String,
    pub rol_id: i64,
    pub locales_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUsuarioDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre_completo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rol_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AsignarLocalesDto {
    pub locales_ids: Vec<i64>,
}

pub struct Usuarios;

impl Resource for Usuarios {
    type Model = Usuario;
    type Create = CreateUsuarioDto;
    type Update = UpdateUsuarioDto;

    const PATH: &'static str = "/usuarios";
    const LABEL: &'static str = "usuario";
    const LISTING: Listing = Listing::Full;
    const CAPABILITIES: Capabilities = Capabilities::NO_DELETE;

    fn id(model: &Usuario) -> i64 {
        model.id
    }

    fn matches(model: &Usuario, search: &str) -> bool {
        contains_ci(&model.nombre_completo, search)
            || contains_ci(&model.email, search)
            || contains_ci(&model.rol, search)
    }

    fn validate_create(dto: &CreateUsuarioDto) -> Result<(), ApiError> {
        Validator::new()
            .required(&dto.email, "El correo es obligatorio.")
            .required(&dto.password, "La contraseña es obligatoria.")
            .required(&dto.nombre_completo, "El nombre completo es obligatorio.")
            .selected(dto.rol_id, "Selecciona un rol.")
            .finish()
    }

    fn validate_update(dto: &UpdateUsuarioDto) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(nombre) = &dto.nombre_completo {
            v.required(nombre, "El nombre completo es obligatorio.");
        }
        if let Some(rol_id) = dto.rol_id {
            v.selected(rol_id, "Selecciona un rol.");
        }
        v.finish()
    }
}
