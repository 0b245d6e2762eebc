use serde::{Deserialize, Serialize};

use crate::domain::resource::contains_ci;
use crate::domain::{ApiError, Capabilities, Listing, Resource, Validator};

/// A physical store/branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Local {
    pub id: i64,
    #[serde(default)]
    pub empresa_id: i64,
    pub nombre: String,
    pub codigo: String,
    pub tiene_mesas: bool,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub activo: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocalDto {
    pub nombre: String,
    pub codigo: String,
    pub tiene_mesas: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocalDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiene_mesas: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

pub struct Locales;

impl Resource for Locales {
    type Model = Local;
    type Create = CreateLocalDto;
    type Update = UpdateLocalDto;

    const PATH: &'static str = "/locales";
    const LABEL: &'static str = "local";
    const LISTING: Listing = Listing::Full;
    const CAPABILITIES: Capabilities = Capabilities::NO_DELETE;

    fn id(model: &Local) -> i64 {
        model.id
    }

    fn matches(model: &Local, search: &str) -> bool {
        contains_ci(&model.nombre, search) || contains_ci(&model.codigo, search)
    }

    fn validate_create(dto: &CreateLocalDto) -> Result<(), ApiError> {
        Validator::new()
            .required(&dto.nombre, "El nombre del local es obligatorio.")
            .required(&dto.codigo, "El código del local es obligatorio.")
            .finish()
    }

    fn validate_update(dto: &UpdateLocalDto) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(nombre) = &dto.nombre {
            v.required(nombre, "El nombre del local es obligatorio.");
        }
        if let Some(codigo) = &dto.codigo {
            v.required(codigo, "El código del local es obligatorio.");
        }
        v.finish()
    }
}
