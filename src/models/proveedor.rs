use serde::{Deserialize, Serialize};

use crate::domain::permissions::{PROVEEDORES_CREAR, PROVEEDORES_EDITAR, PROVEEDORES_ELIMINAR};
use crate::domain::{ActionPermissions, ApiError, Capabilities, Listing, Resource, Validator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proveedor {
    pub id: i64,
    pub ruc: String,
    pub razon_social: String,
    pub nombre_comercial: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub contacto_nombre: Option<String>,
    pub contacto_telefono: Option<String>,
    pub activo: bool,
    #[serde(default)]
    pub creado_en: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrearProveedorDto {
    pub ruc: String,
    pub razon_social: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre_comercial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacto_nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacto_telefono: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditarProveedorDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ruc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub razon_social: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre_comercial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacto_nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacto_telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

pub struct Proveedores;

impl Resource for Proveedores {
    type Model = Proveedor;
    type Create = CrearProveedorDto;
    type Update = EditarProveedorDto;

    const PATH: &'static str = "/proveedores";
    const LABEL: &'static str = "proveedor";
    const LISTING: Listing = Listing::Paginated;
    const CAPABILITIES: Capabilities = Capabilities::ALL;
    const PERMISSIONS: ActionPermissions =
        ActionPermissions::crud(PROVEEDORES_CREAR, PROVEEDORES_EDITAR, PROVEEDORES_ELIMINAR);

    fn id(model: &Proveedor) -> i64 {
        model.id
    }

    fn validate_create(dto: &CrearProveedorDto) -> Result<(), ApiError> {
        Validator::new()
            .required(&dto.ruc, "El RUC es obligatorio.")
            .required(&dto.razon_social, "La razón social es obligatoria.")
            .finish()
    }

    fn validate_update(dto: &EditarProveedorDto) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(ruc) = &dto.ruc {
            v.required(ruc, "El RUC es obligatorio.");
        }
        if let Some(razon) = &dto.razon_social {
            v.required(razon, "La razón social es obligatoria.");
        }
        v.finish()
    }
}
