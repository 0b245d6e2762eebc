use serde::{Deserialize, Serialize};

use crate::domain::{ApiError, Capabilities, Listing, Resource, Validator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categoria {
    pub id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub activo: bool,
    #[serde(default)]
    pub creado_en: String,
    #[serde(default)]
    pub actualizado_en: String,
    #[serde(default)]
    pub creado_por: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrearCategoriaDto {
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditarCategoriaDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

pub struct Categorias;

impl Resource for Categorias {
    type Model = Categoria;
    type Create = CrearCategoriaDto;
    type Update = EditarCategoriaDto;

    const PATH: &'static str = "/categorias";
    const LABEL: &'static str = "categoría";
    const LISTING: Listing = Listing::Paginated;
    const CAPABILITIES: Capabilities = Capabilities::ALL;

    fn id(model: &Categoria) -> i64 {
        model.id
    }

    fn validate_create(dto: &CrearCategoriaDto) -> Result<(), ApiError> {
        Validator::new()
            .required(&dto.nombre, "El nombre de la categoría es obligatorio.")
            .finish()
    }

    fn validate_update(dto: &EditarCategoriaDto) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(nombre) = &dto.nombre {
            v.required(nombre, "El nombre de la categoría es obligatorio.");
        }
        v.finish()
    }
}
