use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::{ApiError, Capabilities, Listing, Resource, Validator};

/// A unit of measure allowed for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductoUnidad {
    pub id: i64,
    pub producto_id: i64,
    pub unidad_medida_id: i64,
    pub es_unidad_base: bool,
    #[serde(default = "default_true")]
    pub activo: bool,
    pub nombre: Option<String>,
    pub abreviatura: Option<String>,
    pub factor_a_base: Option<f64>,
}

fn default_true() -> bool {
    true
}

impl ProductoUnidad {
    pub fn label(&self) -> String {
        match (&self.nombre, &self.abreviatura) {
            (Some(n), Some(a)) => format!("{} ({})", n, a),
            (Some(n), None) => n.clone(),
            (None, Some(a)) => a.clone(),
            (None, None) => format!("unidad #{}", self.unidad_medida_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producto {
    pub id: i64,
    pub codigo: Option<String>,
    pub codigo_barras: Option<String>,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub categoria_id: Option<i64>,
    #[serde(default)]
    pub stock_minimo: f64,
    pub activo: bool,
    pub unidades: Option<Vec<ProductoUnidad>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductoUnidadDto {
    pub unidad_medida_id: i64,
    pub es_unidad_base: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrearProductoDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo_barras: Option<String>,
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_minimo: Option<f64>,
    pub unidades: Vec<ProductoUnidadDto>,
}

/// Units are not editable through the product update endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditarProductoDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo_barras: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_minimo: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

pub struct Productos;

impl Resource for Productos {
    type Model = Producto;
    type Create = CrearProductoDto;
    type Update = EditarProductoDto;

    const PATH: &'static str = "/productos";
    const LABEL: &'static str = "producto";
    const LISTING: Listing = Listing::Paginated;
    const CAPABILITIES: Capabilities = Capabilities::ALL;

    fn id(model: &Producto) -> i64 {
        model.id
    }

    // First failing rule wins, the form shows one message at a time.
    fn validate_create(dto: &CrearProductoDto) -> Result<(), ApiError> {
        if dto.nombre.trim().is_empty() {
            return Err(ApiError::validation("El nombre es obligatorio."));
        }
        if dto.unidades.is_empty() {
            return Err(ApiError::validation("Debes asignar al menos una unidad."));
        }
        if !dto.unidades.iter().any(|u| u.es_unidad_base) {
            return Err(ApiError::validation(
                "Debes marcar una unidad como UNIDAD BASE.",
            ));
        }
        if dto.unidades.iter().any(|u| u.unidad_medida_id <= 0) {
            return Err(ApiError::validation(
                "Selecciona la unidad de medida en todas las filas.",
            ));
        }
        let mut seen = HashSet::new();
        if !dto.unidades.iter().all(|u| seen.insert(u.unidad_medida_id)) {
            return Err(ApiError::validation(
                "No puedes asignar la misma unidad dos veces.",
            ));
        }
        Ok(())
    }

    fn validate_update(dto: &EditarProductoDto) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(nombre) = &dto.nombre {
            v.required(nombre, "El nombre es obligatorio.");
        }
        v.finish()
    }
}
