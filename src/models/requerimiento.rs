use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{ApiError, Capabilities, Listing, Resource};

/// Lifecycle status of a purchase requisition. The backend owns every
/// transition; the client only reflects what it returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Estado {
    Borrador,
    Revision,
    Aprobado,
    Rechazado,
    Comprado,
    Eliminado,
    /// A status this client does not know yet
    Otro(String),
}

impl Estado {
    pub fn as_str(&self) -> &str {
        match self {
            Estado::Borrador => "borrador",
            Estado::Revision => "revision",
            Estado::Aprobado => "aprobado",
            Estado::Rechazado => "rechazado",
            Estado::Comprado => "comprado",
            Estado::Eliminado => "eliminado",
            Estado::Otro(s) => s.as_str(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Estado::Aprobado | Estado::Rechazado | Estado::Comprado | Estado::Eliminado
        )
    }
}

impl From<String> for Estado {
    fn from(s: String) -> Self {
        match s.as_str() {
            "borrador" => Estado::Borrador,
            "revision" => Estado::Revision,
            "aprobado" => Estado::Aprobado,
            "rechazado" => Estado::Rechazado,
            "comprado" => Estado::Comprado,
            "eliminado" => Estado::Eliminado,
            _ => Estado::Otro(s),
        }
    }
}

impl From<Estado> for String {
    fn from(e: Estado) -> Self {
        e.as_str().to_string()
    }
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequerimientoItem {
    pub id: i64,
    pub requerimiento_id: i64,
    pub producto_id: i64,
    pub unidad_medida_id: i64,
    pub cantidad: f64,
    pub precio_unitario_estimado: Option<f64>,
    pub precio_total_estimado: Option<f64>,
    pub observaciones: Option<String>,
    pub producto_nombre: Option<String>,
    pub producto_codigo: Option<String>,
    pub unidad_nombre: Option<String>,
    pub unidad_abreviatura: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requerimiento {
    pub id: i64,
    pub codigo: String,
    #[serde(default)]
    pub tipo: String,
    pub estado: Estado,
    pub observaciones: Option<String>,
    pub observaciones_aprobador: Option<String>,
    pub creado_por: i64,
    pub creado_en: String,
    #[serde(default)]
    pub actualizado_en: String,
}

/// Detail view: header plus items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequerimientoCompleto {
    #[serde(flatten)]
    pub requerimiento: Requerimiento,
    #[serde(default)]
    pub items: Vec<RequerimientoItem>,
}

impl RequerimientoCompleto {
    /// Items as they would be sent back in an edit or review payload.
    pub fn item_dtos(&self) -> Vec<RequerimientoItemDto> {
        self.items
            .iter()
            .map(|i| RequerimientoItemDto {
                producto_id: i.producto_id,
                unidad_medida_id: i.unidad_medida_id,
                cantidad: i.cantidad,
                precio_unitario_estimado: i.precio_unitario_estimado,
                precio_total_estimado: i.precio_total_estimado,
                observaciones: i.observaciones.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequerimientoItemDto {
    pub producto_id: i64,
    pub unidad_medida_id: i64,
    pub cantidad: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precio_unitario_estimado: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precio_total_estimado: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrearRequerimientoDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
    pub items: Vec<RequerimientoItemDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditarRequerimientoDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<RequerimientoItemDto>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccionRevision {
    Aprobar,
    Rechazar,
    /// Save amendments while the requisition stays in review
    Guardar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisarRequerimientoDto {
    pub accion: AccionRevision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<RequerimientoItemDto>>,
}

/// Row checks shared by create, edit and review. Stops at the first bad row.
pub fn validate_items(items: &[RequerimientoItemDto]) -> Result<(), ApiError> {
    if items.is_empty() {
        return Err(ApiError::validation("Debe haber al menos un item."));
    }
    for (i, row) in items.iter().enumerate() {
        if row.producto_id <= 0 || row.unidad_medida_id <= 0 {
            return Err(ApiError::validation(format!("Fila {}: Faltan datos.", i + 1)));
        }
        if row.cantidad.is_nan() || row.cantidad <= 0.0 {
            return Err(ApiError::validation(format!(
                "Fila {}: Cantidad inválida.",
                i + 1
            )));
        }
    }
    Ok(())
}

pub struct Requerimientos;

impl Resource for Requerimientos {
    type Model = Requerimiento;
    type Create = CrearRequerimientoDto;
    type Update = EditarRequerimientoDto;

    const PATH: &'static str = "/requerimientos";
    const LABEL: &'static str = "requerimiento";
    const LISTING: Listing = Listing::Paginated;
    const CAPABILITIES: Capabilities = Capabilities::ALL;

    fn id(model: &Requerimiento) -> i64 {
        model.id
    }

    fn validate_create(dto: &CrearRequerimientoDto) -> Result<(), ApiError> {
        validate_items(&dto.items)
    }

    fn validate_update(dto: &EditarRequerimientoDto) -> Result<(), ApiError> {
        match &dto.items {
            Some(items) => validate_items(items),
            None => Ok(()),
        }
    }
}
