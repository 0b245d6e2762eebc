use serde::{Deserialize, Serialize};

use super::requerimiento::RequerimientoCompleto;
use crate::domain::permissions::INVENTARIO_CENTRAL_ENTRADAS;
use crate::domain::{ActionPermissions, ApiError, Capabilities, Listing, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoEntrada {
    Manual,
    Requerimiento,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntradaCentralItem {
    pub id: i64,
    pub producto_id: i64,
    pub producto_nombre: Option<String>,
    pub unidad_nombre: Option<String>,
    pub cantidad: f64,
    pub precio_unitario: f64,
    pub precio_total: f64,
}

/// Inventory intake record at the central warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntradaCentral {
    pub id: i64,
    pub codigo: String,
    pub tipo: TipoEntrada,
    pub proveedor_id: Option<i64>,
    pub requerimiento_id: Option<i64>,
    pub comprobante: Option<String>,
    pub total: f64,
    pub observaciones: Option<String>,
    /// Voided intakes stay listed
    #[serde(default)]
    pub anulado: bool,
    pub creado_en: String,
    pub items: Option<Vec<EntradaCentralItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntradaItemDto {
    pub producto_id: i64,
    pub unidad_medida_id: i64,
    pub cantidad: f64,
    pub precio_unitario: f64,
    pub precio_total: f64,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl EntradaItemDto {
    pub fn new(producto_id: i64, unidad_medida_id: i64, cantidad: f64, precio_unitario: f64) -> Self {
        let mut item = Self {
            producto_id,
            unidad_medida_id,
            cantidad,
            precio_unitario,
            precio_total: 0.0,
        };
        item.recompute_total();
        item
    }

    pub fn recompute_total(&mut self) {
        self.precio_total = round2(self.cantidad * self.precio_unitario);
    }

    fn is_complete(&self) -> bool {
        self.producto_id > 0 && self.unidad_medida_id > 0 && self.cantidad > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrearEntradaDto {
    pub tipo: TipoEntrada,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requerimiento_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proveedor_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comprobante: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
    pub items: Vec<EntradaItemDto>,
}

impl CrearEntradaDto {
    pub fn manual(items: Vec<EntradaItemDto>) -> Self {
        Self {
            tipo: TipoEntrada::Manual,
            requerimiento_id: None,
            proveedor_id: None,
            comprobante: None,
            observaciones: None,
            items,
        }
    }

    /// Intake pre-filled from a requisition. Prices start from the estimates,
    /// or zero when the requisition carried none.
    pub fn from_requisition(req: &RequerimientoCompleto) -> Self {
        let items = req
            .items
            .iter()
            .map(|i| {
                EntradaItemDto::new(
                    i.producto_id,
                    i.unidad_medida_id,
                    i.cantidad,
                    i.precio_unitario_estimado.unwrap_or(0.0),
                )
            })
            .collect();
        Self {
            tipo: TipoEntrada::Requerimiento,
            requerimiento_id: Some(req.requerimiento.id),
            ..Self::manual(items)
        }
    }

    pub fn total(&self) -> f64 {
        round2(self.items.iter().map(|i| i.precio_total).sum())
    }
}

pub struct Entradas;

impl Resource for Entradas {
    type Model = EntradaCentral;
    type Create = CrearEntradaDto;
    // Intakes are voided, never edited
    type Update = CrearEntradaDto;

    const PATH: &'static str = "/entradas-central";
    const LABEL: &'static str = "entrada";
    const LISTING: Listing = Listing::Paginated;
    const CAPABILITIES: Capabilities = Capabilities {
        update: false,
        delete: true,
    };
    const PERMISSIONS: ActionPermissions = ActionPermissions {
        create: Some(INVENTARIO_CENTRAL_ENTRADAS),
        update: None,
        delete: Some(INVENTARIO_CENTRAL_ENTRADAS),
    };

    fn id(model: &EntradaCentral) -> i64 {
        model.id
    }

    fn validate_create(dto: &CrearEntradaDto) -> Result<(), ApiError> {
        if dto.tipo == TipoEntrada::Requerimiento && dto.requerimiento_id.is_none_or(|id| id <= 0) {
            return Err(ApiError::validation("Seleccione un requerimiento"));
        }
        if dto.items.is_empty() {
            return Err(ApiError::validation("Agregue al menos un producto"));
        }
        if !dto.items.iter().all(EntradaItemDto::is_complete) {
            return Err(ApiError::validation("Complete los datos de los productos"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_are_rounded_to_cents() {
        let item = EntradaItemDto::new(1, 1, 3.0, 0.333);
        assert_eq!(item.precio_total, 1.0);

        let dto = CrearEntradaDto::manual(vec![item, EntradaItemDto::new(2, 1, 2.0, 10.25)]);
        assert_eq!(dto.total(), 21.5);
    }

    #[test]
    fn requisition_intake_needs_requisition() {
        let mut dto = CrearEntradaDto::manual(vec![EntradaItemDto::new(1, 1, 1.0, 1.0)]);
        dto.tipo = TipoEntrada::Requerimiento;
        assert_eq!(
            Entradas::validate_create(&dto).unwrap_err().user_message(),
            "Seleccione un requerimiento"
        );

        dto.requerimiento_id = Some(7);
        assert!(Entradas::validate_create(&dto).is_ok());

        dto.items.push(EntradaItemDto::new(0, 1, 1.0, 1.0));
        assert_eq!(
            Entradas::validate_create(&dto).unwrap_err().user_message(),
            "Complete los datos de los productos"
        );
    }
}
