use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{ApiError, Capabilities, Listing, Resource, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoUnidad {
    Peso,
    Volumen,
    Cantidad,
}

impl fmt::Display for TipoUnidad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TipoUnidad::Peso => write!(f, "peso"),
            TipoUnidad::Volumen => write!(f, "volumen"),
            TipoUnidad::Cantidad => write!(f, "cantidad"),
        }
    }
}

impl std::str::FromStr for TipoUnidad {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "peso" => Ok(TipoUnidad::Peso),
            "volumen" => Ok(TipoUnidad::Volumen),
            "cantidad" => Ok(TipoUnidad::Cantidad),
            other => Err(format!("tipo de unidad desconocido: {}", other)),
        }
    }
}

/// Unit of measure. Non-base units convert to their base through `factor_a_base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnidadMedida {
    pub id: i64,
    pub nombre: String,
    pub abreviatura: String,
    pub tipo: TipoUnidad,
    pub es_base: bool,
    pub unidad_base_id: Option<i64>,
    pub factor_a_base: Option<f64>,
    pub activo: bool,
    pub creado_en: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrearUnidadDto {
    pub nombre: String,
    pub abreviatura: String,
    pub tipo: TipoUnidad,
    pub es_base: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unidad_base_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor_a_base: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditarUnidadDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abreviatura: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<TipoUnidad>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub es_base: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unidad_base_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor_a_base: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

fn check_conversion(
    v: &mut Validator,
    es_base: bool,
    unidad_base_id: Option<i64>,
    factor: Option<f64>,
) {
    if es_base {
        return;
    }
    v.check(
        unidad_base_id.is_some_and(|id| id > 0),
        "Selecciona una Unidad Base de referencia.",
    );
    v.check(
        factor.is_some_and(|f| f > 0.0),
        "El factor de conversión debe ser un número mayor a 0.",
    );
}

pub struct Unidades;

impl Resource for Unidades {
    type Model = UnidadMedida;
    type Create = CrearUnidadDto;
    type Update = EditarUnidadDto;

    const PATH: &'static str = "/unidades-medida";
    const LABEL: &'static str = "unidad";
    const LISTING: Listing = Listing::Paginated;
    const CAPABILITIES: Capabilities = Capabilities::ALL;

    fn id(model: &UnidadMedida) -> i64 {
        model.id
    }

    fn validate_create(dto: &CrearUnidadDto) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.check(
            !dto.nombre.trim().is_empty() && !dto.abreviatura.trim().is_empty(),
            "El nombre y la abreviatura son obligatorios.",
        );
        check_conversion(&mut v, dto.es_base, dto.unidad_base_id, dto.factor_a_base);
        v.finish()
    }

    fn validate_update(dto: &EditarUnidadDto) -> Result<(), ApiError> {
        let mut v = Validator::new();
        let blank = |s: &Option<String>| s.as_deref().is_some_and(|s| s.trim().is_empty());
        v.check(
            !blank(&dto.nombre) && !blank(&dto.abreviatura),
            "El nombre y la abreviatura son obligatorios.",
        );
        if dto.es_base == Some(false) {
            check_conversion(&mut v, false, dto.unidad_base_id, dto.factor_a_base);
        }
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kilo() -> CrearUnidadDto {
        CrearUnidadDto {
            nombre: "Kilogramo".into(),
            abreviatura: "kg".into(),
            tipo: TipoUnidad::Peso,
            es_base: true,
            unidad_base_id: None,
            factor_a_base: None,
        }
    }

    #[test]
    fn base_unit_needs_no_conversion() {
        assert!(Unidades::validate_create(&kilo()).is_ok());
    }

    #[test]
    fn derived_unit_needs_base_and_positive_factor() {
        let mut saco = kilo();
        saco.nombre = "Saco 50kg".into();
        saco.es_base = false;
        saco.factor_a_base = Some(0.0);

        let err = Unidades::validate_create(&saco).unwrap_err();
        assert_eq!(
            err,
            ApiError::Validation {
                messages: vec![
                    "Selecciona una Unidad Base de referencia.".to_string(),
                    "El factor de conversión debe ser un número mayor a 0.".to_string()
                ]
            }
        );

        saco.unidad_base_id = Some(1);
        saco.factor_a_base = Some(50.0);
        assert!(Unidades::validate_create(&saco).is_ok());
    }

    #[test]
    fn tipo_parses_case_insensitively() {
        assert_eq!("Volumen".parse::<TipoUnidad>(), Ok(TipoUnidad::Volumen));
        assert!("litros".parse::<TipoUnidad>().is_err());
    }
}
