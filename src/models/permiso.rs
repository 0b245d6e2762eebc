use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::permissions::split_code;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permiso {
    pub id: i64,
    /// `modulo.accion`
    pub codigo: String,
    pub nombre: String,
    #[serde(default)]
    pub modulo: String,
    pub descripcion: Option<String>,
}

impl Permiso {
    /// Module name, falling back to the code prefix when the backend omits it.
    pub fn module_name(&self) -> &str {
        if !self.modulo.is_empty() {
            return &self.modulo;
        }
        split_code(&self.codigo).0.unwrap_or("general")
    }
}

/// Permissions grouped by module, modules in alphabetical order.
pub fn group_by_module(permisos: &[Permiso]) -> BTreeMap<String, Vec<Permiso>> {
    let mut groups: BTreeMap<String, Vec<Permiso>> = BTreeMap::new();
    for p in permisos {
        groups
            .entry(p.module_name().to_string())
            .or_default()
            .push(p.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permiso(id: i64, codigo: &str, modulo: &str) -> Permiso {
        Permiso {
            id,
            codigo: codigo.into(),
            nombre: codigo.into(),
            modulo: modulo.into(),
            descripcion: None,
        }
    }

    #[test]
    fn groups_keep_backend_order_within_module() {
        let groups = group_by_module(&[
            permiso(1, "roles.ver", "roles"),
            permiso(2, "locales.ver", "locales"),
            permiso(3, "roles.crear", "roles"),
            permiso(4, "productos.ver", ""),
        ]);

        let modules: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(modules, vec!["locales", "productos", "roles"]);
        let roles: Vec<i64> = groups["roles"].iter().map(|p| p.id).collect();
        assert_eq!(roles, vec![1, 3]);
    }
}
