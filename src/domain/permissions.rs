//! Permission codes used by the client to decide what to offer.
//!
//! Codes follow the backend's `modulo.accion` convention. The backend stays
//! authoritative; these only gate which actions are shown.

/// Role name that bypasses every permission check.
pub const OWNER_ROLE: &str = "Dueño";

/// Approve, reject or amend a requisition under review.
pub const REQUERIMIENTOS_APROBAR: &str = "requerimientos.aprobar";

pub const PROVEEDORES_CREAR: &str = "proveedores.crear";
pub const PROVEEDORES_EDITAR: &str = "proveedores.editar";
pub const PROVEEDORES_ELIMINAR: &str = "proveedores.eliminar";

/// Register and void central warehouse intakes.
pub const INVENTARIO_CENTRAL_ENTRADAS: &str = "inventario_central.entradas";

/// Splits `modulo.accion`; codes without a dot belong to no module.
pub fn split_code(code: &str) -> (Option<&str>, &str) {
    match code.split_once('.') {
        Some((module, action)) => (Some(module), action),
        None => (None, code),
    }
}
