//! Wire models mirrored from the back-office API, plus the [`Resource`]
//! description of each CRUD entity.
//!
//! [`Resource`]: crate::domain::Resource

pub mod auth;
pub mod categoria;
pub mod entrada;
pub mod local;
pub mod permiso;
pub mod producto;
pub mod proveedor;
pub mod requerimiento;
pub mod rol;
pub mod unidad;
pub mod usuario;

pub use categoria::Categorias;
pub use entrada::Entradas;
pub use local::Locales;
pub use producto::Productos;
pub use proveedor::Proveedores;
pub use requerimiento::Requerimientos;
pub use rol::Roles;
pub use unidad::Unidades;
pub use usuario::Usuarios;
