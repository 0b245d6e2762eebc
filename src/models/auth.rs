use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpresaInfo {
    pub subdominio: String,
    pub schema: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalInfo {
    pub id: i64,
    pub nombre: String,
    pub codigo: String,
    #[serde(default)]
    pub tiene_mesas: bool,
}

/// User profile returned alongside the token at login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioSesion {
    pub id: i64,
    pub email: String,
    pub nombre_completo: String,
    pub rol: String,
    pub empresa: Option<EmpresaInfo>,
    #[serde(default)]
    pub locales: Vec<LocalInfo>,
    #[serde(default)]
    pub permisos: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub usuario: UsuarioSesion,
}

/// `/auth/me/refresh` reissues the token with the current permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub usuario: Option<UsuarioSesion>,
}

/// Menu entry as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub codigo: String,
    pub titulo: String,
    #[serde(default)]
    pub icono: String,
    pub ruta: Option<String>,
    pub permiso_requerido: Option<String>,
    pub orden: Option<i64>,
    #[serde(default)]
    pub hijos: Vec<MenuItem>,
}

impl MenuItem {
    pub fn is_public(&self) -> bool {
        self.permiso_requerido.is_none()
    }
}
