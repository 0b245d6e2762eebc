//! Session & permission gate
//!
//! Holds the decoded token of the logged-in operator, persists it through a
//! [`TokenStore`] and answers `has_permission` for every screen and action.
//! Permissions are whatever the token says until the next login or
//! [`Session::refresh`].

use std::sync::{Arc, RwLock};

use crate::domain::{ApiError, Validator};
use crate::infrastructure::auth::{Claims, decode_token, decode_valid_token};
use crate::infrastructure::http::ApiClient;
use crate::infrastructure::storage::{StoredSession, TokenStore};
use crate::models::auth::{LoginRequest, LoginResponse, MenuItem, RefreshResponse};

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub claims: Claims,
    pub user_name: Option<String>,
}

impl Identity {
    /// Display name, falling back to the e-mail in the token.
    pub fn display_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or(&self.claims.email)
    }
}

pub struct Session {
    client: Arc<ApiClient>,
    store: Arc<dyn TokenStore>,
    owner_role: String,
    identity: RwLock<Option<Identity>>,
}

impl Session {
    pub fn new(client: Arc<ApiClient>, store: Arc<dyn TokenStore>, owner_role: impl Into<String>) -> Self {
        Self {
            client,
            store,
            owner_role: owner_role.into(),
            identity: RwLock::new(None),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, ApiError> {
        let mut v = Validator::new();
        v.required(email, "El correo es obligatorio.")
            .required(password, "La contraseña es obligatoria.");
        v.finish()?;

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let response: LoginResponse = self
            .client
            .post_json("/auth/login", &request)
            .await
            .map_err(|e| match e {
                // 401 here means bad credentials, not an expired session
                ApiError::SessionExpired => ApiError::validation("Credenciales inválidas"),
                other => other,
            })?;

        let identity = self.install(
            response.access_token,
            Some(response.usuario.nombre_completo),
        )?;
        tracing::info!("Logged in as {} ({})", identity.claims.email, identity.claims.rol);
        Ok(identity)
    }

    /// Drop the session everywhere: store, transport and memory.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.client.clear_token();
        if let Ok(mut slot) = self.identity.write() {
            *slot = None;
        }
        self.store.clear()?;
        tracing::info!("Session closed");
        Ok(())
    }

    /// Pick up a persisted session. Expired or unreadable tokens are discarded.
    pub fn restore(&self) -> Result<Option<Identity>, ApiError> {
        let Some(stored) = self.store.load()? else {
            return Ok(None);
        };

        match decode_valid_token(&stored.access_token) {
            Ok(claims) => {
                self.client.set_token(stored.access_token);
                let identity = Identity {
                    claims,
                    user_name: stored.user_name,
                };
                self.set_identity(Some(identity.clone()));
                tracing::debug!("Restored session for {}", identity.claims.email);
                Ok(Some(identity))
            }
            Err(_) => {
                self.logout()?;
                Ok(None)
            }
        }
    }

    /// Reissue the token so permission changes take effect without a new login.
    pub async fn refresh(&self) -> Result<Identity, ApiError> {
        let current = self.identity().ok_or(ApiError::SessionExpired)?;

        let response: RefreshResponse = self.client.post_empty("/auth/me/refresh").await?;
        let user_name = response
            .usuario
            .map(|u| u.nombre_completo)
            .or(current.user_name);

        let identity = self.install(response.access_token, user_name)?;
        tracing::info!(
            "Token refreshed, {} permission(s) now granted",
            identity.claims.permisos.len()
        );
        Ok(identity)
    }

    fn install(&self, token: String, user_name: Option<String>) -> Result<Identity, ApiError> {
        let claims = decode_token(&token)?;
        self.store.save(&StoredSession {
            access_token: token.clone(),
            user_name: user_name.clone(),
        })?;
        self.client.set_token(token);

        let identity = Identity { claims, user_name };
        self.set_identity(Some(identity.clone()));
        Ok(identity)
    }

    fn set_identity(&self, identity: Option<Identity>) {
        if let Ok(mut slot) = self.identity.write() {
            *slot = identity;
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity.read().ok().and_then(|slot| slot.clone())
    }

    pub fn claims(&self) -> Option<Claims> {
        self.identity().map(|i| i.claims)
    }

    pub fn user_name(&self) -> Option<String> {
        self.identity().map(|i| i.display_name().to_string())
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    pub fn owner_role(&self) -> &str {
        &self.owner_role
    }

    pub fn is_owner(&self) -> bool {
        self.claims()
            .is_some_and(|c| c.rol == self.owner_role)
    }

    pub fn has_permission(&self, code: &str) -> bool {
        self.claims()
            .is_some_and(|c| c.allows(code, &self.owner_role))
    }

    /// Fail with `PermissionDenied` unless the operator holds `code`.
    pub fn require(&self, code: &str) -> Result<(), ApiError> {
        if !self.is_authenticated() {
            return Err(ApiError::SessionExpired);
        }
        if self.has_permission(code) {
            Ok(())
        } else {
            Err(ApiError::PermissionDenied {
                message: String::new(),
                missing: vec![code.to_string()],
            })
        }
    }

    /// Navigation tree for the current operator.
    pub async fn menu(&self) -> Result<Vec<MenuItem>, ApiError> {
        let items: Vec<MenuItem> = self.client.get_json("/auth/me/menu", &[]).await?;
        Ok(filter_menu(items, &|code: &str| self.has_permission(code)))
    }
}

/// Keep the entries `allowed` grants, drop empty groups, order by `orden`.
pub fn filter_menu(items: Vec<MenuItem>, allowed: &dyn Fn(&str) -> bool) -> Vec<MenuItem> {
    let mut visible: Vec<MenuItem> = items
        .into_iter()
        .filter(|item| item.permiso_requerido.as_deref().is_none_or(allowed))
        .filter_map(|mut item| {
            item.hijos = filter_menu(std::mem::take(&mut item.hijos), allowed);
            if item.ruta.is_none() && item.hijos.is_empty() {
                None
            } else {
                Some(item)
            }
        })
        .collect();

    visible.sort_by_key(|item| item.orden.unwrap_or(i64::MAX));
    visible
}
