//! Application context shared by every screen and command

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ApiError, Resource};
use crate::infrastructure::config::Config;
use crate::infrastructure::http::ApiClient;
use crate::infrastructure::storage::{FileTokenStore, TokenStore};
use crate::services::crud::CrudPage;
use crate::services::entity_manager::EntityManager;
use crate::services::entrada_service::EntradaService;
use crate::services::lookups::{FormLookups, UnitCache, load_form_lookups};
use crate::services::notify::{Notice, Notifier, TracingNotifier};
use crate::services::requisition_service::RequisitionService;
use crate::services::role_service::RoleService;
use crate::services::session::Session;
use crate::services::usuario_service::UsuarioService;

/// Everything that used to live in globals: the transport, the session, the
/// notice sink and the lookup caches. Built once by [`AppContext::init`] and
/// torn down by [`AppContext::shutdown`].
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub client: Arc<ApiClient>,
    pub session: Arc<Session>,
    pub notifier: Arc<dyn Notifier>,
    pub unit_cache: Arc<UnitCache>,
}

impl AppContext {
    /// Build the context and pick up a persisted session if there is one.
    pub fn init(
        config: Config,
        store: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let client = Arc::new(ApiClient::new(
            &config.api_url,
            Duration::from_secs(config.timeout_secs),
        )?);
        let session = Arc::new(Session::new(
            client.clone(),
            store,
            config.owner_role.clone(),
        ));
        let unit_cache = Arc::new(UnitCache::new(client.clone()));

        if let Some(identity) = session.restore()? {
            tracing::info!("Session restored for {}", identity.display_name());
        }

        Ok(Self {
            config,
            client,
            session,
            notifier,
            unit_cache,
        })
    }

    /// Context backed by the session file named in `config`.
    pub fn from_config(config: Config) -> Result<Self, ApiError> {
        let store = Arc::new(FileTokenStore::new(config.session_file.clone()));
        Self::init(config, store, Arc::new(TracingNotifier::new(true)))
    }

    /// Drop cached lookups. The persisted session is kept for the next run.
    pub fn shutdown(&self) {
        self.unit_cache.clear();
        tracing::debug!("Application context shut down");
    }

    /// Central reaction to a failed call: a notice for the operator and, for
    /// an expired session, a forced logout.
    pub fn handle_error(&self, error: &ApiError) {
        self.notifier.notify(Notice::from_error(error));
        self.expire_if_needed(error);
    }

    /// Log out when `error` means the token is no longer accepted.
    pub fn expire_if_needed(&self, error: &ApiError) -> bool {
        if !error.is_session_expired() {
            return false;
        }
        if let Err(e) = self.session.logout() {
            tracing::error!("Logout after expired session failed: {}", e);
        }
        self.notifier
            .notify(Notice::warning("Redirigiendo al inicio de sesión"));
        true
    }

    /// Fail early when nobody is logged in.
    pub fn require_session(&self) -> Result<(), ApiError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(ApiError::SessionExpired)
        }
    }

    pub fn manager<R: Resource>(&self) -> EntityManager<R> {
        EntityManager::new(self.client.clone()).with_session(self.session.clone())
    }

    pub fn crud<R: Resource>(&self) -> CrudPage<R> {
        CrudPage::new(self.manager(), self.notifier.clone(), self.config.page_size)
    }

    pub fn requisitions(&self) -> RequisitionService {
        RequisitionService::new(self.client.clone(), self.session.clone())
    }

    pub fn entradas(&self) -> EntradaService {
        EntradaService::new(
            self.client.clone(),
            self.session.clone(),
            self.unit_cache.clone(),
        )
    }

    pub fn roles(&self) -> RoleService {
        RoleService::new(self.client.clone())
    }

    pub fn usuarios(&self) -> UsuarioService {
        UsuarioService::new(self.client.clone())
    }

    pub async fn form_lookups(&self) -> Result<FormLookups, ApiError> {
        load_form_lookups(&self.client).await
    }
}
