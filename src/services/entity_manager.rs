//! Generic REST operations for any [`Resource`].

use std::marker::PhantomData;
use std::sync::Arc;

use crate::domain::pagination::ListEnvelope;
use crate::domain::{ApiError, Listing, PageRequest, Paginated, Resource};
use crate::infrastructure::http::ApiClient;
use crate::services::session::Session;

/// Row cap used when a whole collection is needed for a dropdown.
pub const LOOKUP_LIMIT: u64 = 100;

pub struct EntityManager<R: Resource> {
    client: Arc<ApiClient>,
    session: Option<Arc<Session>>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for EntityManager<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            session: self.session.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> EntityManager<R> {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            session: None,
            _resource: PhantomData,
        }
    }

    /// Check [`Resource::PERMISSIONS`] against `session` before every write.
    pub fn with_session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    fn authorize(&self, code: Option<&str>) -> Result<(), ApiError> {
        let (Some(session), Some(code)) = (&self.session, code) else {
            return Ok(());
        };
        session.require(code).inspect_err(|_| {
            tracing::warn!("Refusing write on {}: missing {}", R::PATH, code);
        })
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// One page of rows. [`Listing::Full`] endpoints are fetched whole and
    /// searched/sliced here; a paginated endpoint that answers with a bare
    /// array gets the same treatment.
    pub async fn list(&self, request: &PageRequest) -> Result<Paginated<R::Model>, ApiError> {
        let query = match R::LISTING {
            Listing::Paginated => request.query_pairs(),
            Listing::Full => Vec::new(),
        };

        let envelope: ListEnvelope<R::Model> = self.client.get_json(R::PATH, &query).await?;
        let page = match envelope {
            ListEnvelope::Paged(page) => page,
            ListEnvelope::Bare(items) => {
                let search = request.search.trim();
                let rows = if search.is_empty() {
                    items
                } else {
                    items.into_iter().filter(|m| R::matches(m, search)).collect()
                };
                Paginated::from_full(rows, request)
            }
        };

        tracing::debug!(
            "Listed {} page {} ({} of {} rows)",
            R::PATH,
            page.meta.page,
            page.data.len(),
            page.meta.total
        );
        Ok(page)
    }

    /// Every row, for selects and lookups.
    pub async fn all(&self) -> Result<Vec<R::Model>, ApiError> {
        let query = match R::LISTING {
            Listing::Paginated => PageRequest::new(1, LOOKUP_LIMIT).query_pairs(),
            Listing::Full => Vec::new(),
        };
        let envelope: ListEnvelope<R::Model> = self.client.get_json(R::PATH, &query).await?;
        Ok(envelope.into_items())
    }

    pub async fn get(&self, id: i64) -> Result<R::Model, ApiError> {
        self.client.get_json(&R::item_path(id), &[]).await
    }

    /// Permission and required fields are checked locally first; a refused
    /// or invalid draft never reaches the network.
    pub async fn create(&self, dto: &R::Create) -> Result<R::Model, ApiError> {
        self.authorize(R::PERMISSIONS.create)?;
        R::validate_create(dto)?;
        let created: R::Model = self.client.post_json(R::PATH, dto).await?;
        tracing::info!("Created {} #{}", R::LABEL, R::id(&created));
        Ok(created)
    }

    pub async fn update(&self, id: i64, dto: &R::Update) -> Result<R::Model, ApiError> {
        if !R::CAPABILITIES.update {
            return Err(ApiError::Unsupported(format!(
                "No se puede editar un {}",
                R::LABEL
            )));
        }
        self.authorize(R::PERMISSIONS.update)?;
        R::validate_update(dto)?;
        let updated = self.client.patch_json(&R::item_path(id), dto).await?;
        tracing::info!("Updated {} #{}", R::LABEL, id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        if !R::CAPABILITIES.delete {
            return Err(ApiError::Unsupported(format!(
                "No se puede eliminar un {}",
                R::LABEL
            )));
        }
        self.authorize(R::PERMISSIONS.delete)?;
        self.client.delete(&R::item_path(id)).await?;
        tracing::info!("Deleted {} #{}", R::LABEL, id);
        Ok(())
    }
}
