//! The list + form pattern shared by every maintenance screen.

use std::sync::Arc;

use crate::domain::{ApiError, Resource};
use crate::services::entity_manager::EntityManager;
use crate::services::listing::PagedList;
use crate::services::notify::{Notice, Notifier};

/// A draft being edited in the form, either a new record or an existing one.
pub enum EntityForm<R: Resource> {
    Create(R::Create),
    Edit { id: i64, draft: R::Update },
}

impl<R: Resource> Clone for EntityForm<R> {
    fn clone(&self) -> Self {
        match self {
            EntityForm::Create(dto) => EntityForm::Create(dto.clone()),
            EntityForm::Edit { id, draft } => EntityForm::Edit {
                id: *id,
                draft: draft.clone(),
            },
        }
    }
}

impl<R: Resource> std::fmt::Debug for EntityForm<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityForm::Create(dto) => f.debug_tuple("Create").field(dto).finish(),
            EntityForm::Edit { id, draft } => f
                .debug_struct("Edit")
                .field("id", id)
                .field("draft", draft)
                .finish(),
        }
    }
}

impl<R: Resource> EntityForm<R> {
    pub fn create(dto: R::Create) -> Self {
        EntityForm::Create(dto)
    }

    pub fn edit(id: i64, draft: R::Update) -> Self {
        EntityForm::Edit { id, draft }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, EntityForm::Edit { .. })
    }

    /// Local required-field check, without submitting.
    pub fn validate(&self) -> Result<(), ApiError> {
        match self {
            EntityForm::Create(dto) => R::validate_create(dto),
            EntityForm::Edit { draft, .. } => R::validate_update(draft),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    /// Saved; the list has been refetched and the form can close.
    Saved(T),
    /// The form stays open showing this error.
    Rejected(ApiError),
}

impl<T> SubmitOutcome<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Saved(_))
    }

    /// Inline message for a rejected form.
    pub fn message(&self) -> Option<String> {
        match self {
            SubmitOutcome::Saved(_) => None,
            SubmitOutcome::Rejected(e) => Some(e.user_message()),
        }
    }
}

fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct CrudPage<R: Resource> {
    list: PagedList<R>,
    manager: EntityManager<R>,
    notifier: Arc<dyn Notifier>,
}

impl<R: Resource> CrudPage<R> {
    pub fn new(manager: EntityManager<R>, notifier: Arc<dyn Notifier>, page_size: u64) -> Self {
        Self {
            list: PagedList::new(manager.clone(), notifier.clone(), page_size),
            manager,
            notifier,
        }
    }

    pub async fn load(&mut self) -> bool {
        self.list.refresh().await
    }

    pub fn list(&self) -> &PagedList<R> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut PagedList<R> {
        &mut self.list
    }

    pub fn manager(&self) -> &EntityManager<R> {
        &self.manager
    }

    /// Save the form. Validation and backend errors come back as
    /// [`SubmitOutcome::Rejected`]; errors that do not belong in the form are
    /// also raised as notices.
    pub async fn submit(&mut self, form: &EntityForm<R>) -> SubmitOutcome<R::Model> {
        let result = match form {
            EntityForm::Create(dto) => self.manager.create(dto).await,
            EntityForm::Edit { id, draft } => self.manager.update(*id, draft).await,
        };

        match result {
            Ok(model) => {
                let verb = if form.is_edit() { "actualizado" } else { "creado" };
                self.notifier.notify(Notice::success(format!(
                    "{} {} correctamente",
                    capitalized(R::LABEL),
                    verb
                )));
                self.list.refresh().await;
                SubmitOutcome::Saved(model)
            }
            Err(e) => {
                tracing::debug!("{} form rejected: {}", R::LABEL, e);
                if !e.is_inline() {
                    self.notifier.notify(Notice::from_error(&e));
                }
                SubmitOutcome::Rejected(e)
            }
        }
    }

    /// Delete a row; the list is refetched on success, a notice is raised on failure.
    pub async fn delete(&mut self, id: i64) -> Result<(), ApiError> {
        match self.manager.delete(id).await {
            Ok(()) => {
                self.notifier.notify(Notice::success(format!(
                    "{} eliminado",
                    capitalized(R::LABEL)
                )));
                self.list.refresh().await;
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(Notice::from_error(&e));
                Err(e)
            }
        }
    }
}
