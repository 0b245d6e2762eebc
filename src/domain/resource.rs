//! Schema description of one REST-backed entity.
//!
//! Each entity (stores, users, products, ...) is described once through
//! [`Resource`]; the generic [`crate::services::EntityManager`] and
//! [`crate::services::CrudPage`] drive every list/create/update/delete screen
//! from that description.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use super::ApiError;

/// How the collection endpoint answers a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// `{ data, meta }`, honours `page`, `limit` and `search`
    Paginated,
    /// A bare array of every row; paged and searched locally
    Full,
}

/// Operations the backend exposes beyond list and create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub update: bool,
    pub delete: bool,
}

impl Capabilities {
    pub const ALL: Capabilities = Capabilities {
        update: true,
        delete: true,
    };
    pub const NO_DELETE: Capabilities = Capabilities {
        update: true,
        delete: false,
    };
    pub const CREATE_ONLY: Capabilities = Capabilities {
        update: false,
        delete: false,
    };
}

/// Permission code each write action needs, when the screen gates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionPermissions {
    pub create: Option<&'static str>,
    pub update: Option<&'static str>,
    pub delete: Option<&'static str>,
}

impl ActionPermissions {
    pub const NONE: ActionPermissions = ActionPermissions {
        create: None,
        update: None,
        delete: None,
    };

    /// `modulo.crear`, `modulo.editar` and `modulo.eliminar`.
    pub const fn crud(create: &'static str, update: &'static str, delete: &'static str) -> Self {
        ActionPermissions {
            create: Some(create),
            update: Some(update),
            delete: Some(delete),
        }
    }
}

pub trait Resource: Send + Sync + 'static {
    type Model: DeserializeOwned + Serialize + Clone + Debug + Send + Sync;
    type Create: Serialize + Clone + Debug + Send + Sync;
    type Update: Serialize + Clone + Debug + Send + Sync;

    /// Collection path relative to the API base, e.g. `/locales`
    const PATH: &'static str;
    /// Singular noun used in notices
    const LABEL: &'static str;
    const LISTING: Listing;
    const CAPABILITIES: Capabilities;
    const PERMISSIONS: ActionPermissions = ActionPermissions::NONE;

    fn id(model: &Self::Model) -> i64;

    /// Local search for [`Listing::Full`] resources.
    fn matches(_model: &Self::Model, _search: &str) -> bool {
        true
    }

    fn validate_create(dto: &Self::Create) -> Result<(), ApiError>;

    fn validate_update(_dto: &Self::Update) -> Result<(), ApiError> {
        Ok(())
    }

    fn item_path(id: i64) -> String {
        format!("{}/{}", Self::PATH, id)
    }
}

/// Case-insensitive containment used by local search.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}
