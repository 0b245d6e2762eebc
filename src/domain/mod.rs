//! Domain layer - Pure client abstractions
//!
//! This layer contains NO transport code (no reqwest calls).
//! Only the error type, pagination, validation and the resource schema trait.

pub mod errors;
pub mod pagination;
pub mod permissions;
pub mod resource;
pub mod validation;

pub use errors::{ApiError, ErrorBody};
pub use pagination::{PageMeta, PageRequest, Paginated, total_pages};
pub use resource::{ActionPermissions, Capabilities, Listing, Resource};
pub use validation::Validator;
