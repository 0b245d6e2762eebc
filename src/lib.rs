pub mod domain;
pub mod infrastructure;
pub mod models;
pub mod services;

pub use domain::{ApiError, PageRequest, Paginated, Resource};
pub use infrastructure::{AppContext, Config};
