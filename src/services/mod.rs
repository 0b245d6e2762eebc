//! Services Layer
//!
//! Screen-level logic on top of the HTTP client: session gate, generic lists
//! and forms, and the workflows that do not fit plain CRUD.

pub mod crud;
pub mod entity_manager;
pub mod entrada_service;
pub mod listing;
pub mod lookups;
pub mod notify;
pub mod requisition_service;
pub mod role_service;
pub mod session;
pub mod usuario_service;

// Re-export for convenience
pub use crud::{CrudPage, EntityForm, SubmitOutcome};
pub use entity_manager::EntityManager;
pub use listing::{CellValue, Column, PagedList, SortDirection, TableView};
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use requisition_service::{RequisitionAction, RequisitionService, ViewMode};
pub use session::{Identity, Session};
