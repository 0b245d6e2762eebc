//! Infrastructure layer - Transport and process plumbing
//!
//! This layer contains:
//! - Token decoding (auth)
//! - Configuration loading (config)
//! - The HTTP client (http)
//! - Session persistence (storage)
//! - Application context (state)

pub mod auth;
pub mod config;
pub mod http;
pub mod state;
pub mod storage;

pub use config::Config;
pub use http::ApiClient;
pub use state::AppContext;
pub use storage::{FileTokenStore, MemoryTokenStore, StoredSession, TokenStore};
