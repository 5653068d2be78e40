pub mod app;
pub mod auth;
pub mod config;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod kv;
pub mod models;
pub mod state;
pub mod stats;
pub mod ui;
pub mod validation;

pub use app::router;
pub use auth::{AuthProvider, SupabaseAuth};
pub use config::Config;
pub use kv::KvStore;
pub use state::AppState;
