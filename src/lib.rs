pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod stats;
pub mod storage;
pub mod store;
pub mod ui;
pub mod state;
pub mod validation;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use storage::{FileKv, MemoryKv, Persistence};
pub use store::TipStore;
