pub mod app;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod store;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{init_store, load_store, persist_store};
