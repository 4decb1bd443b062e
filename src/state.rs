use crate::config::Config;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub static_dir: PathBuf,
    /// Serializes read-merge-write cycles within this process.
    pub writes: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            data_path: config.data_path.clone(),
            static_dir: config.static_dir.clone(),
            writes: Arc::new(Mutex::new(())),
        }
    }
}
