use crate::errors::StoreError;
use crate::store::MealStore;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{info, warn};

/// Creates the data directory and a header-only store if none exists yet.
pub async fn init_store(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    if fs::try_exists(path).await? {
        return Ok(());
    }

    info!("creating empty meal store at {}", path.display());
    persist_store(path, &MealStore::default()).await
}

/// Reads the whole store. A missing file is an empty store.
pub async fn load_store(path: &Path) -> Result<MealStore, StoreError> {
    match fs::read_to_string(path).await {
        Ok(text) => MealStore::from_csv(&text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(MealStore::default()),
        Err(err) => Err(err.into()),
    }
}

/// Rewrites the whole store: stage next to the target, then rename over it.
pub async fn persist_store(path: &Path, store: &MealStore) -> Result<(), StoreError> {
    let staging = write_staging(path, store).await?;
    swap_into_place(&staging, path).await
}

pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("meal_data.csv"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes and syncs the serialized store to the staging file. The live
/// store is untouched until [`swap_into_place`] runs.
pub async fn write_staging(path: &Path, store: &MealStore) -> Result<PathBuf, StoreError> {
    let payload = store.to_csv()?;
    let staging = staging_path(path);

    let written = async {
        let mut file = fs::File::create(&staging).await?;
        file.write_all(&payload).await?;
        file.sync_all().await
    }
    .await;

    if let Err(err) = written {
        discard(&staging).await;
        return Err(err.into());
    }
    Ok(staging)
}

pub async fn swap_into_place(staging: &Path, path: &Path) -> Result<(), StoreError> {
    if let Err(err) = fs::rename(staging, path).await {
        discard(staging).await;
        return Err(err.into());
    }
    Ok(())
}

async fn discard(staging: &Path) {
    if let Err(err) = fs::remove_file(staging).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!("failed to remove staging file {}: {err}", staging.display());
        }
    }
}
