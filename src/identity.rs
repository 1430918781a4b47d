/*!
 * Stable anonymous user identity.
 *
 * Usage limits are tracked per user id. The id is a random UUID stored in
 * the data directory and reused across runs; an explicit id always wins and
 * replaces the stored one.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::database::DatabaseConnection;

/// File holding the stored id inside the data directory
const IDENTITY_FILENAME: &str = "user_id";

/// Default location of the stored id
pub fn default_identity_path() -> Result<PathBuf> {
    Ok(DatabaseConnection::default_data_dir()?.join(IDENTITY_FILENAME))
}

/// Generate a fresh random user id
pub fn generate_user_id() -> String {
    Uuid::new_v4().to_string()
}

fn read_stored(path: &Path) -> Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }

    let stored = fs::read_to_string(path)
        .with_context(|| format!("Failed to read user id from {:?}", path))?;
    let stored = stored.trim();

    Ok((!stored.is_empty()).then(|| stored.to_string()))
}

fn store(path: &Path, user_id: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    fs::write(path, user_id).with_context(|| format!("Failed to store user id in {:?}", path))
}

/// Resolve the user id for this run
///
/// An explicit non-blank id is used and persisted. Otherwise the stored id is
/// reused, or a new one is generated and persisted.
pub fn resolve(explicit: Option<&str>, store_path: &Path) -> Result<String> {
    if let Some(user_id) = explicit.map(str::trim).filter(|id| !id.is_empty()) {
        if read_stored(store_path)?.as_deref() != Some(user_id) {
            store(store_path, user_id)?;
        }
        debug!("Using explicit user id {}", user_id);
        return Ok(user_id.to_string());
    }

    if let Some(user_id) = read_stored(store_path)? {
        debug!("Using stored user id {}", user_id);
        return Ok(user_id);
    }

    let user_id = generate_user_id();
    store(store_path, &user_id)?;
    info!("Created new user id {}", user_id);
    Ok(user_id)
}
