use super::{CacheSnapshot, CacheStore};
use crate::error::{IdentityError, Result};
use atomicwrites::{AllowOverwrite, AtomicFile};
use std::io::Write;
use std::path::{Path, PathBuf};

const CACHE_FILE: &str = "identity-cache.json";

/// JSON cache file, replaced atomically on every save.
///
/// The file holds refresh tokens; on Unix it is restricted to the owner.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/<app_name>/identity-cache.json`.
    pub fn in_data_dir(app_name: &str) -> Result<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| IdentityError::Storage("could not determine data dir".into()))?;
        Ok(Self::new(base.join(app_name).join(CACHE_FILE)))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self) -> Result<CacheSnapshot> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CacheSnapshot::default());
            }
            Err(e) => {
                return Err(IdentityError::Storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                IdentityError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        AtomicFile::new(&self.path, AllowOverwrite)
            .write(|f| f.write_all(json.as_bytes()))
            .map_err(|e| {
                IdentityError::Storage(format!("failed to write {}: {e}", self.path.display()))
            })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| IdentityError::Storage(e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Account;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_cache() {
        let temp = TempDir::new().unwrap();
        let store = FileCacheStore::new(temp.path().join("none.json"));
        assert_eq!(store.load().unwrap(), CacheSnapshot::default());
    }

    #[test]
    fn save_then_load_in_nested_dir() {
        let temp = TempDir::new().unwrap();
        let store = FileCacheStore::new(temp.path().join("portal").join(CACHE_FILE));

        let mut snap = CacheSnapshot::default();
        snap.upsert_account(Account {
            home_account_id: "oid.tid".into(),
            username: "hank@contoso.com".into(),
            tenant_id: "tid".into(),
            name: None,
        })
        .refresh_token = Some("rt".into());
        snap.active_account_id = Some("oid.tid".into());
        store.save(&snap).unwrap();

        assert_eq!(store.load().unwrap(), snap);
    }

    #[cfg(unix)]
    #[test]
    fn cache_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let store = FileCacheStore::new(temp.path().join(CACHE_FILE));
        store.save(&CacheSnapshot::default()).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CACHE_FILE);
        std::fs::write(&path, "{not json").unwrap();

        assert!(FileCacheStore::new(path).load().is_err());
    }
}
