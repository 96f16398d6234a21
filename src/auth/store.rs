use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::token::TokenRecord;

/// Everything the extension persists: the pending code verifier and the
/// current token pair.
///
/// Always written and cleared as a whole record, so concurrent readers never
/// observe a half-updated token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub code_verifier: Option<String>,
    pub token: Option<TokenRecord>,
}

/// Storage abstraction for persisted credentials.
///
/// Injectable so the auth flow can run against the browser's storage in the
/// extension shell and against an in-memory fake in tests.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credentials>, AuthError>;
    fn save(&self, credentials: &Credentials) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// Configuration for file-backed credential storage.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_dir: PathBuf,
}

impl StoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_crossfade_dir()
    }
}

/// File-backed credential store using a single TOML file.
///
/// A missing file loads as `None` (treated as logged out by callers); clearing
/// a missing file is a no-op.
///
/// # Example
/// ```no_run
/// use crossfade::auth::{Credentials, CredentialStore, FileCredentialStore, StoreConfig};
///
/// let store = FileCredentialStore::new(StoreConfig::new(std::path::PathBuf::from("/tmp")));
/// store.save(&Credentials::default())?;
/// # Ok::<(), crossfade::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    base_dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_crossfade_dir(),
        }
    }

    fn credentials_path(&self) -> PathBuf {
        self.base_dir.join("credentials.toml")
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, AuthError> {
        let path = self.credentials_path();
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Storage(err.to_string())),
        };
        let file: CredentialsFile = toml::from_str(&raw)?;
        Ok(Some(file.credentials))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let path = self.credentials_path();
        Self::ensure_parent(&path)?;
        let file = CredentialsFile {
            version: 1,
            credentials: credentials.clone(),
            saved_at: DateTime::<Utc>::from(std::time::SystemTime::now()),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        let path = self.credentials_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Storage(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialsFile {
    version: u32,
    credentials: Credentials,
    saved_at: DateTime<Utc>,
}

/// In-memory credential store for tests and ephemeral contexts.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: Mutex<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, AuthError> {
        Ok(self
            .credentials
            .lock()
            .map_err(|_| AuthError::Storage("store lock poisoned".to_string()))?
            .clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), AuthError> {
        *self
            .credentials
            .lock()
            .map_err(|_| AuthError::Storage("store lock poisoned".to_string()))? =
            Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self
            .credentials
            .lock()
            .map_err(|_| AuthError::Storage("store lock poisoned".to_string()))? = None;
        Ok(())
    }
}

fn default_crossfade_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".crossfade"))
        .unwrap_or_else(|| PathBuf::from(".crossfade"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileCredentialStore) {
        let dir = TempDir::new().expect("tempdir");
        let store = FileCredentialStore::new(StoreConfig::new(dir.path().to_path_buf()));
        (dir, store)
    }

    fn sample_credentials() -> Credentials {
        Credentials {
            code_verifier: Some("verifier".to_string()),
            token: Some(TokenRecord {
                access_token: "access".to_string(),
                refresh_token: Some("refresh".to_string()),
                expires_at: Utc::now() + Duration::hours(1),
            }),
        }
    }

    #[test]
    fn round_trip_preserves_record() {
        let (_dir, store) = temp_store();
        store.save(&sample_credentials()).expect("save");
        let loaded = store.load().expect("load").expect("credentials");
        assert_eq!(loaded.code_verifier.as_deref(), Some("verifier"));
        let token = loaded.token.expect("token");
        assert_eq!(token.access_token, "access");
        assert_eq!(token.refresh_token.as_deref(), Some("refresh"));
        assert!(token.expires_at > Utc::now());
    }

    #[test]
    fn load_missing_returns_none() {
        let (_dir, store) = temp_store();
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn clear_removes_credentials() {
        let (_dir, store) = temp_store();
        store.save(&sample_credentials()).expect("save");
        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn clear_missing_is_noop() {
        let (_dir, store) = temp_store();
        store.clear().expect("clear");
    }

    #[test]
    fn corrupt_file_reports_serialization_error() {
        let (dir, store) = temp_store();
        fs::write(dir.path().join("credentials.toml"), "not [valid toml").expect("write");
        assert!(matches!(store.load(), Err(AuthError::Serialization(_))));
    }

    #[test]
    fn memory_store_round_trip_and_clear() {
        let store = MemoryCredentialStore::new();
        assert!(store.load().expect("load").is_none());
        store.save(&sample_credentials()).expect("save");
        assert!(store.load().expect("load").is_some());
        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
    }
}
