//! Local key/value configuration store
//!
//! The host owns configuration persistence; the workflow only needs to merge
//! keys into it and read the verified flags back. Two stores are provided: an
//! in-memory one and a JSON file.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use tracing::{debug, error};

use crate::errors::IdentityError;
use crate::identity::{domain_of, same_email_address, IdentityType};

pub type Parameters = Map<String, Value>;

/// Persisted configuration the verified flags are written into
pub trait ConfigStore: Send + Sync {
    /// Read a single key
    fn get(&self, key: &str) -> Result<Option<Value>, IdentityError>;

    /// Merge the given keys into the configuration, overwriting existing ones
    fn set_parameters(&self, parameters: Parameters) -> Result<(), IdentityError>;
}

/// Configuration store kept in memory
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    parameters: RwLock<Parameters>,
    writes: AtomicUsize,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set_parameters` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Result<Option<Value>, IdentityError> {
        let parameters = self
            .parameters
            .read()
            .map_err(|_| IdentityError::Config("configuration lock poisoned".to_string()))?;
        Ok(parameters.get(key).cloned())
    }

    fn set_parameters(&self, parameters: Parameters) -> Result<(), IdentityError> {
        let mut current = self
            .parameters
            .write()
            .map_err(|_| IdentityError::Config("configuration lock poisoned".to_string()))?;
        current.extend(parameters);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Configuration store backed by a JSON object in a file
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Parameters, IdentityError> {
        if !self.path.exists() {
            return Ok(Parameters::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Parameters::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(IdentityError::Config(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self, key: &str) -> Result<Option<Value>, IdentityError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set_parameters(&self, parameters: Parameters) -> Result<(), IdentityError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| IdentityError::Config("configuration lock poisoned".to_string()))?;

        let mut current = self.load()?;
        current.extend(parameters);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write then rename so readers never see a half-written file
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_string_pretty(&Value::Object(current))?)?;
        fs::rename(&tmp_path, &self.path)?;

        debug!("Wrote local configuration to {}", self.path.display());
        Ok(())
    }
}

/// Configuration key holding the verified flag for an identity type
pub fn verified_flag_key(identity_type: IdentityType) -> String {
    format!("mailer_from_{}_verified", identity_type.config_segment())
}

/// Replace the verified flag for the identity type with `{identity: verified}`
pub fn write_verified_flag(
    store: &dyn ConfigStore,
    identity_type: IdentityType,
    identity: &str,
    verified: bool,
) -> Result<(), IdentityError> {
    let mut entry = Map::new();
    entry.insert(identity.to_string(), Value::Bool(verified));

    let mut parameters = Parameters::new();
    parameters.insert(verified_flag_key(identity_type), Value::Object(entry));

    store.set_parameters(parameters)
}

/// Read back the identity and flag stored for the identity type.
///
/// Hosts that persist strings store the entry JSON-encoded; both forms are
/// accepted.
pub fn read_verified_flag(
    store: &dyn ConfigStore,
    identity_type: IdentityType,
) -> Result<Option<(String, bool)>, IdentityError> {
    let entry = match store.get(&verified_flag_key(identity_type))? {
        Some(Value::Object(map)) => map,
        Some(Value::String(encoded)) if !encoded.is_empty() => {
            match serde_json::from_str::<Value>(&encoded)? {
                Value::Object(map) => map,
                _ => return Ok(None),
            }
        }
        _ => return Ok(None),
    };

    Ok(entry
        .into_iter()
        .next()
        .map(|(identity, verified)| (identity, verified.as_bool().unwrap_or(false))))
}

/// Whether the stored verified domain is verified and matches the domain of
/// `email`, ignoring case
pub fn is_domain_verified(store: &dyn ConfigStore, email: &str) -> bool {
    let (stored, verified) = match read_verified_flag(store, IdentityType::Domain) {
        Ok(Some(entry)) => entry,
        Ok(None) => return false,
        Err(e) => {
            error!("Failed to read verified domain flag: {}", e);
            return false;
        }
    };

    match (domain_of(&stored), domain_of(email)) {
        (Ok(stored_domain), Ok(domain)) => verified && stored_domain.eq_ignore_ascii_case(&domain),
        _ => false,
    }
}

/// Whether the stored verified email address is verified and names the same
/// mailbox as `email`
pub fn is_email_verified(store: &dyn ConfigStore, email: &str) -> bool {
    match read_verified_flag(store, IdentityType::EmailAddress) {
        Ok(Some((address, verified))) => verified && same_email_address(&address, email),
        Ok(None) => false,
        Err(e) => {
            error!("Failed to read verified email flag: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_verified_flag_key() {
        assert_eq!(
            verified_flag_key(IdentityType::EmailAddress),
            "mailer_from_email_address_verified"
        );
        assert_eq!(
            verified_flag_key(IdentityType::Domain),
            "mailer_from_domain_verified"
        );
    }

    #[test]
    fn test_memory_store_merges_and_overwrites() {
        let store = MemoryConfigStore::new();

        write_verified_flag(&store, IdentityType::Domain, "example.com", false).unwrap();
        write_verified_flag(&store, IdentityType::Domain, "other.com", true).unwrap();
        write_verified_flag(&store, IdentityType::EmailAddress, "a@b.com", true).unwrap();

        // Last write wins, no history kept
        assert_eq!(
            store.get("mailer_from_domain_verified").unwrap(),
            Some(json!({ "other.com": true }))
        );
        assert_eq!(
            read_verified_flag(&store, IdentityType::EmailAddress).unwrap(),
            Some(("a@b.com".to_string(), true))
        );
        assert_eq!(store.write_count(), 3);
    }

    #[test]
    fn test_read_verified_flag_accepts_encoded_string() {
        let store = MemoryConfigStore::new();
        let mut parameters = Parameters::new();
        parameters.insert(
            "mailer_from_domain_verified".to_string(),
            json!("{\"example.com\":true}"),
        );
        store.set_parameters(parameters).unwrap();

        assert_eq!(
            read_verified_flag(&store, IdentityType::Domain).unwrap(),
            Some(("example.com".to_string(), true))
        );
    }

    #[test]
    fn test_read_verified_flag_missing() {
        let store = MemoryConfigStore::new();
        assert_eq!(read_verified_flag(&store, IdentityType::Domain).unwrap(), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("local.json");
        let store = FileConfigStore::new(&path);

        assert_eq!(store.get("anything").unwrap(), None);

        let mut parameters = Parameters::new();
        parameters.insert("mailer_transport".to_string(), json!("ses"));
        store.set_parameters(parameters).unwrap();
        write_verified_flag(&store, IdentityType::EmailAddress, "a@b.com", false).unwrap();

        // A fresh store reads what the first one persisted
        let reopened = FileConfigStore::new(&path);
        assert_eq!(reopened.get("mailer_transport").unwrap(), Some(json!("ses")));
        assert_eq!(
            read_verified_flag(&reopened, IdentityType::EmailAddress).unwrap(),
            Some(("a@b.com".to_string(), false))
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_serializes_concurrent_writers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        let store = Arc::new(FileConfigStore::new(&path));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let mut parameters = Parameters::new();
                    parameters.insert(format!("key_{}", i), json!(i));
                    store.set_parameters(parameters).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Every writer merged into the file, none lost to a concurrent rewrite
        for i in 0..8 {
            assert_eq!(store.get(&format!("key_{}", i)).unwrap(), Some(json!(i)));
        }
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_email_gate_ignores_domain_case() {
        let store = MemoryConfigStore::new();
        write_verified_flag(&store, IdentityType::EmailAddress, "user@example.com", true).unwrap();

        assert!(is_email_verified(&store, "user@Example.com"));
        assert!(!is_email_verified(&store, "other@example.com"));
        assert!(!is_domain_verified(&store, "user@example.com"));

        write_verified_flag(&store, IdentityType::EmailAddress, "user@example.com", false).unwrap();
        assert!(!is_email_verified(&store, "user@example.com"));
    }

    #[test]
    fn test_domain_gate() {
        let store = MemoryConfigStore::new();
        write_verified_flag(&store, IdentityType::Domain, "Example.com", true).unwrap();

        assert!(is_domain_verified(&store, "anyone@example.COM"));
        assert!(!is_domain_verified(&store, "anyone@other.com"));
        assert!(!is_domain_verified(&store, "not valid"));
    }

    #[test]
    fn test_file_store_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let store = FileConfigStore::new(&path);
        assert!(matches!(store.get("key"), Err(IdentityError::Config(_))));
    }
}
